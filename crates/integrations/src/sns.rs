//! SNS publish integration
//!
//! SNS expects a url-encoded query string rather than a JSON body, so the
//! request body is passed through as the message without VTL transformation.

use crate::descriptor::{IntegrationDescriptor, IntegrationKind, ResponseMapping};
use crate::templates;
use apigw_openapi_common::Result;
use serde::{Deserialize, Serialize};
use tera::Context;

pub const PUBLISH_URI: &str = "arn:aws:apigateway:${region}:sns:action/Publish";

/// An SNS topic behind a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnsTarget {
    pub topic_arn: String,
    pub role_arn: String,
}

impl SnsTarget {
    pub fn new(topic_arn: impl Into<String>, role_arn: impl Into<String>) -> Self {
        Self {
            topic_arn: topic_arn.into(),
            role_arn: role_arn.into(),
        }
    }
}

pub fn sns_integration(target: &SnsTarget) -> Result<IntegrationDescriptor> {
    let mut context = Context::new();
    context.insert("topic_arn", &target.topic_arn);
    context.insert("message", "$input.body");
    let query_string = templates::render(templates::SNS_PUBLISH, &context)?;

    let descriptor =
        IntegrationDescriptor::new(IntegrationKind::Aws, PUBLISH_URI, target.role_arn.clone())
            .with_json_request_template(query_string)
            .with_request_parameter(
                "integration.request.header.Content-Type",
                "'application/x-www-form-urlencoded'",
            )
            .with_response("default", ResponseMapping::status("200"))
            .with_response("4xx", ResponseMapping::status("400"))
            .with_response("5xx", ResponseMapping::status("500"));

    descriptor.validate()?;
    Ok(descriptor)
}

//! API Gateway integration builders
//!
//! Each builder maps a backend target (Lambda function, state machine, S3
//! bucket, DynamoDB table, SNS topic) and a credential ARN to an
//! [`IntegrationDescriptor`]. Builders are pure: no I/O, no global state.
//!
//! ## Placeholders
//!
//! Targets are usually infrastructure placeholders such as
//! `${lambda_function_arn}`; the builders emit them verbatim, along with
//! `${region}` in service action URIs, for the deployment tooling to
//! substitute.
//!
//! ## Usage
//! ```rust
//! use apigw_openapi_common::HttpMethod;
//! use apigw_openapi_integrations::{BuildContext, IntegrationTarget, LambdaTarget};
//!
//! let target = IntegrationTarget::Lambda(LambdaTarget::new("${fn_arn}", "${role_arn}"));
//! let ctx = BuildContext::new(HttpMethod::Get, vec!["user_id".to_string()]);
//! let descriptor = target.build(&ctx).unwrap();
//! assert_eq!(descriptor.uri, "${fn_arn}");
//! ```

pub mod descriptor;
pub mod dynamodb;
pub mod lambda;
pub mod mock;
pub mod s3;
pub mod sns;
pub mod step_function;
pub mod templates;

pub use descriptor::{
    IntegrationDescriptor, IntegrationKind, ResponseMapping, ResponseMappings, ResponseOverride,
    JSON_CONTENT_TYPE,
};
pub use dynamodb::{dynamodb_integration, DynamoDbTarget};
pub use lambda::{lambda_integration, LambdaMode, LambdaTarget};
pub use mock::{cors_preflight_integration, mock_integration};
pub use s3::{s3_integration, S3Target};
pub use sns::{sns_integration, SnsTarget};
pub use step_function::{step_function_integration, Execution, StepFunctionTarget};

use apigw_openapi_common::{HttpMethod, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Route facts a builder may need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    /// Method the route is registered for
    pub http_method: HttpMethod,
    /// Placeholder names of the route path, in order
    pub path_parameters: Vec<String>,
}

impl BuildContext {
    pub fn new(http_method: HttpMethod, path_parameters: Vec<String>) -> Self {
        Self {
            http_method,
            path_parameters,
        }
    }
}

/// The backend a route is wired to
///
/// Each variant carries only the fields its integration needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntegrationTarget {
    Lambda(LambdaTarget),
    StepFunction(StepFunctionTarget),
    S3(S3Target),
    #[serde(rename = "dynamodb")]
    DynamoDb(DynamoDbTarget),
    Sns(SnsTarget),
    /// Not implemented yet, answers 501
    Mock,
}

impl IntegrationTarget {
    /// Names of every integration source a route can be given
    pub const SOURCE_NAMES: &'static [&'static str] =
        &["lambda", "step_function", "s3", "dynamodb", "sns", "mock"];

    pub fn name(&self) -> &'static str {
        match self {
            IntegrationTarget::Lambda(_) => "lambda",
            IntegrationTarget::StepFunction(_) => "step_function",
            IntegrationTarget::S3(_) => "s3",
            IntegrationTarget::DynamoDb(_) => "dynamodb",
            IntegrationTarget::Sns(_) => "sns",
            IntegrationTarget::Mock => "mock",
        }
    }

    /// Build the integration descriptor for a route
    pub fn build(&self, ctx: &BuildContext) -> Result<IntegrationDescriptor> {
        debug!(
            integration = self.name(),
            method = %ctx.http_method,
            path_parameters = ?ctx.path_parameters,
            "building integration"
        );

        match self {
            IntegrationTarget::Lambda(target) => lambda_integration(target, &ctx.path_parameters),
            IntegrationTarget::StepFunction(target) => step_function_integration(target),
            IntegrationTarget::S3(target) => {
                s3_integration(target, ctx.http_method, &ctx.path_parameters)
            }
            IntegrationTarget::DynamoDb(target) => dynamodb_integration(target, ctx.http_method),
            IntegrationTarget::Sns(target) => sns_integration(target),
            IntegrationTarget::Mock => Ok(mock_integration()),
        }
    }
}

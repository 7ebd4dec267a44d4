//! DynamoDB integrations
//!
//! - POST maps to `PutItem`; partition and sort keys come from caller
//!   patterns or default to fields of the request body.
//! - GET maps to `Query`; the key condition must be supplied as VTL.

use crate::descriptor::{IntegrationDescriptor, IntegrationKind, ResponseMapping, ResponseMappings};
use crate::templates;
use apigw_openapi_common::{GatewayError, HttpMethod, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tera::Context;
use tracing::debug;

pub const PUT_ITEM_URI: &str = "arn:aws:apigateway:${region}:dynamodb:action/PutItem";
pub const QUERY_URI: &str = "arn:aws:apigateway:${region}:dynamodb:action/Query";

pub const DEFAULT_PK_PATTERN: &str = "$input.path('$.owner')#$input.path('$.project')";
pub const DEFAULT_SK_PATTERN: &str =
    "$input.path('$.project')#$input.path('$.eventname')#$input.path('$.timestamp')";
pub const DEFAULT_FIELDS: &str = r#""timestamp": { "S": "$context.requestTime" }"#;

/// Thirty days
pub const DEFAULT_TTL_SECONDS: u64 = 2_592_000;

const ORIGIN_PARAM: &str = "$input.params('origin')";

/// A DynamoDB table behind a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamoDbTarget {
    pub table_name: String,
    pub role_arn: String,

    /// Replaces the generated request template entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pk_pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sk_pattern: Option<String>,

    /// Extra attribute block placed after `PK`/`SK` in the item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,

    /// Query body fragment following `TableName` (GET only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_expr: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_seconds: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_parameters: Option<IndexMap<String, String>>,
}

impl DynamoDbTarget {
    pub fn new(table_name: impl Into<String>, role_arn: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            role_arn: role_arn.into(),
            mapping_template: None,
            pk_pattern: None,
            sk_pattern: None,
            fields: None,
            query_expr: None,
            ttl_seconds: None,
            request_parameters: None,
        }
    }

    pub fn with_mapping_template(mut self, template: impl Into<String>) -> Self {
        self.mapping_template = Some(template.into());
        self
    }

    pub fn with_pk_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pk_pattern = Some(pattern.into());
        self
    }

    pub fn with_sk_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.sk_pattern = Some(pattern.into());
        self
    }

    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn with_query_expr(mut self, expr: impl Into<String>) -> Self {
        self.query_expr = Some(expr.into());
        self
    }

    pub fn with_ttl_seconds(mut self, ttl: u64) -> Self {
        self.ttl_seconds = Some(ttl);
        self
    }

    /// Whether any caller-supplied expression reads the `origin` header
    fn references_origin(&self) -> bool {
        [
            &self.pk_pattern,
            &self.sk_pattern,
            &self.fields,
            &self.query_expr,
            &self.mapping_template,
        ]
        .into_iter()
        .flatten()
        .any(|expr| expr.contains(ORIGIN_PARAM))
    }
}

/// Build the integration for a DynamoDB target
pub fn dynamodb_integration(
    target: &DynamoDbTarget,
    route_method: HttpMethod,
) -> Result<IntegrationDescriptor> {
    if target.table_name.trim().is_empty() {
        return Err(GatewayError::InvalidArgument(
            "dynamodb integration requires a table name".to_string(),
        ));
    }

    let (uri, request_template) = match route_method {
        HttpMethod::Post => (PUT_ITEM_URI, put_item_template(target)?),
        HttpMethod::Get => (QUERY_URI, query_template(target)?),
        other => {
            return Err(GatewayError::Configuration(format!(
                "Unsupported HTTP method {} for DynamoDB integration. \
                 Only POST (PutItem) or GET (Query) is allowed.",
                other
            )))
        }
    };

    debug!(table = %target.table_name, %uri, "dynamodb mapping template:\n{}", request_template);

    let mut descriptor =
        IntegrationDescriptor::new(IntegrationKind::Aws, uri, target.role_arn.clone())
            .with_json_request_template(request_template)
            .with_responses(default_responses());

    if let Some(parameters) = &target.request_parameters {
        for (name, source) in parameters {
            descriptor = descriptor.with_request_parameter(name.clone(), source.clone());
        }
    }

    if target.references_origin() {
        descriptor = descriptor.with_request_parameter(
            "integration.request.header.origin",
            "method.request.header.origin",
        );
    }

    descriptor.validate()?;
    Ok(descriptor)
}

fn put_item_template(target: &DynamoDbTarget) -> Result<String> {
    if let Some(template) = &target.mapping_template {
        return Ok(template.clone());
    }

    let mut context = Context::new();
    context.insert("table_name", &target.table_name);
    context.insert(
        "ttl_seconds",
        &target.ttl_seconds.unwrap_or(DEFAULT_TTL_SECONDS),
    );
    context.insert(
        "pk_pattern",
        target.pk_pattern.as_deref().unwrap_or(DEFAULT_PK_PATTERN),
    );
    context.insert(
        "sk_pattern",
        target.sk_pattern.as_deref().unwrap_or(DEFAULT_SK_PATTERN),
    );
    context.insert("fields", target.fields.as_deref().unwrap_or(DEFAULT_FIELDS));

    templates::render(templates::DYNAMODB_PUT_ITEM, &context)
}

/// Query key conditions cannot be derived, the caller supplies them as VTL
fn query_template(target: &DynamoDbTarget) -> Result<String> {
    if let Some(template) = &target.mapping_template {
        return Ok(template.clone());
    }

    let query_expr = target.query_expr.as_deref().ok_or_else(|| {
        GatewayError::InvalidArgument(
            "dynamodb GET (Query) integration requires query_expr".to_string(),
        )
    })?;

    let mut context = Context::new();
    context.insert("table_name", &target.table_name);
    context.insert("query_expr", query_expr);

    templates::render(templates::DYNAMODB_QUERY, &context)
}

fn default_responses() -> ResponseMappings {
    let mut responses = ResponseMappings::new();
    responses.insert("default".to_string(), ResponseMapping::status("200"));
    responses.insert("4xx".to_string(), ResponseMapping::status("400"));
    responses.insert("5xx".to_string(), ResponseMapping::status("500"));
    responses
}

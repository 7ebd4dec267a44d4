//! Lambda integrations
//!
//! Proxy integrations (`aws_proxy`) hand the whole request to the function,
//! which must then return its own CORS headers. Direct integrations (`aws`)
//! call the function with the mapped request template only.

use crate::descriptor::{IntegrationDescriptor, IntegrationKind, ResponseMapping, ResponseOverride};
use apigw_openapi_common::{is_valid_parameter_name, GatewayError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How API Gateway invokes the function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LambdaMode {
    #[default]
    Proxy,
    Direct,
}

impl LambdaMode {
    fn kind(&self) -> IntegrationKind {
        match self {
            LambdaMode::Proxy => IntegrationKind::AwsProxy,
            LambdaMode::Direct => IntegrationKind::Aws,
        }
    }
}

/// A Lambda function behind a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LambdaTarget {
    /// Invocation URI, usually a `${lambda_function_arn}` placeholder
    pub function_uri: String,

    /// Role API Gateway assumes to invoke the function
    pub role_arn: String,

    #[serde(default)]
    pub mode: LambdaMode,

    /// Replaces the generated request template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_template: Option<String>,

    /// Merged into the `default` response mapping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseOverride>,
}

impl LambdaTarget {
    pub fn new(function_uri: impl Into<String>, role_arn: impl Into<String>) -> Self {
        Self {
            function_uri: function_uri.into(),
            role_arn: role_arn.into(),
            mode: LambdaMode::Proxy,
            request_template: None,
            response: None,
        }
    }

    /// Switch to a direct (`aws`) integration
    pub fn direct(mut self) -> Self {
        self.mode = LambdaMode::Direct;
        self
    }

    pub fn with_request_template(mut self, template: impl Into<String>) -> Self {
        self.request_template = Some(template.into());
        self
    }

    pub fn with_response(mut self, response: ResponseOverride) -> Self {
        self.response = Some(response);
        self
    }
}

/// Build the integration for a Lambda target
///
/// Every path parameter is forwarded twice: as a `pathParameters` entry in
/// the request template and as an `integration.request.path.*` mapping.
pub fn lambda_integration(
    target: &LambdaTarget,
    path_parameters: &[String],
) -> Result<IntegrationDescriptor> {
    validate_path_parameters(path_parameters)?;

    let request_template = match &target.request_template {
        Some(template) => template.clone(),
        None => default_request_template(path_parameters)?,
    };

    let mut default_response = ResponseMapping::status("200");
    if let Some(overrides) = &target.response {
        default_response = default_response.merged_with(overrides);
    }

    let mut descriptor = IntegrationDescriptor::new(
        target.mode.kind(),
        target.function_uri.clone(),
        target.role_arn.clone(),
    )
    .with_json_request_template(request_template)
    .with_response("default", default_response);

    for name in path_parameters {
        descriptor = descriptor.with_request_parameter(
            format!("integration.request.path.{}", name),
            format!("method.request.path.{}", name),
        );
    }

    descriptor.validate()?;
    Ok(descriptor)
}

/// The request template carrying the HTTP context of the call
///
/// ```
/// use apigw_openapi_integrations::lambda::default_request_template;
///
/// let template = default_request_template(&["user_id".to_string()]).unwrap();
/// assert!(template.contains("\"pathParameters\":{\"user_id\":\"$input.params('user_id')\"}"));
/// ```
pub fn default_request_template(path_parameters: &[String]) -> Result<String> {
    validate_path_parameters(path_parameters)?;

    let mut template = Map::new();
    template.insert("body".into(), Value::from("$input.json('$')"));
    template.insert("httpMethod".into(), Value::from("$context.httpMethod"));
    template.insert("resource".into(), Value::from("$context.resourcePath"));
    template.insert("path".into(), Value::from("$context.path"));

    if !path_parameters.is_empty() {
        let params: Map<String, Value> = path_parameters
            .iter()
            .map(|name| (name.clone(), Value::from(format!("$input.params('{}')", name))))
            .collect();
        template.insert("pathParameters".into(), Value::Object(params));
    }

    Ok(serde_json::to_string(&Value::Object(template))?)
}

fn validate_path_parameters(path_parameters: &[String]) -> Result<()> {
    match path_parameters
        .iter()
        .find(|name| !is_valid_parameter_name(name))
    {
        Some(bad) => Err(GatewayError::InvalidArgument(format!(
            "path_parameters must be a list of parameter names, got '{}'",
            bad
        ))),
        None => Ok(()),
    }
}

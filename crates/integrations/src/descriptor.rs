//! The `x-amazon-apigateway-integration` block
//!
//! Field names follow the API Gateway OpenAPI extension, so a descriptor can
//! be serialized straight into an operation.

use apigw_openapi_common::{GatewayError, HttpMethod, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Content type every generated mapping template is registered under
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Integration response mappings keyed by status selector (`default`, `4xx`, `404`)
pub type ResponseMappings = IndexMap<String, ResponseMapping>;

/// API Gateway integration type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationKind {
    /// Fixed response, no backend call
    Mock,
    /// AWS service call with request/response mapping templates
    Aws,
    /// Lambda proxy, the function receives the full request context
    AwsProxy,
}

impl IntegrationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationKind::Mock => "mock",
            IntegrationKind::Aws => "aws",
            IntegrationKind::AwsProxy => "aws_proxy",
        }
    }
}

/// One entry of the integration `responses` map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMapping {
    /// Method response status returned to the caller
    #[serde(alias = "status_code")]
    pub status_code: String,

    /// Response mapping templates by content type
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "response_templates")]
    pub response_templates: Option<IndexMap<String, String>>,

    /// Header mappings (`method.response.header.X` → expression)
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "response_parameters")]
    pub response_parameters: Option<IndexMap<String, String>>,
}

/// Partial response mapping laid over a builder's default entry
///
/// Unset fields keep the default's values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseOverride {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "statusCode")]
    pub status_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", alias = "responseTemplates")]
    pub response_templates: Option<IndexMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none", alias = "responseParameters")]
    pub response_parameters: Option<IndexMap<String, String>>,
}

impl ResponseOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status_code: impl Into<String>) -> Self {
        self.status_code = Some(status_code.into());
        self
    }

    pub fn with_json_template(mut self, template: impl Into<String>) -> Self {
        self.response_templates
            .get_or_insert_with(IndexMap::new)
            .insert(JSON_CONTENT_TYPE.to_string(), template.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.response_parameters
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), source.into());
        self
    }
}

impl ResponseMapping {
    /// A bare status mapping
    pub fn status(status_code: impl Into<String>) -> Self {
        Self {
            status_code: status_code.into(),
            response_templates: None,
            response_parameters: None,
        }
    }

    /// Add a JSON response template
    pub fn with_json_template(mut self, template: impl Into<String>) -> Self {
        self.response_templates
            .get_or_insert_with(IndexMap::new)
            .insert(JSON_CONTENT_TYPE.to_string(), template.into());
        self
    }

    /// Add a response header mapping
    pub fn with_parameter(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.response_parameters
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), source.into());
        self
    }

    /// Overlay the set fields of `other` onto this mapping
    pub fn merged_with(mut self, other: &ResponseOverride) -> Self {
        if let Some(status_code) = &other.status_code {
            self.status_code = status_code.clone();
        }
        if let Some(templates) = &other.response_templates {
            self.response_templates
                .get_or_insert_with(IndexMap::new)
                .extend(templates.clone());
        }
        if let Some(parameters) = &other.response_parameters {
            self.response_parameters
                .get_or_insert_with(IndexMap::new)
                .extend(parameters.clone());
        }
        self
    }
}

/// Integration descriptor attached to an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationDescriptor {
    /// Backend target (Lambda invocation ARN, service action, S3 path)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,

    /// Method used towards the backend (not the client method)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<HttpMethod>,

    #[serde(rename = "type")]
    pub kind: IntegrationKind,

    /// IAM role API Gateway assumes for the call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,

    /// Request mapping templates by content type
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub request_templates: IndexMap<String, String>,

    /// Integration request parameter → method request source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_parameters: Option<IndexMap<String, String>>,

    #[serde(default)]
    pub responses: ResponseMappings,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passthrough_behavior: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_in_millis: Option<u32>,
}

impl IntegrationDescriptor {
    /// Start a descriptor for a backend call (`httpMethod` defaults to `POST`)
    pub fn new(kind: IntegrationKind, uri: impl Into<String>, credentials: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            http_method: Some(HttpMethod::Post),
            kind,
            credentials: Some(credentials.into()),
            request_templates: IndexMap::new(),
            request_parameters: None,
            responses: IndexMap::new(),
            passthrough_behavior: None,
            timeout_in_millis: None,
        }
    }

    /// Start a mock descriptor (no target, no credentials)
    pub fn mock() -> Self {
        Self {
            uri: String::new(),
            http_method: None,
            kind: IntegrationKind::Mock,
            credentials: None,
            request_templates: IndexMap::new(),
            request_parameters: None,
            responses: IndexMap::new(),
            passthrough_behavior: None,
            timeout_in_millis: None,
        }
    }

    pub fn with_http_method(mut self, method: HttpMethod) -> Self {
        self.http_method = Some(method);
        self
    }

    /// Register the `application/json` request template
    pub fn with_json_request_template(mut self, template: impl Into<String>) -> Self {
        self.request_templates
            .insert(JSON_CONTENT_TYPE.to_string(), template.into());
        self
    }

    pub fn with_request_parameter(
        mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        self.request_parameters
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), source.into());
        self
    }

    pub fn with_response(mut self, selector: impl Into<String>, mapping: ResponseMapping) -> Self {
        self.responses.insert(selector.into(), mapping);
        self
    }

    pub fn with_responses(mut self, responses: ResponseMappings) -> Self {
        self.responses = responses;
        self
    }

    /// Check the target and credential invariants
    ///
    /// Non-mock integrations need both a target URI and a credential ARN.
    pub fn validate(&self) -> Result<()> {
        if self.kind == IntegrationKind::Mock {
            return Ok(());
        }

        if self.uri.trim().is_empty() {
            return Err(GatewayError::InvalidArgument(format!(
                "{} integration requires a target uri",
                self.kind.as_str()
            )));
        }

        match self.credentials.as_deref() {
            Some(arn) if !arn.trim().is_empty() => Ok(()),
            _ => Err(GatewayError::InvalidArgument(format!(
                "{} integration for '{}' requires a credential arn",
                self.kind.as_str(),
                self.uri
            ))),
        }
    }

    /// Serialize into the JSON value stored under `x-amazon-apigateway-integration`
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

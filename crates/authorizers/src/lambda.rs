//! Lambda (custom) authorizer

use crate::descriptor::{AuthType, AuthorizerDescriptor, AuthorizerKind};
use crate::{SecurityScheme, DEFAULT_HEADER_NAME};
use apigw_openapi_common::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_IDENTITY_VALIDATION_EXPRESSION: &str = "^x-[a-z]+";
pub const DEFAULT_RESULT_TTL_SECONDS: u32 = 60;

/// How the authorizer function receives the caller identity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LambdaAuthorizerKind {
    Token,
    #[default]
    Request,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LambdaAuthorizer {
    pub name: String,
    pub function_uri: String,
    pub role_arn: String,

    /// Required for the `request` kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,

    #[serde(default)]
    pub kind: LambdaAuthorizerKind,

    #[serde(default = "default_validation_expression")]
    pub identity_validation_expression: String,

    #[serde(default = "default_ttl")]
    pub ttl_seconds: u32,
}

fn default_validation_expression() -> String {
    DEFAULT_IDENTITY_VALIDATION_EXPRESSION.to_string()
}

fn default_ttl() -> u32 {
    DEFAULT_RESULT_TTL_SECONDS
}

impl LambdaAuthorizer {
    pub fn new(
        name: impl Into<String>,
        function_uri: impl Into<String>,
        role_arn: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            function_uri: function_uri.into(),
            role_arn: role_arn.into(),
            header_name: None,
            kind: LambdaAuthorizerKind::default(),
            identity_validation_expression: default_validation_expression(),
            ttl_seconds: DEFAULT_RESULT_TTL_SECONDS,
        }
    }

    pub fn with_header_name(mut self, header_name: impl Into<String>) -> Self {
        self.header_name = Some(header_name.into());
        self
    }

    pub fn token(mut self) -> Self {
        self.kind = LambdaAuthorizerKind::Token;
        self
    }

    pub fn with_identity_validation_expression(mut self, expression: impl Into<String>) -> Self {
        self.identity_validation_expression = expression.into();
        self
    }

    pub fn with_ttl_seconds(mut self, ttl_seconds: u32) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }
}

impl SecurityScheme for LambdaAuthorizer {
    fn scheme_name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AuthorizerKind {
        match self.kind {
            LambdaAuthorizerKind::Token => AuthorizerKind::Token,
            LambdaAuthorizerKind::Request => AuthorizerKind::Request,
        }
    }

    fn build_descriptor(&self) -> Result<AuthorizerDescriptor> {
        if self.function_uri.trim().is_empty() || self.role_arn.trim().is_empty() {
            return Err(GatewayError::InvalidArgument(format!(
                "lambda authorizer '{}' requires function_uri and role_arn",
                self.name
            )));
        }

        let header_name = match (self.kind, &self.header_name) {
            (_, Some(header)) => header.clone(),
            (LambdaAuthorizerKind::Token, None) => DEFAULT_HEADER_NAME.to_string(),
            (LambdaAuthorizerKind::Request, None) => {
                return Err(GatewayError::InvalidArgument(format!(
                    "header_name is required when authorizer '{}' is of type 'request'",
                    self.name
                )))
            }
        };

        let mut descriptor = AuthorizerDescriptor::new(&self.name, self.kind(), &header_name);
        descriptor.auth_type = Some(AuthType::Custom);
        descriptor.authorizer_uri = Some(self.function_uri.clone());
        descriptor.credentials = Some(self.role_arn.clone());
        descriptor.identity_source = Some(format!("method.request.header.{}", header_name));
        descriptor.identity_validation_expression =
            Some(self.identity_validation_expression.clone());
        descriptor.ttl_seconds = Some(self.ttl_seconds);

        debug!(scheme = %self.name, kind = self.kind().as_str(), "built lambda authorizer");

        descriptor.validate()?;
        Ok(descriptor)
    }
}

//! Authorizer descriptors and the security schemes rendered from them

use apigw_openapi_common::{GatewayError, Result};
use serde::{Deserialize, Serialize};

/// Authorizer type inside `x-amazon-apigateway-authorizer`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizerKind {
    /// Single header token (Lambda token authorizers, API keys)
    Token,
    /// Lambda receives the request headers named in `identitySource`
    Request,
    CognitoUserPools,
}

impl AuthorizerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizerKind::Token => "token",
            AuthorizerKind::Request => "request",
            AuthorizerKind::CognitoUserPools => "cognito_user_pools",
        }
    }
}

/// Value of `x-amazon-apigateway-authtype`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    CognitoUserPools,
    Custom,
}

/// Everything the document generator needs to know about an authorizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizerDescriptor {
    /// Key under `components.securitySchemes`
    pub scheme_name: String,
    pub kind: AuthorizerKind,
    /// `None` for plain API key schemes
    pub auth_type: Option<AuthType>,
    /// Header carrying the credential
    pub header_name: String,
    pub authorizer_uri: Option<String>,
    pub credentials: Option<String>,
    pub provider_arns: Vec<String>,
    pub identity_source: Option<String>,
    pub identity_validation_expression: Option<String>,
    pub ttl_seconds: Option<u32>,
}

impl AuthorizerDescriptor {
    /// A descriptor with only the scheme fields set
    pub fn new(
        scheme_name: impl Into<String>,
        kind: AuthorizerKind,
        header_name: impl Into<String>,
    ) -> Self {
        Self {
            scheme_name: scheme_name.into(),
            kind,
            auth_type: None,
            header_name: header_name.into(),
            authorizer_uri: None,
            credentials: None,
            provider_arns: Vec::new(),
            identity_source: None,
            identity_validation_expression: None,
            ttl_seconds: None,
        }
    }

    /// Check the per-kind invariants
    pub fn validate(&self) -> Result<()> {
        if self.scheme_name.trim().is_empty() {
            return Err(GatewayError::InvalidArgument(
                "authorizer requires a scheme name".to_string(),
            ));
        }

        if self.kind == AuthorizerKind::CognitoUserPools
            && (self.provider_arns.is_empty() || self.provider_arns.iter().any(|a| a.is_empty()))
        {
            return Err(GatewayError::InvalidArgument(format!(
                "cognito authorizer '{}' requires at least one user pool arn",
                self.scheme_name
            )));
        }

        if self.kind == AuthorizerKind::Request {
            if self.header_name.trim().is_empty() {
                return Err(GatewayError::InvalidArgument(format!(
                    "header_name is required when authorizer '{}' is of type 'request'",
                    self.scheme_name
                )));
            }
            if is_blank(&self.authorizer_uri) {
                return Err(GatewayError::InvalidArgument(format!(
                    "request authorizer '{}' requires an authorizer uri",
                    self.scheme_name
                )));
            }
        }

        if self.auth_type == Some(AuthType::Custom)
            && (is_blank(&self.authorizer_uri) || is_blank(&self.credentials))
        {
            return Err(GatewayError::InvalidArgument(format!(
                "custom authorizer '{}' requires an authorizer uri and credentials",
                self.scheme_name
            )));
        }

        Ok(())
    }

    /// Render the OpenAPI security scheme carrying the gateway extensions
    pub fn to_security_scheme(&self) -> ApiKeyScheme {
        let authorizer = self.auth_type.map(|_| GatewayAuthorizer {
            kind: self.kind,
            authorizer_uri: self.authorizer_uri.clone(),
            authorizer_credentials: self.credentials.clone(),
            identity_source: self.identity_source.clone(),
            identity_validation_expression: self.identity_validation_expression.clone(),
            authorizer_result_ttl_in_seconds: self.ttl_seconds,
            provider_arns: (!self.provider_arns.is_empty()).then(|| self.provider_arns.clone()),
        });

        ApiKeyScheme {
            scheme_type: "apiKey".to_string(),
            name: self.header_name.clone(),
            location: "header".to_string(),
            auth_type: self.auth_type,
            authorizer,
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// OpenAPI `apiKey` security scheme with API Gateway extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,

    pub name: String,

    #[serde(rename = "in")]
    pub location: String,

    #[serde(
        rename = "x-amazon-apigateway-authtype",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub auth_type: Option<AuthType>,

    #[serde(
        rename = "x-amazon-apigateway-authorizer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub authorizer: Option<GatewayAuthorizer>,
}

/// The `x-amazon-apigateway-authorizer` object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayAuthorizer {
    #[serde(rename = "type")]
    pub kind: AuthorizerKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorizer_uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorizer_credentials: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_validation_expression: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorizer_result_ttl_in_seconds: Option<u32>,

    #[serde(
        rename = "providerARNs",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub provider_arns: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cognito_requires_provider() {
        let descriptor =
            AuthorizerDescriptor::new("pool", AuthorizerKind::CognitoUserPools, "Authorization");
        assert!(matches!(
            descriptor.validate(),
            Err(GatewayError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_request_requires_uri() {
        let mut descriptor =
            AuthorizerDescriptor::new("custom", AuthorizerKind::Request, "Authorization");
        assert!(descriptor.validate().is_err());

        descriptor.authorizer_uri = Some("${authorizer_uri}".to_string());
        assert!(descriptor.validate().is_ok());
    }

    #[test]
    fn test_plain_scheme_has_no_extensions() {
        let scheme = AuthorizerDescriptor::new("key", AuthorizerKind::Token, "x-api-key")
            .to_security_scheme();
        let value = serde_json::to_value(&scheme).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"type": "apiKey", "name": "x-api-key", "in": "header"})
        );
    }
}

//! API key authorizer
//!
//! API Gateway checks the key itself, so the scheme carries no authorizer
//! block. Documents using it declare `x-amazon-apigateway-api-key-source`.

use crate::descriptor::{AuthorizerDescriptor, AuthorizerKind};
use crate::SecurityScheme;
use apigw_openapi_common::Result;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// Value of `x-amazon-apigateway-api-key-source`
pub const API_KEY_SOURCE_HEADER: &str = "HEADER";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyAuthorizer {
    pub name: String,

    #[serde(default = "default_header")]
    pub header_name: String,
}

fn default_header() -> String {
    DEFAULT_API_KEY_HEADER.to_string()
}

impl ApiKeyAuthorizer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header_name: default_header(),
        }
    }

    pub fn with_header_name(mut self, header_name: impl Into<String>) -> Self {
        self.header_name = header_name.into();
        self
    }
}

impl SecurityScheme for ApiKeyAuthorizer {
    fn scheme_name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AuthorizerKind {
        AuthorizerKind::Token
    }

    fn build_descriptor(&self) -> Result<AuthorizerDescriptor> {
        let descriptor = AuthorizerDescriptor::new(&self.name, self.kind(), &self.header_name);
        descriptor.validate()?;
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_key_scheme() {
        let scheme = ApiKeyAuthorizer::new("ApiKey")
            .build_descriptor()
            .unwrap()
            .to_security_scheme();
        assert_eq!(
            serde_json::to_value(&scheme).unwrap(),
            json!({"type": "apiKey", "name": "x-api-key", "in": "header"})
        );
    }

    #[test]
    fn test_custom_header() {
        let descriptor = ApiKeyAuthorizer::new("ApiKey")
            .with_header_name("X-Client-Key")
            .build_descriptor()
            .unwrap();
        assert_eq!(descriptor.header_name, "X-Client-Key");
        assert_eq!(descriptor.auth_type, None);
    }
}

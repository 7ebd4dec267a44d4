//! API Gateway authorizer security schemes
//!
//! Authorizers only describe themselves for the OpenAPI document. Nothing
//! here verifies credentials; API Gateway does that at request time.

pub mod api_key;
pub mod cognito;
pub mod descriptor;
pub mod lambda;

pub use api_key::{ApiKeyAuthorizer, API_KEY_SOURCE_HEADER, DEFAULT_API_KEY_HEADER};
pub use cognito::{CognitoAuthorizer, DEFAULT_USER_POOL_ARN};
pub use descriptor::{
    ApiKeyScheme, AuthType, AuthorizerDescriptor, AuthorizerKind, GatewayAuthorizer,
};
pub use lambda::{LambdaAuthorizer, LambdaAuthorizerKind};

use apigw_openapi_common::{GatewayError, Result};
use serde::{Deserialize, Serialize};

/// Header read by Cognito and token authorizers unless told otherwise
pub const DEFAULT_HEADER_NAME: &str = "Authorization";

/// Anything that can appear under `components.securitySchemes`
pub trait SecurityScheme {
    /// Name the scheme is registered and referenced under
    fn scheme_name(&self) -> &str;

    fn kind(&self) -> AuthorizerKind;

    /// Describe the authorizer
    ///
    /// Implementations that cannot describe themselves keep this default.
    fn build_descriptor(&self) -> Result<AuthorizerDescriptor> {
        Err(GatewayError::NotImplemented(format!(
            "authorizer '{}' ({}) has no security scheme definition",
            self.scheme_name(),
            self.kind().as_str()
        )))
    }
}

/// An authorizer declared by name only, without a definition yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderAuthorizer {
    pub name: String,
    pub kind: AuthorizerKind,
}

impl PlaceholderAuthorizer {
    pub fn new(name: impl Into<String>, kind: AuthorizerKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl SecurityScheme for PlaceholderAuthorizer {
    fn scheme_name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AuthorizerKind {
        self.kind
    }
}

/// Every supported authorizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Authorizer {
    Cognito(CognitoAuthorizer),
    ApiKey(ApiKeyAuthorizer),
    Lambda(LambdaAuthorizer),
    Placeholder(PlaceholderAuthorizer),
}

impl Authorizer {
    fn inner(&self) -> &dyn SecurityScheme {
        match self {
            Authorizer::Cognito(a) => a,
            Authorizer::ApiKey(a) => a,
            Authorizer::Lambda(a) => a,
            Authorizer::Placeholder(a) => a,
        }
    }

    /// Whether the document must declare where API keys come from
    pub fn uses_api_key(&self) -> bool {
        matches!(self, Authorizer::ApiKey(_))
    }
}

impl SecurityScheme for Authorizer {
    fn scheme_name(&self) -> &str {
        self.inner().scheme_name()
    }

    fn kind(&self) -> AuthorizerKind {
        self.inner().kind()
    }

    fn build_descriptor(&self) -> Result<AuthorizerDescriptor> {
        self.inner().build_descriptor()
    }
}

impl From<CognitoAuthorizer> for Authorizer {
    fn from(a: CognitoAuthorizer) -> Self {
        Authorizer::Cognito(a)
    }
}

impl From<ApiKeyAuthorizer> for Authorizer {
    fn from(a: ApiKeyAuthorizer) -> Self {
        Authorizer::ApiKey(a)
    }
}

impl From<LambdaAuthorizer> for Authorizer {
    fn from(a: LambdaAuthorizer) -> Self {
        Authorizer::Lambda(a)
    }
}

impl From<PlaceholderAuthorizer> for Authorizer {
    fn from(a: PlaceholderAuthorizer) -> Self {
        Authorizer::Placeholder(a)
    }
}

//! Cognito user pool authorizer

use crate::descriptor::{AuthType, AuthorizerDescriptor, AuthorizerKind};
use crate::{SecurityScheme, DEFAULT_HEADER_NAME};
use apigw_openapi_common::Result;
use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_POOL_ARN: &str = "${cognito_user_pool_arn}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CognitoAuthorizer {
    pub name: String,

    #[serde(default = "default_user_pool_arns")]
    pub user_pool_arns: Vec<String>,
}

fn default_user_pool_arns() -> Vec<String> {
    vec![DEFAULT_USER_POOL_ARN.to_string()]
}

impl CognitoAuthorizer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user_pool_arns: default_user_pool_arns(),
        }
    }

    /// Replace the default pool with a single ARN
    pub fn with_user_pool_arn(mut self, arn: impl Into<String>) -> Self {
        self.user_pool_arns = vec![arn.into()];
        self
    }

    pub fn with_user_pool_arns<I, S>(mut self, arns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_pool_arns = arns.into_iter().map(Into::into).collect();
        self
    }
}

impl SecurityScheme for CognitoAuthorizer {
    fn scheme_name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AuthorizerKind {
        AuthorizerKind::CognitoUserPools
    }

    fn build_descriptor(&self) -> Result<AuthorizerDescriptor> {
        let mut descriptor =
            AuthorizerDescriptor::new(&self.name, self.kind(), DEFAULT_HEADER_NAME);
        descriptor.auth_type = Some(AuthType::CognitoUserPools);
        descriptor.provider_arns = self.user_pool_arns.clone();
        descriptor.validate()?;
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apigw_openapi_common::GatewayError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_default_pool_scheme() {
        let scheme = CognitoAuthorizer::new("UserPool")
            .build_descriptor()
            .unwrap()
            .to_security_scheme();

        assert_eq!(
            serde_json::to_value(&scheme).unwrap(),
            json!({
                "type": "apiKey",
                "name": "Authorization",
                "in": "header",
                "x-amazon-apigateway-authtype": "cognito_user_pools",
                "x-amazon-apigateway-authorizer": {
                    "type": "cognito_user_pools",
                    "providerARNs": ["${cognito_user_pool_arn}"]
                }
            })
        );
    }

    #[test]
    fn test_multiple_pools() {
        let descriptor = CognitoAuthorizer::new("UserPool")
            .with_user_pool_arns(["${pool_a}", "${pool_b}"])
            .build_descriptor()
            .unwrap();
        assert_eq!(descriptor.provider_arns, vec!["${pool_a}", "${pool_b}"]);
    }

    #[test]
    fn test_empty_pool_list_rejected() {
        let err = CognitoAuthorizer::new("UserPool")
            .with_user_pool_arns(Vec::<String>::new())
            .build_descriptor()
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArgument(_)));
    }
}

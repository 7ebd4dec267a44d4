//! S3 object integrations
//!
//! The object is addressed either by a fixed key or by the route's path
//! parameters. Placeholders in the resulting path (`{filename}`) are mapped
//! from the method request so API Gateway can substitute them.

use crate::descriptor::{IntegrationDescriptor, IntegrationKind, ResponseMapping, ResponseMappings};
use apigw_openapi_common::{extract_path_parameters, GatewayError, HttpMethod, Result};
use serde::{Deserialize, Serialize};

const S3_PATH_PREFIX: &str = "arn:aws:apigateway:${region}:s3:path";

/// An S3 bucket behind a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Target {
    pub bucket: String,
    pub role_arn: String,

    /// Fixed object key, may contain `{param}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_key: Option<String>,

    /// Method used against S3; defaults to the route method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<HttpMethod>,

    /// Replaces the default response mappings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<ResponseMappings>,
}

impl S3Target {
    pub fn new(bucket: impl Into<String>, role_arn: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            role_arn: role_arn.into(),
            object_key: None,
            http_method: None,
            responses: None,
        }
    }

    pub fn with_object_key(mut self, key: impl Into<String>) -> Self {
        self.object_key = Some(key.into());
        self
    }

    pub fn with_http_method(mut self, method: HttpMethod) -> Self {
        self.http_method = Some(method);
        self
    }

    pub fn with_responses(mut self, responses: ResponseMappings) -> Self {
        self.responses = Some(responses);
        self
    }
}

/// Build the integration for an S3 target
///
/// `object_key` wins over `path_parameters`; with neither there is no object
/// to address and the call fails.
pub fn s3_integration(
    target: &S3Target,
    route_method: HttpMethod,
    path_parameters: &[String],
) -> Result<IntegrationDescriptor> {
    if target.bucket.trim().is_empty() {
        return Err(GatewayError::InvalidArgument(
            "s3 integration requires a bucket name".to_string(),
        ));
    }

    let method = target.http_method.unwrap_or(route_method);
    if !matches!(method, HttpMethod::Get | HttpMethod::Put | HttpMethod::Delete) {
        return Err(GatewayError::Configuration(format!(
            "unsupported HTTP method {} for S3 integration, expected GET, PUT or DELETE",
            method
        )));
    }

    let key = match (&target.object_key, path_parameters.is_empty()) {
        (Some(key), _) if !key.is_empty() => key.clone(),
        (_, false) => path_parameters
            .iter()
            .map(|name| format!("{{{}}}", name))
            .collect::<Vec<_>>()
            .join("/"),
        _ => {
            return Err(GatewayError::InvalidArgument(
                "expected one of: 'object_key', 'path_parameters'".to_string(),
            ))
        }
    };

    let uri = format!("{}/{}/{}", S3_PATH_PREFIX, target.bucket, key);

    let responses = match &target.responses {
        Some(responses) => responses.clone(),
        None => default_responses(),
    };

    let mut descriptor =
        IntegrationDescriptor::new(IntegrationKind::Aws, uri, target.role_arn.clone())
            .with_http_method(method)
            .with_responses(responses);

    for name in extract_path_parameters(&key) {
        descriptor = descriptor.with_request_parameter(
            format!("integration.request.path.{}", name),
            format!("method.request.path.{}", name),
        );
    }

    descriptor.validate()?;
    Ok(descriptor)
}

/// Missing and forbidden objects both surface as 404
fn default_responses() -> ResponseMappings {
    let mut responses = ResponseMappings::new();
    responses.insert("default".to_string(), ResponseMapping::status("200"));
    responses.insert("4xx".to_string(), ResponseMapping::status("404"));
    responses.insert("403".to_string(), ResponseMapping::status("404"));
    responses.insert("404".to_string(), ResponseMapping::status("404"));
    responses
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_object_key() {
        let target = S3Target::new("B", "${my_role_arn}").with_object_key("K");
        let descriptor = s3_integration(&target, HttpMethod::Get, &[]).unwrap();

        assert_eq!(descriptor.uri, "arn:aws:apigateway:${region}:s3:path/B/K");
        assert_eq!(descriptor.http_method, Some(HttpMethod::Get));
        assert_eq!(descriptor.kind, IntegrationKind::Aws);
        assert_eq!(descriptor.request_parameters, None);
        assert_eq!(descriptor.responses.len(), 4);
        assert_eq!(descriptor.responses["403"].status_code, "404");
        assert_eq!(descriptor.responses["default"].status_code, "200");
    }

    #[test]
    fn test_neither_key_nor_path_parameters_fails() {
        let target = S3Target::new("test-bucket", "${my_role_arn}");
        let err = s3_integration(&target, HttpMethod::Get, &[]).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArgument(_)));
    }

    #[test]
    fn test_path_parameters_address_the_object() {
        let target = S3Target::new("test-bucket", "${my_role_arn}");
        let params = vec!["user_id".to_string(), "file".to_string()];
        let descriptor = s3_integration(&target, HttpMethod::Get, &params).unwrap();

        assert_eq!(
            descriptor.uri,
            "arn:aws:apigateway:${region}:s3:path/test-bucket/{user_id}/{file}"
        );
        let mapped = descriptor.request_parameters.unwrap();
        assert_eq!(mapped["integration.request.path.file"], "method.request.path.file");
    }

    #[test]
    fn test_key_placeholders_are_mapped() {
        let target = S3Target::new("my-bucket", "${s3_role_arn}").with_object_key("uploads/{filename}");
        let descriptor =
            s3_integration(&target, HttpMethod::Get, &["filename".to_string()]).unwrap();

        assert_eq!(
            descriptor.uri,
            "arn:aws:apigateway:${region}:s3:path/my-bucket/uploads/{filename}"
        );
        assert!(descriptor
            .request_parameters
            .unwrap()
            .contains_key("integration.request.path.filename"));
    }

    #[test]
    fn test_post_is_rejected() {
        let target = S3Target::new("b", "${role}").with_object_key("k");
        let err = s3_integration(&target, HttpMethod::Post, &[]).unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
    }

    #[test]
    fn test_explicit_method_overrides_route_method() {
        let target = S3Target::new("b", "${role}")
            .with_object_key("k")
            .with_http_method(HttpMethod::Put);
        let descriptor = s3_integration(&target, HttpMethod::Post, &[]).unwrap();
        assert_eq!(descriptor.http_method, Some(HttpMethod::Put));
    }
}

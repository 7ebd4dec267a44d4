//! Mock integrations
//!
//! Mock integrations answer from API Gateway itself. They back routes that
//! are not implemented yet and the CORS pre-flight `OPTIONS` routes.

use crate::descriptor::{IntegrationDescriptor, ResponseMapping};
use apigw_openapi_common::cors::{
    ALLOW_HEADERS_HEADER, ALLOW_METHODS_HEADER, ALLOW_ORIGIN_HEADER,
};
use apigw_openapi_common::CorsConfig;

/// API Gateway's upper bound for integration timeouts
pub const MAX_TIMEOUT_MILLIS: u32 = 29_000;

/// A fixed `501 {"status": "not implemented"}` response
pub fn mock_integration() -> IntegrationDescriptor {
    IntegrationDescriptor::mock()
        .with_json_request_template(r#"{"statusCode": 200}"#)
        .with_response(
            "default",
            ResponseMapping::status("501").with_json_template(r#"{"status": "not implemented"}"#),
        )
}

/// The pre-flight response advertising the allowed origin, methods and headers
pub fn cors_preflight_integration(cors: &CorsConfig) -> IntegrationDescriptor {
    let response = ResponseMapping::status("200")
        .with_parameter(
            format!("method.response.header.{}", ALLOW_METHODS_HEADER),
            format!("'{}'", cors.preflight_allow_methods),
        )
        .with_parameter(
            format!("method.response.header.{}", ALLOW_HEADERS_HEADER),
            format!("'{}'", cors.preflight_allow_headers),
        )
        .with_parameter(
            format!("method.response.header.{}", ALLOW_ORIGIN_HEADER),
            cors.preflight_origin_literal(),
        );

    let mut descriptor = IntegrationDescriptor::mock()
        .with_json_request_template(r#"{ "statusCode": 200 }"#)
        .with_response("default", response);
    descriptor.passthrough_behavior = Some("when_no_match".to_string());
    descriptor.timeout_in_millis = Some(MAX_TIMEOUT_MILLIS);
    descriptor
}

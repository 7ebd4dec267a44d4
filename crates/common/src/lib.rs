//! Common types and utilities for apigw-openapi
//!
//! This crate contains the shared error type, the HTTP method enum and the
//! vendor extension key names used across the integration, authorizer,
//! router and export components.

pub mod cors;
pub mod path;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use cors::CorsConfig;
pub use path::{extract_path_parameters, is_valid_parameter_name};

/// Operation-level integration block consumed by API Gateway
pub const X_INTEGRATION: &str = "x-amazon-apigateway-integration";

/// Security scheme authorizer type (`cognito_user_pools`, `custom`)
pub const X_AUTHTYPE: &str = "x-amazon-apigateway-authtype";

/// Security scheme authorizer definition
pub const X_AUTHORIZER: &str = "x-amazon-apigateway-authorizer";

/// Document-level API key source (`HEADER` or `AUTHORIZER`)
pub const X_API_KEY_SOURCE: &str = "x-amazon-apigateway-api-key-source";

/// Glob matching every API Gateway extension key
pub const X_AMAZON_APIGATEWAY_PATTERN: &str = "x-amazon-apigateway-*";

/// Errors raised while building integrations, routes and documents
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// HTTP methods a route can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "delete")]
    Delete,
    #[serde(alias = "options")]
    Options,
    #[serde(alias = "head")]
    Head,
    #[serde(alias = "patch")]
    Patch,
}

impl HttpMethod {
    /// Upper-case method name as used by API Gateway (`GET`)
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Lower-case key used inside an OpenAPI path item (`get`)
    pub fn path_item_key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "PUT" => Ok(HttpMethod::Put),
            "POST" => Ok(HttpMethod::Post),
            "DELETE" => Ok(HttpMethod::Delete),
            "OPTIONS" => Ok(HttpMethod::Options),
            "HEAD" => Ok(HttpMethod::Head),
            "PATCH" => Ok(HttpMethod::Patch),
            _ => Err(GatewayError::InvalidArgument(format!(
                "unknown HTTP method '{}'",
                s
            ))),
        }
    }
}

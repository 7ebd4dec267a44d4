//! CORS configuration shared by pre-flight routes and document headers

use serde::{Deserialize, Serialize};

/// Header names injected into documented responses
pub const ALLOW_ORIGIN_HEADER: &str = "Access-Control-Allow-Origin";
pub const ALLOW_HEADERS_HEADER: &str = "Access-Control-Allow-Headers";
pub const ALLOW_METHODS_HEADER: &str = "Access-Control-Allow-Methods";

/// Allowed origins, headers and methods advertised to browsers
///
/// The document values are the examples shown in response headers; the
/// pre-flight values are the quoted literals API Gateway returns from the
/// mock `OPTIONS` integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins (`CORS_ORIGINS`, comma separated)
    pub allow_origins: Vec<String>,
    /// `Access-Control-Allow-Headers` example in documented responses
    pub allow_headers: String,
    /// `Access-Control-Allow-Methods` example in documented responses
    pub allow_methods: String,
    /// Header list returned by the pre-flight integration
    pub preflight_allow_headers: String,
    /// Method list returned by the pre-flight integration
    pub preflight_allow_methods: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: vec!["*".to_string()],
            allow_headers: "Content-Type, Authorization, X-Api-Key".to_string(),
            allow_methods: "OPTIONS, GET, POST, PUT, DELETE, PATCH".to_string(),
            preflight_allow_headers:
                "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token".to_string(),
            preflight_allow_methods: "OPTIONS,HEAD,GET,POST,PUT,PATCH,DELETE".to_string(),
        }
    }
}

impl CorsConfig {
    /// Build a config from a comma-separated origin list
    ///
    /// Blank entries are dropped; an empty list falls back to `*`.
    pub fn from_origins_csv(origins: &str) -> Self {
        let allow_origins: Vec<String> = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();

        if allow_origins.is_empty() {
            return Self::default();
        }

        Self {
            allow_origins,
            ..Self::default()
        }
    }

    /// Origins joined as a single header value
    pub fn origin_value(&self) -> String {
        self.allow_origins.join(",")
    }

    /// Origin value as a quoted API Gateway static mapping (`'*'`)
    pub fn preflight_origin_literal(&self) -> String {
        format!("'{}'", self.origin_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_any_origin() {
        let cors = CorsConfig::default();
        assert_eq!(cors.origin_value(), "*");
        assert_eq!(cors.preflight_origin_literal(), "'*'");
    }

    #[test]
    fn test_from_origins_csv() {
        let cors = CorsConfig::from_origins_csv("https://a.example, https://b.example,");
        assert_eq!(
            cors.allow_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(cors.origin_value(), "https://a.example,https://b.example");
    }

    #[test]
    fn test_from_empty_csv_falls_back_to_wildcard() {
        assert_eq!(CorsConfig::from_origins_csv(" , "), CorsConfig::default());
    }
}

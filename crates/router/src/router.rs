//! Route collections and OpenAPI document generation

use crate::openapi::{
    Components, Info, OpenApiDocument, PathItem, Response, DEFAULT_OPENAPI_VERSION,
    DEFAULT_TITLE, DEFAULT_VERSION,
};
use crate::route::{join_prefix, scope_options, Route, RouteOptions};
use apigw_openapi_authorizers::{Authorizer, SecurityScheme, API_KEY_SOURCE_HEADER};
use apigw_openapi_common::cors::{ALLOW_HEADERS_HEADER, ALLOW_METHODS_HEADER, ALLOW_ORIGIN_HEADER};
use apigw_openapi_common::{CorsConfig, GatewayError, HttpMethod, Result, X_API_KEY_SOURCE, X_INTEGRATION};
use apigw_openapi_integrations::cors_preflight_integration;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

/// Handler name given to synthesized pre-flight routes
pub const PREFLIGHT_ENDPOINT: &str = "options_handler";

/// Tag appended to every pre-flight route
pub const CORS_TAG: &str = "CORS";

/// Document metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub title: String,
    pub version: String,
    pub openapi_version: String,
    pub description: Option<String>,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            version: DEFAULT_VERSION.to_string(),
            openapi_version: DEFAULT_OPENAPI_VERSION.to_string(),
            description: None,
        }
    }
}

impl DocumentInfo {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            ..Default::default()
        }
    }
}

/// A collection of routes sharing a prefix, tags and authorizers
#[derive(Debug, Clone, Default)]
pub struct ApiRouter {
    prefix: String,
    tags: Vec<String>,
    authorizers: Vec<Authorizer>,
    routes: Vec<Route>,
}

impl ApiRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path prefix applied to every route registered afterwards
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Authorizer required by every route registered afterwards
    pub fn with_authorizer(mut self, authorizer: impl Into<Authorizer>) -> Self {
        self.authorizers.push(authorizer.into());
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn add_route(
        &mut self,
        path: &str,
        method: HttpMethod,
        endpoint: &str,
        mut options: RouteOptions,
    ) -> Result<&Route> {
        options.endpoint = endpoint.to_string();
        let options = scope_options(options, &self.tags, &self.authorizers);
        let route = Route::new(join_prefix(&self.prefix, path)?, method, options)?;
        self.push(route)
    }

    pub fn get(&mut self, path: &str, endpoint: &str, options: RouteOptions) -> Result<&Route> {
        self.add_route(path, HttpMethod::Get, endpoint, options)
    }

    pub fn post(&mut self, path: &str, endpoint: &str, options: RouteOptions) -> Result<&Route> {
        self.add_route(path, HttpMethod::Post, endpoint, options)
    }

    pub fn put(&mut self, path: &str, endpoint: &str, options: RouteOptions) -> Result<&Route> {
        self.add_route(path, HttpMethod::Put, endpoint, options)
    }

    pub fn patch(&mut self, path: &str, endpoint: &str, options: RouteOptions) -> Result<&Route> {
        self.add_route(path, HttpMethod::Patch, endpoint, options)
    }

    pub fn delete(&mut self, path: &str, endpoint: &str, options: RouteOptions) -> Result<&Route> {
        self.add_route(path, HttpMethod::Delete, endpoint, options)
    }

    /// Add every route of `other` under this router's prefix, tags and authorizers
    pub fn include_router(&mut self, other: &ApiRouter) -> Result<()> {
        for route in &other.routes {
            let route = route.scoped(&self.prefix, &self.tags, &self.authorizers)?;
            self.push(route)?;
        }
        Ok(())
    }

    fn push(&mut self, route: Route) -> Result<&Route> {
        if self
            .routes
            .iter()
            .any(|r| r.path() == route.path() && r.method() == route.method())
        {
            return Err(GatewayError::InvalidArgument(format!(
                "duplicate route {} {}",
                route.method(),
                route.path()
            )));
        }
        self.routes.push(route);
        let index = self.routes.len() - 1;
        Ok(&self.routes[index])
    }

    /// A copy of this router with one `OPTIONS` route per distinct path
    ///
    /// Paths that already answer `OPTIONS` are left alone.
    pub fn with_cors_preflight(&self, cors: &CorsConfig) -> Result<ApiRouter> {
        let mut paths: IndexMap<&str, Vec<String>> = IndexMap::new();
        for route in &self.routes {
            let tags = paths.entry(route.path()).or_default();
            for tag in route.tags() {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
        }

        let integration = cors_preflight_integration(cors).to_value()?;
        let mut router = self.clone();

        for (path, mut tags) in paths {
            if self
                .routes
                .iter()
                .any(|r| r.path() == path && r.method() == HttpMethod::Options)
            {
                continue;
            }
            tags.push(CORS_TAG.to_string());

            let mut options = RouteOptions::new(PREFLIGHT_ENDPOINT)
                .extension(X_INTEGRATION, integration.clone())
                .response(
                    "200",
                    Response::new("200 response")
                        .with_string_header(ALLOW_ORIGIN_HEADER)
                        .with_string_header(ALLOW_METHODS_HEADER)
                        .with_string_header(ALLOW_HEADERS_HEADER),
                );
            options.tags = tags;

            debug!(%path, "adding CORS pre-flight route");
            router.push(Route::new(path, HttpMethod::Options, options)?)?;
        }

        Ok(router)
    }

    /// Render the OpenAPI document for every registered route
    pub fn openapi(&self, info: &DocumentInfo) -> Result<OpenApiDocument> {
        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        let mut schemes = IndexMap::new();
        let mut registered: IndexMap<String, &Authorizer> = IndexMap::new();
        let mut api_key_source = false;

        for route in &self.routes {
            paths
                .entry(route.path().to_string())
                .or_default()
                .set(route.method(), route.operation());

            for authorizer in route.authorizers() {
                let name = authorizer.scheme_name();
                if let Some(existing) = registered.get(name) {
                    if *existing != authorizer {
                        return Err(GatewayError::Configuration(format!(
                            "authorizer name '{}' is used for two different definitions",
                            name
                        )));
                    }
                    continue;
                }

                let descriptor = authorizer.build_descriptor()?;
                schemes.insert(name.to_string(), descriptor.to_security_scheme());
                registered.insert(name.to_string(), authorizer);
                api_key_source |= authorizer.uses_api_key();
            }
        }

        let mut extensions = IndexMap::new();
        if api_key_source {
            extensions.insert(
                X_API_KEY_SOURCE.to_string(),
                Value::from(API_KEY_SOURCE_HEADER),
            );
        }

        info!(
            title = %info.title,
            paths = paths.len(),
            security_schemes = schemes.len(),
            "built openapi document"
        );

        Ok(OpenApiDocument {
            openapi: info.openapi_version.clone(),
            info: Info {
                title: info.title.clone(),
                version: info.version.clone(),
                description: info.description.clone(),
            },
            paths,
            components: (!schemes.is_empty()).then(|| Components {
                security_schemes: schemes,
            }),
            extensions,
        })
    }
}

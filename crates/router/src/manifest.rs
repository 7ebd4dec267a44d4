//! Route manifests
//!
//! A manifest declares authorizers and named routers in YAML or JSON so a
//! document can be exported without writing Rust:
//!
//! ```yaml
//! authorizers:
//!   - type: cognito
//!     name: UserPool
//! routers:
//!   users:
//!     prefix: /users
//!     authorizers: [UserPool]
//!     routes:
//!       - path: /{user_id}
//!         method: GET
//!         endpoint: get_user
//!         integration:
//!           type: lambda
//!           function_uri: ${get_user_lambda_arn}
//!           role_arn: ${lambda_invoke_role_arn}
//! ```

use crate::openapi::{Extensions, Response};
use crate::route::RouteOptions;
use crate::router::ApiRouter;
use apigw_openapi_authorizers::{Authorizer, SecurityScheme};
use apigw_openapi_common::{GatewayError, HttpMethod, Result};
use apigw_openapi_integrations::IntegrationTarget;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Authorizers routers and routes refer to by name
    #[serde(default)]
    pub authorizers: Vec<Authorizer>,

    pub routers: IndexMap<String, RouterManifest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterManifest {
    pub prefix: String,
    pub tags: Vec<String>,
    pub authorizers: Vec<String>,
    /// Other routers of the manifest merged into this one
    pub include: Vec<String>,
    pub routes: Vec<RouteManifest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteManifest {
    pub path: String,
    pub method: HttpMethod,
    pub endpoint: String,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub operation_id: Option<String>,

    #[serde(default)]
    pub integration: Option<IntegrationTarget>,

    #[serde(default)]
    pub extensions: Extensions,

    #[serde(default)]
    pub authorizers: Vec<String>,

    /// Documented responses by status; `200 Successful Response` when empty
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
}

impl Manifest {
    /// Load a manifest, picking the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Err(GatewayError::Manifest(format!(
                "unsupported manifest format: {} (expected .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn router_names(&self) -> impl Iterator<Item = &str> {
        self.routers.keys().map(String::as_str)
    }

    /// Resolve the router to export
    ///
    /// Without a name the manifest must hold exactly one router.
    pub fn select(&self, name: Option<&str>) -> Result<&str> {
        let available = || self.router_names().collect::<Vec<_>>().join(", ");
        match name {
            Some(name) => self
                .routers
                .get_key_value(name)
                .map(|(key, _)| key.as_str())
                .ok_or_else(|| {
                    GatewayError::Manifest(format!(
                        "router '{}' not found, available: {}",
                        name,
                        available()
                    ))
                }),
            None => match self.routers.len() {
                0 => Err(GatewayError::Manifest(
                    "manifest declares no routers".to_string(),
                )),
                1 => self.router_names().next().ok_or_else(|| {
                    GatewayError::Manifest("manifest declares no routers".to_string())
                }),
                _ => Err(GatewayError::Manifest(format!(
                    "manifest declares several routers, choose one of: {}",
                    available()
                ))),
            },
        }
    }

    /// Build the named router with everything it includes
    pub fn build_router(&self, name: &str) -> Result<ApiRouter> {
        self.build_router_inner(name, &mut Vec::new())
    }

    fn build_router_inner<'a>(&'a self, name: &'a str, stack: &mut Vec<&'a str>) -> Result<ApiRouter> {
        if stack.contains(&name) {
            stack.push(name);
            return Err(GatewayError::Manifest(format!(
                "router include cycle: {}",
                stack.join(" -> ")
            )));
        }
        let declared = self.routers.get(name).ok_or_else(|| {
            GatewayError::Manifest(format!("router '{}' not found", name))
        })?;
        stack.push(name);

        let mut router = ApiRouter::new().with_prefix(declared.prefix.clone());
        for tag in &declared.tags {
            router = router.with_tag(tag.clone());
        }
        for authorizer in &declared.authorizers {
            router = router.with_authorizer(self.authorizer(authorizer)?);
        }

        for route in &declared.routes {
            let mut options = RouteOptions::new(route.endpoint.clone());
            options.summary = route.summary.clone();
            options.description = route.description.clone();
            options.tags = route.tags.clone();
            options.operation_id = route.operation_id.clone();
            options.integration = route.integration.clone();
            options.extensions = route.extensions.clone();
            options.responses = route.responses.clone();
            for authorizer in &route.authorizers {
                options.authorizers.push(self.authorizer(authorizer)?);
            }

            router
                .add_route(&route.path, route.method, &route.endpoint, options)
                .map_err(|e| {
                    GatewayError::Manifest(format!(
                        "router '{}', {} {}: {}",
                        name, route.method, route.path, e
                    ))
                })?;
        }

        for included in &declared.include {
            let child = self.build_router_inner(included, stack)?;
            router.include_router(&child)?;
        }

        stack.pop();
        debug!(router = name, routes = router.routes().len(), "built router from manifest");
        Ok(router)
    }

    fn authorizer(&self, name: &str) -> Result<Authorizer> {
        self.authorizers
            .iter()
            .find(|a| a.scheme_name() == name)
            .cloned()
            .ok_or_else(|| GatewayError::Manifest(format!("unknown authorizer '{}'", name)))
    }
}

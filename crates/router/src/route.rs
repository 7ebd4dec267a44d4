//! Route records carrying API Gateway integration metadata

use crate::openapi::{Extensions, Operation, Parameter, Response};
use apigw_openapi_authorizers::{Authorizer, SecurityScheme};
use apigw_openapi_common::{
    extract_path_parameters, is_valid_parameter_name, GatewayError, HttpMethod, Result,
    X_INTEGRATION,
};
use apigw_openapi_integrations::{BuildContext, IntegrationTarget};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

/// Everything a registration may say about a route besides path and method
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteOptions {
    /// Handler name, drives the default summary and operation id
    pub endpoint: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub operation_id: Option<String>,
    pub integration: Option<IntegrationTarget>,
    /// Extra operation fields; may hold a raw `x-amazon-apigateway-integration`
    pub extensions: Extensions,
    pub authorizers: Vec<Authorizer>,
    /// Documented responses; `200 Successful Response` when empty
    pub responses: IndexMap<String, Response>,
}

impl RouteOptions {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn integration(mut self, target: IntegrationTarget) -> Self {
        self.integration = Some(target);
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    pub fn extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    pub fn authorizer(mut self, authorizer: impl Into<Authorizer>) -> Self {
        self.authorizers.push(authorizer.into());
        self
    }

    pub fn response(mut self, status: impl Into<String>, response: Response) -> Self {
        self.responses.insert(status.into(), response);
        self
    }
}

/// A registered endpoint
///
/// Immutable once built; `with_extensions` and the scoping helpers return
/// new records. The registration options are kept so a router can rebuild
/// the route under its prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    path: String,
    method: HttpMethod,
    path_parameters: Vec<String>,
    options: RouteOptions,
    /// Caller extensions with the built integration block merged in
    extensions: Extensions,
}

impl Route {
    /// Validate the registration and attach its integration
    ///
    /// Exactly one integration source must be given: `options.integration`
    /// or a raw `x-amazon-apigateway-integration` extension.
    pub fn new(path: impl Into<String>, method: HttpMethod, options: RouteOptions) -> Result<Self> {
        let path = path.into();
        validate_path(&path)?;

        let raw = options.extensions.get(X_INTEGRATION);
        match (&options.integration, raw) {
            (None, None) => {
                return Err(GatewayError::InvalidArgument(format!(
                    "{} {} requires one of: {}, {}",
                    method,
                    path,
                    IntegrationTarget::SOURCE_NAMES.join(", "),
                    X_INTEGRATION
                )))
            }
            (Some(target), Some(_)) => {
                return Err(GatewayError::InvalidArgument(format!(
                    "{} {} has two integration sources: '{}' and a raw {} block",
                    method,
                    path,
                    target.name(),
                    X_INTEGRATION
                )))
            }
            (None, Some(block)) if !block.is_object() => {
                return Err(GatewayError::InvalidArgument(format!(
                    "{} {}: {} must be an object",
                    method, path, X_INTEGRATION
                )))
            }
            _ => {}
        }

        let route = Self::assemble(path, method, options)?;
        debug!(
            method = %route.method,
            path = %route.path,
            endpoint = %route.options.endpoint,
            "registered route"
        );
        Ok(route)
    }

    /// Extract parameters and build the integration for the final path
    ///
    /// With a target, any `x-amazon-apigateway-integration` extension is an
    /// overlay merged onto the built block.
    fn assemble(path: String, method: HttpMethod, options: RouteOptions) -> Result<Self> {
        let path_parameters = validate_path(&path)?;

        let mut extensions = options.extensions.clone();
        if let Some(target) = &options.integration {
            let ctx = BuildContext::new(method, path_parameters.clone());
            let mut block = target.build(&ctx)?.to_value()?;
            if let Some(overlay) = extensions.get(X_INTEGRATION) {
                merge_value(&mut block, overlay.clone());
            }
            extensions.insert(X_INTEGRATION.to_string(), block);
        }

        Ok(Self {
            path,
            method,
            path_parameters,
            options,
            extensions,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.options.endpoint
    }

    pub fn path_parameters(&self) -> &[String] {
        &self.path_parameters
    }

    pub fn tags(&self) -> &[String] {
        &self.options.tags
    }

    pub fn authorizers(&self) -> &[Authorizer] {
        &self.options.authorizers
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// The typed target the integration block was built from
    pub fn integration_target(&self) -> Option<&IntegrationTarget> {
        self.options.integration.as_ref()
    }

    /// The attached integration block
    pub fn integration(&self) -> Option<&Value> {
        self.extensions.get(X_INTEGRATION)
    }

    /// `type` of the attached integration (`aws_proxy`, `aws`, `mock`)
    pub fn integration_type(&self) -> Option<&str> {
        self.integration()
            .and_then(|block| block.get("type"))
            .and_then(Value::as_str)
    }

    /// A copy of this route with `extra` merged into its extensions
    ///
    /// Objects are merged key by key; keys only present on this route are
    /// kept, other values are replaced by the incoming ones.
    pub fn with_extensions(&self, extra: Extensions) -> Route {
        let mut route = self.clone();
        for (key, value) in extra {
            merge_entry(&mut route.options.extensions, &key, value.clone());
            merge_entry(&mut route.extensions, &key, value);
        }
        route
    }

    /// This route rebuilt under a router: prefixed path, router tags and
    /// authorizers ahead of the route's own
    ///
    /// Parameters and the integration are derived again from the prefixed
    /// path, so placeholders in the prefix are documented and forwarded.
    pub(crate) fn scoped(
        &self,
        prefix: &str,
        tags: &[String],
        authorizers: &[Authorizer],
    ) -> Result<Route> {
        let options = scope_options(self.options.clone(), tags, authorizers);
        Self::assemble(join_prefix(prefix, &self.path)?, self.method, options)
    }

    /// `<endpoint>_<path>_<method>` with every non-word character as `_`
    pub fn operation_id(&self) -> String {
        if let Some(id) = &self.options.operation_id {
            return id.clone();
        }
        let raw = format!("{}{}", self.options.endpoint, self.path);
        let sanitized: String = raw
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        format!("{}_{}", sanitized, self.method.path_item_key())
    }

    /// The OpenAPI operation for this route
    pub fn operation(&self) -> Operation {
        let responses = if self.options.responses.is_empty() {
            let mut responses = IndexMap::new();
            responses.insert("200".to_string(), Response::successful());
            responses
        } else {
            self.options.responses.clone()
        };

        let endpoint = &self.options.endpoint;
        let summary = self
            .options
            .summary
            .clone()
            .or_else(|| (!endpoint.is_empty()).then(|| title_case(endpoint)));

        Operation {
            tags: self.options.tags.clone(),
            summary,
            description: self.options.description.clone(),
            operation_id: Some(self.operation_id()),
            parameters: self.path_parameters.iter().map(Parameter::path).collect(),
            responses,
            security: self
                .options
                .authorizers
                .iter()
                .map(|a| {
                    let mut requirement = IndexMap::new();
                    requirement.insert(a.scheme_name().to_string(), Vec::new());
                    requirement
                })
                .collect(),
            extensions: self.extensions.clone(),
        }
    }
}

/// Put router tags and authorizers ahead of the route's own, without repeats
pub(crate) fn scope_options(
    mut options: RouteOptions,
    tags: &[String],
    authorizers: &[Authorizer],
) -> RouteOptions {
    let mut scoped_tags = tags.to_vec();
    for tag in &options.tags {
        if !scoped_tags.contains(tag) {
            scoped_tags.push(tag.clone());
        }
    }
    options.tags = scoped_tags;

    let mut scoped_authorizers = authorizers.to_vec();
    for authorizer in &options.authorizers {
        if !scoped_authorizers
            .iter()
            .any(|a| a.scheme_name() == authorizer.scheme_name())
        {
            scoped_authorizers.push(authorizer.clone());
        }
    }
    options.authorizers = scoped_authorizers;
    options
}

/// `prefix` followed by `path`; the route's own path must be rooted
pub(crate) fn join_prefix(prefix: &str, path: &str) -> Result<String> {
    if !path.starts_with('/') {
        return Err(GatewayError::InvalidArgument(format!(
            "route path must start with '/': {}",
            path
        )));
    }
    Ok(format!("{}{}", prefix.trim_end_matches('/'), path))
}

/// Check a full route path and return its placeholder names
fn validate_path(path: &str) -> Result<Vec<String>> {
    if !path.starts_with('/') {
        return Err(GatewayError::InvalidArgument(format!(
            "route path must start with '/': {}",
            path
        )));
    }

    let path_parameters = extract_path_parameters(path);
    for (index, name) in path_parameters.iter().enumerate() {
        if !is_valid_parameter_name(name) {
            return Err(GatewayError::InvalidArgument(format!(
                "invalid path parameter '{}' in {}",
                name, path
            )));
        }
        if path_parameters[..index].contains(name) {
            return Err(GatewayError::InvalidArgument(format!(
                "path parameter '{}' appears twice in {}",
                name, path
            )));
        }
    }
    Ok(path_parameters)
}

fn merge_entry(map: &mut Extensions, key: &str, value: Value) {
    match map.get_mut(key) {
        Some(existing) => merge_value(existing, value),
        None => {
            map.insert(key.to_string(), value);
        }
    }
}

fn merge_value(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Object(current), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match current.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        current.insert(key, value);
                    }
                }
            }
        }
        (slot, incoming) => *slot = incoming,
    }
}

/// `get_user` -> `Get User`
fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use apigw_openapi_integrations::{LambdaTarget, SnsTarget};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn lambda() -> IntegrationTarget {
        IntegrationTarget::Lambda(LambdaTarget::new("${fn_arn}", "${role_arn}"))
    }

    #[test]
    fn test_route_without_integration_lists_sources() {
        let err = Route::new("/users", HttpMethod::Get, RouteOptions::new("list_users"))
            .unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, GatewayError::InvalidArgument(_)));
        for source in IntegrationTarget::SOURCE_NAMES {
            assert!(message.contains(source), "{} missing from {}", source, message);
        }
        assert!(message.contains(X_INTEGRATION));
    }

    #[test]
    fn test_two_sources_rejected() {
        let options = RouteOptions::new("list_users")
            .integration(lambda())
            .extension(X_INTEGRATION, json!({"type": "mock"}));
        let err = Route::new("/users", HttpMethod::Get, options).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArgument(_)));
    }

    #[test]
    fn test_raw_block_must_be_object() {
        let options = RouteOptions::new("list_users").extension(X_INTEGRATION, json!("mock"));
        assert!(Route::new("/users", HttpMethod::Get, options).is_err());
    }

    #[test]
    fn test_raw_block_is_kept() {
        let options =
            RouteOptions::new("ping").extension(X_INTEGRATION, json!({"type": "mock", "uri": ""}));
        let route = Route::new("/ping", HttpMethod::Get, options).unwrap();
        assert_eq!(route.integration_type(), Some("mock"));
    }

    #[test]
    fn test_path_parameters_reach_the_integration() {
        let route = Route::new(
            "/users/{user_id}/files/{name+}",
            HttpMethod::Get,
            RouteOptions::new("get_file").integration(lambda()),
        )
        .unwrap();

        assert_eq!(route.path_parameters(), ["user_id", "name"]);
        let params = &route.integration().unwrap()["requestParameters"];
        assert_eq!(params["integration.request.path.user_id"], "method.request.path.user_id");
    }

    #[test]
    fn test_other_extensions_survive_integration() {
        let options = RouteOptions::new("notify")
            .integration(IntegrationTarget::Sns(SnsTarget::new("${topic}", "${role}")))
            .extension("x-internal-owner", json!("team-a"));
        let route = Route::new("/notify", HttpMethod::Post, options).unwrap();

        assert_eq!(route.extensions()["x-internal-owner"], "team-a");
        assert_eq!(route.integration_type(), Some("aws"));
    }

    #[test]
    fn test_with_extensions_returns_merged_copy() {
        let route = Route::new(
            "/users",
            HttpMethod::Get,
            RouteOptions::new("list_users").integration(lambda()),
        )
        .unwrap();

        let mut extra = Extensions::new();
        extra.insert(X_INTEGRATION.to_string(), json!({"timeoutInMillis": 5000}));
        extra.insert("x-team".to_string(), json!("core"));
        let merged = route.with_extensions(extra);

        assert!(route.extensions().get("x-team").is_none());
        assert!(route.integration().unwrap().get("timeoutInMillis").is_none());

        let block = merged.integration().unwrap();
        assert_eq!(block["timeoutInMillis"], 5000);
        assert_eq!(block["uri"], "${fn_arn}");
        assert_eq!(merged.extensions()["x-team"], "core");
    }

    #[test]
    fn test_operation_defaults() {
        let route = Route::new(
            "/users/{user_id}",
            HttpMethod::Get,
            RouteOptions::new("get_user").integration(lambda()).tag("users"),
        )
        .unwrap();
        let operation = route.operation();

        assert_eq!(operation.operation_id.as_deref(), Some("get_user_users__user_id__get"));
        assert_eq!(operation.summary.as_deref(), Some("Get User"));
        assert_eq!(operation.tags, vec!["users"]);
        assert_eq!(operation.parameters, vec![Parameter::path("user_id")]);
        assert_eq!(operation.responses["200"], Response::successful());
        assert!(operation.extensions.contains_key(X_INTEGRATION));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("get_user"), "Get User");
        assert_eq!(title_case("HEALTH"), "Health");
        assert_eq!(title_case("_private__name"), "Private Name");
    }

    #[test]
    fn test_scoped_prefix_and_tags() {
        let route = Route::new(
            "/items",
            HttpMethod::Get,
            RouteOptions::new("list_items").integration(lambda()).tag("items"),
        )
        .unwrap();
        let scoped = route
            .scoped("/v1/", &["api".to_string(), "items".to_string()], &[])
            .unwrap();

        assert_eq!(scoped.path(), "/v1/items");
        assert_eq!(scoped.tags(), ["api", "items"]);
        assert_eq!(scoped.operation_id(), "list_items_v1_items_get");
    }

    #[test]
    fn test_scoped_prefix_placeholders_reach_the_integration() {
        let route = Route::new(
            "/users/{user_id}",
            HttpMethod::Get,
            RouteOptions::new("get_user").integration(lambda()),
        )
        .unwrap();
        let scoped = route.scoped("/tenants/{tenant_id}", &[], &[]).unwrap();

        assert_eq!(scoped.path(), "/tenants/{tenant_id}/users/{user_id}");
        assert_eq!(scoped.path_parameters(), ["tenant_id", "user_id"]);
        assert_eq!(
            scoped.operation().parameters,
            vec![Parameter::path("tenant_id"), Parameter::path("user_id")]
        );

        let block = scoped.integration().unwrap();
        assert_eq!(
            block["requestParameters"]["integration.request.path.tenant_id"],
            "method.request.path.tenant_id"
        );
        let template = block["requestTemplates"]["application/json"].as_str().unwrap();
        assert!(template.contains("$input.params('tenant_id')"));
    }

    #[test]
    fn test_scoped_rejects_relative_prefix() {
        let route = Route::new(
            "/users",
            HttpMethod::Get,
            RouteOptions::new("list_users").integration(lambda()),
        )
        .unwrap();

        let err = route.scoped("v1", &[], &[]).unwrap_err();
        assert!(err.to_string().contains("must start with '/'"));
    }

    #[test]
    fn test_scoped_rejects_repeated_placeholder() {
        let route = Route::new(
            "/items/{id}",
            HttpMethod::Get,
            RouteOptions::new("get_item").integration(lambda()),
        )
        .unwrap();

        let err = route.scoped("/groups/{id}", &[], &[]).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArgument(_)));
    }

    #[test]
    fn test_scoped_keeps_merged_extensions() {
        let route = Route::new(
            "/users",
            HttpMethod::Get,
            RouteOptions::new("list_users").integration(lambda()),
        )
        .unwrap();
        let mut extra = Extensions::new();
        extra.insert(X_INTEGRATION.to_string(), json!({"timeoutInMillis": 5000}));

        let scoped = route.with_extensions(extra).scoped("/v1", &[], &[]).unwrap();
        let block = scoped.integration().unwrap();
        assert_eq!(block["timeoutInMillis"], 5000);
        assert_eq!(block["uri"], "${fn_arn}");
        assert_eq!(scoped.integration_target(), Some(&lambda()));
    }
}

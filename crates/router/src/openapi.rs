//! OpenAPI 3.0 document model
//!
//! Only the parts a route registration can produce are modelled. Vendor
//! extensions are kept in flattened maps so they serialize next to the
//! standard fields.

use apigw_openapi_authorizers::ApiKeyScheme;
use apigw_openapi_common::{HttpMethod, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Extension fields keyed by `x-*` name
pub type Extensions = IndexMap<String, Value>;

pub const DEFAULT_OPENAPI_VERSION: &str = "3.0.1";
pub const DEFAULT_TITLE: &str = "untitled";
pub const DEFAULT_VERSION: &str = "0.0.1";

/// Document root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version (e.g., "3.0.1")
    pub openapi: String,

    pub info: Info,

    /// Paths in registration order
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl OpenApiDocument {
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Every operation with its path and method, in document order
    pub fn operations(&self) -> impl Iterator<Item = (&str, HttpMethod, &Operation)> {
        self.paths
            .iter()
            .flat_map(|(path, item)| item.operations().map(move |(m, op)| (path.as_str(), m, op)))
    }
}

/// API information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,

    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Reusable components
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub security_schemes: IndexMap<String, ApiKeyScheme>,
}

/// Operations for a path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl PathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
        }
    }

    fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Patch => &mut self.patch,
        }
    }

    /// Set the operation for a method, returning the one it replaced
    pub fn set(&mut self, method: HttpMethod, operation: Operation) -> Option<Operation> {
        self.slot(method).replace(operation)
    }

    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        [
            HttpMethod::Get,
            HttpMethod::Put,
            HttpMethod::Post,
            HttpMethod::Delete,
            HttpMethod::Options,
            HttpMethod::Head,
            HttpMethod::Patch,
        ]
        .into_iter()
        .filter_map(move |m| self.operation(m).map(|op| (m, op)))
    }
}

/// HTTP operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    #[serde(default)]
    pub responses: IndexMap<String, Response>,

    /// Requirement objects, one per scheme name
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<IndexMap<String, Vec<String>>>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Parameter definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    /// Location: query, header, path, cookie
    #[serde(rename = "in")]
    pub location: String,

    #[serde(default)]
    pub required: bool,

    pub schema: Schema,
}

impl Parameter {
    /// A required string path parameter
    pub fn path(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: "path".to_string(),
            required: true,
            schema: Schema::string(),
        }
    }
}

/// Minimal schema: a type name or the empty (any) schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
}

impl Schema {
    pub fn string() -> Self {
        Self {
            schema_type: Some("string".to_string()),
        }
    }

    pub fn any() -> Self {
        Self::default()
    }
}

/// Documented response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Header>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

impl Response {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            headers: IndexMap::new(),
            content: IndexMap::new(),
        }
    }

    /// `200 Successful Response` with an unconstrained JSON body
    pub fn successful() -> Self {
        let mut response = Self::new("Successful Response");
        response.content.insert(
            "application/json".to_string(),
            MediaType {
                schema: Schema::any(),
            },
        );
        response
    }

    pub fn with_string_header(mut self, name: impl Into<String>) -> Self {
        self.headers.insert(
            name.into(),
            Header {
                schema: Schema::string(),
                example: None,
            },
        );
        self
    }
}

/// Response header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub schema: Schema,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// Media type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Schema,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_extensions_flatten() {
        let mut operation = Operation {
            operation_id: Some("get_user_users__user_id__get".to_string()),
            ..Default::default()
        };
        operation
            .responses
            .insert("200".to_string(), Response::successful());
        operation
            .extensions
            .insert("x-amazon-apigateway-integration".to_string(), json!({"type": "mock"}));

        let value = serde_json::to_value(&operation).unwrap();
        assert_eq!(value["x-amazon-apigateway-integration"]["type"], "mock");
        assert_eq!(
            value["responses"]["200"],
            json!({"description": "Successful Response", "content": {"application/json": {"schema": {}}}})
        );
        assert!(value.get("tags").is_none());
    }

    #[test]
    fn test_path_item_set_and_iterate() {
        let mut item = PathItem::default();
        assert!(item.set(HttpMethod::Post, Operation::default()).is_none());
        assert!(item.set(HttpMethod::Get, Operation::default()).is_none());
        assert!(item.set(HttpMethod::Get, Operation::default()).is_some());

        let methods: Vec<_> = item.operations().map(|(m, _)| m).collect();
        assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Post]);
    }

    #[test]
    fn test_path_parameter_shape() {
        let value = serde_json::to_value(Parameter::path("user_id")).unwrap();
        assert_eq!(
            value,
            json!({"name": "user_id", "in": "path", "required": true, "schema": {"type": "string"}})
        );
    }
}

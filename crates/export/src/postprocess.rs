//! Document post-processing
//!
//! Both transformations are total and idempotent; they take a document and
//! return a new one.

use apigw_openapi_common::cors::{ALLOW_HEADERS_HEADER, ALLOW_METHODS_HEADER, ALLOW_ORIGIN_HEADER};
use apigw_openapi_common::{CorsConfig, X_AMAZON_APIGATEWAY_PATTERN};
use glob::Pattern;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;

/// Add the three CORS headers to every response of every operation
///
/// Other headers and response fields are kept.
pub fn add_cors_headers(doc: &Value, cors: &CorsConfig) -> Value {
    let mut doc = doc.clone();
    let headers = [
        (ALLOW_ORIGIN_HEADER, cors.origin_value()),
        (ALLOW_HEADERS_HEADER, cors.allow_headers.clone()),
        (ALLOW_METHODS_HEADER, cors.allow_methods.clone()),
    ];

    if let Some(paths) = doc.get_mut("paths").and_then(Value::as_object_mut) {
        let responses = paths
            .values_mut()
            .filter_map(Value::as_object_mut)
            .flat_map(|item| item.values_mut())
            .filter_map(|operation| operation.get_mut("responses"))
            .filter_map(Value::as_object_mut)
            .flat_map(|responses| responses.values_mut())
            .filter_map(Value::as_object_mut);

        for response in responses {
            let entry = response
                .entry("headers")
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Some(existing) = entry.as_object_mut() {
                for (name, example) in &headers {
                    existing.insert(
                        name.to_string(),
                        json!({"schema": {"type": "string"}, "example": example}),
                    );
                }
            }
        }
    }

    doc
}

/// Remove every object key matching `pattern`, at any depth
pub fn remove_keys_matching(doc: &Value, pattern: &Pattern) -> Value {
    match doc {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !pattern.matches(key))
                .map(|(key, value)| (key.clone(), remove_keys_matching(value, pattern)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| remove_keys_matching(item, pattern))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Strip every `x-amazon-apigateway-*` key
pub fn make_public(doc: &Value) -> Value {
    remove_keys_matching(doc, public_pattern())
}

fn public_pattern() -> &'static Pattern {
    static PATTERN: OnceLock<Pattern> = OnceLock::new();
    PATTERN.get_or_init(|| Pattern::new(X_AMAZON_APIGATEWAY_PATTERN).unwrap_or_default())
}

//! Mapping template loading and rendering
//!
//! VTL bodies are kept as Tera templates. Tera only fills in the builder
//! parameters; the VTL itself is evaluated later by API Gateway.

use apigw_openapi_common::{GatewayError, Result};
use std::collections::HashMap;
use std::sync::OnceLock;
use tera::{Context, Tera, Value};

pub const DYNAMODB_PUT_ITEM: &str = "dynamodb_put_item.vtl";
pub const DYNAMODB_QUERY: &str = "dynamodb_query.vtl";
pub const SNS_PUBLISH: &str = "sns_publish.vtl";

/// Load all mapping templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.register_filter("vtl_string", vtl_string_filter);

    tera.add_raw_template(
        DYNAMODB_PUT_ITEM,
        include_str!("../templates/dynamodb_put_item.vtl.tera"),
    )
    .map_err(|e| load_error(DYNAMODB_PUT_ITEM, e))?;

    tera.add_raw_template(
        DYNAMODB_QUERY,
        include_str!("../templates/dynamodb_query.vtl.tera"),
    )
    .map_err(|e| load_error(DYNAMODB_QUERY, e))?;

    tera.add_raw_template(SNS_PUBLISH, include_str!("../templates/sns_publish.vtl.tera"))
        .map_err(|e| load_error(SNS_PUBLISH, e))?;

    Ok(tera)
}

/// Render one mapping template
///
/// The trailing newline of the template file is not part of the output.
pub fn render(name: &str, context: &Context) -> Result<String> {
    let rendered = templates()?
        .render(name, context)
        .map_err(|e| GatewayError::Template(format!("Failed to render {}: {:?}", name, e)))?;

    Ok(rendered.trim_end_matches('\n').to_string())
}

/// Templates parsed once per process
fn templates() -> Result<&'static Tera> {
    static TEMPLATES: OnceLock<std::result::Result<Tera, String>> = OnceLock::new();
    TEMPLATES
        .get_or_init(|| {
            load_templates().map_err(|e| match e {
                GatewayError::Template(message) => message,
                other => other.to_string(),
            })
        })
        .as_ref()
        .map_err(|message| GatewayError::Template(message.clone()))
}

fn load_error(name: &str, e: tera::Error) -> GatewayError {
    GatewayError::Template(format!("Failed to load {} template: {}", name, e))
}

/// Filter escaping a value for use inside a double-quoted VTL/JSON string
fn vtl_string_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("vtl_string filter expects a string"))?;

    Ok(Value::String(s.replace('\\', "\\\\").replace('"', "\\\"")))
}

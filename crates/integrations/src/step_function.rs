//! Step Functions integrations
//!
//! The request body becomes the state machine input. Synchronous execution
//! returns the result in `output`, which the default response unwraps.

use crate::descriptor::{IntegrationDescriptor, IntegrationKind, ResponseMapping, ResponseMappings};
use apigw_openapi_common::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const START_SYNC_EXECUTION_URI: &str =
    "arn:aws:apigateway:${region}:states:action/StartSyncExecution";
pub const START_EXECUTION_URI: &str = "arn:aws:apigateway:${region}:states:action/StartExecution";

const DEFAULT_INPUT: &str = "$input.json('$')";
const UNWRAP_OUTPUT_TEMPLATE: &str =
    "#set($output = $util.parseJson($input.path('$.output')))\n$output.body";

/// Execution style of the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Execution {
    /// `StartSyncExecution`, express workflows only
    #[default]
    Sync,
    /// `StartExecution`, returns the execution ARN immediately
    Async,
}

impl Execution {
    pub fn uri(&self) -> &'static str {
        match self {
            Execution::Sync => START_SYNC_EXECUTION_URI,
            Execution::Async => START_EXECUTION_URI,
        }
    }
}

/// A state machine behind a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFunctionTarget {
    pub state_machine_arn: String,
    pub role_arn: String,

    #[serde(default)]
    pub execution: Execution,

    /// VTL expression producing the execution input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_template: Option<String>,

    /// Replaces the default response mappings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<ResponseMappings>,
}

impl StepFunctionTarget {
    pub fn new(state_machine_arn: impl Into<String>, role_arn: impl Into<String>) -> Self {
        Self {
            state_machine_arn: state_machine_arn.into(),
            role_arn: role_arn.into(),
            execution: Execution::Sync,
            input_template: None,
            responses: None,
        }
    }

    pub fn asynchronous(mut self) -> Self {
        self.execution = Execution::Async;
        self
    }

    pub fn with_input_template(mut self, template: impl Into<String>) -> Self {
        self.input_template = Some(template.into());
        self
    }

    pub fn with_responses(mut self, responses: ResponseMappings) -> Self {
        self.responses = Some(responses);
        self
    }
}

pub fn step_function_integration(target: &StepFunctionTarget) -> Result<IntegrationDescriptor> {
    let mut template = Map::new();
    template.insert(
        "input".into(),
        Value::from(target.input_template.as_deref().unwrap_or(DEFAULT_INPUT)),
    );
    template.insert(
        "stateMachineArn".into(),
        Value::from(target.state_machine_arn.as_str()),
    );
    template.insert("region".into(), Value::from("${region}"));
    let request_template = serde_json::to_string(&Value::Object(template))?;

    let responses = match &target.responses {
        Some(responses) => responses.clone(),
        None => default_responses(),
    };

    let descriptor = IntegrationDescriptor::new(
        IntegrationKind::Aws,
        target.execution.uri(),
        target.role_arn.clone(),
    )
    .with_json_request_template(request_template)
    .with_responses(responses);

    descriptor.validate()?;
    Ok(descriptor)
}

fn default_responses() -> ResponseMappings {
    let mut responses = ResponseMappings::new();
    responses.insert(
        "default".to_string(),
        ResponseMapping::status("200").with_json_template(UNWRAP_OUTPUT_TEMPLATE),
    );
    responses
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_sync_integration() {
        let target = StepFunctionTarget::new("${step_function_arn}", "${my_role_arn}");
        let descriptor = step_function_integration(&target).unwrap();

        assert_eq!(descriptor.uri, START_SYNC_EXECUTION_URI);
        assert_eq!(descriptor.kind, IntegrationKind::Aws);
        assert_eq!(descriptor.credentials.as_deref(), Some("${my_role_arn}"));

        let template: Value =
            serde_json::from_str(&descriptor.request_templates["application/json"]).unwrap();
        assert_eq!(
            template,
            json!({
                "input": "$input.json('$')",
                "stateMachineArn": "${step_function_arn}",
                "region": "${region}"
            })
        );

        let default = &descriptor.responses["default"];
        assert_eq!(default.status_code, "200");
        assert_eq!(
            default.response_templates.as_ref().unwrap()["application/json"],
            UNWRAP_OUTPUT_TEMPLATE
        );
    }

    #[test]
    fn test_async_differs_only_in_uri() {
        let sync = step_function_integration(&StepFunctionTarget::new("${sfn}", "${role}")).unwrap();
        let mut async_ =
            step_function_integration(&StepFunctionTarget::new("${sfn}", "${role}").asynchronous())
                .unwrap();

        assert_eq!(async_.uri, START_EXECUTION_URI);
        async_.uri = sync.uri.clone();
        assert_eq!(async_, sync);
    }

    #[test]
    fn test_response_override_replaces_default() {
        let mut responses = ResponseMappings::new();
        responses.insert("default".to_string(), ResponseMapping::status("202"));
        let target = StepFunctionTarget::new("${sfn}", "${role}").with_responses(responses);

        let descriptor = step_function_integration(&target).unwrap();
        assert_eq!(descriptor.responses.len(), 1);
        assert_eq!(descriptor.responses["default"], ResponseMapping::status("202"));
    }

    #[test]
    fn test_custom_input_template() {
        let target = StepFunctionTarget::new("${sfn}", "${role}")
            .with_input_template("$util.escapeJavaScript($input.json('$'))");
        let descriptor = step_function_integration(&target).unwrap();

        let template: Value =
            serde_json::from_str(&descriptor.request_templates["application/json"]).unwrap();
        assert_eq!(template["input"], "$util.escapeJavaScript($input.json('$'))");
    }
}

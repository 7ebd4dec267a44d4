//! Building and writing the private/public document pair

use crate::output::{DocumentSink, OutputTarget};
use crate::postprocess::{add_cors_headers, make_public};
use apigw_openapi_common::{CorsConfig, Result};
use apigw_openapi_router::{ApiRouter, DocumentInfo};
use serde_json::Value;
use tracing::info;

/// The two documents produced for one router
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDocuments {
    /// Full document with every API Gateway extension
    pub private: Value,
    /// Same document without `x-amazon-apigateway-*` keys
    pub public: Value,
}

impl ExportedDocuments {
    pub fn private_json(&self) -> Result<String> {
        to_pretty_json(&self.private)
    }

    pub fn public_json(&self) -> Result<String> {
        to_pretty_json(&self.public)
    }
}

fn to_pretty_json(doc: &Value) -> Result<String> {
    let mut text = serde_json::to_string_pretty(doc)?;
    text.push('\n');
    Ok(text)
}

/// Turns a router into exported documents
#[derive(Debug, Clone, Default)]
pub struct ExportPipeline {
    info: DocumentInfo,
    cors: Option<CorsConfig>,
}

impl ExportPipeline {
    pub fn new(info: DocumentInfo) -> Self {
        Self { info, cors: None }
    }

    /// Add pre-flight routes and CORS response headers
    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.cors = Some(cors);
        self
    }

    pub fn build(&self, router: &ApiRouter) -> Result<ExportedDocuments> {
        let private = match &self.cors {
            Some(cors) => {
                let router = router.with_cors_preflight(cors)?;
                add_cors_headers(&router.openapi(&self.info)?.to_value()?, cors)
            }
            None => router.openapi(&self.info)?.to_value()?,
        };
        let public = make_public(&private);

        Ok(ExportedDocuments { private, public })
    }

    /// Write the private document (when asked for) and then the public one
    pub fn write(
        &self,
        docs: &ExportedDocuments,
        sink: &mut dyn DocumentSink,
        public: &OutputTarget,
        private: Option<&OutputTarget>,
    ) -> Result<()> {
        if let Some(target) = private {
            sink.write_document(target, &docs.private_json()?)?;
            info!(target_path = %target, "wrote private document");
        }
        sink.write_document(public, &docs.public_json()?)?;
        info!(target_path = %public, "wrote public document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MockDocumentSink;
    use apigw_openapi_common::{GatewayError, X_INTEGRATION};
    use apigw_openapi_integrations::{IntegrationTarget, LambdaTarget};
    use apigw_openapi_router::RouteOptions;
    use mockall::predicate::eq;
    use mockall::Sequence;
    use std::path::PathBuf;

    fn router() -> ApiRouter {
        let mut router = ApiRouter::new();
        router
            .get(
                "/users",
                "list_users",
                RouteOptions::default().integration(IntegrationTarget::Lambda(LambdaTarget::new(
                    "${fn_arn}",
                    "${role_arn}",
                ))),
            )
            .unwrap();
        router
    }

    #[test]
    fn test_build_without_cors() {
        let docs = ExportPipeline::default().build(&router()).unwrap();

        let get = &docs.private["paths"]["/users"]["get"];
        assert!(get.get(X_INTEGRATION).is_some());
        assert!(get["responses"]["200"].get("headers").is_none());
        assert!(docs.public["paths"]["/users"]["get"].get(X_INTEGRATION).is_none());
        assert!(docs.private["paths"]["/users"].get("options").is_none());
    }

    #[test]
    fn test_build_with_cors() {
        let docs = ExportPipeline::default()
            .with_cors(CorsConfig::default())
            .build(&router())
            .unwrap();

        let item = &docs.private["paths"]["/users"];
        assert_eq!(item["options"][X_INTEGRATION]["type"], "mock");
        assert!(item["get"]["responses"]["200"]["headers"]
            .get("Access-Control-Allow-Origin")
            .is_some());
        assert!(docs.public["paths"]["/users"]["options"].get(X_INTEGRATION).is_none());
    }

    #[test]
    fn test_write_private_before_public() {
        let docs = ExportPipeline::default().build(&router()).unwrap();
        let private_target = OutputTarget::File(PathBuf::from("private.json"));
        let expected_private = docs.private_json().unwrap();

        let mut seq = Sequence::new();
        let mut sink = MockDocumentSink::new();
        sink.expect_write_document()
            .withf(move |target, contents| {
                *target == OutputTarget::File(PathBuf::from("private.json"))
                    && contents == expected_private
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        sink.expect_write_document()
            .with(eq(OutputTarget::Stdout), mockall::predicate::always())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        ExportPipeline::default()
            .write(&docs, &mut sink, &OutputTarget::Stdout, Some(&private_target))
            .unwrap();
    }

    #[test]
    fn test_write_failure_propagates() {
        let docs = ExportPipeline::default().build(&router()).unwrap();

        let mut sink = MockDocumentSink::new();
        sink.expect_write_document().times(1).returning(|_, _| {
            Err(GatewayError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        });

        let err = ExportPipeline::default()
            .write(&docs, &mut sink, &OutputTarget::Stdout, None)
            .unwrap_err();
        assert!(matches!(err, GatewayError::Io(_)));
    }
}

//! OpenAPI document export
//!
//! The private document keeps every API Gateway extension and is consumed by
//! deployment tooling. The public document is the same document with all
//! `x-amazon-apigateway-*` keys removed, safe to publish.

pub mod output;
pub mod pipeline;
pub mod postprocess;

pub use output::{DocumentSink, FsSink, OutputTarget};
pub use pipeline::{ExportPipeline, ExportedDocuments};
pub use postprocess::{add_cors_headers, make_public, remove_keys_matching};

//! Route registration and OpenAPI generation for Amazon API Gateway
//!
//! Routes are registered on an [`ApiRouter`]; each carries a typed
//! integration target whose descriptor lands in the operation's
//! `x-amazon-apigateway-integration` field. The router renders the whole
//! document, including the security schemes of every authorizer in use.
//!
//! ```rust
//! use apigw_openapi_integrations::{IntegrationTarget, LambdaTarget};
//! use apigw_openapi_router::{ApiRouter, DocumentInfo, RouteOptions};
//!
//! let mut router = ApiRouter::new();
//! router
//!     .get(
//!         "/users/{user_id}",
//!         "get_user",
//!         RouteOptions::default().integration(IntegrationTarget::Lambda(LambdaTarget::new(
//!             "${get_user_arn}",
//!             "${invoke_role_arn}",
//!         ))),
//!     )
//!     .unwrap();
//!
//! let doc = router.openapi(&DocumentInfo::default()).unwrap();
//! assert!(doc.paths.contains_key("/users/{user_id}"));
//! ```

pub mod manifest;
pub mod openapi;
pub mod route;
pub mod router;

pub use manifest::{Manifest, RouteManifest, RouterManifest};
pub use openapi::{OpenApiDocument, Operation, PathItem, Response};
pub use route::{Route, RouteOptions};
pub use router::{ApiRouter, DocumentInfo, CORS_TAG, PREFLIGHT_ENDPOINT};

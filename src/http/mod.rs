//! HTTP plumbing: endpoint declarations, payload shapes, transport and the
//! request executor.

pub mod endpoint;
pub mod executor;
pub mod routes;
pub mod shape;
pub mod transport;

pub use endpoint::{EndpointDescriptor, EndpointRegistry, Method, Operation};
pub use executor::{LoadingFlag, Message, Outcome, RequestExecutor, RequestOptions};
pub use routes::ApiRoutes;
pub use shape::ShapeTag;
pub use transport::{ApiRequest, ReqwestTransport, Transport, TransportSettings};

//! Forward lookup service: given an address, ask the configured vendors who
//! lives there and return the first answer.

pub mod api;
pub mod context;

pub use api::{router, serve, ApiError, ServerError};
pub use context::{Credentials, ServiceContext};

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::build_router;
pub use server::{serve, ServerHandle};

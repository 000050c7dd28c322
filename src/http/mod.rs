//! HTTP API.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (router, middleware stack)
//!     → extract.rs (JSON body regardless of content type)
//!     → handlers/ (keys: blocking pool; tx: async node calls)
//!     → error.rs (ErrorClass → status, {"error": ...})
//! ```

pub mod error;
pub mod extract;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, AppState, HttpServer};

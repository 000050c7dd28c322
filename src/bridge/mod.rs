//! Credential bridge.
//!
//! Turns a one-shot password from a request body into the line-oriented input
//! an interactive store expects, for the lifetime of a single request.
//!
//! # Data Flow
//! ```text
//! SecretString ──▶ feeder thread ──▶ PipeWriter ══(bounded)══▶ PipeReader ──▶ store opener
//! ```
//!
//! # Design Decisions
//! - The channel holds one chunk; the feeder stops on a zero-byte or failed write
//! - `close` drops the reader before joining, so the feeder can never block it
//! - Password bytes live in `Zeroizing` buffers on both sides of the pipe

pub mod handle;
pub mod pipe;

pub use handle::CredentialHandle;
pub use pipe::{pipe, PipeReader, PipeWriter};

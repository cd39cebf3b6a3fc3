//! regscope-client — HTTP transport for the regscope core.
//!
//! [`HttpBackend`] implements the core's [`regscope_core::SearchBackend`] and
//! [`regscope_core::MetadataProvider`] seams over `reqwest`, plus the
//! word-count endpoints that sit outside the search flow. Cancellation works
//! by dropping: when the controller abandons a request future, the
//! underlying transfer is aborted.
//!
//! # Modules
//!
//! - [`config`] — base URL, optional timeout, user agent
//! - [`error`] — typed transport/status/decode errors
//! - [`http`] — the backend client itself

pub mod config;
pub mod error;
pub mod http;

pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::ClientError;
pub use http::{AgencyWordCount, HttpBackend, WordCountBreakdown};

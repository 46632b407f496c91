//! # DLENS Common Library
//!
//! Shared code for the DLENS services including:
//! - Backend REST contract types (thread envelopes, overview lists,
//!   annotation payloads)
//! - Request/error taxonomy shared by all HTTP clients and handlers
//! - Configuration resolution
//! - SSE utilities

pub mod config;
pub mod error;
pub mod sse;
pub mod types;

pub use error::{Error, RequestError, Result};

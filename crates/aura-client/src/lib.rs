//! Aura Generation Client
//!
//! Capability boundary to the external generative service.
//!
//! # Core Concepts
//!
//! - [`GenerationClient`]: one request in, zero-or-one payload out
//! - [`CallFailure`]: why a single call produced nothing (never fatal to a batch)
//! - [`ClientError`]: why no call can be issued at all
//! - [`GeminiClient`]: REST adapter for `generateContent`
//!
//! # Example
//!
//! ```rust,ignore
//! use aura_client::{GeminiClient, GeminiConfig, GenerationClient};
//!
//! let client = GeminiClient::new(GeminiConfig::default().with_api_key(key))?;
//! client.ensure_ready()?;
//! let payload = client.invoke(&request).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod client;
mod error;
pub mod gemini;

pub use client::{GeneratedPayload, GenerationClient};
pub use error::{CallFailure, ClientError};
pub use gemini::{GeminiClient, GeminiConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

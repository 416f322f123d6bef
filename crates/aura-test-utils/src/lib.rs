//! Testing utilities for the Aura workspace
//!
//! Shared fixtures and a scripted [`GenerationClient`].

#![allow(missing_docs)]

pub mod fixtures;
mod scripted;

pub use scripted::{CallRecord, ScriptedClient};

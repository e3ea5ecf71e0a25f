//! # `pollen-core`
//!
//! Provider-agnostic building blocks shared by every crate in the *pollen*
//! workspace:
//!
//! * [`generic`] – chat messages, roles, responses and stream events,
//! * [`model`] – the open model-name type handed to back-ends,
//! * [`provider`] – the traits a back-end implements,
//! * [`client`] – a cheap-to-clone handle around a single back-end,
//! * [`error`] – the unified error type.
//!
//! Back-end crates (e.g. `pollen-openai-compatible`) depend on this crate and
//! convert their own errors into [`error::PollenError`].
pub mod client;
pub mod error;
pub mod generic;
pub mod model;
pub mod provider;
pub mod schema_util;

pub use client::PollenClient;

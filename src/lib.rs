//! `license-expr`: a compiler and reasoning engine for SPDX-style license expressions.
//!
//! # Flow
//! 1. Parse explicit expressions ([`license::parser`]) or resolve free-text
//!    mentions from build metadata ([`sources`], [`license::normalizer`]).
//! 2. Rewrite version ranges into concrete versions ([`license::equivalence`]).
//! 3. Evaluate against a three-valued policy ([`license::compatibility`]).
//!
//! [`Engine`] wires these together from a [`config::Config`].

pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod license;
pub mod models;
pub mod sources;

pub use engine::Engine;
pub use error::{Error, Result};
pub use license::{parse, LicenseExpression};

//! Report renderers for checked licenses.
//!
//! - [`terminal`]: colored, tabular output with summary box; respects `--verbose` / `--quiet`.
//!
//! JSON output is the serialized row list and needs no renderer.

pub mod terminal;

//! gantry-core — shared types for gantry.
//!
//! Holds the pieces every other crate needs: the `name:version` image key,
//! the `gantry.toml` configuration parser, and the render traits that give
//! each entity both a human (CLI) and a machine (wire) representation.

pub mod config;
pub mod key;
pub mod render;

pub use config::GantryConfig;
pub use key::{ImageKey, KeyError};
pub use render::{CliRender, RenderError, RenderResult, WireRender};

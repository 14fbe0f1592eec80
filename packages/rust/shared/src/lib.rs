//! Shared types, error model, and configuration for profilegen.
//!
//! This crate is the foundation depended on by all other profilegen crates.
//! It provides:
//! - [`ProfilegenError`] — the unified error type
//! - Domain types ([`AssembledContext`], [`SearchEntry`], [`Provenance`],
//!   [`RoleCategory`], [`ReferenceTier`], [`ContextId`])
//! - Configuration ([`AppConfig`], config loading)
//! - Text budgeting passes ([`text`])

pub mod config;
pub mod error;
pub mod text;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BudgetsConfig, PathsConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{ProfilegenError, Result};
pub use types::{
    AssembledContext, ContextId, HierarchyBreakdown, Provenance, ReferenceTier, RoleCategory,
    SearchEntry,
};

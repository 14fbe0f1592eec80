//! Role classification and reference-document compression.
//!
//! `classify` maps a (role title, department) pair onto the closed
//! [`RoleCategory`](profilegen_shared::RoleCategory) set via ordered
//! keyword rules; `compress` renders the static reference document at the
//! size tier a category is budgeted for.

mod compressor;
mod rules;

pub use compressor::compress;
pub use rules::classify;

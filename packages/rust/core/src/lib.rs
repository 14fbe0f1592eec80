//! Core orchestration for profilegen.
//!
//! Ties the organization index, metric resolver, role classifier, and
//! reference compressor into the [`ContextAssembler`], and owns the
//! shared-index lifecycle through [`IndexHandle`].

pub mod assembler;
pub mod handle;

pub use assembler::ContextAssembler;
pub use handle::IndexHandle;

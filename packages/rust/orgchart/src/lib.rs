//! Organization chart indexing and path resolution.
//!
//! Parses the raw hierarchical org-chart document once and builds an
//! immutable index: an exact path index plus a name→paths multimap that
//! keeps every unit reachable when short names collide. On top of the
//! index sit the path resolver operations: highlighted-structure trees
//! and six-level position-path extraction.

pub mod document;
pub mod index;
pub mod resolver;

pub use document::{OrgChartDocument, OrgChartNode, load_document, parse_document};
pub use index::{BusinessUnit, OrganizationIndex, SEPARATOR};
pub use resolver::{
    HighlightedUnit, PositionPath, extract_position_path, structure_with_target,
};

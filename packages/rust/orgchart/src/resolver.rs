//! Path resolution over the built index: highlighted-structure trees and
//! six-level position paths.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use profilegen_shared::HierarchyBreakdown;

use crate::index::{BusinessUnit, OrganizationIndex, SEPARATOR};

// ---------------------------------------------------------------------------
// Highlighted structure
// ---------------------------------------------------------------------------

/// A node of the highlighted tree handed to the visualization collaborator.
/// Same shape as the input document plus the two annotation flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightedUnit {
    /// Short unit name.
    pub name: String,
    /// Full unit path.
    pub path: String,
    /// Role titles attached to the unit.
    pub positions: Vec<String>,
    /// Optional headcount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headcount: Option<u32>,
    /// True for every ancestor of the target (target excluded).
    pub is_ancestor_of_target: bool,
    /// True for the target node only.
    pub is_exact_target: bool,
    /// Nested children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HighlightedUnit>,
}

/// Rebuild the full tree with the target and its direct ancestors marked.
///
/// A node is an ancestor iff the target path starts with the node's path
/// followed by the separator; only the target itself gets `is_exact_target`.
/// Siblings and unrelated descendants stay unmarked. O(total nodes).
#[instrument(skip(index))]
pub fn structure_with_target(
    index: &OrganizationIndex,
    target_path: &str,
) -> Vec<HighlightedUnit> {
    let target = target_path.trim();
    index
        .roots()
        .iter()
        .map(|unit| highlight_unit(unit, target))
        .collect()
}

fn highlight_unit(unit: &Arc<BusinessUnit>, target: &str) -> HighlightedUnit {
    let is_exact_target = unit.path == target;
    let is_ancestor_of_target =
        !is_exact_target && target.starts_with(&format!("{}{SEPARATOR}", unit.path));

    HighlightedUnit {
        name: unit.name.clone(),
        path: unit.path.clone(),
        positions: unit.positions.clone(),
        headcount: unit.headcount,
        is_ancestor_of_target,
        is_exact_target,
        children: unit
            .children
            .iter()
            .map(|child| highlight_unit(child, target))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Position paths
// ---------------------------------------------------------------------------

/// A resolved position path: the joined full path, its named levels, and
/// whether the role was structurally located in the subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionPath {
    /// Full path down to the unit owning the role (or the department's own
    /// path when the role was not located).
    pub full_path: String,
    /// The path split into up to six named hierarchy levels.
    pub hierarchy: HierarchyBreakdown,
    /// Whether the role title was found in the resolved subtree.
    pub located: bool,
}

/// Resolve `(department, role)` to a full position path.
///
/// The department may be a short name or an already-qualified path. The
/// resolved unit and its descendants are searched in breadth order for the
/// first unit listing the role; the owning unit's ancestor chain becomes
/// the path. Absent data degrades to a shorter path — this function never
/// fails:
/// - role not listed anywhere in the subtree → the department's own path;
/// - department not resolvable at all → the input split at separators.
#[instrument(skip(index))]
pub fn extract_position_path(
    index: &OrganizationIndex,
    department: &str,
    role: &str,
) -> PositionPath {
    let Some(unit) = index.find_department(department) else {
        debug!(department, "department not in index, degrading to input path");
        let chain: Vec<String> = department
            .split(SEPARATOR)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        return PositionPath {
            full_path: chain.join(SEPARATOR),
            hierarchy: HierarchyBreakdown::from_chain(&chain),
            located: false,
        };
    };

    // Breadth-first over the unit and its descendants: the shallowest unit
    // listing the role owns the position.
    let mut queue: VecDeque<&Arc<BusinessUnit>> = VecDeque::new();
    queue.push_back(unit);
    while let Some(current) = queue.pop_front() {
        if current.has_position(role) {
            debug!(owner = %current.path, "role located");
            return PositionPath {
                full_path: current.path.clone(),
                hierarchy: HierarchyBreakdown::from_chain(&current.full_path),
                located: true,
            };
        }
        queue.extend(current.children.iter());
    }

    debug!(department = %unit.path, role, "role not located in subtree");
    PositionPath {
        full_path: unit.path.clone(),
        hierarchy: HierarchyBreakdown::from_chain(&unit.full_path),
        located: false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

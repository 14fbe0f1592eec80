//! Hierarchical organization index.
//!
//! Built once from the raw document, then shared immutably. Two indices
//! cover the duplicate-name problem: `path_index` keys every unit by its
//! unique full path, and `name_index` maps each short name to all paths
//! sharing it, so no unit is lost when hundreds of units reuse the same
//! short name.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use profilegen_shared::{ProfilegenError, Result, SearchEntry};

use crate::document::{OrgChartDocument, OrgChartNode};

/// Separator joining ancestor names into a full path string.
///
/// A department argument containing this separator is treated as an
/// already-qualified path.
pub const SEPARATOR: &str = " / ";

/// Hard cap on nesting depth; the named hierarchy has six levels and real
/// charts never approach this.
const MAX_DEPTH: usize = 12;

// ---------------------------------------------------------------------------
// BusinessUnit
// ---------------------------------------------------------------------------

/// One node of the built organization tree. Immutable after build; shared
/// via `Arc` between the tree and the path index.
#[derive(Debug)]
pub struct BusinessUnit {
    /// Short unit name (not unique across the chart).
    pub name: String,
    /// Ancestor names including self, root label excluded.
    pub full_path: Vec<String>,
    /// `full_path` joined with [`SEPARATOR`] — the unique key.
    pub path: String,
    /// Depth: `full_path.len()`.
    pub level: usize,
    /// Optional numeric identifier from the source system.
    pub unit_id: Option<u64>,
    /// Role titles in document order.
    pub positions: Vec<String>,
    /// Optional headcount.
    pub headcount: Option<u32>,
    /// Child units in document order.
    pub children: Vec<Arc<BusinessUnit>>,
}

impl BusinessUnit {
    /// Names of the unit's ancestors, immediate parent first.
    pub fn ancestor_names(&self) -> impl Iterator<Item = &str> {
        self.full_path[..self.full_path.len() - 1]
            .iter()
            .rev()
            .map(String::as_str)
    }

    /// Whether the unit's `positions` list contains `role`
    /// (case-insensitive, trimmed).
    pub fn has_position(&self, role: &str) -> bool {
        let wanted = role.trim();
        self.positions
            .iter()
            .any(|p| p.trim().eq_ignore_ascii_case(wanted))
    }
}

// ---------------------------------------------------------------------------
// OrganizationIndex
// ---------------------------------------------------------------------------

/// The built organization index: tree roots plus the two lookup indices.
#[derive(Debug)]
pub struct OrganizationIndex {
    /// Root label from the source document.
    pub title: String,
    /// Top-level blocks in document order.
    roots: Vec<Arc<BusinessUnit>>,
    /// Full path → unit. Keys are unique by construction.
    path_index: HashMap<String, Arc<BusinessUnit>>,
    /// Short name → every full path sharing that name. A back-reference
    /// registry, never an ownership relation.
    name_index: HashMap<String, Vec<String>>,
    /// Distinct short names in first-seen document order. Fuzzy lookup
    /// iterates this list, not the hash map, so first-match is stable
    /// across runs.
    name_order: Vec<String>,
    /// Canonical short-name table: alias → full path. Consulted before
    /// any fuzzy matching.
    aliases: BTreeMap<String, String>,
}

impl OrganizationIndex {
    /// Build the index from a parsed document.
    ///
    /// Walks the document depth-first, accumulating the path string and
    /// inserting every unit into both indices. Idempotent: rebuilding from
    /// the same input yields identical indices. Fails closed on duplicate
    /// paths, empty names, or depth overflow.
    #[instrument(skip_all, fields(title = %doc.title, top_level = doc.units.len()))]
    pub fn build(doc: &OrgChartDocument, aliases: BTreeMap<String, String>) -> Result<Self> {
        let mut index = Self {
            title: doc.title.clone(),
            roots: Vec::with_capacity(doc.units.len()),
            path_index: HashMap::new(),
            name_index: HashMap::new(),
            name_order: Vec::new(),
            aliases,
        };

        for node in &doc.units {
            let unit = index.build_unit(node, &[])?;
            index.roots.push(unit);
        }

        info!(
            units = index.path_index.len(),
            names = index.name_order.len(),
            "organization index built"
        );

        Ok(index)
    }

    /// Recursively build one unit and register it in both indices.
    /// Depth is bounded by [`MAX_DEPTH`], so recursion cannot run away on
    /// a malformed document.
    fn build_unit(
        &mut self,
        node: &OrgChartNode,
        ancestors: &[String],
    ) -> Result<Arc<BusinessUnit>> {
        let name = node.name.trim();
        if name.is_empty() {
            return Err(ProfilegenError::parse(format!(
                "unit with empty name under '{}'",
                ancestors.join(SEPARATOR)
            )));
        }

        let mut full_path = ancestors.to_vec();
        full_path.push(name.to_string());

        if full_path.len() > MAX_DEPTH {
            return Err(ProfilegenError::validation(format!(
                "unit nesting exceeds {MAX_DEPTH} levels at '{}'",
                full_path.join(SEPARATOR)
            )));
        }

        let path = full_path.join(SEPARATOR);

        let mut children = Vec::with_capacity(node.units.len());
        for child in &node.units {
            children.push(self.build_unit(child, &full_path)?);
        }

        let unit = Arc::new(BusinessUnit {
            name: name.to_string(),
            level: full_path.len(),
            path: path.clone(),
            full_path,
            unit_id: node.id,
            positions: node.positions.clone(),
            headcount: node.headcount,
            children,
        });

        if self.path_index.insert(path.clone(), Arc::clone(&unit)).is_some() {
            return Err(ProfilegenError::validation(format!(
                "duplicate unit path: '{path}'"
            )));
        }

        match self.name_index.entry(unit.name.clone()) {
            std::collections::hash_map::Entry::Occupied(mut e) => {
                e.get_mut().push(path);
            }
            std::collections::hash_map::Entry::Vacant(e) => {
                self.name_order.push(unit.name.clone());
                e.insert(vec![path]);
            }
        }

        Ok(unit)
    }

    // -- Lookups ------------------------------------------------------------

    /// Exact O(1) lookup by full path.
    pub fn find_unit_by_path(&self, path: &str) -> Option<&Arc<BusinessUnit>> {
        self.path_index.get(path.trim())
    }

    /// Resolve a department given as either a full path or a short name.
    ///
    /// Resolution order: full-path lookup when the input carries the
    /// separator; the canonical alias table; an exact short-name hit; then
    /// substring-contains matching (in either direction, case-insensitive)
    /// against short names in first-seen document order. The fuzzy stage is
    /// deterministic first-match, not best-match: when several units share
    /// or overlap a name, the first registered path wins. Pin an alias in
    /// the config to override it.
    pub fn find_department(&self, department: &str) -> Option<&Arc<BusinessUnit>> {
        let wanted = department.trim();
        if wanted.is_empty() {
            return None;
        }

        if wanted.contains(SEPARATOR) {
            return self.find_unit_by_path(wanted);
        }

        if let Some(target) = self.aliases.get(wanted) {
            if let Some(unit) = self.find_unit_by_path(target) {
                debug!(alias = wanted, path = %unit.path, "alias hit");
                return Some(unit);
            }
        }

        if let Some(paths) = self.name_index.get(wanted) {
            return self.first_path_unit(paths);
        }

        let wanted_lc = wanted.to_lowercase();
        for name in &self.name_order {
            let name_lc = name.to_lowercase();
            if name_lc.contains(&wanted_lc) || wanted_lc.contains(&name_lc) {
                debug!(query = wanted, matched = %name, "fuzzy name match");
                return self.first_path_unit(&self.name_index[name]);
            }
        }

        None
    }

    /// First registered path for a (possibly ambiguous) name.
    fn first_path_unit(&self, paths: &[String]) -> Option<&Arc<BusinessUnit>> {
        paths.first().and_then(|p| self.path_index.get(p))
    }

    // -- Collaborator views -------------------------------------------------

    /// Top-level blocks in document order.
    pub fn roots(&self) -> &[Arc<BusinessUnit>] {
        &self.roots
    }

    /// Flat unit listing for the search/autocomplete collaborator,
    /// sorted by level then name.
    pub fn search_entries(&self) -> Vec<SearchEntry> {
        let mut entries: Vec<SearchEntry> = self
            .path_index
            .values()
            .map(|unit| SearchEntry {
                display_name: unit.name.clone(),
                full_path: unit.path.clone(),
                positions_count: unit.positions.len(),
                level: unit.level,
                positions: unit.positions.clone(),
            })
            .collect();

        entries.sort_by(|a, b| {
            a.level
                .cmp(&b.level)
                .then_with(|| a.display_name.cmp(&b.display_name))
                .then_with(|| a.full_path.cmp(&b.full_path))
        });

        entries
    }

    /// All full paths registered for a short name, in document order.
    pub fn paths_for_name(&self, name: &str) -> &[String] {
        self.name_index
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of indexed units.
    pub fn unit_count(&self) -> usize {
        self.path_index.len()
    }

    /// Total number of role titles across all units.
    pub fn position_count(&self) -> usize {
        self.path_index
            .values()
            .map(|unit| unit.positions.len())
            .sum()
    }

    /// Iterate every indexed unit (arbitrary order).
    pub fn units(&self) -> impl Iterator<Item = &Arc<BusinessUnit>> {
        self.path_index.values()
    }

    /// Check the cross-index invariants: every name-index path resolves in
    /// the path index, every path-index unit is reachable through its name,
    /// and the flattened name index covers the path index exactly.
    pub fn verify_invariants(&self) -> Result<()> {
        let flattened: usize = self.name_index.values().map(Vec::len).sum();
        if flattened != self.path_index.len() {
            return Err(ProfilegenError::validation(format!(
                "index mismatch: {} paths vs {} name references",
                self.path_index.len(),
                flattened
            )));
        }

        for (name, paths) in &self.name_index {
            for path in paths {
                match self.path_index.get(path) {
                    Some(unit) if unit.name == *name => {}
                    Some(unit) => {
                        return Err(ProfilegenError::validation(format!(
                            "name index points '{name}' at unit named '{}'",
                            unit.name
                        )));
                    }
                    None => {
                        return Err(ProfilegenError::validation(format!(
                            "name index references unknown path '{path}'"
                        )));
                    }
                }
            }
        }

        for unit in self.path_index.values() {
            if !self
                .name_index
                .get(&unit.name)
                .is_some_and(|paths| paths.contains(&unit.path))
            {
                return Err(ProfilegenError::validation(format!(
                    "unit '{}' missing from name index",
                    unit.path
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

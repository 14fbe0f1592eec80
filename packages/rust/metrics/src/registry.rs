//! Metric-document registry.
//!
//! Maps department-name patterns to metric-document identifiers and
//! identifiers to generated filenames. Patterns live in an explicit
//! ordered list, not a hash map, so first-match resolution is stable
//! across runs. Read-only after construction.

use std::collections::HashMap;

/// Built-in pattern table: (department pattern, document id), in priority
/// order. Extended from config before the registry freezes.
const DEFAULT_PATTERNS: &[(&str, &str)] = &[
    ("it department", "metrics-it"),
    ("information technology", "metrics-it"),
    ("infrastructure", "metrics-it"),
    ("software development", "metrics-it"),
    ("accounting", "metrics-accounting"),
    ("finance", "metrics-finance"),
    ("treasury", "metrics-finance"),
    ("audit", "metrics-audit"),
    ("sales", "metrics-sales"),
    ("commercial", "metrics-sales"),
    ("marketing", "metrics-marketing"),
    ("human resources", "metrics-hr"),
    ("recruiting", "metrics-hr"),
    ("personnel", "metrics-hr"),
    ("legal", "metrics-legal"),
    ("procurement", "metrics-procurement"),
    ("logistics", "metrics-logistics"),
    ("security", "metrics-security"),
    ("operations", "metrics-operations"),
];

/// Normalize a department name for registry matching: lowercase, trimmed,
/// inner whitespace collapsed.
pub fn normalize_department(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The frozen pattern registry.
#[derive(Debug)]
pub struct MetricRegistry {
    /// Ordered (pattern, doc id) pairs; patterns are pre-normalized.
    patterns: Vec<(String, String)>,
    /// Document id → filename.
    filenames: HashMap<String, String>,
}

impl MetricRegistry {
    /// Registry with the built-in table only.
    pub fn with_defaults() -> Self {
        let mut registry = Self {
            patterns: Vec::with_capacity(DEFAULT_PATTERNS.len()),
            filenames: HashMap::new(),
        };
        for (pattern, doc_id) in DEFAULT_PATTERNS {
            registry.register(pattern, doc_id, None);
        }
        registry
    }

    /// Empty registry, for tests and fully config-driven setups.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            filenames: HashMap::new(),
        }
    }

    /// Register a pattern. Later registrations rank after earlier ones;
    /// the filename defaults to `<doc_id>.md`.
    pub fn register(&mut self, pattern: &str, doc_id: &str, filename: Option<&str>) {
        self.patterns
            .push((normalize_department(pattern), doc_id.to_string()));
        self.filenames
            .entry(doc_id.to_string())
            .or_insert_with(|| {
                filename
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{doc_id}.md"))
            });
    }

    /// Candidate document ids for a department, best first: exact pattern
    /// hits, then substring-contains in either direction, all in
    /// registration order. Duplicates are removed preserving order.
    pub fn candidates(&self, department: &str) -> Vec<&str> {
        let wanted = normalize_department(department);
        if wanted.is_empty() {
            return Vec::new();
        }

        let mut out: Vec<&str> = Vec::new();

        for (pattern, doc_id) in &self.patterns {
            if *pattern == wanted && !out.contains(&doc_id.as_str()) {
                out.push(doc_id);
            }
        }
        for (pattern, doc_id) in &self.patterns {
            if (pattern.contains(&wanted) || wanted.contains(pattern.as_str()))
                && !out.contains(&doc_id.as_str())
            {
                out.push(doc_id);
            }
        }

        out
    }

    /// Filename registered for a document id.
    pub fn filename(&self, doc_id: &str) -> Option<&str> {
        self.filenames.get(doc_id).map(String::as_str)
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the registry has no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_department("  IT   Department "), "it department");
        assert_eq!(normalize_department("Sales"), "sales");
    }

    #[test]
    fn exact_match_ranks_before_substring() {
        let registry = MetricRegistry::with_defaults();
        let candidates = registry.candidates("IT Department");
        assert_eq!(candidates.first(), Some(&"metrics-it"));
    }

    #[test]
    fn substring_matches_both_directions() {
        let registry = MetricRegistry::with_defaults();
        // Pattern contained in the department name.
        assert_eq!(
            registry.candidates("Regional Sales Department").first(),
            Some(&"metrics-sales")
        );
        // Department name contained in a pattern.
        assert_eq!(
            registry.candidates("recruiting").first(),
            Some(&"metrics-hr")
        );
    }

    #[test]
    fn unknown_department_has_no_candidates() {
        let registry = MetricRegistry::with_defaults();
        assert!(registry.candidates("Quantum Research Lab").is_empty());
        assert!(registry.candidates("").is_empty());
    }

    #[test]
    fn registration_order_is_match_order() {
        let mut registry = MetricRegistry::empty();
        registry.register("Development", "doc-a", None);
        registry.register("Development Department", "doc-b", None);
        // Both patterns overlap the query; the exact hit outranks the
        // substring hit despite registration order.
        let candidates = registry.candidates("Development Department");
        assert_eq!(candidates, vec!["doc-b", "doc-a"]);
    }

    #[test]
    fn filename_defaults_to_doc_id() {
        let mut registry = MetricRegistry::empty();
        registry.register("x", "doc-x", None);
        registry.register("y", "doc-y", Some("custom_y.md"));
        assert_eq!(registry.filename("doc-x"), Some("doc-x.md"));
        assert_eq!(registry.filename("doc-y"), Some("custom_y.md"));
        assert_eq!(registry.filename("doc-z"), None);
    }
}

//! Core domain types for assembled generation context.
//!
//! Field names and serialized forms here are a stable contract: the
//! downstream generation-prompt builder substitutes them into a fixed
//! instruction, so renames are breaking changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ContextId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for assembled-context identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(pub Uuid);

impl ContextId {
    /// Generate a new time-sortable context identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ContextId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// Which resolution tier produced a metric document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// A document registered for the department itself.
    Specific,
    /// A document inherited from an ancestor unit.
    Inherited,
    /// A static category template.
    Template,
    /// The minimal generic document of last resort.
    Fallback,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Specific => "specific",
            Self::Inherited => "inherited",
            Self::Template => "template",
            Self::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// RoleCategory
// ---------------------------------------------------------------------------

/// Closed set of role classification buckets.
///
/// The category selects the reference-document size tier and tells the
/// downstream prompt builder whether a specialized document is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCategory {
    /// Hands-on engineering and technology roles.
    Technical,
    /// Managers of technical units (department-level fallback match).
    TechnicalManagement,
    /// General management and leadership.
    Management,
    /// Finance, accounting, audit.
    Finance,
    /// Sales and account management.
    Sales,
    /// HR and recruiting.
    HumanResources,
    /// Administrative and support roles.
    Support,
    /// Generic business roles (default bucket).
    Business,
}

impl RoleCategory {
    /// The reference-document size tier this category is budgeted for.
    pub fn reference_tier(self) -> ReferenceTier {
        match self {
            Self::Technical | Self::TechnicalManagement => ReferenceTier::Full,
            Self::Management | Self::Business => ReferenceTier::CompressedSummary,
            Self::Finance | Self::Sales | Self::HumanResources => ReferenceTier::DomainFiltered,
            Self::Support => ReferenceTier::MinimalOverview,
        }
    }
}

impl std::fmt::Display for RoleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Technical => "technical",
            Self::TechnicalManagement => "technical_management",
            Self::Management => "management",
            Self::Finance => "finance",
            Self::Sales => "sales",
            Self::HumanResources => "human_resources",
            Self::Support => "support",
            Self::Business => "business",
        };
        f.write_str(s)
    }
}

/// Content-size tiers for the compressed reference document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceTier {
    /// The whole document, bounded only by its ceiling.
    Full,
    /// Headings plus the first paragraph of each section.
    CompressedSummary,
    /// Sections matching the category's domain keywords.
    DomainFiltered,
    /// Title, intro, and top-level outline.
    MinimalOverview,
}

impl std::fmt::Display for ReferenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Full => "full",
            Self::CompressedSummary => "compressed_summary",
            Self::DomainFiltered => "domain_filtered",
            Self::MinimalOverview => "minimal_overview",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// HierarchyBreakdown
// ---------------------------------------------------------------------------

/// The up-to-six named hierarchy levels of a resolved position path.
///
/// Levels the path does not reach are empty strings; units deeper than six
/// levels fold into `final_group`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyBreakdown {
    #[serde(default)]
    pub block: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub subsection: String,
    #[serde(default)]
    pub final_group: String,
}

impl HierarchyBreakdown {
    /// Build a breakdown from an ancestor chain (root block first).
    pub fn from_chain(chain: &[String]) -> Self {
        let mut levels = chain.iter();
        let mut breakdown = Self {
            block: levels.next().cloned().unwrap_or_default(),
            department: levels.next().cloned().unwrap_or_default(),
            section: levels.next().cloned().unwrap_or_default(),
            group: levels.next().cloned().unwrap_or_default(),
            subsection: levels.next().cloned().unwrap_or_default(),
            final_group: levels.next().cloned().unwrap_or_default(),
        };

        // Anything past six levels collapses into the final group so the
        // breakdown never silently drops a unit name.
        let rest: Vec<&str> = levels.map(String::as_str).collect();
        if !rest.is_empty() {
            let mut parts = vec![breakdown.final_group.clone()];
            parts.extend(rest.iter().map(|s| s.to_string()));
            breakdown.final_group = parts.join(" / ");
        }

        breakdown
    }
}

// ---------------------------------------------------------------------------
// AssembledContext
// ---------------------------------------------------------------------------

/// The bounded variable set handed to the downstream generation collaborator.
///
/// Created fresh per `(department, role)` request and never mutated after
/// construction. Every field has a defined fallback value, so assembly never
/// fails on missing inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledContext {
    /// Unique identifier for this assembly request.
    pub context_id: ContextId,
    /// The department as requested (short name or full path).
    pub department: String,
    /// The role title as requested.
    pub role: String,
    /// Resolved full unit path, or the input as-is when unresolvable.
    pub full_path: String,
    /// Bounded textual rendering of the resolved unit and its surroundings.
    pub org_snippet: String,
    /// Resolved metric-document text (never empty).
    pub metric_text: String,
    /// Which tier produced `metric_text`.
    pub metric_provenance: Provenance,
    /// Where the metric text came from (filename, ancestor path, or
    /// template tag) for operator explainability.
    pub metric_source: String,
    /// Classified role category.
    pub role_category: RoleCategory,
    /// Reference document compressed to the category's tier.
    pub reference_text: String,
    /// The tier `reference_text` was compressed to.
    pub reference_tier: ReferenceTier,
    /// Named hierarchy levels of the resolved position path.
    pub hierarchy: HierarchyBreakdown,
    /// Approximate token count of all text fields combined.
    pub estimated_tokens: usize,
    /// Total character count backing the token estimate.
    pub total_chars: usize,
    /// When this context was assembled.
    pub assembled_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// SearchEntry
// ---------------------------------------------------------------------------

/// A flat unit listing for the search/autocomplete collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEntry {
    /// Short unit name for display.
    pub display_name: String,
    /// Full path (unique key).
    pub full_path: String,
    /// Number of role titles attached to the unit.
    pub positions_count: usize,
    /// Depth of the unit (path length).
    pub level: usize,
    /// Role titles attached to the unit.
    pub positions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_id_roundtrip() {
        let id = ContextId::new();
        let s = id.to_string();
        let parsed: ContextId = s.parse().expect("parse ContextId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn provenance_serializes_lowercase() {
        let json = serde_json::to_string(&Provenance::Inherited).expect("serialize");
        assert_eq!(json, "\"inherited\"");
        let parsed: Provenance = serde_json::from_str("\"fallback\"").expect("deserialize");
        assert_eq!(parsed, Provenance::Fallback);
    }

    #[test]
    fn role_category_tier_mapping() {
        assert_eq!(RoleCategory::Technical.reference_tier(), ReferenceTier::Full);
        assert_eq!(
            RoleCategory::Support.reference_tier(),
            ReferenceTier::MinimalOverview
        );
        assert_eq!(
            RoleCategory::Finance.reference_tier(),
            ReferenceTier::DomainFiltered
        );
    }

    #[test]
    fn hierarchy_from_short_chain() {
        let chain = vec!["Operations Block".to_string(), "IT Department".to_string()];
        let h = HierarchyBreakdown::from_chain(&chain);
        assert_eq!(h.block, "Operations Block");
        assert_eq!(h.department, "IT Department");
        assert!(h.section.is_empty());
        assert!(h.final_group.is_empty());
    }

    #[test]
    fn hierarchy_folds_overflow_into_final_group() {
        let chain: Vec<String> = (1..=8).map(|i| format!("Level {i}")).collect();
        let h = HierarchyBreakdown::from_chain(&chain);
        assert_eq!(h.block, "Level 1");
        assert_eq!(h.subsection, "Level 5");
        assert_eq!(h.final_group, "Level 6 / Level 7 / Level 8");
    }

    #[test]
    fn assembled_context_serialization() {
        let ctx = AssembledContext {
            context_id: ContextId::new(),
            department: "IT Department".into(),
            role: "Senior Backend Engineer".into(),
            full_path: "Operations Block / IT Department".into(),
            org_snippet: "IT Department (2 positions)".into(),
            metric_text: "KPIs...".into(),
            metric_provenance: Provenance::Specific,
            metric_source: "metrics-it.md".into(),
            role_category: RoleCategory::Technical,
            reference_text: "# Reference".into(),
            reference_tier: ReferenceTier::Full,
            hierarchy: HierarchyBreakdown::default(),
            estimated_tokens: 10,
            total_chars: 40,
            assembled_at: Utc::now(),
        };

        let json = serde_json::to_string_pretty(&ctx).expect("serialize");
        assert!(json.contains("\"metric_provenance\": \"specific\""));
        assert!(json.contains("\"role_category\": \"technical\""));
        let parsed: AssembledContext = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.department, "IT Department");
        assert_eq!(parsed.estimated_tokens, 10);
    }
}

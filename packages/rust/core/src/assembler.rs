//! Context assembly orchestration.
//!
//! Combines the organization index, metric resolver, role classifier, and
//! reference compressor into one bounded [`AssembledContext`] per
//! `(department, role)` request. Assembly never fails: every field has a
//! defined fallback, and missing inputs degrade to sentinels instead of
//! errors.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use profilegen_classify::{classify, compress};
use profilegen_metrics::{MetricDocumentResolver, MetricRegistry};
use profilegen_orgchart::{
    BusinessUnit, HighlightedUnit, extract_position_path, structure_with_target,
};
use profilegen_shared::text::estimate_tokens;
use profilegen_shared::{
    AppConfig, AssembledContext, BudgetsConfig, ContextId, Result, SearchEntry,
};

use crate::handle::IndexHandle;

/// Sentinel used when the organization snippet cannot be resolved.
const ORG_NOT_AVAILABLE: &str = "Organization data not available";

/// Sentinel used when the reference document is missing on disk.
const REFERENCE_NOT_AVAILABLE: &str = "Reference document not available.";

/// Cap on positions listed in an org snippet before eliding.
const SNIPPET_MAX_POSITIONS: usize = 30;

/// Cap on child units listed in an org snippet before eliding.
const SNIPPET_MAX_CHILDREN: usize = 20;

// ---------------------------------------------------------------------------
// ContextAssembler
// ---------------------------------------------------------------------------

/// Top-level orchestrator. Construct once, then serve concurrent
/// `assemble` calls; all reads are over immutable shared state.
pub struct ContextAssembler {
    handle: IndexHandle,
    resolver: MetricDocumentResolver,
    reference_path: PathBuf,
    reference: RwLock<Option<Arc<String>>>,
    budgets: BudgetsConfig,
}

impl ContextAssembler {
    /// Assemble the engine from explicit parts.
    ///
    /// The reference document is loaded eagerly; a missing file is
    /// downgraded to a warning because assembly must still answer with
    /// its sentinel.
    pub fn new(
        handle: IndexHandle,
        resolver: MetricDocumentResolver,
        reference_path: impl Into<PathBuf>,
        budgets: BudgetsConfig,
    ) -> Self {
        let reference_path = reference_path.into();
        let reference = RwLock::new(load_reference(&reference_path));
        Self {
            handle,
            resolver,
            reference_path,
            reference,
            budgets,
        }
    }

    /// Build the whole engine from application config: index (fatal on a
    /// malformed org chart), default metric registry, resolver, budgets.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let handle = IndexHandle::load(
            PathBuf::from(&config.paths.org_chart),
            config.aliases.clone(),
        )?;
        let resolver = MetricDocumentResolver::new(
            MetricRegistry::with_defaults(),
            &config.paths.metrics_dir,
            config.budgets.metric_char_ceiling,
        );
        Ok(Self::new(
            handle,
            resolver,
            &config.paths.reference_doc,
            config.budgets.clone(),
        ))
    }

    /// Assemble the bounded context for one `(department, role)` request.
    #[instrument(skip(self))]
    pub fn assemble(&self, department: &str, role: &str) -> AssembledContext {
        let index = self.handle.current();

        let unit = index.find_department(department);
        let position_path = extract_position_path(&index, department, role);

        let org_snippet = match unit {
            Some(unit) => render_org_snippet(unit),
            None => {
                debug!(department, "no unit for org snippet");
                format!("{ORG_NOT_AVAILABLE} for '{}'", department.trim())
            }
        };

        let metric = self.resolver.resolve(&index, department);

        let classify_department = unit.map(|u| u.name.as_str()).unwrap_or(department);
        let role_category = classify(role, classify_department);
        let reference_tier = role_category.reference_tier();

        let reference_text = match self.reference() {
            Some(doc) => compress(&doc, reference_tier, role_category, &self.budgets),
            None => REFERENCE_NOT_AVAILABLE.to_string(),
        };

        let total_chars = org_snippet.chars().count()
            + metric.text.chars().count()
            + reference_text.chars().count();
        let estimated_tokens = estimate_tokens(
            &format!("{org_snippet}{}{reference_text}", metric.text),
            self.budgets.chars_per_token,
        );

        let context = AssembledContext {
            context_id: ContextId::new(),
            department: department.trim().to_string(),
            role: role.trim().to_string(),
            full_path: position_path.full_path,
            org_snippet,
            metric_text: metric.text,
            metric_provenance: metric.provenance,
            metric_source: metric.source,
            role_category,
            reference_text,
            reference_tier,
            hierarchy: position_path.hierarchy,
            estimated_tokens,
            total_chars,
            assembled_at: Utc::now(),
        };

        info!(
            context_id = %context.context_id,
            full_path = %context.full_path,
            category = %context.role_category,
            provenance = %context.metric_provenance,
            tier = %context.reference_tier,
            estimated_tokens = context.estimated_tokens,
            "context assembled"
        );

        context
    }

    /// Flat unit listing, optionally filtered by a case-insensitive query
    /// over display names and paths.
    pub fn search(&self, query: &str) -> Vec<SearchEntry> {
        let entries = self.handle.current().search_entries();
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return entries;
        }
        entries
            .into_iter()
            .filter(|e| {
                e.display_name.to_lowercase().contains(&query)
                    || e.full_path.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Highlighted structure tree for the visualization collaborator.
    pub fn highlighted_tree(&self, target_path: &str) -> Vec<HighlightedUnit> {
        structure_with_target(&self.handle.current(), target_path)
    }

    /// Resolve a metric document without assembling a full context.
    pub fn resolve_metric(&self, department: &str) -> profilegen_metrics::ResolvedMetric {
        self.resolver.resolve(&self.handle.current(), department)
    }

    /// Metric resolution outcome for every department in the index.
    pub fn metric_coverage(&self) -> Vec<(String, profilegen_shared::Provenance)> {
        self.resolver.coverage(&self.handle.current())
    }

    /// The current shared index.
    pub fn index(&self) -> Arc<profilegen_orgchart::OrganizationIndex> {
        self.handle.current()
    }

    /// Rebuild the index from its backing document, drop the metric cache,
    /// and re-read the reference document. Readers keep the previous state
    /// if the rebuild fails.
    #[instrument(skip(self))]
    pub fn reload(&self) -> Result<()> {
        self.handle.reload()?;
        self.resolver.invalidate();
        *self.reference.write().expect("reference lock poisoned") =
            load_reference(&self.reference_path);
        info!("assembler state reloaded");
        Ok(())
    }

    fn reference(&self) -> Option<Arc<String>> {
        self.reference
            .read()
            .expect("reference lock poisoned")
            .clone()
    }
}

/// Load the reference document, downgrading absence to a warning.
fn load_reference(path: &std::path::Path) -> Option<Arc<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) if !content.trim().is_empty() => Some(Arc::new(content)),
        Ok(_) => {
            warn!(path = %path.display(), "reference document is empty");
            None
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "reference document not readable");
            None
        }
    }
}

/// Render a bounded textual snippet of a unit for the generation prompt.
fn render_org_snippet(unit: &BusinessUnit) -> String {
    let mut out = String::new();
    out.push_str(&format!("Unit: {}\n", unit.path));
    out.push_str(&format!("Level: {}\n", unit.level));
    if let Some(headcount) = unit.headcount {
        out.push_str(&format!("Headcount: {headcount}\n"));
    }

    if !unit.positions.is_empty() {
        out.push_str("Positions:\n");
        for position in unit.positions.iter().take(SNIPPET_MAX_POSITIONS) {
            out.push_str(&format!("- {position}\n"));
        }
        if unit.positions.len() > SNIPPET_MAX_POSITIONS {
            out.push_str(&format!(
                "- (and {} more)\n",
                unit.positions.len() - SNIPPET_MAX_POSITIONS
            ));
        }
    }

    if !unit.children.is_empty() {
        out.push_str("Subunits:\n");
        for child in unit.children.iter().take(SNIPPET_MAX_CHILDREN) {
            out.push_str(&format!(
                "- {} ({} positions)\n",
                child.name,
                child.positions.len()
            ));
        }
        if unit.children.len() > SNIPPET_MAX_CHILDREN {
            out.push_str(&format!(
                "- (and {} more)\n",
                unit.children.len() - SNIPPET_MAX_CHILDREN
            ));
        }
    }

    out.trim_end().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use super::*;
    use profilegen_shared::{Provenance, ReferenceTier, RoleCategory};

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "pg-assembler-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const ORG_DOC: &str = r#"{
        "title": "Example Corp",
        "units": [
            {
                "name": "Operations Block",
                "positions": ["Block Director"],
                "units": [
                    {
                        "name": "IT Department",
                        "positions": ["Senior Backend Engineer", "Executive Assistant"],
                        "headcount": 12,
                        "units": [
                            {
                                "name": "Infrastructure Section",
                                "positions": ["DevOps Engineer"],
                                "units": []
                            }
                        ]
                    }
                ]
            }
        ]
    }"#;

    const REFERENCE_DOC: &str = "\
# Competency Handbook

Expectations for every role family.

## Engineering Standards

Code review and deployment discipline.

Deep technical detail for engineering roles.

## Financial Controls

Budget and audit expectations.

## Workplace Conduct

Conduct expectations for all staff.
";

    fn make_assembler(dir: &std::path::Path) -> ContextAssembler {
        std::fs::write(dir.join("orgchart.json"), ORG_DOC).unwrap();
        std::fs::write(dir.join("reference.md"), REFERENCE_DOC).unwrap();
        std::fs::create_dir_all(dir.join("metrics")).unwrap();
        std::fs::write(
            dir.join("metrics/metrics-it.md"),
            "# IT KPIs\n\nUptime and delivery targets.\n",
        )
        .unwrap();

        let handle =
            IndexHandle::load(dir.join("orgchart.json"), BTreeMap::new()).expect("load");
        let mut registry = MetricRegistry::empty();
        registry.register("IT Department", "metrics-it", None);
        let resolver =
            MetricDocumentResolver::new(registry, dir.join("metrics"), 12_000);

        ContextAssembler::new(
            handle,
            resolver,
            dir.join("reference.md"),
            BudgetsConfig::default(),
        )
    }

    #[test]
    fn technical_role_gets_full_reference() {
        let dir = temp_dir();
        let assembler = make_assembler(&dir);

        let ctx = assembler.assemble("IT Department", "Senior Backend Engineer");

        assert_eq!(ctx.role_category, RoleCategory::Technical);
        assert_eq!(ctx.reference_tier, ReferenceTier::Full);
        // Full tier keeps deep section bodies.
        assert!(ctx.reference_text.contains("Deep technical detail"));
        assert_eq!(ctx.metric_provenance, Provenance::Specific);
        assert!(ctx.metric_text.contains("Uptime and delivery targets."));
        assert_eq!(ctx.full_path, "Operations Block / IT Department");
        assert_eq!(ctx.hierarchy.block, "Operations Block");
        assert_eq!(ctx.hierarchy.department, "IT Department");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn support_role_gets_minimal_reference() {
        let dir = temp_dir();
        let assembler = make_assembler(&dir);

        let ctx = assembler.assemble("IT Department", "Executive Assistant");

        assert_eq!(ctx.role_category, RoleCategory::Support);
        assert_eq!(ctx.reference_tier, ReferenceTier::MinimalOverview);
        assert!(ctx.reference_text.chars().count() < 5_000);
        assert!(!ctx.reference_text.contains("Deep technical detail"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn assemble_never_fails_on_unknown_inputs() {
        let dir = temp_dir();
        let assembler = make_assembler(&dir);

        let ctx = assembler.assemble("Ghost Department", "Imaginary Role");

        assert!(ctx.org_snippet.contains("not available"));
        assert!(!ctx.metric_text.is_empty());
        assert_eq!(ctx.full_path, "Ghost Department");
        assert!(ctx.estimated_tokens > 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn token_estimate_tracks_total_chars() {
        let dir = temp_dir();
        let assembler = make_assembler(&dir);

        let ctx = assembler.assemble("IT Department", "Senior Backend Engineer");
        assert_eq!(ctx.estimated_tokens, ctx.total_chars / 4);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_reference_document_degrades_to_sentinel() {
        let dir = temp_dir();
        let assembler = make_assembler(&dir);
        std::fs::remove_file(dir.join("reference.md")).unwrap();
        // The already-loaded copy persists until reload drops it.
        assembler.reload().expect("reload");

        let ctx = assembler.assemble("IT Department", "Senior Backend Engineer");
        assert_eq!(ctx.reference_text, "Reference document not available.");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn search_filters_by_name_and_path() {
        let dir = temp_dir();
        let assembler = make_assembler(&dir);

        let all = assembler.search("");
        assert_eq!(all.len(), 3);

        let hits = assembler.search("infrastructure");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].display_name, "Infrastructure Section");

        // Path components match too.
        let hits = assembler.search("operations block");
        assert_eq!(hits.len(), 3);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn highlighted_tree_marks_target() {
        let dir = temp_dir();
        let assembler = make_assembler(&dir);

        let tree = assembler.highlighted_tree("Operations Block / IT Department");
        assert_eq!(tree.len(), 1);
        assert!(tree[0].is_ancestor_of_target);
        let it = &tree[0].children[0];
        assert!(it.is_exact_target);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn reload_picks_up_new_units_and_reference() {
        let dir = temp_dir();
        let assembler = make_assembler(&dir);
        assert_eq!(assembler.search("").len(), 3);

        let grown = ORG_DOC.replace(
            r#""name": "Infrastructure Section","#,
            r#""name": "Platform Section","#,
        );
        std::fs::write(dir.join("orgchart.json"), grown).unwrap();
        assembler.reload().expect("reload");

        assert_eq!(assembler.search("platform").len(), 1);
        assert!(assembler.search("infrastructure").is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }
}

//! Three-tier metric-document resolution.
//!
//! Every department resolves to non-empty text through a deterministic,
//! explainable chain: a registered document for the department itself, a
//! document inherited from the nearest ancestor, a static category
//! template, and finally a minimal generic document. Coverage is total by
//! construction; exhaustion of the registered tiers is recovered, not
//! surfaced.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use profilegen_orgchart::{OrganizationIndex, SEPARATOR};
use profilegen_shared::Provenance;
use profilegen_shared::text::tidy_with_ceiling;

use crate::registry::MetricRegistry;
use crate::templates::{FALLBACK_DOCUMENT, classify_template, template_text};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A resolved metric document with its provenance.
#[derive(Debug, Clone)]
pub struct ResolvedMetric {
    /// Post-processed document text; never empty.
    pub text: String,
    /// Which tier produced the text.
    pub provenance: Provenance,
    /// Filename, `filename (inherited from Ancestor)`, or template tag.
    pub source: String,
}

/// A memoized on-disk document.
#[derive(Debug)]
struct CachedDocument {
    content: String,
    sha256: String,
    loaded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves departments to metric documents with lazy, memoizing file
/// loads. The cache tolerates racing producers: all of them compute the
/// same value for the same key, so an overwrite is idempotent.
#[derive(Debug)]
pub struct MetricDocumentResolver {
    registry: MetricRegistry,
    metrics_dir: PathBuf,
    char_ceiling: usize,
    cache: RwLock<HashMap<String, Arc<CachedDocument>>>,
}

impl MetricDocumentResolver {
    /// Create a resolver over a frozen registry and a document directory.
    pub fn new(registry: MetricRegistry, metrics_dir: impl Into<PathBuf>, char_ceiling: usize) -> Self {
        Self {
            registry,
            metrics_dir: metrics_dir.into(),
            char_ceiling,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a department (short name or full path) to a metric document.
    ///
    /// Tier 1: a document registered for the department itself.
    /// Tier 2: walk ancestors, immediate parent first, repeating tier 1.
    /// Tier 3: static template for the department's keyword category.
    /// Tier 4: the minimal generic fallback (logged as a warning).
    ///
    /// All tiers return post-processed text under the character ceiling.
    #[instrument(skip(self, index))]
    pub fn resolve(&self, index: &OrganizationIndex, department: &str) -> ResolvedMetric {
        let unit = index.find_department(department);

        // Tier 1: the department's own name (or the last path segment when
        // the department is not in the index at all).
        let own_name = unit.map(|u| u.name.clone()).unwrap_or_else(|| {
            department
                .rsplit(SEPARATOR)
                .next()
                .unwrap_or(department)
                .trim()
                .to_string()
        });

        if let Some((content, filename)) = self.try_specific(&own_name) {
            debug!(department, file = %filename, "specific document");
            return self.finish(content, Provenance::Specific, filename);
        }

        // Tier 2: hierarchical inheritance, immediate parent first.
        if let Some(unit) = unit {
            for ancestor in unit.ancestor_names() {
                if let Some((content, filename)) = self.try_specific(ancestor) {
                    debug!(department, ancestor, file = %filename, "inherited document");
                    return self.finish(
                        content,
                        Provenance::Inherited,
                        format!("{filename} (inherited from {ancestor})"),
                    );
                }
            }
        }

        // Tier 3: category template. Classify on the full path when we
        // have one; the ancestors' names carry useful signal.
        let classify_input = unit.map(|u| u.path.clone()).unwrap_or_else(|| own_name.clone());
        let category = classify_template(&classify_input);
        let template = template_text(category);
        if !template.trim().is_empty() {
            debug!(department, category = %category, "template document");
            return self.finish(
                template.to_string(),
                Provenance::Template,
                category.tag().to_string(),
            );
        }

        // Tier 4: all tiers exhausted. Recovered with the minimal generic
        // document; operators see a warning, callers never see an error.
        warn!(department, "metric resolution exhausted, using fallback document");
        self.finish(
            FALLBACK_DOCUMENT.to_string(),
            Provenance::Fallback,
            "fallback".to_string(),
        )
    }

    /// Resolve every department in the index, for coverage reporting.
    pub fn coverage(&self, index: &OrganizationIndex) -> Vec<(String, Provenance)> {
        let mut report: Vec<(String, Provenance)> = index
            .units()
            .map(|unit| {
                let resolved = self.resolve(index, &unit.path);
                (unit.path.clone(), resolved.provenance)
            })
            .collect();
        report.sort_by(|a, b| a.0.cmp(&b.0));
        report
    }

    /// Drop all memoized documents. Called on index reload.
    pub fn invalidate(&self) {
        let mut cache = self.cache.write().expect("cache lock poisoned");
        let dropped = cache.len();
        cache.clear();
        debug!(dropped, "metric document cache invalidated");
    }

    // -- Internals ----------------------------------------------------------

    /// Tier-1 lookup for one name: first registry candidate whose file
    /// loads. A registered pattern whose file is missing is skipped, so a
    /// stale registry row cannot break coverage.
    fn try_specific(&self, name: &str) -> Option<(String, String)> {
        for doc_id in self.registry.candidates(name) {
            let Some(filename) = self.registry.filename(doc_id) else {
                continue;
            };
            match self.load_cached(filename) {
                Some(doc) => return Some((doc.content.clone(), filename.to_string())),
                None => {
                    debug!(doc_id, filename, "registered document not loadable, skipping");
                }
            }
        }
        None
    }

    /// Load a document through the cache. Returns `None` when the file is
    /// absent or unreadable; file reads happen at most once per distinct
    /// document per resolver lifetime.
    fn load_cached(&self, filename: &str) -> Option<Arc<CachedDocument>> {
        if let Some(doc) = self
            .cache
            .read()
            .expect("cache lock poisoned")
            .get(filename)
        {
            return Some(Arc::clone(doc));
        }

        let path = self.metrics_dir.join(filename);
        let content = read_document(&path)?;

        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let doc = Arc::new(CachedDocument {
            sha256: format!("{:x}", hasher.finalize()),
            content,
            loaded_at: Utc::now(),
        });

        debug!(
            filename,
            sha256 = %doc.sha256,
            loaded_at = %doc.loaded_at,
            "metric document loaded"
        );

        self.cache
            .write()
            .expect("cache lock poisoned")
            .insert(filename.to_string(), Arc::clone(&doc));

        Some(doc)
    }

    /// Post-process and package a resolution result.
    fn finish(&self, text: String, provenance: Provenance, source: String) -> ResolvedMetric {
        ResolvedMetric {
            text: tidy_with_ceiling(&text, self.char_ceiling),
            provenance,
            source,
        }
    }
}

/// Read a document, treating blank files the same as absent ones.
fn read_document(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) if !content.trim().is_empty() => Some(content),
        Ok(_) => {
            debug!(path = %path.display(), "document is empty, ignoring");
            None
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "document not readable");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

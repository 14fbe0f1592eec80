//! Shared organization-index handle.
//!
//! The index is built once, fails closed on malformed input, and is shared
//! immutably behind an `Arc`. Reload builds a complete replacement index
//! and swaps the pointer atomically, so concurrent readers either see the
//! old index or the new one, never a partial rebuild. There is no global:
//! consumers hold a reference to the handle.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tracing::{info, instrument};

use profilegen_orgchart::{OrgChartDocument, OrganizationIndex, load_document};
use profilegen_shared::{ProfilegenError, Result};

/// Owner of the shared, immutable organization index.
#[derive(Debug)]
pub struct IndexHandle {
    /// Backing document path; absent for in-memory handles.
    org_chart_path: Option<PathBuf>,
    /// Alias table applied on every (re)build.
    aliases: BTreeMap<String, String>,
    inner: RwLock<Arc<OrganizationIndex>>,
}

impl IndexHandle {
    /// Build the index from the document at `path`. Fails closed: an
    /// unparsable document yields an error and no handle.
    #[instrument(skip(aliases))]
    pub fn load(path: impl Into<PathBuf> + std::fmt::Debug, aliases: BTreeMap<String, String>) -> Result<Self> {
        let path = path.into();
        let doc = load_document(&path)?;
        let index = OrganizationIndex::build(&doc, aliases.clone())?;
        info!(path = %path.display(), units = index.unit_count(), "index loaded");

        Ok(Self {
            org_chart_path: Some(path),
            aliases,
            inner: RwLock::new(Arc::new(index)),
        })
    }

    /// Build the index from an already-parsed document (no backing file;
    /// `reload` is unavailable).
    pub fn from_document(
        doc: &OrgChartDocument,
        aliases: BTreeMap<String, String>,
    ) -> Result<Self> {
        let index = OrganizationIndex::build(doc, aliases.clone())?;
        Ok(Self {
            org_chart_path: None,
            aliases,
            inner: RwLock::new(Arc::new(index)),
        })
    }

    /// The current index. Cheap: clones the `Arc`, not the index.
    pub fn current(&self) -> Arc<OrganizationIndex> {
        Arc::clone(&self.inner.read().expect("index lock poisoned"))
    }

    /// Rebuild from the backing document and swap atomically.
    ///
    /// On failure the previous index stays in place: readers keep a
    /// complete index and the error propagates to the caller.
    #[instrument(skip(self))]
    pub fn reload(&self) -> Result<()> {
        let Some(path) = &self.org_chart_path else {
            return Err(ProfilegenError::config(
                "index has no backing document to reload from",
            ));
        };

        let doc = load_document(path)?;
        let index = OrganizationIndex::build(&doc, self.aliases.clone())?;
        info!(units = index.unit_count(), "index rebuilt, swapping");

        *self.inner.write().expect("index lock poisoned") = Arc::new(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profilegen_orgchart::parse_document;

    fn temp_file(content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "pg-handle-test-{}.json",
            uuid::Uuid::now_v7()
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    const DOC_V1: &str = r#"{"units": [{"name": "Block A", "units": [{"name": "Dept One"}]}]}"#;
    const DOC_V2: &str = r#"{"units": [
        {"name": "Block A", "units": [{"name": "Dept One"}, {"name": "Dept Two"}]}
    ]}"#;

    #[test]
    fn load_builds_index() {
        let path = temp_file(DOC_V1);
        let handle = IndexHandle::load(&path, BTreeMap::new()).expect("load");
        assert_eq!(handle.current().unit_count(), 2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_fails_closed_on_malformed_document() {
        let path = temp_file("{broken");
        assert!(IndexHandle::load(&path, BTreeMap::new()).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn reload_swaps_to_new_index() {
        let path = temp_file(DOC_V1);
        let handle = IndexHandle::load(&path, BTreeMap::new()).expect("load");
        let before = handle.current();

        std::fs::write(&path, DOC_V2).unwrap();
        handle.reload().expect("reload");

        let after = handle.current();
        assert_eq!(before.unit_count(), 2);
        assert_eq!(after.unit_count(), 3);
        // The old Arc stays valid for readers that captured it.
        assert!(before.find_unit_by_path("Block A / Dept One").is_some());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn failed_reload_keeps_previous_index() {
        let path = temp_file(DOC_V1);
        let handle = IndexHandle::load(&path, BTreeMap::new()).expect("load");

        std::fs::write(&path, "{broken").unwrap();
        assert!(handle.reload().is_err());
        assert_eq!(handle.current().unit_count(), 2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn in_memory_handle_cannot_reload() {
        let doc = parse_document(DOC_V1).expect("parse");
        let handle = IndexHandle::from_document(&doc, BTreeMap::new()).expect("build");
        assert!(handle.reload().is_err());
        assert_eq!(handle.current().unit_count(), 2);
    }
}

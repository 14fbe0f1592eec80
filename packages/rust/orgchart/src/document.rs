//! Raw organization document model.
//!
//! The hierarchical org chart arrives as a JSON document: a root label plus
//! nested units, each with a name, optional numeric identifier, role-title
//! list, optional headcount, and nested children. The root label is a
//! display artifact and is not part of any unit path.

use std::path::Path;

use serde::{Deserialize, Serialize};

use profilegen_shared::{ProfilegenError, Result};

/// The full org-chart input document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgChartDocument {
    /// Root label (e.g. the legal entity name). Not part of unit paths.
    #[serde(default)]
    pub title: String,

    /// Top-level blocks.
    #[serde(default)]
    pub units: Vec<OrgChartNode>,
}

/// One nested unit in the raw document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgChartNode {
    /// Unit name. Short names repeat across the chart; only full paths
    /// are unique.
    pub name: String,

    /// Optional numeric identifier from the source system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Role titles attached to this unit, in document order.
    #[serde(default)]
    pub positions: Vec<String>,

    /// Optional headcount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headcount: Option<u32>,

    /// Nested child units, in document order.
    #[serde(default)]
    pub units: Vec<OrgChartNode>,
}

/// Load and parse an org-chart document from disk.
///
/// Parsing is the one fatal path in this crate: a malformed document must
/// abort index construction rather than serve partial data.
pub fn load_document(path: &Path) -> Result<OrgChartDocument> {
    let content = std::fs::read_to_string(path).map_err(|e| ProfilegenError::io(path, e))?;
    parse_document(&content)
}

/// Parse an org-chart document from a JSON string.
pub fn parse_document(content: &str) -> Result<OrgChartDocument> {
    let doc: OrgChartDocument = serde_json::from_str(content)
        .map_err(|e| ProfilegenError::parse(format!("org chart document: {e}")))?;

    if doc.units.is_empty() {
        return Err(ProfilegenError::parse(
            "org chart document contains no units",
        ));
    }

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_document() {
        let json = r#"{
            "title": "Example Corp",
            "units": [
                {
                    "name": "Operations Block",
                    "id": 100,
                    "positions": ["Block Director"],
                    "units": [
                        {
                            "name": "IT Department",
                            "positions": ["Senior Backend Engineer", "System Administrator"],
                            "headcount": 14,
                            "units": []
                        }
                    ]
                }
            ]
        }"#;

        let doc = parse_document(json).expect("parse");
        assert_eq!(doc.title, "Example Corp");
        assert_eq!(doc.units.len(), 1);
        assert_eq!(doc.units[0].units[0].name, "IT Department");
        assert_eq!(doc.units[0].units[0].headcount, Some(14));
    }

    #[test]
    fn parse_rejects_empty_document() {
        let err = parse_document(r#"{"title": "Empty", "units": []}"#).unwrap_err();
        assert!(err.to_string().contains("no units"));
    }

    #[test]
    fn parse_rejects_malformed_json() {
        let err = parse_document("{not json").unwrap_err();
        assert!(err.to_string().starts_with("parse error"));
    }

    #[test]
    fn optional_fields_default() {
        let json = r#"{"units": [{"name": "Solo Block"}]}"#;
        let doc = parse_document(json).expect("parse");
        assert!(doc.title.is_empty());
        assert!(doc.units[0].positions.is_empty());
        assert_eq!(doc.units[0].headcount, None);
        assert_eq!(doc.units[0].id, None);
    }
}

//! Reference-document compressor.
//!
//! The large static reference document (competency handbook) is compressed
//! to one of four size tiers selected by role category. Each tier is a
//! line-based transformation over the document's heading structure,
//! bounded by the configured ceilings and never empty.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use profilegen_shared::text::tidy_with_ceiling;
use profilegen_shared::{BudgetsConfig, ReferenceTier, RoleCategory};

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Section model
// ---------------------------------------------------------------------------

/// One heading-delimited section of the reference document.
#[derive(Debug)]
struct Section {
    /// Heading depth (1 = H1).
    depth: usize,
    /// Heading text without the hashes.
    title: String,
    /// Raw heading line.
    heading_line: String,
    /// Body lines until the next heading.
    body: Vec<String>,
}

/// Split a markdown document into a preamble (lines before the first
/// heading) and heading-delimited sections.
fn split_sections(md: &str) -> (Vec<String>, Vec<Section>) {
    let mut preamble = Vec::new();
    let mut sections: Vec<Section> = Vec::new();

    for line in md.lines() {
        if let Some(caps) = HEADING_RE.captures(line) {
            sections.push(Section {
                depth: caps[1].len(),
                title: caps[2].trim().to_string(),
                heading_line: line.to_string(),
                body: Vec::new(),
            });
        } else if let Some(current) = sections.last_mut() {
            current.body.push(line.to_string());
        } else {
            preamble.push(line.to_string());
        }
    }

    (preamble, sections)
}

/// First non-empty paragraph of a line block.
fn first_paragraph(lines: &[String]) -> Vec<String> {
    let mut paragraph = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }
        paragraph.push(line.clone());
    }
    paragraph
}

// ---------------------------------------------------------------------------
// Compression
// ---------------------------------------------------------------------------

/// Compress the reference document to the given tier.
///
/// Every tier ends post-processed and bounded by its configured ceiling;
/// a tier that would come out empty falls back to the next-larger shape,
/// so the result is never empty for a non-empty input.
#[instrument(skip(reference_md, budgets), fields(tier = %tier, category = %category))]
pub fn compress(
    reference_md: &str,
    tier: ReferenceTier,
    category: RoleCategory,
    budgets: &BudgetsConfig,
) -> String {
    let result = match tier {
        ReferenceTier::Full => tidy_with_ceiling(reference_md, budgets.reference_full_ceiling),
        ReferenceTier::CompressedSummary => {
            tidy_with_ceiling(&summarize(reference_md), budgets.reference_compressed_ceiling)
        }
        ReferenceTier::DomainFiltered => {
            let filtered = filter_by_domain(reference_md, category);
            match filtered {
                Some(text) => tidy_with_ceiling(&text, budgets.reference_filtered_ceiling),
                // Nothing matched the domain: degrade to the summary shape
                // rather than returning an empty document.
                None => {
                    debug!("no domain sections matched, using summary");
                    tidy_with_ceiling(&summarize(reference_md), budgets.reference_filtered_ceiling)
                }
            }
        }
        ReferenceTier::MinimalOverview => {
            tidy_with_ceiling(&overview(reference_md), budgets.reference_minimal_ceiling)
        }
    };

    debug!(chars = result.chars().count(), "reference compressed");
    result
}

/// Compressed-summary shape: every heading plus the first paragraph of its
/// body.
fn summarize(md: &str) -> String {
    let (preamble, sections) = split_sections(md);
    let mut out: Vec<String> = Vec::new();

    let intro = first_paragraph(&preamble);
    if !intro.is_empty() {
        out.extend(intro);
        out.push(String::new());
    }

    for section in &sections {
        out.push(section.heading_line.clone());
        let para = first_paragraph(&section.body);
        if !para.is_empty() {
            out.extend(para);
        }
        out.push(String::new());
    }

    out.join("\n")
}

/// Domain-filtered shape: sections whose heading or body mentions the
/// category's domain keywords, in document order. `None` when nothing
/// matches.
fn filter_by_domain(md: &str, category: RoleCategory) -> Option<String> {
    let keywords = domain_keywords(category);
    let (preamble, sections) = split_sections(md);

    let matching: Vec<&Section> = sections
        .iter()
        .filter(|section| {
            let title_lc = section.title.to_lowercase();
            keywords.iter().any(|kw| title_lc.contains(kw))
                || section
                    .body
                    .iter()
                    .any(|line| {
                        let line_lc = line.to_lowercase();
                        keywords.iter().any(|kw| line_lc.contains(kw))
                    })
        })
        .collect();

    if matching.is_empty() {
        return None;
    }

    let mut out: Vec<String> = Vec::new();
    let intro = first_paragraph(&preamble);
    if !intro.is_empty() {
        out.extend(intro);
        out.push(String::new());
    }

    for section in matching {
        out.push(section.heading_line.clone());
        out.extend(section.body.iter().cloned());
    }

    Some(out.join("\n"))
}

/// Minimal-overview shape: title, intro paragraph, and the H1/H2 outline.
fn overview(md: &str) -> String {
    let (preamble, sections) = split_sections(md);
    let mut out: Vec<String> = Vec::new();

    if let Some(title) = sections.iter().find(|s| s.depth == 1) {
        out.push(title.heading_line.clone());
        out.push(String::new());
        let intro = first_paragraph(&title.body);
        if !intro.is_empty() {
            out.extend(intro);
            out.push(String::new());
        }
    } else {
        let intro = first_paragraph(&preamble);
        if !intro.is_empty() {
            out.extend(intro);
            out.push(String::new());
        }
    }

    let outline: Vec<&Section> = sections.iter().filter(|s| s.depth == 2).collect();
    if !outline.is_empty() {
        out.push("Covered areas:".to_string());
        for section in outline {
            out.push(format!("- {}", section.title));
        }
    }

    out.join("\n")
}

/// Domain keywords per category, used by the filtered tier.
fn domain_keywords(category: RoleCategory) -> &'static [&'static str] {
    match category {
        RoleCategory::Finance => &[
            "finance",
            "financial",
            "budget",
            "accounting",
            "audit",
            "cost",
            "revenue",
            "compliance",
        ],
        RoleCategory::Sales => &[
            "sales",
            "client",
            "customer",
            "market",
            "revenue",
            "pipeline",
        ],
        RoleCategory::HumanResources => &[
            "human resources",
            "recruit",
            "talent",
            "people",
            "onboarding",
            "training",
        ],
        // Remaining categories route to other tiers; keep a broad net in
        // case a caller filters anyway.
        _ => &["competenc", "skill", "responsibilit"],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Competency Handbook

Company-wide expectations for every role family.

## Engineering Standards

Code review discipline and deployment safety.

Detailed engineering material follows with many specifics.

## Financial Controls

Budget ownership, audit trails, and cost accounting rules.

More financial detail.

## Customer and Sales Practice

Client communication standards and pipeline hygiene.

## Workplace Conduct

General conduct expectations for all staff.
";

    fn budgets() -> BudgetsConfig {
        BudgetsConfig::default()
    }

    #[test]
    fn full_tier_keeps_everything_under_ceiling() {
        let out = compress(SAMPLE, ReferenceTier::Full, RoleCategory::Technical, &budgets());
        assert!(out.contains("# Competency Handbook"));
        assert!(out.contains("Detailed engineering material"));
        assert!(out.contains("More financial detail."));
    }

    #[test]
    fn full_tier_truncates_over_ceiling() {
        let mut small = budgets();
        small.reference_full_ceiling = 80;
        let out = compress(SAMPLE, ReferenceTier::Full, RoleCategory::Technical, &small);
        assert!(out.ends_with("[content truncated]"));
        assert!(out.chars().count() < SAMPLE.chars().count());
    }

    #[test]
    fn compressed_tier_keeps_headings_drops_tail_paragraphs() {
        let out = compress(
            SAMPLE,
            ReferenceTier::CompressedSummary,
            RoleCategory::Management,
            &budgets(),
        );
        assert!(out.contains("## Engineering Standards"));
        assert!(out.contains("Code review discipline"));
        // Second paragraph of the section is summarized away.
        assert!(!out.contains("Detailed engineering material"));
    }

    #[test]
    fn filtered_tier_keeps_matching_sections_only() {
        let out = compress(
            SAMPLE,
            ReferenceTier::DomainFiltered,
            RoleCategory::Finance,
            &budgets(),
        );
        assert!(out.contains("## Financial Controls"));
        assert!(out.contains("More financial detail."));
        assert!(!out.contains("## Engineering Standards"));
        assert!(!out.contains("## Workplace Conduct"));
    }

    #[test]
    fn filtered_tier_degrades_to_summary_when_nothing_matches() {
        let md = "# Doc\n\n## Alpha\n\nNothing relevant here.\n";
        let out = compress(md, ReferenceTier::DomainFiltered, RoleCategory::Sales, &budgets());
        assert!(!out.is_empty());
        assert!(out.contains("## Alpha"));
    }

    #[test]
    fn minimal_tier_is_outline_only_and_bounded() {
        let out = compress(
            SAMPLE,
            ReferenceTier::MinimalOverview,
            RoleCategory::Support,
            &budgets(),
        );
        assert!(out.contains("# Competency Handbook"));
        assert!(out.contains("- Engineering Standards"));
        assert!(out.contains("- Workplace Conduct"));
        assert!(!out.contains("Code review discipline"));
        assert!(out.chars().count() < 5_000);
    }

    #[test]
    fn minimal_tier_bounded_even_for_huge_input() {
        let mut huge = String::from("# Big\n\nIntro paragraph.\n\n");
        for i in 0..2_000 {
            huge.push_str(&format!("## Section {i}\n\nBody {i}.\n\n"));
        }
        let out = compress(
            &huge,
            ReferenceTier::MinimalOverview,
            RoleCategory::Support,
            &budgets(),
        );
        assert!(out.chars().count() < 5_000);
        assert!(out.ends_with("[content truncated]"));
    }

    #[test]
    fn empty_input_stays_empty_but_does_not_panic() {
        let out = compress("", ReferenceTier::CompressedSummary, RoleCategory::Business, &budgets());
        assert!(out.is_empty());
    }
}

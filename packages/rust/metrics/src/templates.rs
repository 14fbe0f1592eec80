//! Static category templates, the third resolution tier.
//!
//! When neither the department nor any ancestor has a registered metric
//! document, the department is classified into a template category by a
//! keyword table independent of role classification, and the category's
//! static template is returned. Read-only.

/// Closed set of template category tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateCategory {
    Finance,
    Technical,
    Sales,
    Operations,
    HumanResources,
    Generic,
}

impl TemplateCategory {
    /// Stable tag string recorded as the metric source.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Finance => "finance",
            Self::Technical => "technical",
            Self::Sales => "sales",
            Self::Operations => "operations",
            Self::HumanResources => "hr",
            Self::Generic => "generic",
        }
    }
}

impl std::fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Ordered (category, keywords) table for department classification.
/// First match wins; unmatched departments get the generic template.
const TEMPLATE_RULES: &[(TemplateCategory, &[&str])] = &[
    (
        TemplateCategory::Finance,
        &["financ", "account", "audit", "treasury", "budget", "economic"],
    ),
    (
        TemplateCategory::Technical,
        &[
            " it ",
            "information technology",
            "infrastructure",
            "software",
            "network",
            "technical",
            "technology",
            "digital",
            "data",
        ],
    ),
    (
        TemplateCategory::Sales,
        &["sales", "commercial", "market", "client", "customer"],
    ),
    (
        TemplateCategory::HumanResources,
        &["human resources", " hr ", "personnel", "recruit", "talent"],
    ),
    (
        TemplateCategory::Operations,
        &["operations", "logistic", "procurement", "supply", "production", "facilities"],
    ),
];

/// Classify a department (name or full path) into a template category.
pub fn classify_template(department: &str) -> TemplateCategory {
    // Padding with spaces lets short tokens like " it " and " hr " match
    // only at word boundaries.
    let padded = format!(" {} ", department.trim().to_lowercase());

    for (category, keywords) in TEMPLATE_RULES {
        if keywords.iter().any(|kw| padded.contains(kw)) {
            return *category;
        }
    }

    TemplateCategory::Generic
}

/// Template text for a category.
pub fn template_text(category: TemplateCategory) -> &'static str {
    match category {
        TemplateCategory::Finance => FINANCE_TEMPLATE,
        TemplateCategory::Technical => TECHNICAL_TEMPLATE,
        TemplateCategory::Sales => SALES_TEMPLATE,
        TemplateCategory::Operations => OPERATIONS_TEMPLATE,
        TemplateCategory::HumanResources => HR_TEMPLATE,
        TemplateCategory::Generic => GENERIC_TEMPLATE,
    }
}

/// Minimal document of last resort, returned when even template
/// classification yields nothing usable.
pub const FALLBACK_DOCUMENT: &str = "\
# Performance Metrics

Standard performance expectations apply to this unit. Key results are
agreed with the direct manager during the planning cycle and reviewed
quarterly. Typical measures include delivery against agreed plans,
quality of output, and adherence to company policies.
";

const FINANCE_TEMPLATE: &str = "\
# Performance Metrics: Finance Functions

Core measures for finance, accounting, and audit units.

## Reporting Discipline

- Closing deadlines met for monthly, quarterly, and annual cycles
- Restatement and correction counts per period
- Audit findings resolved within the agreed remediation window

## Financial Control

- Budget variance within the approved tolerance band
- Forecast accuracy against actuals
- Payment and reconciliation backlogs kept within service levels

## Compliance

- Regulatory filings submitted on time
- Internal control checks completed per the control calendar
";

const TECHNICAL_TEMPLATE: &str = "\
# Performance Metrics: Technology Functions

Core measures for infrastructure, software, and technical units.

## Service Reliability

- Availability of owned services against agreed targets
- Incident counts by severity and mean time to restore
- Change failure rate and rollback frequency

## Delivery

- Planned work delivered per cycle against commitment
- Lead time from request to production
- Defect escape rate into production

## Operations Hygiene

- Patching and lifecycle currency of owned systems
- Monitoring coverage for critical paths
";

const SALES_TEMPLATE: &str = "\
# Performance Metrics: Sales and Commercial Functions

Core measures for sales, commercial, and client-facing units.

## Revenue

- Revenue against plan per period
- Pipeline coverage and conversion rates
- Average deal size and cycle length

## Client Health

- Client retention and churn
- Satisfaction scores for managed accounts
- Response times to client requests
";

const OPERATIONS_TEMPLATE: &str = "\
# Performance Metrics: Operations Functions

Core measures for operations, logistics, and supply units.

## Throughput

- Order and request throughput against plan
- Processing cycle times per stage
- Backlog age and clearance rates

## Quality and Cost

- Error and rework rates
- Cost per processed unit against budget
- Supplier service-level attainment
";

const HR_TEMPLATE: &str = "\
# Performance Metrics: People Functions

Core measures for HR and recruiting units.

## Hiring

- Time to fill by role family
- Offer acceptance rate
- Quality of hire at the probation checkpoint

## People Health

- Regretted attrition against target
- Onboarding completion within the standard window
- Training plan completion rates
";

const GENERIC_TEMPLATE: &str = "\
# Performance Metrics: General Business Functions

Baseline measures applied when no specialized document exists.

## Delivery

- Agreed objectives delivered per review period
- Task turnaround against internal service levels

## Quality

- Output accepted without rework
- Process and policy adherence

## Collaboration

- Cross-unit commitments met on schedule
- Stakeholder satisfaction with the unit's service
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_template_by_keywords() {
        assert_eq!(
            classify_template("Accounting Department"),
            TemplateCategory::Finance
        );
        assert_eq!(
            classify_template("Network Infrastructure Section"),
            TemplateCategory::Technical
        );
        assert_eq!(
            classify_template("Regional Sales Department"),
            TemplateCategory::Sales
        );
        assert_eq!(
            classify_template("Recruiting Group"),
            TemplateCategory::HumanResources
        );
        assert_eq!(
            classify_template("Logistics Department"),
            TemplateCategory::Operations
        );
        assert_eq!(
            classify_template("Strategy Office"),
            TemplateCategory::Generic
        );
    }

    #[test]
    fn short_prefixes_match_word_boundaries() {
        assert_eq!(classify_template("IT Department"), TemplateCategory::Technical);
        assert_eq!(classify_template("HR Department"), TemplateCategory::HumanResources);
        // "audit" must not hijack "IT" matching; exact word context matters.
        assert_eq!(classify_template("Audit Group"), TemplateCategory::Finance);
    }

    #[test]
    fn classify_template_accepts_full_paths() {
        assert_eq!(
            classify_template("Finance Block / Accounting Department"),
            TemplateCategory::Finance
        );
    }

    #[test]
    fn every_template_is_nonempty() {
        for category in [
            TemplateCategory::Finance,
            TemplateCategory::Technical,
            TemplateCategory::Sales,
            TemplateCategory::Operations,
            TemplateCategory::HumanResources,
            TemplateCategory::Generic,
        ] {
            assert!(!template_text(category).trim().is_empty());
        }
        assert!(!FALLBACK_DOCUMENT.trim().is_empty());
    }
}

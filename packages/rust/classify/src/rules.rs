//! Role classification rules.
//!
//! An ordered rule table maps role titles to categories; order encodes
//! priority, most specific first, and the first matching category wins.
//! Titles that match nothing fall through to a department-based pass:
//! technical departments yield a management-tier technical category,
//! everything else the generic business bucket.

use tracing::debug;

use profilegen_shared::RoleCategory;

/// Ordered (category, keywords) table. Matching is case-insensitive
/// substring over the title. The order is intentional: support keywords
/// run before management so "Executive Assistant" lands in support, and
/// sales before management so "Account Manager" lands in sales.
const CATEGORY_RULES: &[(RoleCategory, &[&str])] = &[
    (
        RoleCategory::Technical,
        &[
            "engineer",
            "developer",
            "programmer",
            "architect",
            "devops",
            "sysadmin",
            "system administrator",
            "database administrator",
            "dba",
            "quality assurance",
            "tester",
            "data scientist",
            "machine learning",
            "frontend",
            "backend",
            "fullstack",
        ],
    ),
    (
        RoleCategory::Finance,
        &[
            "accountant",
            "auditor",
            "treasurer",
            "financial",
            "economist",
            "controller",
            "bookkeeper",
        ],
    ),
    (
        RoleCategory::Sales,
        &[
            "sales",
            "account manager",
            "account executive",
            "business development",
        ],
    ),
    (
        RoleCategory::HumanResources,
        &[
            "human resources",
            "recruiter",
            "recruiting",
            "talent",
            "people partner",
        ],
    ),
    (
        RoleCategory::Support,
        &[
            "assistant",
            "secretary",
            "receptionist",
            "clerk",
            "office manager",
            "courier",
            "intern",
        ],
    ),
    (
        RoleCategory::Management,
        &[
            "director",
            "head of",
            "chief",
            "ceo",
            "cfo",
            "cto",
            "cio",
            "manager",
            "supervisor",
            "team lead",
            "deputy",
        ],
    ),
];

/// Department keywords marking infrastructure/technical units. A title
/// with no keyword hit but a technical department classifies as
/// management-tier technical.
const TECHNICAL_DEPARTMENT_KEYWORDS: &[&str] = &[
    "information technology",
    "infrastructure",
    "technical",
    "technology",
    "digital",
    "software",
    "network",
    "telecom",
    "data center",
    "automation",
    "engineering",
];

/// Classify a role title within its department.
///
/// Stage 1 tests the title against the ordered rule table; stage 2 runs
/// only when stage 1 misses and checks the department name. The two-stage
/// priority (title first, department second) is load-bearing: keyword
/// lists are ordered from most to least specific.
pub fn classify(title: &str, department: &str) -> RoleCategory {
    let title_lc = title.trim().to_lowercase();

    for (category, keywords) in CATEGORY_RULES {
        if keywords.iter().any(|kw| title_lc.contains(kw)) {
            debug!(title, category = %category, "title keyword match");
            return *category;
        }
    }

    if is_technical_department(department) {
        debug!(title, department, "technical department fallback");
        return RoleCategory::TechnicalManagement;
    }

    RoleCategory::Business
}

/// Whether a department name marks an infrastructure/technical unit.
fn is_technical_department(department: &str) -> bool {
    let dept_lc = department.trim().to_lowercase();

    // "IT" is too short for substring matching ("recruiting" contains
    // "it"), so it gets exact and prefix checks of its own.
    if dept_lc == "it" || dept_lc.starts_with("it ") || dept_lc.contains("it department") {
        return true;
    }

    TECHNICAL_DEPARTMENT_KEYWORDS
        .iter()
        .any(|kw| dept_lc.contains(kw))
}

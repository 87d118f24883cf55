//! # Search Task Planner
//!
//! Turns a fixed catalogue of subjects (the products we track) and modifiers
//! (the angles we care about) into an ordered list of search queries. Planning
//! is a pure function of the catalogue: the same catalogue always yields the
//! same tasks in the same order.
//!
//! Tasks are ordered by descending subject priority. The sort is stable, so
//! tasks with equal priority keep their declaration order (subject order,
//! then term order, then modifier order).

use serde::{Deserialize, Serialize};
use url::Url;

/// One query to submit to the search API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTask {
    /// Subject term, e.g. "hair dryer"
    pub subject: String,

    /// Modifier term, e.g. "market report"
    pub modifier: String,

    /// Query string sent to the search API
    pub query: String,

    /// Higher runs first
    pub priority: i32,

    /// Product line the subject belongs to
    pub sub_category: String,

    /// Topic group of the modifier, or the domain for site-targeted tasks
    pub kind: String,
}

impl SearchTask {
    /// Identity of the task
    pub fn key(&self) -> (&str, &str) {
        (&self.subject, &self.modifier)
    }
}

/// A product line and the search terms that describe it
#[derive(Debug, Clone)]
pub struct SubjectGroup {
    /// Product line, stored as the article's sub-category hint
    pub sub_category: String,

    /// Static business weight of the group
    pub priority: i32,

    /// Search terms for the product line
    pub terms: Vec<String>,
}

/// A topic angle and the search terms that express it
#[derive(Debug, Clone)]
pub struct ModifierGroup {
    /// Topic group name
    pub kind: String,

    /// Search terms for the topic
    pub terms: Vec<String>,
}

/// A publication searched directly with `site:` queries
#[derive(Debug, Clone)]
pub struct TargetedSource {
    /// Domain of the publication
    pub domain: String,

    /// Keywords searched on that domain
    pub keywords: Vec<String>,
}

/// How subject and modifier are combined into a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStyle {
    /// `subject modifier`
    #[default]
    Plain,
    /// `intitle:"subject" "modifier"`
    Quoted,
}

/// Sub-category given to site-targeted tasks
pub const INDUSTRY_NEWS: &str = "industry news";

/// Priority of site-targeted tasks, below every subject group
pub const TARGETED_PRIORITY: i32 = 0;

const DOMAIN_BLACKLIST: &[&str] = &[
    "winbo4x4.com",
    "youtube.com",
    "bilibili.com",
    "facebook.com",
    "twitter.com",
    "instagram.com",
    "pinterest.com",
    "linkedin.com",
    "reddit.com",
    "tiktok.com",
];

/// Builds the ordered search task list
#[derive(Debug, Clone)]
pub struct SearchTaskPlanner {
    subjects: Vec<SubjectGroup>,
    modifiers: Vec<ModifierGroup>,
    targeted_sources: Vec<TargetedSource>,
    style: QueryStyle,
}

impl Default for SearchTaskPlanner {
    fn default() -> Self {
        let strings = |terms: &[&str]| terms.iter().map(|t| t.to_string()).collect::<Vec<_>>();

        Self {
            subjects: vec![
                SubjectGroup {
                    sub_category: "hair dryer".to_string(),
                    priority: 30,
                    terms: strings(&["high-speed hair dryer", "hair dryer"]),
                },
                SubjectGroup {
                    sub_category: "beauty device".to_string(),
                    priority: 20,
                    terms: strings(&["beauty device", "RF beauty device", "microcurrent device"]),
                },
                SubjectGroup {
                    sub_category: "massager".to_string(),
                    priority: 10,
                    terms: strings(&["massage gun"]),
                },
            ],
            modifiers: vec![
                ModifierGroup {
                    kind: "technology".to_string(),
                    terms: strings(&["new technology", "innovation", "patent", "launch"]),
                },
                ModifierGroup {
                    kind: "reviews".to_string(),
                    terms: strings(&["review", "vs"]),
                },
                ModifierGroup {
                    kind: "regulation".to_string(),
                    terms: strings(&["FDA approval", "clinical trial"]),
                },
                ModifierGroup {
                    kind: "industry report".to_string(),
                    terms: strings(&["market research", "industry report", "market report"]),
                },
            ],
            targeted_sources: vec![
                TargetedSource {
                    domain: "36kr.com".to_string(),
                    keywords: strings(&["beauty tech", "personal care appliance"]),
                },
                TargetedSource {
                    domain: "geekpark.net".to_string(),
                    keywords: strings(&["smart hardware", "consumer electronics"]),
                },
                TargetedSource {
                    domain: "techcrunch.com".to_string(),
                    keywords: strings(&["beauty tech", "personal care", "hardware"]),
                },
                TargetedSource {
                    domain: "theverge.com".to_string(),
                    keywords: strings(&["personal care", "gadgets", "review"]),
                },
            ],
            style: QueryStyle::Plain,
        }
    }
}

impl SearchTaskPlanner {
    /// Create a planner over a custom catalogue
    pub fn new(subjects: Vec<SubjectGroup>, modifiers: Vec<ModifierGroup>) -> Self {
        Self {
            subjects,
            modifiers,
            targeted_sources: Vec::new(),
            style: QueryStyle::Plain,
        }
    }

    /// Add site-targeted sources
    pub fn with_targeted_sources(mut self, sources: Vec<TargetedSource>) -> Self {
        self.targeted_sources = sources;
        self
    }

    /// Set the query style
    pub fn with_style(mut self, style: QueryStyle) -> Self {
        self.style = style;
        self
    }

    /// Produce the ordered task list
    pub fn plan(&self) -> Vec<SearchTask> {
        let mut tasks = Vec::new();

        for group in &self.subjects {
            for term in &group.terms {
                for modifier in &self.modifiers {
                    for mod_term in &modifier.terms {
                        tasks.push(SearchTask {
                            subject: term.clone(),
                            modifier: mod_term.clone(),
                            query: build_query(term, mod_term, self.style),
                            priority: group.priority,
                            sub_category: group.sub_category.clone(),
                            kind: modifier.kind.clone(),
                        });
                    }
                }
            }
        }

        for source in &self.targeted_sources {
            for keyword in &source.keywords {
                tasks.push(SearchTask {
                    subject: keyword.clone(),
                    modifier: format!("site:{}", source.domain),
                    query: format!("\"{}\" site:{}", keyword, source.domain),
                    priority: TARGETED_PRIORITY,
                    sub_category: INDUSTRY_NEWS.to_string(),
                    kind: source.domain.clone(),
                });
            }
        }

        // Vec::sort_by is stable, which keeps declaration order among equal priorities
        tasks.sort_by(|a, b| b.priority.cmp(&a.priority));
        tasks
    }
}

/// Combine a subject and a modifier into a query string
pub fn build_query(subject: &str, modifier: &str, style: QueryStyle) -> String {
    let subject = subject.trim();
    let modifier = modifier.trim();
    match style {
        QueryStyle::Plain if modifier.is_empty() => subject.to_string(),
        QueryStyle::Plain => format!("{} {}", subject, modifier),
        QueryStyle::Quoted => format!("intitle:\"{}\" \"{}\"", subject, modifier),
    }
}

/// Whether the URL points at a domain we never collect from
pub fn is_blacklisted(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();

    DOMAIN_BLACKLIST.iter().any(|domain| {
        host == *domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

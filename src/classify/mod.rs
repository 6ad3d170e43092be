//! Page category classifier
//!
//! A pure function of a fetched page's DOM snapshot and URL. Rules are tried
//! in a fixed order and the first match wins:
//!
//! 1. Home page paths
//! 2. URL path keywords ([`rules::CATEGORY_RULES`])
//! 3. Title and first heading keywords (same table)
//! 4. Structural rules ([`rules::DOM_RULES`])
//! 5. `other`
//!
//! Characteristics are computed independently of the category.

mod detectors;
pub mod rules;

pub use detectors::{detect_author, detect_newsletter};

use crate::signatures::{first_match, MatchMode};
use rules::{
    AUTH_SELECTOR, CATEGORY_RULES, CONFIDENCE_DOM, CONFIDENCE_FALLBACK, CONFIDENCE_PATH,
    CONFIDENCE_TITLE, DOCUMENT_LINK_SELECTOR, DOM_RULES, HOMEPAGE_PATHS, MEDIA_SELECTOR,
};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Page category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Homepage,
    Contact,
    LegalNotices,
    Accessibility,
    Sitemap,
    Help,
    Authentication,
    Form,
    Table,
    Multimedia,
    Document,
    MultiStepProcess,
    DistinctLayout,
    Other,
}

impl Category {
    pub const ALL: [Category; 14] = [
        Category::Homepage,
        Category::Contact,
        Category::LegalNotices,
        Category::Accessibility,
        Category::Sitemap,
        Category::Help,
        Category::Authentication,
        Category::Form,
        Category::Table,
        Category::Multimedia,
        Category::Document,
        Category::MultiStepProcess,
        Category::DistinctLayout,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Homepage => "homepage",
            Category::Contact => "contact",
            Category::LegalNotices => "legal_notices",
            Category::Accessibility => "accessibility",
            Category::Sitemap => "sitemap",
            Category::Help => "help",
            Category::Authentication => "authentication",
            Category::Form => "form",
            Category::Table => "table",
            Category::Multimedia => "multimedia",
            Category::Document => "document",
            Category::MultiStepProcess => "multi_step_process",
            Category::DistinctLayout => "distinct_layout",
            Category::Other => "other",
        }
    }

    /// Parses the storage representation; unknown values yield `None`
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Independent structural flags of a page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristics {
    pub has_form: bool,
    pub has_table: bool,
    pub has_multimedia: bool,
    pub has_documents: bool,
    pub has_authentication: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    pub confidence: f32,
    pub characteristics: Characteristics,
}

/// Classifies a parsed page
pub fn classify_page(document: &Html, url: &Url) -> Classification {
    let characteristics = detect_characteristics(document);
    let (category, confidence) = categorize(document, url);

    Classification {
        category,
        confidence,
        characteristics,
    }
}

/// Parses `html` and classifies it
pub fn classify_html(html: &str, url: &Url) -> Classification {
    classify_page(&Html::parse_document(html), url)
}

fn categorize(document: &Html, url: &Url) -> (Category, f32) {
    let path = url.path().to_lowercase();
    let trimmed = path.trim_end_matches('/');
    if HOMEPAGE_PATHS.contains(&path.as_str()) || HOMEPAGE_PATHS.contains(&trimmed) {
        return (Category::Homepage, CONFIDENCE_PATH);
    }

    if let Some(rule) = first_match(CATEGORY_RULES, |r| r.path_keywords, &[path.as_str()], MatchMode::Contains) {
        return (rule.category, CONFIDENCE_PATH);
    }

    let headings = [text_of(document, "title"), text_of(document, "h1")];
    let headings: Vec<&str> = headings.iter().flatten().map(String::as_str).collect();
    if let Some(rule) = first_match(CATEGORY_RULES, |r| r.title_keywords, &headings, MatchMode::Contains) {
        return (rule.category, CONFIDENCE_TITLE);
    }

    DOM_RULES
        .iter()
        .find(|rule| count(document, rule.selector) >= rule.min_count)
        .map(|rule| (rule.category, CONFIDENCE_DOM))
        .unwrap_or((Category::Other, CONFIDENCE_FALLBACK))
}

fn detect_characteristics(document: &Html) -> Characteristics {
    Characteristics {
        has_form: count(document, "form") > 0,
        has_table: count(document, "table") > 0,
        has_multimedia: count(document, MEDIA_SELECTOR) > 0,
        has_documents: count(document, DOCUMENT_LINK_SELECTOR) > 0,
        has_authentication: count(document, AUTH_SELECTOR) > 0,
    }
}

/// Number of elements matching `selector`; an invalid selector counts zero
pub(crate) fn count(document: &Html, selector: &str) -> usize {
    Selector::parse(selector)
        .map(|sel| document.select(&sel).count())
        .unwrap_or(0)
}

/// Trimmed text of the first element matching `selector`
pub(crate) fn text_of(document: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    document
        .select(&sel)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string())
        .filter(|s| !s.is_empty())
}

use crate::audit::{Impact, LoadedPage, Violation};
use crate::signatures::criteria::criteria_for_tags;
use crate::Result;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};

/// An automated accessibility rule checker
#[async_trait]
pub trait AccessibilityRuleEngine: Send + Sync {
    /// Checks the loaded page, running only rules carrying one of `tags`
    async fn scan(&self, page: &mut LoadedPage, tags: &[String]) -> Result<Vec<Violation>>;
}

/// Rule checker working on the served markup
///
/// Covers the static subset of WCAG checks: text alternatives, document
/// language and title, form labels, link, button and frame names, duplicate
/// ids and heading levels.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinRuleEngine;

#[async_trait]
impl AccessibilityRuleEngine for BuiltinRuleEngine {
    async fn scan(&self, page: &mut LoadedPage, tags: &[String]) -> Result<Vec<Violation>> {
        Ok(check_markup(&page.response.html, tags))
    }
}

struct Rule {
    id: &'static str,
    impact: Impact,
    description: &'static str,
    tags: &'static [&'static str],
    /// Number of offending nodes
    check: fn(&Html) -> usize,
}

const RULES: &[Rule] = &[
    Rule {
        id: "image-alt",
        impact: Impact::Critical,
        description: "Images must have alternate text",
        tags: &["wcag2a", "wcag111"],
        check: images_without_alt,
    },
    Rule {
        id: "html-has-lang",
        impact: Impact::Serious,
        description: "<html> element must have a lang attribute",
        tags: &["wcag2a", "wcag311"],
        check: missing_lang,
    },
    Rule {
        id: "document-title",
        impact: Impact::Serious,
        description: "Documents must have <title> element to aid in navigation",
        tags: &["wcag2a", "wcag242"],
        check: missing_title,
    },
    Rule {
        id: "label",
        impact: Impact::Critical,
        description: "Form elements must have labels",
        tags: &["wcag2a", "wcag412", "wcag131"],
        check: unlabeled_fields,
    },
    Rule {
        id: "link-name",
        impact: Impact::Serious,
        description: "Links must have discernible text",
        tags: &["wcag2a", "wcag412", "wcag244"],
        check: unnamed_links,
    },
    Rule {
        id: "button-name",
        impact: Impact::Critical,
        description: "Buttons must have discernible text",
        tags: &["wcag2a", "wcag412"],
        check: unnamed_buttons,
    },
    Rule {
        id: "frame-title",
        impact: Impact::Serious,
        description: "Frames must have an accessible name",
        tags: &["wcag2a", "wcag412"],
        check: untitled_frames,
    },
    Rule {
        id: "duplicate-id",
        impact: Impact::Minor,
        description: "id attribute values must be unique",
        tags: &["wcag2a", "wcag411"],
        check: duplicate_ids,
    },
    Rule {
        id: "heading-order",
        impact: Impact::Moderate,
        description: "Heading levels should only increase by one",
        tags: &["wcag2a", "wcag131"],
        check: skipped_heading_levels,
    },
];

/// Runs every rule selected by `tags` over `html`
///
/// An empty tag list runs all rules.
pub(crate) fn check_markup(html: &str, tags: &[String]) -> Vec<Violation> {
    let document = Html::parse_document(html);
    let wanted: HashSet<String> = tags.iter().map(|t| t.to_lowercase()).collect();

    RULES
        .iter()
        .filter(|rule| wanted.is_empty() || rule.tags.iter().any(|t| wanted.contains(*t)))
        .filter_map(|rule| {
            let nodes = (rule.check)(&document);
            if nodes == 0 {
                return None;
            }
            let tags: Vec<String> = rule.tags.iter().map(|t| t.to_string()).collect();
            let criteria = criteria_for_tags(&tags)
                .into_iter()
                .map(String::from)
                .collect();
            Some(Violation {
                rule_id: rule.id.to_string(),
                impact: rule.impact,
                description: rule.description.to_string(),
                nodes,
                tags,
                criteria,
            })
        })
        .collect()
}

fn select<'a>(document: &'a Html, selector: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(selector) {
        Ok(sel) => document.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

fn has_text(element: &ElementRef) -> bool {
    element.text().any(|t| !t.trim().is_empty())
}

fn has_attr_value(element: &ElementRef, name: &str) -> bool {
    element
        .value()
        .attr(name)
        .is_some_and(|v| !v.trim().is_empty())
}

fn has_accessible_name_attr(element: &ElementRef) -> bool {
    has_attr_value(element, "aria-label")
        || has_attr_value(element, "aria-labelledby")
        || has_attr_value(element, "title")
}

fn images_without_alt(document: &Html) -> usize {
    select(document, "img")
        .iter()
        .filter(|img| {
            let role = img.value().attr("role").unwrap_or("");
            img.value().attr("alt").is_none()
                && !has_accessible_name_attr(img)
                && role != "presentation"
                && role != "none"
        })
        .count()
}

fn missing_lang(document: &Html) -> usize {
    let html = select(document, "html");
    usize::from(!html.iter().any(|el| has_attr_value(el, "lang")))
}

fn missing_title(document: &Html) -> usize {
    let titles = select(document, "title");
    usize::from(!titles.iter().any(has_text))
}

fn unlabeled_fields(document: &Html) -> usize {
    let labelled: HashSet<&str> = select(document, "label[for]")
        .iter()
        .filter_map(|label| label.value().attr("for"))
        .collect();

    select(
        document,
        "input:not([type='hidden']):not([type='submit']):not([type='button']):not([type='reset']):not([type='image']), select, textarea",
    )
    .iter()
    .filter(|field| {
        let by_for = field
            .value()
            .attr("id")
            .is_some_and(|id| labelled.contains(id));
        let wrapped = field
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| a.value().name() == "label");
        !(by_for || wrapped || has_accessible_name_attr(field))
    })
    .count()
}

fn unnamed_links(document: &Html) -> usize {
    let img_alt = Selector::parse("img[alt]").ok();
    select(document, "a[href]")
        .iter()
        .filter(|link| {
            let image_named = img_alt.as_ref().is_some_and(|sel| {
                link.select(sel)
                    .any(|img| has_attr_value(&img, "alt"))
            });
            !(has_text(link) || has_accessible_name_attr(link) || image_named)
        })
        .count()
}

fn unnamed_buttons(document: &Html) -> usize {
    select(document, "button")
        .iter()
        .filter(|button| !(has_text(button) || has_accessible_name_attr(button)))
        .count()
}

fn untitled_frames(document: &Html) -> usize {
    select(document, "iframe, frame")
        .iter()
        .filter(|frame| !has_accessible_name_attr(frame))
        .count()
}

fn duplicate_ids(document: &Html) -> usize {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for element in select(document, "[id]") {
        if let Some(id) = element.value().attr("id") {
            *seen.entry(id).or_default() += 1;
        }
    }
    seen.values().filter(|n| **n > 1).map(|n| n - 1).sum()
}

fn skipped_heading_levels(document: &Html) -> usize {
    let mut previous: Option<u8> = None;
    let mut skipped = 0;

    for heading in select(document, "h1, h2, h3, h4, h5, h6") {
        let level = heading.value().name()[1..].parse::<u8>().unwrap_or(1);
        if let Some(prev) = previous {
            if level > prev + 1 {
                skipped += 1;
            }
        }
        previous = Some(level);
    }
    skipped
}

//! Author and newsletter detectors

use scraper::{Html, Selector};

const AUTHOR_SELECTORS: &[&str] = &[
    "[rel='author']",
    "[itemprop='author']",
    ".author",
    ".byline",
    ".entry-author",
];

const NEWSLETTER_KEYWORDS: &[&str] = &[
    "newsletter",
    "lettre d'information",
    "lettre d’information",
    "abonnez",
    "s'abonner",
    "subscribe",
    "mailchimp",
    "list-manage.com",
    "sendinblue",
    "brevo",
    "mailjet",
];

/// Author of the page from `meta[name=author]`, an author link or a byline
pub fn detect_author(document: &Html) -> Option<String> {
    if let Ok(meta) = Selector::parse("meta[name='author']") {
        let content = document
            .select(&meta)
            .filter_map(|el| el.value().attr("content"))
            .map(|c| c.trim().to_string())
            .find(|c| !c.is_empty());
        if content.is_some() {
            return content;
        }
    }

    AUTHOR_SELECTORS.iter().find_map(|selector| {
        let sel = Selector::parse(selector).ok()?;
        document
            .select(&sel)
            .map(|el| el.text().collect::<Vec<_>>().join(" "))
            .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
            .find(|text| !text.is_empty() && text.len() <= 80)
    })
}

/// True when a form with an email field reads like a newsletter signup
pub fn detect_newsletter(document: &Html) -> bool {
    let (Ok(forms), Ok(email)) = (
        Selector::parse("form"),
        Selector::parse("input[type='email'], input[name*='email'], input[name*='mail']"),
    ) else {
        return false;
    };

    document.select(&forms).any(|form| {
        if form.select(&email).next().is_none() {
            return false;
        }
        let markup = form.html().to_lowercase();
        NEWSLETTER_KEYWORDS.iter().any(|k| markup.contains(k))
    })
}

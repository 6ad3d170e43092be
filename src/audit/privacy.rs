use crate::audit::{DetectedTracker, LoadedPage, PrivacyResult};
use crate::browser::NavigateResponse;
use crate::scoring::privacy_score;
use crate::signatures::consent::{detect_consent_manager, looks_like_consent_text};
use crate::signatures::trackers::detect_trackers;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;

/// Reads cookies and storage keys from a rendering engine
const STORAGE_SCRIPT: &str = "JSON.stringify({cookies: document.cookie, \
    local: Object.keys(localStorage), session: Object.keys(sessionStorage)})";

/// Elements that may hold a consent banner
const BANNER_CANDIDATES: &str = "[role='dialog'], [role='alertdialog'], [aria-modal='true'], \
    [style*='position: fixed'], [style*='position:fixed'], \
    [id*='cookie'], [class*='cookie'], [id*='consent'], [class*='consent'], \
    [id*='rgpd'], [class*='rgpd'], [id*='gdpr'], [class*='gdpr']";

/// Controls a visitor uses to answer a consent banner
const CONSENT_CONTROLS: &str = "button, [role='button'], input[type='button'], input[type='submit']";

/// Resources whose URLs are treated as outbound requests
const RESOURCE_SELECTORS: &[(&str, &str)] = &[
    ("script[src]", "src"),
    ("link[href]", "href"),
    ("iframe[src]", "src"),
    ("img[src]", "src"),
];

/// Runs the privacy probe on a loaded page
///
/// A rendering engine is asked for `document.cookie` and storage keys; an
/// engine without script support falls back to the markup and headers.
pub(crate) async fn probe(page: &mut LoadedPage) -> PrivacyResult {
    let runtime = match page.page.evaluate(STORAGE_SCRIPT).await {
        Ok(value) => parse_runtime_state(&value),
        Err(e) => {
            tracing::debug!("Storage inspection unavailable for {}: {}", page.url, e);
            None
        }
    };

    let mut result = analyze_privacy(&page.response);
    if let Some((cookies, storage_keys)) = runtime {
        merge_sorted(&mut result.cookies, cookies);
        merge_sorted(&mut result.storage_keys, storage_keys);
        rescore(&mut result, &page.response);
    }
    result
}

/// Privacy analysis of a served page before any consent interaction
pub fn analyze_privacy(response: &NavigateResponse) -> PrivacyResult {
    let is_https = response.final_url.starts_with("https://");
    let document = Html::parse_document(&response.html);

    let mut cookies: BTreeSet<String> = response.cookie_names().into_iter().collect();
    let inline_scripts = inline_scripts(&document);
    for script in &inline_scripts {
        cookies.extend(cookie_writes(script));
    }

    let storage_keys: BTreeSet<String> = inline_scripts
        .iter()
        .flat_map(|s| storage_writes(s))
        .collect();

    let cookie_names: Vec<String> = cookies.into_iter().collect();
    let mut result = PrivacyResult {
        is_https,
        cookies: cookie_names,
        storage_keys: storage_keys.into_iter().collect(),
        ..Default::default()
    };
    rescore_with(&mut result, &response.html, &document);
    result
}

fn rescore(result: &mut PrivacyResult, response: &NavigateResponse) {
    let document = Html::parse_document(&response.html);
    rescore_with(result, &response.html, &document);
}

/// Recomputes trackers, banner and score from the current cookie list
fn rescore_with(result: &mut PrivacyResult, html: &str, document: &Html) {
    let mut urls = resource_urls(document);
    urls.extend(inline_scripts(document));
    let url_refs: Vec<&str> = urls.iter().map(String::as_str).collect();
    let cookie_refs: Vec<&str> = result.cookies.iter().map(String::as_str).collect();

    result.trackers = detect_trackers(&url_refs, &cookie_refs)
        .into_iter()
        .map(|t| DetectedTracker {
            name: t.name.to_string(),
            category: t.category,
        })
        .collect();

    result.consent_manager = detect_consent_manager(html, &cookie_refs).map(|m| m.name.to_string());
    result.consent_banner = result.consent_manager.is_some() || has_banner_element(document);
    result.score = Some(privacy_score(
        result.is_https,
        result.cookies.len(),
        result.trackers.len(),
        result.consent_banner,
    ));
}

fn parse_runtime_state(value: &serde_json::Value) -> Option<(Vec<String>, Vec<String>)> {
    // Engines may hand back the JSON string or the parsed object
    let parsed;
    let state = match value {
        serde_json::Value::String(s) => {
            parsed = serde_json::from_str::<serde_json::Value>(s).ok()?;
            &parsed
        }
        other => other,
    };

    let cookies = state
        .get("cookies")
        .and_then(|c| c.as_str())
        .unwrap_or("")
        .split(';')
        .filter_map(|pair| pair.split_once('=').map(|(name, _)| name.trim().to_string()))
        .filter(|name| !name.is_empty())
        .collect();

    let keys = ["local", "session"]
        .iter()
        .filter_map(|k| state.get(*k).and_then(|v| v.as_array()))
        .flatten()
        .filter_map(|v| v.as_str().map(String::from))
        .collect();

    Some((cookies, keys))
}

fn merge_sorted(target: &mut Vec<String>, extra: Vec<String>) {
    let merged: BTreeSet<String> = target.drain(..).chain(extra).collect();
    target.extend(merged);
}

fn inline_scripts(document: &Html) -> Vec<String> {
    let Ok(sel) = Selector::parse("script:not([src])") else {
        return Vec::new();
    };
    document
        .select(&sel)
        .map(|s| s.text().collect::<String>())
        .filter(|s| !s.trim().is_empty())
        .collect()
}

fn resource_urls(document: &Html) -> Vec<String> {
    let mut urls = Vec::new();
    for (selector, attr) in RESOURCE_SELECTORS {
        if let Ok(sel) = Selector::parse(selector) {
            urls.extend(
                document
                    .select(&sel)
                    .filter_map(|el| el.value().attr(attr))
                    .map(String::from),
            );
        }
    }
    urls
}

/// Cookie names written by `document.cookie = "name=value..."`
fn cookie_writes(script: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = script;
    while let Some(pos) = rest.find("document.cookie") {
        rest = &rest[pos + "document.cookie".len()..];
        let assignment = rest.trim_start();
        let Some(value) = assignment
            .strip_prefix('=')
            .filter(|v| !v.starts_with('='))
        else {
            continue;
        };
        let value = value.trim_start().trim_start_matches(['"', '\'', '`']);
        if let Some((name, _)) = value.split_once('=') {
            let name = name.trim();
            if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || "_-.".contains(c)) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Keys written by `localStorage.setItem("key", ...)` and its session twin
fn storage_writes(script: &str) -> Vec<String> {
    let mut keys = Vec::new();
    for marker in ["localStorage.setItem(", "sessionStorage.setItem("] {
        for (pos, _) in script.match_indices(marker) {
            let args = script[pos + marker.len()..].trim_start();
            let Some(quote) = args.chars().next().filter(|c| matches!(c, '"' | '\'' | '`')) else {
                continue;
            };
            if let Some(end) = args[1..].find(quote) {
                let key = &args[1..1 + end];
                if !key.is_empty() {
                    keys.push(key.to_string());
                }
            }
        }
    }
    keys
}

fn is_hidden(element: &ElementRef) -> bool {
    let attrs = element.value();
    let style = attrs.attr("style").unwrap_or("").replace(' ', "").to_lowercase();
    attrs.attr("hidden").is_some()
        || attrs.attr("aria-hidden") == Some("true")
        || style.contains("display:none")
        || style.contains("visibility:hidden")
}

/// A visible candidate with consent wording and at least one answer control
///
/// Footer links to a cookie policy carry the wording but offer no choice,
/// so they do not count.
fn has_banner_element(document: &Html) -> bool {
    let (Ok(sel), Ok(controls)) = (
        Selector::parse(BANNER_CANDIDATES),
        Selector::parse(CONSENT_CONTROLS),
    ) else {
        return false;
    };
    document.select(&sel).any(|el| {
        !is_hidden(&el)
            && el.select(&controls).next().is_some()
            && looks_like_consent_text(&el.text().collect::<Vec<_>>().join(" "))
    })
}

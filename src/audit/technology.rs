use crate::audit::TechnologyFingerprint;
use crate::classify::{detect_author, detect_newsletter};
use crate::signatures::consent::detect_consent_manager;
use crate::signatures::plugins::detect_plugins;
use crate::signatures::technology::{detect_cms, detect_frameworks, parse_generator};
use crate::signatures::trackers::{detect_trackers, TrackerCategory};
use scraper::{Html, Selector};

/// What the technology probe looks at
#[derive(Debug, Clone, Copy)]
pub struct TechnologyInput<'a> {
    pub html: &'a str,
    /// Response headers, names lowercased
    pub headers: &'a [(String, String)],
    pub cookies: &'a [String],
}

/// Technology fingerprint database
pub trait TechnologySignatureDb: Send + Sync {
    fn detect(&self, input: &TechnologyInput<'_>) -> TechnologyFingerprint;
}

/// Fingerprints from the built-in signature tables
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticSignatureDb;

impl TechnologySignatureDb for StaticSignatureDb {
    fn detect(&self, input: &TechnologyInput<'_>) -> TechnologyFingerprint {
        let document = Html::parse_document(input.html);
        let scripts = attr_values(&document, "script[src]", "src");
        let generator = attr_values(&document, "meta[name='generator']", "content")
            .into_iter()
            .next();

        let header_lines: Vec<String> = input
            .headers
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect();

        let mut haystacks: Vec<&str> = vec![input.html];
        haystacks.extend(scripts.iter().map(String::as_str));
        haystacks.extend(header_lines.iter().map(String::as_str));
        haystacks.extend(input.cookies.iter().map(String::as_str));

        let (cms, cms_version) = match generator.as_deref().and_then(parse_generator) {
            Some((name, version)) => (Some(name), version),
            None => (detect_cms(&haystacks).map(|s| s.name), None),
        };

        let frameworks = detect_frameworks(&haystacks)
            .into_iter()
            .map(|s| s.name.to_string())
            .collect();

        let cookie_refs: Vec<&str> = input.cookies.iter().map(String::as_str).collect();
        let consent_manager =
            detect_consent_manager(input.html, &cookie_refs).map(|m| m.name.to_string());

        let script_refs: Vec<&str> = scripts.iter().map(String::as_str).collect();
        let analytics = detect_trackers(&script_refs, &cookie_refs)
            .into_iter()
            .filter(|t| t.category == TrackerCategory::Analytics)
            .map(|t| t.name.to_string())
            .collect();

        let plugins = cms
            .map(|name| detect_plugins(name, input.html))
            .unwrap_or_default();

        TechnologyFingerprint {
            cms: cms.map(String::from),
            cms_version,
            frameworks,
            consent_manager,
            analytics,
            plugins,
            author: detect_author(&document),
            has_newsletter: detect_newsletter(&document),
            error: None,
        }
    }
}

fn attr_values(document: &Html, selector: &str, attr: &str) -> Vec<String> {
    let Ok(sel) = Selector::parse(selector) else {
        return Vec::new();
    };
    document
        .select(&sel)
        .filter_map(|el| el.value().attr(attr))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

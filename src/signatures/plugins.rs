//! Plugin detection for known CMSes
//!
//! Plugins are found by their asset paths (`/wp-content/plugins/<slug>/` and
//! friends). Known slugs get a display name from [`PLUGIN_NAMES`], a single
//! lookup table built on first use and shared for the life of the process.

use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};

/// Where each CMS serves plugin assets from
const PLUGIN_PATHS: &[(&str, &[&str])] = &[
    ("WordPress", &["/wp-content/plugins/"]),
    ("Drupal", &["/modules/contrib/", "/sites/all/modules/"]),
    ("Joomla", &["/components/com_", "/plugins/system/", "/modules/mod_"]),
    ("PrestaShop", &["/modules/"]),
];

/// (cms, slug, display name)
const KNOWN_PLUGINS: &[(&str, &str, &str)] = &[
    ("WordPress", "contact-form-7", "Contact Form 7"),
    ("WordPress", "woocommerce", "WooCommerce"),
    ("WordPress", "elementor", "Elementor"),
    ("WordPress", "elementor-pro", "Elementor Pro"),
    ("WordPress", "wordpress-seo", "Yoast SEO"),
    ("WordPress", "seo-by-rank-math", "Rank Math"),
    ("WordPress", "jetpack", "Jetpack"),
    ("WordPress", "wpforms-lite", "WPForms"),
    ("WordPress", "gravityforms", "Gravity Forms"),
    ("WordPress", "revslider", "Slider Revolution"),
    ("WordPress", "js_composer", "WPBakery Page Builder"),
    ("WordPress", "wp-rocket", "WP Rocket"),
    ("WordPress", "litespeed-cache", "LiteSpeed Cache"),
    ("WordPress", "complianz-gdpr", "Complianz"),
    ("WordPress", "cookie-notice", "Cookie Notice"),
    ("WordPress", "cookie-law-info", "CookieYes"),
    ("WordPress", "wp-accessibility", "WP Accessibility"),
    ("WordPress", "the-events-calendar", "The Events Calendar"),
    ("WordPress", "sitepress-multilingual-cms", "WPML"),
    ("WordPress", "polylang", "Polylang"),
    ("Drupal", "webform", "Webform"),
    ("Drupal", "views_slideshow", "Views Slideshow"),
    ("Drupal", "eu_cookie_compliance", "EU Cookie Compliance"),
    ("Drupal", "google_analytics", "Google Analytics"),
    ("Drupal", "paragraphs", "Paragraphs"),
    ("Joomla", "k2", "K2"),
    ("Joomla", "virtuemart", "VirtueMart"),
    ("Joomla", "akeeba", "Akeeba Backup"),
    ("Joomla", "rsform", "RSForm! Pro"),
    ("PrestaShop", "ps_shoppingcart", "Shopping Cart"),
    ("PrestaShop", "ps_facetedsearch", "Faceted Search"),
    ("PrestaShop", "ps_googleanalytics", "Google Analytics"),
    ("PrestaShop", "blockreassurance", "Customer Reassurance"),
];

/// Display names keyed by cms, then slug
pub static PLUGIN_NAMES: Lazy<HashMap<&'static str, HashMap<&'static str, &'static str>>> =
    Lazy::new(|| {
        let mut table: HashMap<&'static str, HashMap<&'static str, &'static str>> = HashMap::new();
        for (cms, slug, name) in KNOWN_PLUGINS {
            table.entry(*cms).or_default().insert(*slug, *name);
        }
        table
    });

/// Plugins of `cms` referenced by `html`, sorted and deduplicated
///
/// Unknown slugs are reported as-is.
pub fn detect_plugins(cms: &str, html: &str) -> Vec<String> {
    let Some((cms, prefixes)) = PLUGIN_PATHS.iter().find(|(name, _)| *name == cms) else {
        return Vec::new();
    };

    let lowered = html.to_lowercase();
    let mut found = BTreeSet::new();

    for prefix in prefixes.iter() {
        for (start, _) in lowered.match_indices(prefix) {
            let slug = read_slug(&lowered[start + prefix.len()..]);
            if slug.is_empty() {
                continue;
            }
            let name = PLUGIN_NAMES
                .get(*cms)
                .and_then(|names| names.get(slug))
                .map(|n| n.to_string())
                .unwrap_or_else(|| slug.to_string());
            found.insert(name);
        }
    }

    found.into_iter().collect()
}

/// Slug characters up to the next path separator
fn read_slug(rest: &str) -> &str {
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    // A slug must be followed by a path separator to count
    if rest[end..].starts_with('/') {
        &rest[..end]
    } else {
        ""
    }
}

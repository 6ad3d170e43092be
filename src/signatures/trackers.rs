use super::{match_table, MatchMode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of third-party tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerCategory {
    Analytics,
    Advertising,
    Social,
    Font,
    Other,
}

impl fmt::Display for TrackerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrackerCategory::Analytics => "analytics",
            TrackerCategory::Advertising => "advertising",
            TrackerCategory::Social => "social",
            TrackerCategory::Font => "font",
            TrackerCategory::Other => "other",
        };
        f.write_str(s)
    }
}

/// A third-party tracker, recognized by request host or cookie prefix
#[derive(Debug)]
pub struct TrackerSignature {
    pub name: &'static str,
    pub category: TrackerCategory,
    /// Substrings of request and script URLs
    pub hosts: &'static [&'static str],
    /// Cookie name prefixes
    pub cookies: &'static [&'static str],
}

pub const TRACKERS: &[TrackerSignature] = &[
    TrackerSignature {
        name: "Google Analytics",
        category: TrackerCategory::Analytics,
        hosts: &["google-analytics.com", "googletagmanager.com/gtag/js", "analytics.js"],
        cookies: &["_ga", "_gid", "_gat", "__utm"],
    },
    TrackerSignature {
        name: "Google Tag Manager",
        category: TrackerCategory::Analytics,
        hosts: &["googletagmanager.com/gtm.js", "googletagmanager.com/ns.html"],
        cookies: &[],
    },
    TrackerSignature {
        name: "Matomo",
        category: TrackerCategory::Analytics,
        hosts: &["matomo.js", "piwik.js", "matomo.cloud"],
        cookies: &["_pk_id", "_pk_ses", "mtm_"],
    },
    TrackerSignature {
        name: "AT Internet",
        category: TrackerCategory::Analytics,
        hosts: &["xiti.com", "ati-host.net", "smarttag.js"],
        cookies: &["atuserid", "atidvisitor"],
    },
    TrackerSignature {
        name: "Hotjar",
        category: TrackerCategory::Analytics,
        hosts: &["hotjar.com"],
        cookies: &["_hj"],
    },
    TrackerSignature {
        name: "Microsoft Clarity",
        category: TrackerCategory::Analytics,
        hosts: &["clarity.ms"],
        cookies: &["_clck", "_clsk"],
    },
    TrackerSignature {
        name: "Yandex Metrica",
        category: TrackerCategory::Analytics,
        hosts: &["mc.yandex.ru"],
        cookies: &["_ym_"],
    },
    TrackerSignature {
        name: "Google Ads",
        category: TrackerCategory::Advertising,
        hosts: &["doubleclick.net", "googleadservices.com", "googlesyndication.com"],
        cookies: &["_gcl_", "test_cookie"],
    },
    TrackerSignature {
        name: "Meta Pixel",
        category: TrackerCategory::Advertising,
        hosts: &["connect.facebook.net", "facebook.com/tr"],
        cookies: &["_fbp", "_fbc"],
    },
    TrackerSignature {
        name: "LinkedIn Insight",
        category: TrackerCategory::Advertising,
        hosts: &["snap.licdn.com", "px.ads.linkedin.com"],
        cookies: &["li_sugr", "bcookie", "lidc"],
    },
    TrackerSignature {
        name: "Microsoft Advertising",
        category: TrackerCategory::Advertising,
        hosts: &["bat.bing.com"],
        cookies: &["_uetsid", "_uetvid"],
    },
    TrackerSignature {
        name: "TikTok Pixel",
        category: TrackerCategory::Advertising,
        hosts: &["analytics.tiktok.com"],
        cookies: &["_ttp"],
    },
    TrackerSignature {
        name: "Criteo",
        category: TrackerCategory::Advertising,
        hosts: &["criteo.com", "criteo.net"],
        cookies: &["cto_bundle"],
    },
    TrackerSignature {
        name: "X (Twitter)",
        category: TrackerCategory::Social,
        hosts: &["platform.twitter.com", "static.ads-twitter.com"],
        cookies: &[],
    },
    TrackerSignature {
        name: "YouTube",
        category: TrackerCategory::Social,
        hosts: &["youtube.com/embed", "youtube.com/iframe_api"],
        cookies: &["ysc", "visitor_info1_live"],
    },
    TrackerSignature {
        name: "AddThis",
        category: TrackerCategory::Social,
        hosts: &["addthis.com"],
        cookies: &["__atuvc"],
    },
    TrackerSignature {
        name: "Google Fonts",
        category: TrackerCategory::Font,
        hosts: &["fonts.googleapis.com", "fonts.gstatic.com"],
        cookies: &[],
    },
    TrackerSignature {
        name: "Adobe Fonts",
        category: TrackerCategory::Font,
        hosts: &["use.typekit.net"],
        cookies: &[],
    },
    TrackerSignature {
        name: "Google reCAPTCHA",
        category: TrackerCategory::Other,
        hosts: &["google.com/recaptcha", "gstatic.com/recaptcha"],
        cookies: &[],
    },
];

/// Trackers whose host appears in one of `urls`
pub fn trackers_in_urls(urls: &[&str]) -> Vec<&'static TrackerSignature> {
    match_table(TRACKERS, |t| t.hosts, urls, MatchMode::Contains)
}

/// Trackers owning one of `cookie_names`
pub fn trackers_in_cookies(cookie_names: &[&str]) -> Vec<&'static TrackerSignature> {
    match_table(TRACKERS, |t| t.cookies, cookie_names, MatchMode::Prefix)
}

/// Trackers seen in either URLs or cookies, each listed once in table order
pub fn detect_trackers(urls: &[&str], cookie_names: &[&str]) -> Vec<&'static TrackerSignature> {
    let by_url = trackers_in_urls(urls);
    let by_cookie = trackers_in_cookies(cookie_names);

    TRACKERS
        .iter()
        .filter(|t| {
            by_url.iter().any(|u| std::ptr::eq(*u, *t))
                || by_cookie.iter().any(|c| std::ptr::eq(*c, *t))
        })
        .collect()
}

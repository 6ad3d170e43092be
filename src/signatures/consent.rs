use super::{first_match, keyword_hits, MatchMode};

/// A consent-management platform
#[derive(Debug)]
pub struct ConsentManager {
    pub name: &'static str,
    /// Substrings of markup or script URLs
    pub markers: &'static [&'static str],
    /// Cookie name prefixes the platform sets
    pub cookies: &'static [&'static str],
}

pub const CONSENT_MANAGERS: &[ConsentManager] = &[
    ConsentManager {
        name: "Axeptio",
        markers: &["axeptio"],
        cookies: &["axeptio_"],
    },
    ConsentManager {
        name: "Didomi",
        markers: &["didomi"],
        cookies: &["didomi_token", "euconsent"],
    },
    ConsentManager {
        name: "tarteaucitron",
        markers: &["tarteaucitron"],
        cookies: &["tarteaucitron"],
    },
    ConsentManager {
        name: "OneTrust",
        markers: &["onetrust", "optanon", "cookielaw.org"],
        cookies: &["optanonconsent", "optanonalertboxclosed"],
    },
    ConsentManager {
        name: "Cookiebot",
        markers: &["cookiebot"],
        cookies: &["cookieconsent"],
    },
    ConsentManager {
        name: "CookieYes",
        markers: &["cookieyes", "cky-consent"],
        cookies: &["cookieyes-consent"],
    },
    ConsentManager {
        name: "Complianz",
        markers: &["cmplz", "complianz"],
        cookies: &["cmplz_"],
    },
    ConsentManager {
        name: "Usercentrics",
        markers: &["usercentrics"],
        cookies: &["uc_settings", "uc_user_interaction"],
    },
    ConsentManager {
        name: "Sirdata",
        markers: &["sddan.com", "sirdata"],
        cookies: &[],
    },
    ConsentManager {
        name: "Iubenda",
        markers: &["iubenda"],
        cookies: &["_iub_cs"],
    },
    ConsentManager {
        name: "Quantcast Choice",
        markers: &["quantcast.mgr", "qc-cmp2"],
        cookies: &["addtl_consent"],
    },
    ConsentManager {
        name: "Cookie Notice",
        markers: &["cookie-notice-container", "cn-notice-text"],
        cookies: &["cookie_notice_accepted"],
    },
];

/// Words that show up in consent banners, French and English
pub const CONSENT_KEYWORDS: &[&str] = &[
    "cookie",
    "consent",
    "accepter",
    "accept",
    "refuser",
    "reject",
    "decline",
    "personnaliser",
    "customize",
    "paramétrer",
    "traceurs",
    "rgpd",
    "gdpr",
    "vie privée",
    "privacy",
];

/// Minimum distinct consent keywords for the banner heuristic
pub const MIN_CONSENT_KEYWORDS: usize = 2;

/// Consent manager recognized from markup or cookie names
pub fn detect_consent_manager(markup: &str, cookie_names: &[&str]) -> Option<&'static ConsentManager> {
    first_match(CONSENT_MANAGERS, |m| m.markers, &[markup], MatchMode::Contains)
        .or_else(|| first_match(CONSENT_MANAGERS, |m| m.cookies, cookie_names, MatchMode::Prefix))
}

/// True when `text` reads like a consent banner
pub fn looks_like_consent_text(text: &str) -> bool {
    keyword_hits(CONSENT_KEYWORDS, text) >= MIN_CONSENT_KEYWORDS
}

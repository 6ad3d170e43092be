use super::{first_match, match_table, MatchMode};

/// A named technology recognized by substrings of the page
#[derive(Debug)]
pub struct TechSignature {
    pub name: &'static str,
    pub patterns: &'static [&'static str],
}

/// Content management systems, most specific first
pub const CMS_SIGNATURES: &[TechSignature] = &[
    TechSignature {
        name: "WordPress",
        patterns: &["/wp-content/", "/wp-includes/", "wp-json", "wordpress_"],
    },
    TechSignature {
        name: "Drupal",
        patterns: &["drupal-settings-json", "/sites/default/files/", "drupal.js", "x-drupal-cache"],
    },
    TechSignature {
        name: "Joomla",
        patterns: &["/media/jui/", "/media/system/js/", "/components/com_", "joomla"],
    },
    TechSignature {
        name: "PrestaShop",
        patterns: &["prestashop", "/modules/ps_", "/themes/classic/assets/"],
    },
    TechSignature {
        name: "TYPO3",
        patterns: &["typo3conf/", "typo3temp/"],
    },
    TechSignature {
        name: "SPIP",
        patterns: &["spip.php", "/squelettes/", "x-spip-cache"],
    },
    TechSignature {
        name: "Magento",
        patterns: &["mage/cookies", "magento", "/static/version"],
    },
    TechSignature {
        name: "Shopify",
        patterns: &["cdn.shopify.com", "shopify.theme"],
    },
    TechSignature {
        name: "Wix",
        patterns: &["static.wixstatic.com", "x-wix-request-id"],
    },
    TechSignature {
        name: "Squarespace",
        patterns: &["static1.squarespace.com", "squarespace-cdn"],
    },
    TechSignature {
        name: "Webflow",
        patterns: &["data-wf-site", "webflow.js"],
    },
    TechSignature {
        name: "Ghost",
        patterns: &["ghost-portal", "content=\"ghost"],
    },
];

/// Front-end frameworks and libraries
pub const FRAMEWORK_SIGNATURES: &[TechSignature] = &[
    TechSignature {
        name: "Next.js",
        patterns: &["__next_data__", "/_next/static/"],
    },
    TechSignature {
        name: "Nuxt",
        patterns: &["__nuxt", "/_nuxt/"],
    },
    TechSignature {
        name: "Gatsby",
        patterns: &["___gatsby"],
    },
    TechSignature {
        name: "React",
        patterns: &["data-reactroot", "react-dom", "react.production.min.js"],
    },
    TechSignature {
        name: "Vue.js",
        patterns: &["data-v-app", "vue.min.js", "vue.global", "vue.runtime"],
    },
    TechSignature {
        name: "Angular",
        patterns: &["ng-version=", "ng-app"],
    },
    TechSignature {
        name: "Svelte",
        patterns: &["svelte-"],
    },
    TechSignature {
        name: "Alpine.js",
        patterns: &["alpinejs", "x-data="],
    },
    TechSignature {
        name: "jQuery",
        patterns: &["jquery"],
    },
    TechSignature {
        name: "Bootstrap",
        patterns: &["bootstrap.min.css", "bootstrap.min.js", "bootstrap.bundle"],
    },
];

/// CMS recognized from any of the haystacks
pub fn detect_cms(haystacks: &[&str]) -> Option<&'static TechSignature> {
    first_match(CMS_SIGNATURES, |s| s.patterns, haystacks, MatchMode::Contains)
}

pub fn detect_frameworks(haystacks: &[&str]) -> Vec<&'static TechSignature> {
    match_table(FRAMEWORK_SIGNATURES, |s| s.patterns, haystacks, MatchMode::Contains)
}

/// Splits a generator meta value such as `WordPress 6.4.2` into a known CMS
/// name and its version
pub fn parse_generator(generator: &str) -> Option<(&'static str, Option<String>)> {
    let lowered = generator.to_lowercase();
    let cms = CMS_SIGNATURES
        .iter()
        .find(|s| lowered.starts_with(&s.name.to_lowercase()))?;

    let version = generator
        .get(cms.name.len()..)
        .unwrap_or("")
        .split_whitespace()
        .next()
        .map(|v| v.trim_start_matches(['v', 'V']))
        .filter(|v| v.chars().next().is_some_and(|c| c.is_ascii_digit()))
        .map(|v| {
            v.chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect::<String>()
        });

    Some((cms.name, version))
}

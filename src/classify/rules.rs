//! Ordered classification rules, most specific first

use super::Category;

/// Keyword rule matched against the URL path and the page headings
#[derive(Debug)]
pub struct CategoryRule {
    pub category: Category,
    /// Substrings of the lowercased URL path
    pub path_keywords: &'static [&'static str],
    /// Substrings of the lowercased `<title>` and first `<h1>`
    pub title_keywords: &'static [&'static str],
}

/// Structural rule: at least `min_count` elements match `selector`
#[derive(Debug)]
pub struct DomRule {
    pub category: Category,
    pub selector: &'static str,
    pub min_count: usize,
}

/// Paths that designate the home page
pub const HOMEPAGE_PATHS: &[&str] = &[
    "/",
    "/index.html",
    "/index.php",
    "/accueil",
    "/home",
    "/fr",
    "/en",
];

pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Accessibility,
        path_keywords: &["accessibilite", "accessibility", "rgaa"],
        title_keywords: &["accessibilité", "accessibilite", "accessibility"],
    },
    CategoryRule {
        category: Category::LegalNotices,
        path_keywords: &[
            "mentions-legales",
            "mentions_legales",
            "legal-notice",
            "legal",
            "cgu",
            "cgv",
            "conditions-generales",
            "terms",
            "confidentialite",
            "privacy",
            "donnees-personnelles",
            "rgpd",
            "cookies",
        ],
        title_keywords: &[
            "mentions légales",
            "mentions legales",
            "legal notice",
            "conditions générales",
            "terms of",
            "confidentialité",
            "privacy policy",
            "données personnelles",
            "politique cookies",
        ],
    },
    CategoryRule {
        category: Category::Sitemap,
        path_keywords: &["plan-du-site", "plan-site", "plan_du_site", "sitemap"],
        title_keywords: &["plan du site", "sitemap", "site map"],
    },
    CategoryRule {
        category: Category::Contact,
        path_keywords: &["contact", "nous-joindre", "coordonnees"],
        title_keywords: &["contact", "nous joindre", "coordonnées"],
    },
    CategoryRule {
        category: Category::Authentication,
        path_keywords: &[
            "login",
            "connexion",
            "signin",
            "sign-in",
            "se-connecter",
            "mon-compte",
            "my-account",
            "espace-client",
            "register",
            "inscription",
        ],
        title_keywords: &["connexion", "se connecter", "log in", "sign in", "mon compte", "espace client"],
    },
    CategoryRule {
        category: Category::Help,
        path_keywords: &["aide", "help", "faq", "support", "assistance"],
        title_keywords: &["aide", "help", "faq", "foire aux questions", "support"],
    },
    CategoryRule {
        category: Category::MultiStepProcess,
        path_keywords: &["checkout", "commande", "panier", "demarche", "etape", "step"],
        title_keywords: &["étape", "etape", "step", "commande", "panier", "démarche"],
    },
    CategoryRule {
        category: Category::Form,
        path_keywords: &["formulaire", "devis", "quote", "demande", "reservation", "booking"],
        title_keywords: &["formulaire", "devis", "demande", "réservation", "booking"],
    },
    CategoryRule {
        category: Category::Document,
        path_keywords: &["documents", "telechargement", "download", "publications", "ressources"],
        title_keywords: &["documents", "téléchargement", "download", "publications"],
    },
    CategoryRule {
        category: Category::Multimedia,
        path_keywords: &["video", "galerie", "gallery", "photos", "mediatheque", "podcast"],
        title_keywords: &["vidéo", "video", "galerie", "gallery", "photos", "médiathèque", "podcast"],
    },
    CategoryRule {
        category: Category::Table,
        path_keywords: &["tableau", "horaires", "tarifs", "pricing", "resultats"],
        title_keywords: &["tableau", "horaires", "tarifs", "pricing"],
    },
    CategoryRule {
        category: Category::DistinctLayout,
        path_keywords: &["actualites", "actualite", "news", "blog", "agenda", "evenements", "events"],
        title_keywords: &["actualités", "actualites", "news", "blog", "agenda", "événements"],
    },
];

pub const DOM_RULES: &[DomRule] = &[
    DomRule {
        category: Category::Authentication,
        selector: "input[type='password']",
        min_count: 1,
    },
    DomRule {
        category: Category::MultiStepProcess,
        selector: "[aria-current='step'], .steps, .stepper, .progress-steps, .wizard-step",
        min_count: 1,
    },
    DomRule {
        category: Category::Form,
        selector: "form textarea, form select, form input:not([type='hidden']):not([type='search']):not([type='submit']):not([type='button'])",
        min_count: 3,
    },
    DomRule {
        category: Category::Table,
        selector: "table th",
        min_count: 2,
    },
    DomRule {
        category: Category::Multimedia,
        selector: MEDIA_SELECTOR,
        min_count: 1,
    },
    DomRule {
        category: Category::Document,
        selector: DOCUMENT_LINK_SELECTOR,
        min_count: 3,
    },
];

pub const MEDIA_SELECTOR: &str = "video, audio, iframe[src*='youtube'], iframe[src*='vimeo'], iframe[src*='dailymotion']";

pub const DOCUMENT_LINK_SELECTOR: &str = "a[href$='.pdf'], a[href$='.PDF'], a[href$='.doc'], a[href$='.docx'], a[href$='.odt'], a[href$='.xls'], a[href$='.xlsx'], a[href$='.ods'], a[href$='.ppt'], a[href$='.pptx']";

pub const AUTH_SELECTOR: &str = "input[type='password'], form[action*='login'], form[action*='connexion']";

pub const CONFIDENCE_PATH: f32 = 0.9;
pub const CONFIDENCE_TITLE: f32 = 0.7;
pub const CONFIDENCE_DOM: f32 = 0.6;
pub const CONFIDENCE_FALLBACK: f32 = 0.3;

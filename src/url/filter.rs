use crate::url::matcher::matches_path_pattern;
use std::fmt;
use url::Url;

/// File extensions that are never fetched as pages
const STATIC_ASSET_EXTENSIONS: &[&str] = &[
    // images
    "jpg", "jpeg", "png", "gif", "svg", "webp", "avif", "ico", "bmp", "tif", "tiff",
    // styles, scripts, fonts
    "css", "js", "mjs", "map", "woff", "woff2", "ttf", "otf", "eot",
    // media
    "mp3", "mp4", "m4a", "webm", "ogg", "ogv", "wav", "avi", "mov",
    // documents and archives
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "rtf", "csv",
    "zip", "gz", "tar", "rar", "7z", "exe", "dmg",
    // feeds and data
    "xml", "json", "rss", "atom", "txt",
];

/// Why a URL was not fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Path matched an exclude pattern
    Excluded(String),
    /// Path ends in a static asset extension
    StaticAsset(String),
    /// An allow-list is configured and the path matched none of it
    NotIncluded,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excluded(pattern) => write!(f, "excluded by pattern '{}'", pattern),
            Self::StaticAsset(ext) => write!(f, "static asset (.{})", ext),
            Self::NotIncluded => write!(f, "not matched by any include pattern"),
        }
    }
}

/// Returns the static asset extension of a path, if any
pub fn static_asset_extension(path: &str) -> Option<&'static str> {
    let last_segment = path.rsplit('/').next()?;
    let (_, ext) = last_segment.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    STATIC_ASSET_EXTENSIONS
        .iter()
        .copied()
        .find(|candidate| *candidate == ext)
}

/// Applies the crawl skip rules to a URL
///
/// Rules are checked in order: exclude patterns, static assets, allow-list.
/// Returns `None` when the URL may be fetched.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitewarden::url::{skip_reason, SkipReason};
///
/// let url = Url::parse("https://example.com/logo.png").unwrap();
/// assert_eq!(skip_reason(&url, &[], &[]), Some(SkipReason::StaticAsset("png".into())));
/// ```
pub fn skip_reason(url: &Url, include: &[String], exclude: &[String]) -> Option<SkipReason> {
    let path = url.path();

    if let Some(pattern) = exclude.iter().find(|p| matches_path_pattern(p, path)) {
        return Some(SkipReason::Excluded(pattern.clone()));
    }

    if let Some(ext) = static_asset_extension(path) {
        return Some(SkipReason::StaticAsset(ext.to_string()));
    }

    if !include.is_empty() && !include.iter().any(|p| matches_path_pattern(p, path)) {
        return Some(SkipReason::NotIncluded);
    }

    None
}

use crate::UrlError;
use url::Url;

/// Tracking query parameters dropped during normalization
const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "msclkid", "mc_eid", "mc_cid", "yclid", "_ga", "_gl", "ref", "source",
];

/// Normalizes a URL into the canonical form used as the crawl dedup key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or not HTTP(S)
/// 2. Remove fragment (everything after #)
/// 3. Lowercase path and query (the host is lowercased by the parser)
/// 4. Collapse empty path segments, remove the trailing slash (except for root /)
/// 5. Remove tracking query parameters, keeping the others in their original order
/// 6. Remove empty query string (trailing ?)
///
/// Scheme, host and port are kept as they are. Normalization is idempotent.
///
/// # Examples
///
/// ```
/// use sitewarden::url::normalize_url;
///
/// let url = normalize_url("https://Example.com/Contact/?utm_source=mail#form").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/contact");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    let path = normalize_path(&url.path().to_lowercase());
    url.set_path(&path);

    if let Some(query) = url.query().map(str::to_lowercase) {
        let kept = strip_tracking_params(&query);
        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&kept));
        }
    }

    Ok(url)
}

/// Normalizes a URL string and returns the key as a string
pub fn normalized_key(url_str: &str) -> Result<String, UrlError> {
    normalize_url(url_str).map(String::from)
}

/// Collapses repeated slashes and removes the trailing slash
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}

/// Drops tracking parameters from a raw query string
///
/// Works on the raw `key=value` segments so the surviving parameters keep their
/// original encoding; re-encoding decoded pairs would not be idempotent.
fn strip_tracking_params(query: &str) -> String {
    query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter(|segment| {
            let key = segment.split('=').next().unwrap_or_default();
            !is_tracking_param(key)
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}

use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitewarden::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Strips a leading `www.` so `www.example.com` and `example.com` compare equal
fn site_host(url: &Url) -> Option<String> {
    extract_domain(url).map(|host| match host.strip_prefix("www.") {
        Some(bare) => bare.to_string(),
        None => host,
    })
}

/// Checks whether `candidate` belongs to the same site as `base`
///
/// Two URLs are on the same site when their hosts match (ignoring a leading
/// `www.`) and their explicit ports match. The scheme is ignored so that a
/// site linking between its http and https versions is still crawled as one.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitewarden::url::is_same_origin;
///
/// let base = Url::parse("https://www.example.com/").unwrap();
/// assert!(is_same_origin(&Url::parse("http://example.com/a").unwrap(), &base));
/// assert!(!is_same_origin(&Url::parse("https://blog.example.com/").unwrap(), &base));
/// ```
pub fn is_same_origin(candidate: &Url, base: &Url) -> bool {
    match (site_host(candidate), site_host(base)) {
        (Some(a), Some(b)) => a == b && candidate.port() == base.port(),
        _ => false,
    }
}

/// Moves a same-site URL onto the scheme and host of `base`
///
/// Returns `None` when `candidate` is on another site. Links to the http or
/// `www.` variant of a site then share a dedup key with the pages already
/// queued from `base`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitewarden::url::align_to_site;
///
/// let base = Url::parse("https://example.com/").unwrap();
/// let link = Url::parse("http://www.example.com/Contact").unwrap();
/// assert_eq!(
///     align_to_site(&link, &base).unwrap().as_str(),
///     "https://example.com/Contact"
/// );
/// ```
pub fn align_to_site(candidate: &Url, base: &Url) -> Option<Url> {
    if !is_same_origin(candidate, base) {
        return None;
    }

    let mut aligned = candidate.clone();
    if aligned.scheme() != base.scheme() {
        aligned.set_scheme(base.scheme()).ok()?;
    }
    if aligned.host_str() != base.host_str() {
        aligned.set_host(base.host_str()).ok()?;
    }
    Some(aligned)
}

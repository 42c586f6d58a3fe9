// src/crawl/resolve.rs
// =============================================================================
// Turns the hrefs found on a page into absolute, comparable URLs and decides
// whether they belong to the site being crawled.
//
// Url::join does the RFC 3986 work:
//   base = "https://example.com/docs/page"
//   href = "intro"     -> "https://example.com/docs/intro"
//   href = "../about"  -> "https://example.com/about"
//   href = "//cdn.com" -> "https://cdn.com/"
// =============================================================================

use url::Url;

// Resolves a link (possibly relative) to an absolute URL
//
// Returns None for links that can never be crawled:
// - empty and fragment-only hrefs (same page)
// - non-HTTP schemes (mailto:, tel:, javascript:, data:, ...)
// - values the URL parser rejects
//
// The fragment is removed, "/page#a" and "/page#b" are the same page.
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    url.set_fragment(None);
    Some(url)
}

/// True when `url` is on the same host (and explicit port) as the seed.
///
/// The scheme is not compared, so an https site that links to its own http
/// pages is still one site. Default ports are normalized away by the url
/// crate, so `https://example.com:443/` matches `https://example.com/`.
pub fn is_same_host(url: &Url, seed: &Url) -> bool {
    match (url.host_str(), seed.host_str()) {
        (Some(host), Some(seed_host)) => {
            host.eq_ignore_ascii_case(seed_host) && url.port() == seed.port()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/docs/page").unwrap()
    }

    fn resolved(href: &str) -> Option<String> {
        resolve_link(&base(), href).map(String::from)
    }

    #[test]
    fn test_resolve_absolute_link() {
        assert_eq!(resolved("https://other.com"), Some("https://other.com/".to_string()));
    }

    #[test]
    fn test_resolve_relative_link() {
        assert_eq!(resolved("/root"), Some("https://example.com/root".to_string()));
        assert_eq!(resolved("intro"), Some("https://example.com/docs/intro".to_string()));
        assert_eq!(resolved("../about"), Some("https://example.com/about".to_string()));
    }

    #[test]
    fn test_resolve_keeps_query() {
        assert_eq!(
            resolved("search?q=rust"),
            Some("https://example.com/docs/search?q=rust".to_string())
        );
    }

    #[test]
    fn test_resolve_protocol_relative() {
        assert_eq!(resolved("//cdn.example.net/lib.js"), Some("https://cdn.example.net/lib.js".to_string()));
    }

    #[test]
    fn test_fragment_is_stripped() {
        assert_eq!(resolved("/guide#install"), Some("https://example.com/guide".to_string()));
    }

    #[test]
    fn test_skip_anchor_and_empty() {
        assert_eq!(resolved("#section"), None);
        assert_eq!(resolved(""), None);
        assert_eq!(resolved("   "), None);
    }

    #[test]
    fn test_skip_special_schemes() {
        assert_eq!(resolved("mailto:test@example.com"), None);
        assert_eq!(resolved("tel:+123456"), None);
        assert_eq!(resolved("javascript:void(0)"), None);
        assert_eq!(resolved("data:text/plain,hi"), None);
        assert_eq!(resolved("ftp://example.com/file"), None);
    }

    #[test]
    fn test_skip_unparseable() {
        assert_eq!(resolved("http://[::1"), None);
    }

    #[test]
    fn test_same_host() {
        let seed = Url::parse("https://example.com/").unwrap();
        let same = |s: &str| is_same_host(&Url::parse(s).unwrap(), &seed);

        assert!(same("https://example.com/a/b"));
        assert!(same("http://example.com/"));
        assert!(same("https://EXAMPLE.com/"));
        assert!(same("https://example.com:443/"));
        assert!(!same("https://www.example.com/"));
        assert!(!same("https://example.com:8443/"));
        assert!(!same("https://other.com/"));
    }

    #[test]
    fn test_same_host_with_port() {
        let seed = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert!(is_same_host(&Url::parse("http://127.0.0.1:8080/x").unwrap(), &seed));
        assert!(!is_same_host(&Url::parse("http://127.0.0.1/x").unwrap(), &seed));
    }
}

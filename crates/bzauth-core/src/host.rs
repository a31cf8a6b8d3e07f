//! Host identifiers used as section and token lookup keys.
//!
//! A host identifier is the network location of a URL when it has one
//! (`http://bugzilla.example.com/xmlrpc.cgi` → `bugzilla.example.com`),
//! otherwise the raw path (`bugzilla.example.com` → `bugzilla.example.com`).
//! That makes bare hostnames and full URLs resolve to the same key.

use url::Url;

/// Derive the lookup key for `url`.
///
/// The network location is returned exactly as written, including any
/// userinfo or port, so it can be compared against section names in
/// existing files without normalization surprises.
///
/// # Examples
///
/// ```
/// use bzauth_core::host::host_of;
///
/// assert_eq!(host_of("https://bugzilla.example.com/xmlrpc.cgi"), "bugzilla.example.com");
/// assert_eq!(host_of("bugzilla.example.com"), "bugzilla.example.com");
/// ```
pub fn host_of(url: &str) -> String {
    let rest = match Url::parse(url) {
        // No scheme: the whole input is the path (or a `//netloc` reference).
        Err(url::ParseError::RelativeUrlWithoutBase) => url,
        // A scheme was recognised even if the rest did not validate.
        _ => url.split_once(':').map_or(url, |(_, rest)| rest),
    };
    netloc_or_path(rest).to_string()
}

/// Split what follows `scheme:` the way the input was written, without the
/// normalization `Url` applies to special schemes (`http:/foo` → `http://foo/`).
fn netloc_or_path(rest: &str) -> &str {
    match rest.strip_prefix("//") {
        Some(net) => {
            let authority = authority_prefix(net);
            if authority.is_empty() {
                strip_query_and_fragment(net)
            } else {
                authority
            }
        }
        None => strip_query_and_fragment(rest),
    }
}

fn authority_prefix(rest: &str) -> &str {
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    &rest[..end]
}

fn strip_query_and_fragment(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

//! Reading and writing the Netscape/Mozilla `cookies.txt` format.
//!
//! ```text
//! # Netscape HTTP Cookie File
//! .example.com	TRUE	/	FALSE	1893456000	sid	abc
//! #HttpOnly_example.com	FALSE	/	TRUE		token	xyz
//! ```
//!
//! Fields are tab-separated: domain, include-subdomains, path, secure,
//! expiry (unix seconds; empty or `0` for a session cookie), name, value.

use std::path::Path;

use chrono::{DateTime, Utc};

use bzauth_core::{AuthError, Result};

use crate::cookie::{Cookie, CookieJar};

/// First line written to every saved jar.
pub const HEADER: &str = "# Netscape HTTP Cookie File";

/// Domain prefix curl and browsers use to mark HttpOnly cookies.
const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

const FIELD_COUNT: usize = 7;

/// Parse a cookie file, dropping cookies already expired at `now`.
///
/// # Errors
///
/// Returns [`AuthError::ConfigFormat`] naming `origin` and the line if the
/// header is missing or any record is malformed.
pub fn parse(origin: &Path, text: &str, now: DateTime<Utc>) -> Result<CookieJar> {
    let mut lines = text.lines().enumerate();

    let header_ok = lines
        .next()
        .is_some_and(|(_, first)| is_magic_line(first));
    if !header_ok {
        return Err(AuthError::format(
            origin,
            1,
            "not a Netscape format cookies file (missing '# Netscape HTTP Cookie File' header)",
        ));
    }

    let mut jar = CookieJar::new();
    for (idx, raw) in lines {
        let lineno = idx + 1;
        let line = raw.trim_end_matches('\r');

        let (line, http_only) = match line.strip_prefix(HTTP_ONLY_PREFIX) {
            Some(rest) => (rest, true),
            None => (line, false),
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || (!http_only && (trimmed.starts_with('#') || trimmed.starts_with('$'))) {
            continue;
        }

        let cookie = parse_record(line, http_only)
            .map_err(|message| AuthError::format(origin, lineno, message))?;
        if !cookie.is_expired(now) {
            jar.set_cookie(cookie);
        }
    }
    Ok(jar)
}

fn is_magic_line(line: &str) -> bool {
    let line = line.trim();
    line.contains("# Netscape HTTP Cookie File") || line.contains("# HTTP Cookie File")
}

fn parse_record(line: &str, http_only: bool) -> std::result::Result<Cookie, String> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != FIELD_COUNT {
        return Err(format!(
            "expected {FIELD_COUNT} tab-separated fields, found {}",
            fields.len()
        ));
    }

    let domain = fields[0];
    if domain.is_empty() {
        return Err("empty cookie domain".to_string());
    }
    let domain_specified = parse_flag(fields[1], "include-subdomains")?;
    if domain_specified != domain.starts_with('.') {
        return Err(format!(
            "include-subdomains is {} but domain '{domain}' {} a leading dot",
            fields[1],
            if domain_specified { "lacks" } else { "has" }
        ));
    }
    let secure = parse_flag(fields[3], "secure")?;
    let expires = parse_expiry(fields[4])?;

    Ok(Cookie {
        domain: domain.to_string(),
        domain_specified,
        path: fields[2].to_string(),
        secure,
        http_only,
        expires,
        name: fields[5].to_string(),
        value: fields[6].to_string(),
    })
}

fn parse_flag(text: &str, field: &str) -> std::result::Result<bool, String> {
    match text {
        "TRUE" => Ok(true),
        "FALSE" => Ok(false),
        other => Err(format!("{field} flag must be TRUE or FALSE, found '{other}'")),
    }
}

fn parse_expiry(text: &str) -> std::result::Result<Option<DateTime<Utc>>, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let secs: i64 = text
        .parse()
        .map_err(|_| format!("expiry must be unix seconds, found '{text}'"))?;
    if secs == 0 {
        return Ok(None);
    }
    DateTime::from_timestamp(secs, 0)
        .map(Some)
        .ok_or_else(|| format!("expiry {secs} is out of range"))
}

/// Serialize `jar`, leaving out cookies already expired at `now`.
pub fn render(jar: &CookieJar, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\n# This file was generated by bzauth. Edit at your own risk.\n\n");

    for cookie in jar.iter().filter(|c| !c.is_expired(now)) {
        if cookie.http_only {
            out.push_str(HTTP_ONLY_PREFIX);
        }
        let expires = cookie
            .expires
            .map(|e| e.timestamp().to_string())
            .unwrap_or_default();
        let fields = [
            cookie.domain.as_str(),
            flag(cookie.domain.starts_with('.')),
            cookie.path.as_str(),
            flag(cookie.secure),
            expires.as_str(),
            cookie.name.as_str(),
            cookie.value.as_str(),
        ];
        out.push_str(&fields.join("\t"));
        out.push('\n');
    }
    out
}

fn flag(value: bool) -> &'static str {
    if value { "TRUE" } else { "FALSE" }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    fn origin() -> &'static Path {
        Path::new("cookies.txt")
    }

    #[test]
    fn parses_records_and_flags() {
        let text = "# Netscape HTTP Cookie File\n\
                    # comment\n\
                    \n\
                    .x.com\tTRUE\t/\tFALSE\t1893456000\tsid\t123\n\
                    #HttpOnly_x.com\tFALSE\t/bz\tTRUE\t\ttoken\tabc\n";
        let jar = parse(origin(), text, now()).unwrap();
        assert_eq!(jar.len(), 2);

        let sid = jar.get(".x.com", "/", "sid").unwrap();
        assert!(sid.domain_specified);
        assert!(!sid.secure);
        assert_eq!(sid.expires.unwrap().timestamp(), 1_893_456_000);

        let token = jar.get("x.com", "/bz", "token").unwrap();
        assert!(token.http_only);
        assert!(token.secure);
        assert!(token.is_session());
    }

    #[test]
    fn short_header_variant_is_accepted() {
        let jar = parse(origin(), "# HTTP Cookie File\n", now()).unwrap();
        assert!(jar.is_empty());
    }

    #[test]
    fn missing_header_is_format_error() {
        let err = parse(origin(), "x.com\tFALSE\t/\tFALSE\t\ta\tb\n", now()).unwrap_err();
        match err {
            AuthError::ConfigFormat { line, .. } => assert_eq!(line, 1),
            other => panic!("expected format error, got {:?}", other),
        }
        assert!(parse(origin(), "", now()).unwrap_err().is_format_error());
    }

    #[test]
    fn wrong_field_count_reports_line() {
        let text = "# Netscape HTTP Cookie File\nx.com\tFALSE\t/\tFALSE\t\ta\tb\nbroken line\n";
        match parse(origin(), text, now()).unwrap_err() {
            AuthError::ConfigFormat { line, message, .. } => {
                assert_eq!(line, 3);
                assert!(message.contains("7 tab-separated fields"), "{message}");
            }
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn bad_flag_and_expiry_are_format_errors() {
        let bad_flag = "# Netscape HTTP Cookie File\nx.com\tyes\t/\tFALSE\t\ta\tb\n";
        assert!(parse(origin(), bad_flag, now()).unwrap_err().is_format_error());
        let bad_expiry = "# Netscape HTTP Cookie File\nx.com\tFALSE\t/\tFALSE\tsoon\ta\tb\n";
        assert!(parse(origin(), bad_expiry, now()).unwrap_err().is_format_error());
    }

    #[test]
    fn flag_disagreeing_with_leading_dot_is_format_error() {
        for record in ["x.com\tTRUE\t/\tFALSE\t\ta\tb", ".x.com\tFALSE\t/\tFALSE\t\ta\tb"] {
            let text = format!("# Netscape HTTP Cookie File\n{record}\n");
            match parse(origin(), &text, now()).unwrap_err() {
                AuthError::ConfigFormat { line, message, .. } => {
                    assert_eq!(line, 2);
                    assert!(message.contains("leading dot"), "{message}");
                }
                other => panic!("expected format error, got {:?}", other),
            }
        }
    }

    #[test]
    fn expired_cookies_are_dropped_on_load() {
        let text = "# Netscape HTTP Cookie File\n\
                    x.com\tFALSE\t/\tFALSE\t1000\told\t1\n\
                    x.com\tFALSE\t/\tFALSE\t0\tsession\t2\n";
        let jar = parse(origin(), text, now()).unwrap();
        assert_eq!(jar.len(), 1);
        assert!(jar.get("x.com", "/", "session").unwrap().is_session());
    }

    #[test]
    fn nameless_cookie_is_kept_verbatim() {
        let text = "# Netscape HTTP Cookie File\nx.com\tFALSE\t/\tFALSE\t\t\tflag\n";
        let jar = parse(origin(), text, now()).unwrap();
        let cookie = jar.get("x.com", "/", "").unwrap();
        assert_eq!(cookie.value, "flag");
        assert!(render(&jar, now()).ends_with("x.com\tFALSE\t/\tFALSE\t\t\tflag\n"));
    }

    #[test]
    fn render_then_parse_is_stable() {
        let mut jar = CookieJar::new();
        jar.set_cookie(Cookie::new("x.com", "sid", "123"));
        jar.set_cookie(
            Cookie::new(".x.com", "auth", "q")
                .secure(true)
                .http_only(true)
                .with_expires(Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap()),
        );
        jar.set_cookie(Cookie::new("x.com", "gone", "z").with_expires(now() - chrono::Duration::days(1)));

        let text = render(&jar, now());
        assert!(text.starts_with(HEADER));
        assert!(!text.contains("gone"));

        let back = parse(origin(), &text, now()).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.get("x.com", "/", "sid"), jar.get("x.com", "/", "sid"));
        assert_eq!(back.get(".x.com", "/", "auth"), jar.get(".x.com", "/", "auth"));
    }
}

/// Headers that must never be replayed upstream. `content-length` becomes
/// invalid the moment the body is re-framed across the hop; `host` and
/// `connection` belong to the inbound connection, not the outbound one.
const FORBIDDEN_HEADERS: [&str; 3] = ["host", "connection", "content-length"];

/// Decide which inbound headers are safe to replay upstream.
///
/// Drops the forbidden set (case-insensitively) and force-sets
/// `Content-Type: application/json` on the result, unless the inbound
/// request is a multipart payload, in which case the caller-supplied
/// content type (with its boundary) is preserved untouched.
pub fn filter_headers(inbound: &[(String, String)]) -> Vec<(String, String)> {
    let multipart = inbound.iter().any(|(name, value)| {
        name.eq_ignore_ascii_case("content-type")
            && value.to_ascii_lowercase().starts_with("multipart/")
    });

    let mut filtered: Vec<(String, String)> = inbound
        .iter()
        .filter(|(name, _)| !is_forbidden(name))
        .filter(|(name, _)| multipart || !name.eq_ignore_ascii_case("content-type"))
        .cloned()
        .collect();

    if !multipart {
        filtered.push(("Content-Type".to_string(), "application/json".to_string()));
    }

    filtered
}

fn is_forbidden(name: &str) -> bool {
    FORBIDDEN_HEADERS
        .iter()
        .any(|forbidden| name.eq_ignore_ascii_case(forbidden))
}

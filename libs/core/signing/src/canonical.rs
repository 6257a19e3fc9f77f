// [libs/core/signing/src/canonical.rs]
//! Deterministic query-string and body canonicalization.
//!
//! The exact bytes built here are the ones that must reach the wire
//! unchanged — any reordering, re-encoding, or whitespace drift invalidates
//! the signatures computed over them (spec: signature input fidelity).
//! Grounded on `original_source/register_logic.py`'s inline
//! `quote(v, safe='*').replace('%25', '%')` / `.replace(' ', '%20')` chain.

/// Percent-encodes `value` the way Python's `urllib.parse.quote(v, safe='*')`
/// does: unreserved characters (`A-Za-z0-9_.-~`) and `*` pass through
/// unescaped; everything else, including space, is percent-encoded.
pub fn percent_encode_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'.' | b'-' | b'~' | b'*' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Builds `k=v&k=v&...` over an already key-ordered slice, percent-encoding
/// every value. Keys are assumed to be fixed ASCII parameter names and are
/// never encoded, matching the source's fixed field list.
pub fn canonical_query_string(ordered_pairs: &[(&str, &str)]) -> String {
    ordered_pairs
        .iter()
        .map(|(k, v)| format!("{k}={}", percent_encode_value(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Serializes `value` with the stable, separator-explicit `,`/`:` JSON
/// layout the wire body and the signature both depend on. `serde_json`'s
/// default compact formatter already emits this layout.
pub fn canonical_body_json<T: serde::Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_space_as_percent_20() {
        assert_eq!(percent_encode_value("New York"), "New%20York");
    }

    #[test]
    fn leaves_star_and_unreserved_untouched() {
        assert_eq!(percent_encode_value("a*b_c.d-e~f"), "a*b_c.d-e~f");
    }

    #[test]
    fn encodes_slash_and_colon() {
        assert_eq!(percent_encode_value("a/b:c"), "a%2Fb%3Ac");
    }

    #[test]
    fn query_string_preserves_key_order() {
        let qs = canonical_query_string(&[("ts", "100"), ("region", "US")]);
        assert_eq!(qs, "ts=100&region=US");
    }

    #[test]
    fn body_json_uses_compact_separators() {
        #[derive(serde::Serialize)]
        struct S {
            a: u32,
            b: &'static str,
        }
        let s = canonical_body_json(&S { a: 1, b: "x" }).unwrap();
        assert_eq!(s, r#"{"a":1,"b":"x"}"#);
    }
}

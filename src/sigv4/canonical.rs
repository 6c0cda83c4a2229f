//! Canonical request construction (§4.6 step 1), split out from [`super`]
//! because its URI/query encoding rules are easy to get subtly wrong and
//! deserve isolated unit tests against fixed strings.

fn uri_encode(s: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            b'/' if !encode_slash => out.push('/'),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    uri_encode(path, false)
}

fn canonical_query_string(pairs: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> =
        pairs.iter().map(|(k, v)| (uri_encode(k, true), uri_encode(v, true))).collect();
    encoded.sort();
    encoded.into_iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&")
}

fn canonical_headers(headers: &[(&str, &str)]) -> (String, Vec<String>) {
    let mut normalized: Vec<(String, String)> =
        headers.iter().map(|(k, v)| (k.to_lowercase(), v.trim().to_string())).collect();
    normalized.sort_by(|a, b| a.0.cmp(&b.0));

    let names: Vec<String> = normalized.iter().map(|(k, _)| k.clone()).collect();
    let text = normalized.iter().map(|(k, v)| format!("{k}:{v}\n")).collect::<Vec<_>>().join("");
    (text, names)
}

/// Semicolon-joined, lowercase, sorted header names — the `SignedHeaders`
/// component shared between the canonical request and the final
/// `Authorization` header.
#[must_use]
pub fn signed_headers_list(headers: &[(&str, &str)]) -> String {
    canonical_headers(headers).1.join(";")
}

pub struct CanonicalRequest {
    pub text: String,
    pub signed_headers: String,
}

/// Builds the canonical request string: method, canonical URI, canonical
/// query string, canonical headers, signed-headers list, and payload hash —
/// each newline-separated, exactly as AWS's algorithm specifies.
#[must_use]
pub fn canonical_request(
    method: &str,
    uri: &str,
    query_pairs: &[(&str, &str)],
    headers: &[(&str, &str)],
    payload_hash: &str,
) -> CanonicalRequest {
    let (header_text, names) = canonical_headers(headers);
    let signed_headers = names.join(";");

    let text = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method.to_uppercase(),
        canonical_uri(uri),
        canonical_query_string(query_pairs),
        header_text,
        signed_headers,
        payload_hash
    );

    CanonicalRequest { text, signed_headers }
}

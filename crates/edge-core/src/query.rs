//! Query-string parsing and percent-encoding helpers.

use std::collections::HashMap;

/// Parse a raw query string (without `?`) into decoded key/value pairs.
///
/// Later duplicates win. Keys without `=` map to an empty value.
pub fn parse_query_string(qs: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    for pair in qs.split('&').filter(|p| !p.is_empty()) {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next().unwrap_or("");
        let value = parts.next().unwrap_or("");
        if key.is_empty() {
            continue;
        }
        params.insert(percent_decode(key), percent_decode(value));
    }

    params
}

/// Decode `%XX` escapes and `+` as space. Invalid escapes are kept verbatim.
pub fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
pub fn percent_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 3);
    for byte in s.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char)
            }
            _ => result.push_str(&format!("%{:02X}", byte)),
        }
    }
    result
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_string() {
        let params = parse_query_string("q=zara&category=women&sort=discount-high");
        assert_eq!(params.get("q").map(String::as_str), Some("zara"));
        assert_eq!(params.get("category").map(String::as_str), Some("women"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_parse_skips_empty_pairs() {
        let params = parse_query_string("&&expired&=x");
        assert_eq!(params.get("expired").map(String::as_str), Some(""));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_decode_utf8_umlauts() {
        assert_eq!(percent_decode("M%C3%BCnchen"), "München");
        assert_eq!(percent_decode("Bis+zu+50%25"), "Bis zu 50%");
    }

    #[test]
    fn test_decode_keeps_invalid_escapes() {
        assert_eq!(percent_decode("50%"), "50%");
        assert_eq!(percent_decode("%zz"), "%zz");
    }

    #[test]
    fn test_encode_roundtrip_for_reserved_chars() {
        let encoded = percent_encode("https://ohmysales.app/sale/1?x=ä");
        assert!(!encoded.contains('/'));
        assert_eq!(percent_decode(&encoded), "https://ohmysales.app/sale/1?x=ä");
    }
}

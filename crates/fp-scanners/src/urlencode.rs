//! Minimal percent-encoding for query-path segments (email addresses,
//! usernames). Scanners only ever encode ASCII identifiers, so a full
//! RFC 3986 implementation is unnecessary.

pub fn encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

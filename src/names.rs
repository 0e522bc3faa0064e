// src/names.rs
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::core::sanitize::normalize_ws;

/// Canonical form for name equality: NFD, drop combining marks, lowercase, trim.
///
/// Total and idempotent; `""` stays `""`.
pub fn normalize_name(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// Split a display name into (first, last).
///
/// Results sites print `LAST NAME First` with the surname in capitals
/// ("VAN DER POEL Mathieu"); leading all-caps tokens become the last name.
/// Otherwise the first token is the first name and the rest the last name.
pub fn split_display_name(raw: &str) -> (String, String) {
    let clean = normalize_ws(raw);
    let tokens: Vec<&str> = clean.split(' ').filter(|t| !t.is_empty()).collect();
    if tokens.is_empty() {
        return (s!(), s!());
    }

    let caps = tokens.iter().take_while(|t| is_caps_token(t)).count();
    if caps > 0 && caps < tokens.len() {
        let last = tokens[..caps].iter().map(|t| title_case(t)).collect::<Vec<_>>().join(" ");
        let first = tokens[caps..].join(" ");
        return (first, last);
    }

    let first = s!(tokens[0]);
    let last = tokens[1..].join(" ");
    (first, last)
}

fn is_caps_token(t: &str) -> bool {
    let letters: Vec<char> = t.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() > 1 && letters.iter().all(|c| c.is_uppercase())
}

/// "POGAČAR" → "Pogačar", "O'CONNOR" → "O'Connor", "HALLAND-JOHANNESSEN" → "Halland-Johannessen"
fn title_case(t: &str) -> String {
    let mut out = String::with_capacity(t.len());
    let mut start = true;
    for ch in t.chars() {
        if ch.is_alphabetic() {
            if start { out.extend(ch.to_uppercase()); } else { out.extend(ch.to_lowercase()); }
            start = false;
        } else {
            out.push(ch);
            start = true;
        }
    }
    out
}

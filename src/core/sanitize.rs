// src/core/sanitize.rs

/// Decode the handful of entities that show up in rider and team cells.
pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Collapse whitespace runs to one space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Double single quotes for a SQL string literal body.
pub fn sql_escape(s: &str) -> String {
    s.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_collapses_and_trims() {
        assert_eq!(normalize_ws("  Jasper \t\n Philipsen "), "Jasper Philipsen");
    }

    #[test]
    fn entities_decode_amp_last() {
        assert_eq!(normalize_entities("O&#39;Connor&nbsp;Ben"), "O'Connor Ben");
        assert_eq!(normalize_entities("&amp;nbsp;"), "&nbsp;");
    }

    #[test]
    fn sql_quotes_doubled() {
        assert_eq!(sql_escape("O'Connor"), "O''Connor");
    }
}

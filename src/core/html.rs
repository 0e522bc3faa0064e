// src/core/html.rs
// Tolerant, case-insensitive tag scanning over raw HTML. No DOM.

pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii() {
                c.to_ascii_lowercase()
            } else {
                c
            }
        })
        .collect()
}

/// Find the next `<o …> … c` block at or after `from`. Returns byte range of the whole block.
pub fn next_tag_block_ci(s: &str, o: &str, c: &str, from: usize) -> Option<(usize, usize)> {
    let lc = to_lower(s);
    let ol = to_lower(o);
    let cl = to_lower(c);
    let start = lc.get(from..)?.find(&ol)? + from;
    let open_end = s[start..].find('>')? + start + 1;
    let end_rel = lc[open_end..].find(&cl)?;
    let end = open_end + end_rel + c.len();
    Some((start, end))
}

/// All blocks of one tag inside `s`, in document order.
pub fn tag_blocks_ci<'a>(s: &'a str, o: &str, c: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some((b_s, b_e)) = next_tag_block_ci(s, o, c, pos) {
        out.push(&s[b_s..b_e]);
        pos = b_e;
    }
    out
}

/// Table cells of a row: `<td>` and `<th>` blocks, in order.
pub fn row_cells(tr_block: &str) -> Vec<&str> {
    let lc = to_lower(tr_block);
    let mut out = Vec::new();
    let mut pos = 0usize;
    loop {
        let td = lc[pos..].find("<td").map(|i| (i + pos, "</td>"));
        let th = lc[pos..].find("<th").map(|i| (i + pos, "</th>"));
        let (start, close) = match (td, th) {
            (Some(a), Some(b)) => if a.0 < b.0 { a } else { b },
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => break,
        };
        let Some(open_end) = tr_block[start..].find('>').map(|i| i + start + 1) else { break };
        let end = match lc[open_end..].find(close) {
            Some(rel) => open_end + rel + close.len(),
            // unclosed cell: runs to the end of the row
            None => tr_block.len(),
        };
        out.push(&tr_block[start..end]);
        pos = end;
    }
    out
}

/// Opening tag of a block, lowercased (for attribute sniffing).
pub fn opener_lc(block: &str) -> String {
    let end = block.find('>').unwrap_or(block.len());
    to_lower(&block[..end])
}

/// Value of the first `href=` inside `block` (quoted or bare).
pub fn first_href(block: &str) -> Option<&str> {
    let lc = to_lower(block);
    let hp = lc.find("href=")?;
    let val = &block[hp + 5..];
    let (quote, off) = match val.as_bytes().first() {
        Some(b'"') => (Some('"'), 1),
        Some(b'\'') => (Some('\''), 1),
        _ => (None, 0),
    };
    let end = match quote {
        Some(q) => val[off..].find(q).map(|e| off + e).unwrap_or(val.len()),
        None => val.find(|c: char| c.is_ascii_whitespace() || c == '>').unwrap_or(val.len()),
    };
    Some(&val[off..end])
}

/// Visible text of a fragment: tags dropped, entities decoded, whitespace collapsed.
pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => { in_tag = false; out.push(' '); }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    super::sanitize::normalize_ws(&super::sanitize::normalize_entities(&out))
}

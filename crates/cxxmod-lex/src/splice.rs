/// Recognizes a deleted line-splice (`\` immediately followed by a line
/// terminator) at `pos`. Returns the total byte length of the splice
/// (backslash plus terminator) when present.
///
/// This is the "filter" consulted by character-class rules so a splice
/// inside an identifier, string, or header name is tolerated without
/// ending the enclosing token -- see the restart loop in spec §4.B.
pub fn splice_len(src: &[u8], pos: usize) -> Option<usize> {
    if src.get(pos) != Some(&b'\\') {
        return None;
    }
    match src.get(pos + 1) {
        Some(b'\r') if src.get(pos + 2) == Some(&b'\n') => Some(3),
        Some(b'\r') | Some(b'\n') => Some(2),
        _ => None,
    }
}

/// Length of the line terminator starting at `pos`, if any (CR, LF, or
/// CRLF all count as one newline boundary).
pub fn eol_len(src: &[u8], pos: usize) -> usize {
    match src.get(pos) {
        Some(b'\r') if src.get(pos + 1) == Some(&b'\n') => 2,
        Some(b'\r') | Some(b'\n') => 1,
        _ => 0,
    }
}

/// Strips every deleted splice out of `src[start..end)` to recover the
/// logical text a declaration's identifier/keyword would read as.
pub fn collapse_splices(src: &[u8], start: usize, end: usize) -> String {
    let mut out = String::with_capacity(end - start);
    let mut pos = start;
    while pos < end {
        if let Some(len) = splice_len(src, pos) {
            pos += len;
            continue;
        }
        let ch_len = utf8_char_len(src, pos).min(end - pos);
        out.push_str(std::str::from_utf8(&src[pos..pos + ch_len]).unwrap_or(""));
        pos += ch_len.max(1);
    }
    out
}

fn utf8_char_len(src: &[u8], pos: usize) -> usize {
    match src.get(pos) {
        Some(b) if b & 0x80 == 0 => 1,
        Some(b) if b & 0xE0 == 0xC0 => 2,
        Some(b) if b & 0xF0 == 0xE0 => 3,
        Some(b) if b & 0xF8 == 0xF0 => 4,
        _ => 1,
    }
}

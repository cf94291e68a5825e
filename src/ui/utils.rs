use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Labels longer than this are shortened when not in focus.
pub const LABEL_LIMIT: usize = 18;
const SHORT_KEEP: usize = 15;
const MARQUEE_GAP: &str = "   ";

/// Display name without a trailing `.wav` (any case).
pub fn strip_wav(name: &str) -> &str {
    let cut = name.len().saturating_sub(4);
    match name.get(cut..) {
        Some(ext) if ext.eq_ignore_ascii_case(".wav") => &name[..cut],
        _ => name,
    }
}

/// Tile caption at rest: `.wav` stripped, long names cut to 15 columns + `...`.
pub fn short_label(name: &str) -> String {
    let stem = strip_wav(name);
    if stem.width() > LABEL_LIMIT {
        format!("{}...", take_width(stem, SHORT_KEEP))
    } else {
        stem.to_string()
    }
}

/// Tile caption in focus: the full stem scrolling left by `offset` columns.
pub fn marquee(name: &str, width: usize, offset: usize) -> String {
    let stem = strip_wav(name);
    if stem.width() <= width {
        return stem.to_string();
    }

    let ring: Vec<char> = stem.chars().chain(MARQUEE_GAP.chars()).collect();
    let start = offset % ring.len();
    let rotated: String = ring[start..].iter().chain(ring[..start].iter()).collect();
    take_width(&rotated, width)
}

/// Clip or right-pad to exactly `width` columns.
pub fn fit(s: &str, width: usize) -> String {
    let mut out = take_width(s, width);
    let used = out.width();
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(used)));
    out
}

/// Longest prefix of `s` that fits in `width` columns.
pub fn take_width(s: &str, width: usize) -> String {
    let mut used = 0;
    s.chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= width
        })
        .collect()
}

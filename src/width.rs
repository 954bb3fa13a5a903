//! Display-column math for fixed-width layout.
//!
//! All sidebar, breadcrumb, and content rows are cut and padded by *display*
//! columns, never by bytes or chars, so wide glyphs (CJK, emoji icons) cannot
//! shift a column boundary. Zero-width combining marks count as zero.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Number of terminal columns the string occupies.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Longest prefix whose display width is `<= max_cols`.
///
/// Never splits a scalar value: a 2-column glyph that does not fit is dropped
/// entirely, so the result may be one column short of `max_cols`.
pub fn truncate_to_width(s: &str, max_cols: usize) -> &str {
    if max_cols == 0 || s.is_empty() {
        return "";
    }
    let mut cols = 0usize;
    let mut end = 0usize;
    for (idx, ch) in s.char_indices() {
        let glyph = UnicodeWidthChar::width(ch).unwrap_or(0);
        if cols + glyph > max_cols {
            return &s[..idx];
        }
        cols += glyph;
        end = idx + ch.len_utf8();
    }
    &s[..end]
}

/// Slice bounded by display columns rather than raw characters, for showing
/// a horizontal viewport into a longer row.
pub fn window_by_columns(s: &str, start_cols: usize, width_cols: usize) -> &str {
    if width_cols == 0 || s.is_empty() {
        return "";
    }

    let mut col = 0usize;
    let mut start_byte = 0usize;
    let mut start_found = false;
    let mut end_byte = s.len();
    let target_end = start_cols.saturating_add(width_cols);

    for (idx, ch) in s.char_indices() {
        let glyph = UnicodeWidthChar::width(ch).unwrap_or(0).max(1);
        let next_col = col.saturating_add(glyph);

        if !start_found && col <= start_cols && start_cols < next_col {
            start_byte = idx;
            start_found = true;
        }
        if start_found && next_col > target_end {
            end_byte = idx;
            break;
        }
        col = next_col;
    }

    if !start_found {
        return "";
    }
    &s[start_byte..end_byte]
}

/// Truncate to exactly `width` columns, space-padding the remainder.
///
/// This is how region painters clear their own rectangle without touching
/// neighbouring columns (a full-line erase would bleed into the next pane).
pub fn pad_to_width(s: &str, width: usize) -> String {
    let cut = truncate_to_width(s, width);
    let used = display_width(cut);
    let mut out = String::with_capacity(cut.len() + width.saturating_sub(used));
    out.push_str(cut);
    for _ in used..width {
        out.push(' ');
    }
    out
}

/// Truncate to `max_cols` columns, marking the cut with an ellipsis.
pub fn ellipsize(s: &str, max_cols: usize) -> String {
    if display_width(s) <= max_cols {
        return s.to_string();
    }
    if max_cols <= 1 {
        return String::from("…");
    }
    format!("{}…", truncate_to_width(s, max_cols - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_width_counts_wide_glyphs_double() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("你好"), 4);
        assert_eq!(display_width("a你b"), 4);
        // combining acute accent is zero columns
        assert_eq!(display_width("e\u{0301}"), 1);
    }

    #[test]
    fn truncate_to_width_never_splits_a_glyph() {
        assert_eq!(truncate_to_width("hello", 3), "hel");
        assert_eq!(truncate_to_width("你好世界", 4), "你好");
        // a wide glyph straddling the limit is dropped, not halved
        assert_eq!(truncate_to_width("你好世界", 5), "你好");
        assert_eq!(truncate_to_width("abc", 0), "");
        assert_eq!(truncate_to_width("", 4), "");
    }

    #[test]
    fn window_by_columns_clips_both_edges() {
        assert_eq!(window_by_columns("abcdef", 0, 3), "abc");
        assert_eq!(window_by_columns("abcdef", 2, 3), "cde");
        assert_eq!(window_by_columns("abcdef", 10, 5), "");
        assert_eq!(window_by_columns("你好世界", 2, 4), "好世");
    }

    #[test]
    fn pad_to_width_yields_exact_columns() {
        assert_eq!(pad_to_width("ab", 4), "ab  ");
        assert_eq!(pad_to_width("abcdef", 4), "abcd");
        // wide glyph falls off the edge; padding restores the column count
        let padded = pad_to_width("a你好", 4);
        assert_eq!(display_width(&padded), 4);
    }

    #[test]
    fn ellipsize_marks_the_cut() {
        assert_eq!(ellipsize("hello", 10), "hello");
        assert_eq!(ellipsize("hello world", 8), "hello w…");
        assert_eq!(ellipsize("你好世界", 3), "你…");
        assert_eq!(ellipsize("abc", 1), "…");
    }
}

use std::ops::Range;

use unicode_width::UnicodeWidthChar;

/// Split `chars` into display lines no wider than `width` columns.
///
/// Lines break after the last space that fits; a word longer than the line
/// is broken mid-word. A space that lands on the overflow column stays on
/// the line it closes, one column past `width`. Every char lands in exactly one line and spaces stay
/// at the end of the line they close, so char indices map one-to-one onto
/// the returned ranges.
pub fn wrap_lines(chars: &[char], width: usize) -> Vec<Range<usize>> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut start = 0;
    let mut line_width = 0;
    let mut break_at: Option<usize> = None;

    for (i, ch) in chars.iter().enumerate() {
        let w = ch.width().unwrap_or(0);

        if line_width + w > width && i > start {
            if *ch == ' ' {
                // an overflowing space closes the current line past the width
                lines.push(start..i + 1);
                start = i + 1;
                line_width = 0;
                break_at = None;
                continue;
            }
            let end = match break_at {
                Some(b) if b > start => b,
                _ => i,
            };
            lines.push(start..end);
            start = end;
            line_width = chars[start..i]
                .iter()
                .map(|c| c.width().unwrap_or(0))
                .sum();
            break_at = None;
        }

        line_width += w;
        if *ch == ' ' {
            break_at = Some(i + 1);
        }
    }

    if start < chars.len() || lines.is_empty() {
        lines.push(start..chars.len());
    }

    lines
}

/// Line holding char index `caret`; past-the-end carets sit on the last line
pub fn caret_line(lines: &[Range<usize>], caret: usize) -> usize {
    lines
        .iter()
        .position(|r| caret < r.end)
        .unwrap_or(lines.len().saturating_sub(1))
}

/// Move the viewport the least needed to show `caret_line`
pub fn scroll_to_caret(offset: usize, caret_line: usize, height: usize) -> usize {
    if height == 0 || caret_line < offset {
        caret_line
    } else if caret_line >= offset + height {
        caret_line + 1 - height
    } else {
        offset
    }
}

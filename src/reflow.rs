use itertools::Itertools;
use unicode_width::UnicodeWidthStr;

/// Columns kept free when the requested width does not fit on screen.
pub const WIDTH_MARGIN: usize = 8;

/// Width to wrap at given the requested width and the columns the display actually has.
pub fn effective_width(requested: usize, available: usize) -> usize {
    let width = if requested > available {
        available.saturating_sub(WIDTH_MARGIN)
    } else {
        requested
    };
    width.max(1)
}

/// Collapse whitespace and greedily wrap `text` at `max_width` columns.
///
/// Each inserted break is written as `" \n"`: the space stays at the end of the line as the
/// word separator, the newline is a marker the session steps over for free. A word longer than
/// the width is never split, the line is broken at the first space after it instead.
pub fn reflow(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.split_whitespace().join(" ").chars().collect();
    let width = max_width.max(1);

    let mut breaks = vec![false; chars.len()];
    let mut line_start = 0;
    let mut last_space = None;

    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            last_space = Some(i);
        }

        if i + 1 - line_start > width {
            if let Some(sp) = last_space.filter(|&sp| sp >= line_start) {
                breaks[sp] = true;
                line_start = sp + 1;
            }
        }
    }

    let mut out = String::with_capacity(chars.len() + breaks.len());
    for (c, is_break) in chars.into_iter().zip(breaks) {
        out.push(c);
        if is_break {
            out.push('\n');
        }
    }
    out
}

/// Columns and rows a block of text occupies, columns counted in terminal cells.
pub fn text_dimensions(text: &str) -> (usize, usize) {
    if text.is_empty() {
        return (0, 0);
    }

    let columns = text
        .split('\n')
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0);
    (columns, text.split('\n').count())
}

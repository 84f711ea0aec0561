use std::time::Duration;

use unicode_width::UnicodeWidthChar;

/// How a single character of the target text should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellClass {
    CurrentWord,
    NextWord,
    Upcoming,
    Correct,
    IncorrectChar,
    IncorrectSpace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub class: CellClass,
}

/// Everything the presentation layer needs to draw one frame of a session.
///
/// Coordinates are relative to the top-left corner of the text block.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub lines: Vec<Vec<Cell>>,
    /// (column, row) of the cursor, in terminal cells.
    pub cursor: (usize, usize),
    /// Display width of the widest line.
    pub columns: usize,
    pub attribution: String,
    pub remaining: Option<Duration>,
    pub live_wpm: Option<u32>,
}

impl RenderState {
    /// Classify every position of `text` given what has been typed up to `cursor`.
    pub fn classify(text: &[char], typed: &[Option<char>], cursor: usize) -> (Vec<Vec<Cell>>, (usize, usize)) {
        let mut lines = vec![Vec::new()];
        let mut cursor_at = None;
        // display width of the current line so far
        let mut col = 0;
        // words past the cursor: 0 is the word under the cursor, 1 the next one
        let mut word_index: Option<usize> = None;

        for (i, &ch) in text.iter().enumerate() {
            if ch == '\n' {
                lines.push(Vec::new());
                col = 0;
                continue;
            }

            let line = lines.len() - 1;
            if i == cursor {
                cursor_at = Some((col, line));
                word_index = Some(0);
            }

            let class = if i >= cursor {
                if ch == ' ' {
                    word_index = word_index.map(|w| w + 1);
                    CellClass::Upcoming
                } else {
                    match word_index {
                        Some(0) => CellClass::CurrentWord,
                        Some(1) => CellClass::NextWord,
                        _ => CellClass::Upcoming,
                    }
                }
            } else if typed.get(i).copied().flatten() != Some(ch) {
                if ch == ' ' {
                    CellClass::IncorrectSpace
                } else {
                    CellClass::IncorrectChar
                }
            } else {
                CellClass::Correct
            };

            lines[line].push(Cell { ch, class });
            col += ch.width().unwrap_or(0);
        }

        let cursor_at = cursor_at.unwrap_or((col, lines.len() - 1));
        (lines, cursor_at)
    }

    pub fn rows(&self) -> usize {
        self.lines.len()
    }

    /// Whole seconds left, rounded up the way a countdown reads.
    pub fn remaining_label(&self) -> Option<String> {
        self.remaining.map(|r| (r.as_secs() + 1).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CellClass::*;

    fn classes(line: &[Cell]) -> Vec<CellClass> {
        line.iter().map(|c| c.class).collect()
    }

    #[test]
    fn untouched_text_highlights_first_two_words() {
        let text: Vec<char> = "ab cd ef".chars().collect();
        let typed = vec![None; text.len()];
        let (lines, cursor) = RenderState::classify(&text, &typed, 0);

        assert_eq!(cursor, (0, 0));
        assert_eq!(
            classes(&lines[0]),
            vec![CurrentWord, CurrentWord, Upcoming, NextWord, NextWord, Upcoming, Upcoming, Upcoming]
        );
    }

    #[test]
    fn typed_prefix_is_marked() {
        let text: Vec<char> = "ab cd".chars().collect();
        let typed = vec![Some('a'), Some('x'), Some('_'), None, None];
        let (lines, cursor) = RenderState::classify(&text, &typed, 3);

        assert_eq!(cursor, (3, 0));
        assert_eq!(
            classes(&lines[0]),
            vec![Correct, IncorrectChar, IncorrectSpace, CurrentWord, CurrentWord]
        );
    }

    #[test]
    fn line_breaks_split_rows() {
        let text: Vec<char> = "ab \ncd ef".chars().collect();
        let typed = vec![Some('a'), Some('b'), Some(' '), Some('\n'), None, None, None, None, None];
        let (lines, cursor) = RenderState::classify(&text, &typed, 4);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 3);
        assert_eq!(cursor, (0, 1));
        assert_eq!(
            classes(&lines[1]),
            vec![CurrentWord, CurrentWord, Upcoming, NextWord, NextWord]
        );
    }

    #[test]
    fn next_word_continues_across_line_break() {
        let text: Vec<char> = "ab \ncd".chars().collect();
        let typed = vec![None; text.len()];
        let (lines, _) = RenderState::classify(&text, &typed, 0);
        assert_eq!(classes(&lines[1]), vec![NextWord, NextWord]);
    }

    #[test]
    fn cursor_past_end_sits_after_last_char() {
        let text: Vec<char> = "ab \ncd".chars().collect();
        let typed: Vec<Option<char>> = text.iter().copied().map(Some).collect();
        let (_, cursor) = RenderState::classify(&text, &typed, text.len());
        assert_eq!(cursor, (2, 1));
    }

    #[test]
    fn cursor_column_counts_wide_chars_twice() {
        let text: Vec<char> = "日本 語".chars().collect();
        let typed = vec![Some('日'), Some('本'), None, None];
        let (lines, cursor) = RenderState::classify(&text, &typed, 2);
        assert_eq!(lines[0].len(), 4);
        assert_eq!(cursor, (4, 0));

        let typed: Vec<Option<char>> = text.iter().copied().map(Some).collect();
        let (_, cursor) = RenderState::classify(&text, &typed, text.len());
        assert_eq!(cursor, (7, 0));
    }

    #[test]
    fn remaining_label_counts_down_from_next_second() {
        let state = RenderState {
            lines: vec![],
            cursor: (0, 0),
            columns: 0,
            attribution: String::new(),
            remaining: Some(Duration::from_millis(1500)),
            live_wpm: None,
        };
        assert_eq!(state.remaining_label().as_deref(), Some("2"));
    }
}

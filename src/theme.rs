use ratatui::style::{Color, Modifier, Style};

use crate::error::{Error, Result};
use crate::snapshot::CellClass;
use crate::sources::{read_data, DataKind};

/// Colors used to draw a session.
///
/// Theme files are plain text, one `key: #rrggbb` per line. The keys are `bgcol`, `fgcol`,
/// `hicol` (correct text), `hicol2` (current word), `hicol3` (next word) and `errcol`.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub foreground: Color,
    pub correct: Color,
    pub current_word: Color,
    pub next_word: Color,
    pub error: Color,
    pub bold: bool,
}

impl Theme {
    /// Terminal default colors, used when themes are disabled.
    pub fn plain(bold: bool) -> Self {
        Self {
            background: Color::Reset,
            foreground: Color::Reset,
            correct: Color::Green,
            current_word: Color::Reset,
            next_word: Color::Reset,
            error: Color::Red,
            bold,
        }
    }

    pub fn load(name: &str, bold: bool) -> Result<Self> {
        let (_, contents) =
            read_data(DataKind::Themes, name)?.ok_or_else(|| Error::UnknownTheme(name.to_string()))?;
        Self::parse(&contents, bold)
    }

    pub fn parse(src: &str, bold: bool) -> Result<Self> {
        let entries: Vec<(&str, &str)> = src
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim(), v.trim()))
            .collect();

        let color = |key: &'static str| -> Result<Color> {
            let value = entries
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| *v)
                .unwrap_or_default();
            parse_hex(value).ok_or_else(|| Error::InvalidColor {
                key,
                value: value.to_string(),
            })
        };

        Ok(Self {
            background: color("bgcol")?,
            foreground: color("fgcol")?,
            correct: color("hicol")?,
            current_word: color("hicol2")?,
            next_word: color("hicol3")?,
            error: color("errcol")?,
            bold,
        })
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    pub fn style(&self, class: CellClass) -> Style {
        let base = self.base();
        match class {
            CellClass::Correct => {
                let style = base.fg(self.correct);
                if self.bold {
                    style.add_modifier(Modifier::BOLD)
                } else {
                    style
                }
            }
            CellClass::IncorrectChar => base.fg(self.error),
            CellClass::IncorrectSpace => base.bg(self.error),
            CellClass::CurrentWord => base.fg(self.current_word),
            CellClass::NextWord => base.fg(self.next_word),
            CellClass::Upcoming => base,
        }
    }
}

fn parse_hex(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SAMPLE: &str = "bgcol: #000000\nfgcol: #ffffff\nhicol: #00ff00\nhicol2: #ffff00\nhicol3: #0000ff\nerrcol: #ff0000\n";

    #[test]
    fn test_parse_theme() {
        let theme = Theme::parse(SAMPLE, false).unwrap();
        assert_eq!(theme.background, Color::Rgb(0, 0, 0));
        assert_eq!(theme.foreground, Color::Rgb(255, 255, 255));
        assert_eq!(theme.correct, Color::Rgb(0, 255, 0));
        assert_eq!(theme.error, Color::Rgb(255, 0, 0));
    }

    #[test]
    fn test_missing_or_bad_color() {
        let missing = SAMPLE.replace("errcol: #ff0000\n", "");
        assert_matches!(
            Theme::parse(&missing, false),
            Err(Error::InvalidColor { key: "errcol", .. })
        );

        let bad = SAMPLE.replace("#00ff00", "green");
        assert_matches!(
            Theme::parse(&bad, false),
            Err(Error::InvalidColor { key: "hicol", value }) if value == "green"
        );
    }

    #[test]
    fn test_builtin_themes_load() {
        for name in ["default", "light", "terminal"] {
            assert!(Theme::load(name, false).is_ok(), "theme {name}");
        }
        assert_matches!(Theme::load("nope", false), Err(Error::UnknownTheme(_)));
    }

    #[test]
    fn test_styles() {
        let theme = Theme::parse(SAMPLE, true).unwrap();
        assert_eq!(theme.style(CellClass::IncorrectSpace).bg, Some(Color::Rgb(255, 0, 0)));
        assert_eq!(theme.style(CellClass::IncorrectChar).fg, Some(Color::Rgb(255, 0, 0)));
        assert!(theme
            .style(CellClass::Correct)
            .add_modifier
            .contains(Modifier::BOLD));
        assert_eq!(theme.style(CellClass::NextWord).fg, Some(Color::Rgb(0, 0, 255)));

        let plain = Theme::plain(false);
        assert!(!plain.style(CellClass::Correct).add_modifier.contains(Modifier::BOLD));
    }
}

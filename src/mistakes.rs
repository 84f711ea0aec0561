use serde::{Deserialize, Serialize};

/// Stands in for positions that hold no typed character.
pub const PLACEHOLDER: char = '_';

/// A target word that was not typed exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mistake {
    pub word: String,
    pub typed: String,
}

impl Mistake {
    pub fn new(word: impl Into<String>, typed: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            typed: typed.into(),
        }
    }
}

/// Correct and incorrect keystroke counts over a typed prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub correct: usize,
    pub errors: usize,
}

fn is_separator(c: char) -> bool {
    c == ' ' || c == '\n'
}

/// Count every non-newline position in `[0, upto)`: correct when the typed char equals the
/// target, incorrect otherwise (including unset positions).
pub fn tally(target: &[char], typed: &[Option<char>], upto: usize) -> Tally {
    target
        .iter()
        .zip(typed)
        .take(upto)
        .filter(|(expected, _)| **expected != '\n')
        .fold(Tally::default(), |mut acc, (&expected, &got)| {
            if got == Some(expected) {
                acc.correct += 1;
            } else {
                acc.errors += 1;
            }
            acc
        })
}

/// Words in `target` that differ from `typed` somewhere before `upto`, in order.
///
/// The reported word is always the whole target word. Its typed form shows what is in the
/// buffer, with [`PLACEHOLDER`] for unset positions and for the part of the word past `upto`.
pub fn extract_mistakes(target: &[char], typed: &[Option<char>], upto: usize) -> Vec<Mistake> {
    let upto = upto.min(target.len()).min(typed.len());

    let mut mistakes = Vec::new();
    let mut word = String::new();
    let mut attempt = String::new();
    let mut wrong = false;

    for (i, &expected) in target.iter().enumerate() {
        if is_separator(expected) {
            if wrong {
                mistakes.push(Mistake::new(word.as_str(), attempt.as_str()));
            }
            if i >= upto {
                return mistakes;
            }
            word.clear();
            attempt.clear();
            wrong = false;
            continue;
        }

        word.push(expected);
        if i < upto {
            let got = typed[i];
            wrong |= got != Some(expected);
            attempt.push(got.unwrap_or(PLACEHOLDER));
        } else {
            attempt.push(PLACEHOLDER);
        }
    }

    if wrong {
        mistakes.push(Mistake::new(word, attempt));
    }
    mistakes
}

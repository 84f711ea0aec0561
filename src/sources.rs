use cgisf_lib::cgisf;
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::app_dirs::AppDirs;
use crate::error::{Error, Result};

static DATA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/data");

/// One block of target text and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub attribution: String,
}

impl Segment {
    pub fn new(text: impl Into<String>, attribution: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attribution: attribution.into(),
        }
    }
}

/// Pull-based supplier of tests; each call yields the ordered segments of one test.
pub trait SegmentSource {
    fn next_test(&mut self) -> Result<Vec<Segment>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum DataKind {
    Words,
    Quotes,
    Themes,
}

impl DataKind {
    fn dir(self) -> &'static str {
        match self {
            DataKind::Words => "words",
            DataKind::Quotes => "quotes",
            DataKind::Themes => "themes",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            DataKind::Words | DataKind::Quotes => "json",
            DataKind::Themes => "txt",
        }
    }
}

/// Locate `name` as a file path, then in the user data dir, then among the built-in data.
/// Returns where it was found and its contents.
pub fn read_data(kind: DataKind, name: &str) -> Result<Option<(PathBuf, String)>> {
    let direct = Path::new(name);
    if direct.is_file() {
        return Ok(Some((direct.to_path_buf(), fs::read_to_string(direct)?)));
    }

    let file_name = format!("{name}.{}", kind.extension());
    if let Some(user_dir) = AppDirs::data_dir() {
        let path = user_dir.join(kind.dir()).join(&file_name);
        if path.is_file() {
            debug!(path = %path.display(), "using user data file");
            return Ok(Some((path.clone(), fs::read_to_string(&path)?)));
        }
    }

    let builtin = PathBuf::from(kind.dir()).join(&file_name);
    Ok(DATA_DIR
        .get_file(&builtin)
        .and_then(|f| f.contents_utf8())
        .map(|contents| (builtin, contents.to_string())))
}

/// Names that [`read_data`] can resolve for `kind`, sorted.
pub fn available(kind: DataKind) -> Vec<String> {
    let builtin = DATA_DIR
        .get_dir(kind.dir())
        .into_iter()
        .flat_map(|dir| dir.files())
        .map(|f| f.path().to_path_buf());

    let user = AppDirs::data_dir()
        .and_then(|dir| fs::read_dir(dir.join(kind.dir())).ok())
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.ok().map(|e| e.path()));

    builtin
        .chain(user)
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(kind.extension()))
        .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .sorted()
        .dedup()
        .collect()
}

fn display_name(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
        .to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordList {
    pub name: String,
    #[serde(default)]
    pub no_lazy_mode: bool,
    #[serde(default)]
    pub ordered_by_frequency: bool,
    pub words: Vec<String>,
}

impl WordList {
    pub fn load(name: &str) -> Result<Self> {
        let (path, contents) =
            read_data(DataKind::Words, name)?.ok_or_else(|| Error::UnknownWordList(name.to_string()))?;
        serde_json::from_str(&contents).map_err(|source| Error::Parse { path, source })
    }
}

/// Random words drawn (with repetition) from a word list.
#[derive(Debug)]
pub struct WordSource {
    words: Vec<String>,
    attribution: String,
    words_per_segment: usize,
    segments: usize,
    rng: StdRng,
}

impl WordSource {
    pub fn new(
        list: WordList,
        attribution: &str,
        words_per_segment: usize,
        segments: usize,
    ) -> Result<Self> {
        let words: Vec<String> = list
            .words
            .into_iter()
            .filter(|w| !w.trim().is_empty())
            .collect();
        if words.is_empty() {
            return Err(Error::EmptySource(list.name));
        }

        Ok(Self {
            words,
            attribution: attribution.to_string(),
            words_per_segment: words_per_segment.max(1),
            segments: segments.max(1),
            rng: StdRng::from_entropy(),
        })
    }

    pub fn from_name(name: &str, words_per_segment: usize, segments: usize) -> Result<Self> {
        let list = WordList::load(name)?;
        Self::new(list, &display_name(name), words_per_segment, segments)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    fn random_text(&mut self) -> String {
        let words = &self.words;
        let rng = &mut self.rng;
        (0..self.words_per_segment)
            .filter_map(|_| words.choose(rng))
            .join(" ")
    }
}

impl SegmentSource for WordSource {
    fn next_test(&mut self) -> Result<Vec<Segment>> {
        Ok((0..self.segments)
            .map(|_| Segment::new(self.random_text(), self.attribution.as_str()))
            .collect())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Quote {
    pub text: String,
    pub source: String,
    #[serde(default)]
    pub length: usize,
    #[serde(default)]
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteFile {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub groups: Vec<[usize; 2]>,
    pub quotes: Vec<Quote>,
}

impl QuoteFile {
    pub fn load(name: &str) -> Result<Self> {
        let (path, contents) = read_data(DataKind::Quotes, name)?
            .ok_or_else(|| Error::UnknownQuoteFile(name.to_string()))?;
        serde_json::from_str(&contents).map_err(|source| Error::Parse { path, source })
    }
}

/// One random quote per test, attributed to its source.
#[derive(Debug)]
pub struct QuoteSource {
    quotes: Vec<Quote>,
    rng: StdRng,
}

impl QuoteSource {
    pub fn new(file: QuoteFile, name: &str) -> Result<Self> {
        if file.quotes.is_empty() {
            return Err(Error::EmptySource(name.to_string()));
        }
        Ok(Self {
            quotes: file.quotes,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::new(QuoteFile::load(name)?, name)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl SegmentSource for QuoteSource {
    fn next_test(&mut self) -> Result<Vec<Segment>> {
        let quote = &self.quotes[self.rng.gen_range(0..self.quotes.len())];
        Ok(vec![Segment::new(quote.text.as_str(), quote.source.as_str())])
    }
}

/// Generated nonsense sentences, `sentences` of them per segment.
#[derive(Debug)]
pub struct SentenceSource {
    sentences: usize,
    segments: usize,
    rng: StdRng,
}

impl SentenceSource {
    pub fn new(sentences: usize, segments: usize) -> Self {
        Self {
            sentences: sentences.max(1),
            segments: segments.max(1),
            rng: StdRng::from_entropy(),
        }
    }

    fn sentence(&mut self) -> String {
        let rng = &mut self.rng;
        cgisf(
            rng.gen_range(1..3),
            rng.gen_range(1..3),
            rng.gen_range(1..5),
            rng.gen_bool(0.5),
            rng.gen_range(1..3),
            rng.gen_bool(0.5),
        )
    }
}

impl SegmentSource for SentenceSource {
    fn next_test(&mut self) -> Result<Vec<Segment>> {
        Ok((0..self.segments)
            .map(|_| {
                let text = (0..self.sentences).map(|_| self.sentence()).join(" ");
                Segment::new(text, "")
            })
            .collect())
    }
}

/// The same custom prompt for every test.
#[derive(Debug)]
pub struct FixedSource {
    segment: Segment,
}

impl FixedSource {
    pub fn new(prompt: &str) -> Result<Self> {
        if prompt.trim().is_empty() {
            return Err(Error::EmptySource("custom prompt".to_string()));
        }
        Ok(Self {
            segment: Segment::new(prompt, ""),
        })
    }
}

impl SegmentSource for FixedSource {
    fn next_test(&mut self) -> Result<Vec<Segment>> {
        Ok(vec![self.segment.clone()])
    }
}

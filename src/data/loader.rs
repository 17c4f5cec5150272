// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Reads the summarization corpus and turns each line into a
// vectorised SummaryExample.
//
// Corpus format: JSON Lines, one object per line
//   {"text": "Great taffy at a great price...", "summary": "great taffy"}
//
// Vectorisation:
//   text    → Preprocessor::tokenize → word_to_vector per token
//   summary → Preprocessor::tokenize → word_to_vector per token
//             followed by the vector of the end marker "eos"
//
// Unknown words silently become the "unk" vector, exactly as the
// vector space defines it.
//
// Reference: serde_json documentation (StreamDeserializer)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::data::preprocessor::Preprocessor;
use crate::domain::example::{RawExample, SummaryExample, WordVector};
use crate::domain::traits::VectorLookup;

/// Token appended to every target summary
pub const END_TOKEN: &str = "eos";

/// Loads raw examples from a JSON Lines file.
pub struct CorpusLoader {
    path: PathBuf,
}

impl CorpusLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read every non-blank line of the corpus.
    /// A malformed line fails the whole load, naming the line.
    pub fn load_all(&self) -> Result<Vec<RawExample>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Cannot open corpus '{}'", self.path.display()))?;
        let examples = read_json_lines(BufReader::new(file), &self.path)?;

        tracing::info!(
            "Loaded {} raw examples from '{}'",
            examples.len(),
            self.path.display()
        );
        Ok(examples)
    }
}

fn read_json_lines(reader: impl BufRead, source: &Path) -> Result<Vec<RawExample>> {
    let mut examples = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let example: RawExample = serde_json::from_str(&line).with_context(|| {
            format!("Malformed example on line {} of '{}'", line_no + 1, source.display())
        })?;
        examples.push(example);
    }
    Ok(examples)
}

/// Turns raw text into word-vector sequences.
pub struct Vectorizer<'a, L: VectorLookup> {
    lookup:       &'a L,
    preprocessor: Preprocessor,
}

impl<'a, L: VectorLookup> Vectorizer<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup, preprocessor: Preprocessor::new() }
    }

    /// Tokens of `text` after cleaning
    pub fn tokens(&self, text: &str) -> Vec<String> {
        self.preprocessor.tokenize(text)
    }

    /// Vectorise a raw example; the target gains a trailing end marker.
    pub fn vectorize(&self, raw: &RawExample) -> SummaryExample {
        let input      = self.vectorize_text(&raw.text);
        let mut target = self.vectorize_text(&raw.summary);
        target.push(self.lookup.word_to_vector(END_TOKEN));

        SummaryExample::new(input, target)
    }

    /// One vector per token of `text`, unknown words mapped to `unk`.
    pub fn vectorize_text(&self, text: &str) -> Vec<WordVector> {
        self.tokens(text)
            .iter()
            .map(|t| self.lookup.word_to_vector(t))
            .collect()
    }
}

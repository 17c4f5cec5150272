// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Cleans raw review / summary text and splits it into the word
// tokens that are looked up in the vector space.
//
// Review corpora scraped from the web often contain:
//   - Non-breaking spaces (U+00A0) and zero-width spaces
//   - Carriage returns (\r) from Windows line endings
//   - Tab characters and runs of spaces
//   - Control characters
//
// GloVe vocabularies are lowercase and treat punctuation as
// separate tokens ("great!" → "great", "!"), so tokenisation
// does the same.
//
// Cleaning steps (applied in order):
//   1. Replace Unicode whitespace variants with plain space
//   2. Replace \r with \n for consistent line endings
//   3. Remove invisible control characters
//   4. Collapse multiple spaces into one per line
//   5. Trim leading/trailing whitespace per line
//   6. Collapse more than 2 consecutive blank lines
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

pub struct Preprocessor;

impl Preprocessor {
    /// Create a new Preprocessor instance
    pub fn new() -> Self {
        Self
    }

    /// Clean a raw text string for downstream tokenisation.
    pub fn clean(&self, text: &str) -> String {
        // ── Step 1: Normalise individual characters ───────────────────────────
        let normalised: String = text
            .chars()
            .map(|c| match c {
                '\t' | '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
                '\r' => '\n',
                c if c.is_control() && c != '\n' => ' ',
                c => c,
            })
            .collect();

        // ── Step 2: Collapse spaces and trim, line by line ────────────────────
        let lines: Vec<String> = normalised
            .lines()
            .map(|line| line.split(' ').filter(|w| !w.is_empty()).collect::<Vec<_>>().join(" "))
            .collect();

        // ── Step 3: At most one blank line between paragraphs ─────────────────
        let mut result = String::with_capacity(normalised.len());
        let mut blank_run = 0usize;
        for line in &lines {
            if line.is_empty() {
                blank_run += 1;
                if blank_run > 1 {
                    continue;
                }
            } else {
                blank_run = 0;
            }
            result.push_str(line);
            result.push('\n');
        }

        result.trim().to_string()
    }

    /// Clean, lowercase and split `text` into word tokens.
    /// Punctuation characters become tokens of their own; an
    /// apostrophe inside a word is kept ("don't" stays whole).
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let cleaned = self.clean(text).to_lowercase();
        let mut tokens = Vec::new();

        for word in cleaned.split_whitespace() {
            let mut current = String::new();
            let chars: Vec<char> = word.chars().collect();

            for (i, &c) in chars.iter().enumerate() {
                let inner_apostrophe = c == '\''
                    && i > 0
                    && i + 1 < chars.len()
                    && chars[i - 1].is_alphanumeric()
                    && chars[i + 1].is_alphanumeric();

                if c.is_alphanumeric() || inner_apostrophe {
                    current.push(c);
                } else {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                    tokens.push(c.to_string());
                }
            }

            if !current.is_empty() {
                tokens.push(current);
            }
        }

        tokens
    }
}

/// Implement Default so Preprocessor can be created with Preprocessor::default()
impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
// These tests run with `cargo test` and verify the cleaning logic.
// Reference: Rust Book §11 (Writing Automated Tests)
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_multiple_spaces() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("hello   world"), "hello world");
    }

    #[test]
    fn test_trims_edges() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("  hello world  "), "hello world");
    }

    #[test]
    fn test_removes_control_chars() {
        let p = Preprocessor::new();
        // \x01 is a control character that should become a space
        assert_eq!(p.clean("hello\x01world"), "hello world");
    }

    #[test]
    fn test_collapses_blank_lines() {
        let p = Preprocessor::new();
        let input  = "line1\n\n\n\n\nline2";
        let output = p.clean(input);
        // Should have at most 2 newlines between lines
        assert!(!output.contains("\n\n\n"));
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::new();
        assert_eq!(p.clean(""), "");
        assert!(p.tokenize("   ").is_empty());
    }

    #[test]
    fn test_tokenize_splits_punctuation() {
        let p = Preprocessor::new();
        assert_eq!(
            p.tokenize("Great  taffy, GREAT price!"),
            vec!["great", "taffy", ",", "great", "price", "!"]
        );
    }

    #[test]
    fn test_tokenize_keeps_inner_apostrophe() {
        let p = Preprocessor::new();
        assert_eq!(p.tokenize("don't 'buy'"), vec!["don't", "'", "buy", "'"]);
    }
}

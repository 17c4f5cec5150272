// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw corpus lines to device-resident tensors.
//
// The pipeline flows in this order:
//
//   glove.6B.50d.txt           corpus.jsonl
//       │                          │
//       ▼                          ▼
//   VectorSpace  ◄──────────  CorpusLoader + Preprocessor
//       │                          │  (tokens → word vectors)
//       │                          ▼
//       │                     LengthFilter  (summary/text limits,
//       │                          │          window must fit)
//       ▼                          │
//   LimitedVocabulary ◄────────────┤  (built over every split)
//       │                          ▼
//       │                     split_train_val_test (ordered)
//       │                          ▼
//       │                     SummaryDataset
//       ▼                          │
//   SummaryBatcher  ◄──────────────┘
//       │   (one example → input/targets tensors)
//       ▼
//   training loop (Layer 5)
//
// Reference: Burn Book §4 (Datasets)
//            Rust Book §13 (Iterators and Closures)

/// Pretrained word vectors and the two lookups over them
pub mod vector_space;

/// Reads the JSON Lines corpus and vectorises examples
pub mod loader;

/// Cleans and tokenises raw text
pub mod preprocessor;

/// Drops examples outside the length thresholds
pub mod filter;

/// Ordered train/validation/test split
pub mod splitter;

/// Output vocabulary restricted to corpus words
pub mod vocabulary;

/// Implements Burn's Dataset trait for summary examples
pub mod dataset;

/// Builds per-example tensors
pub mod batcher;

// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs, traits and errors that define the core
// concepts of the summarizer.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// The model layer (Layer 5) turns these plain vectors into
// tensors; everything here stays testable without a backend.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Word vectors, raw and vectorised summary examples
pub mod example;

// Core abstractions (traits) that other layers implement
pub mod traits;

// Typed errors for the encode/decode/train path
pub mod error;

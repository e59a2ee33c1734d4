//! # Storage Primitives
//!
//! Every document the core persists (the config, each workspace's note index,
//! each todo day) is a small JSON file that is read, modified and written back
//! whole. This module owns the two rules that keep those files safe:
//!
//! 1. **Writes are atomic**: readers never observe a half-written file.
//! 2. **Reads never fail**: a corrupt document falls back to its previous
//!    generation, then to a caller-supplied default.
//!
//! ## Write Protocol
//!
//! ```text
//! serialize ──► <file>.tmp ──► re-parse (verify) ──► <file> → <file>.bak ──► <file>.tmp → <file>
//! ```
//!
//! - The verification step guards against serializer bugs, not user input. If
//!   the temp file does not parse back, the original is left untouched.
//! - Moving the live file to `.bak` is best-effort. A failure there is logged
//!   and does not block the write.
//! - The final rename is atomic on the underlying filesystem.
//!
//! ## Read Protocol
//!
//! ```text
//! <file> ok? ──► value
//!    │ missing/corrupt
//!    ▼
//! <file>.bak ok? ──► value
//!    │ missing/corrupt
//!    ▼
//! fallback
//! ```
//!
//! Recovery reaches exactly one generation back. Two consecutive corruptions
//! degrade silently to the fallback.
//!
//! ## Concurrency
//!
//! There is no lock and no compare-and-swap token: the host application is
//! single-instance and serializes requests. A multi-writer deployment must add
//! an advisory lock around [`atomic::write_json`].
//!
//! ## Layout
//!
//! ```text
//! index.json          # live generation
//! index.json.bak      # previous generation
//! index.json.tmp      # only present while a write is in flight (or after a crash)
//! ```

pub mod atomic;

pub use atomic::{backup_path, read_json, temp_path, try_read_json, write_json, write_text};

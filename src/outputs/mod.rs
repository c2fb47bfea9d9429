//! Persisting the finished brief.
//!
//! # Submodules
//!
//! - [`json`]: Writes the [`DigestPayload`](crate::models::DigestPayload) to the primary file and the dated archive
//!
//! # Output Structure
//!
//! ```text
//! public/
//! ├── today.json
//! └── archive/
//!     ├── 2025-05-05.json
//!     └── 2025-05-06.json
//! ```

pub mod json;

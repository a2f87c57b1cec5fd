//! API endpoint modules.
//!
//! Each module adds typed operations to a client as an `impl` block.

pub mod contents;

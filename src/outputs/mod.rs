//! Output artifacts written next to the Telegram alert.
//!
//! # Submodules
//!
//! - [`json`]: Writes the postings found in a run to a JSON file
//!
//! Outputs are write-only: nothing in the application reads them back.

pub mod json;

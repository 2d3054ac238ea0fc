//! # Quill Core
//!
//! Error taxonomy and shared result type for the Quill workspace.

pub mod error;
pub mod result;

pub use error::*;
pub use result::*;

// Re-export shaku for dependency injection
pub use shaku::Interface;

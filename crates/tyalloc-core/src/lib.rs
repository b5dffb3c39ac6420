//! Core types and traits for the tyalloc typed allocator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the element layout descriptor, the raw allocation primitive trait,
//! configuration, and the error types shared by the rest of the
//! workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod layout;
pub mod primitive;

pub use config::{AllocConfig, ReleasePolicy};
pub use error::{AllocError, ConfigError, ReleaseFault};
pub use layout::ElementLayout;
pub use primitive::RawAlloc;

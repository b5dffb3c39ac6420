//! Exact-size typed allocation over an injected raw primitive.
//!
//! A [`TypedAllocator<T, P>`](TypedAllocator) obtains uninitialised
//! storage for exactly `n` contiguous `T` and returns it, nothing more.
//! There is no size header, no free list and no pooling: every byte
//! size is recomputed from `n` and `T` and forwarded to the primitive.
//!
//! # Architecture
//!
//! ```text
//! TypedAllocator<T, P>
//! ├── ElementLayout (size_of/align_of T, fixed)
//! ├── AllocConfig (size domain bound, release policy)
//! ├── P: RawAlloc (SystemAlloc by default, or any injected primitive)
//! └── Option<Arc<ReleaseLedger>> (tracked release only, shared by clones)
//! ```
//!
//! [`Instrumented<P>`](Instrumented) can wrap any primitive to count calls
//! and emit `log` records without changing the allocator's contract.
//!
//! # Unsafe code
//!
//! This crate hands out raw storage, so `unsafe` is confined to
//! `handle.rs`, `system.rs`, `instrument.rs` and `typed.rs`, each item
//! carrying a `// SAFETY:` comment.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod handle;
pub mod instrument;
pub mod ledger;
pub mod system;
pub mod typed;

pub use handle::{Allocation, RejectedRelease, StorageHandle};
pub use instrument::{AllocStats, Instrumented};
pub use ledger::ReleaseLedger;
pub use system::SystemAlloc;
pub use typed::TypedAllocator;

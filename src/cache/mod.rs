//! Cache Module
//!
//! The driver contract and its engine: prefixing, lazy TTL expiration and the
//! value pipeline over a pluggable raw backend.

mod backend;
mod clock;
mod driver;
mod engine;
mod entry;
mod pipeline;
mod stats;


// Re-export public types
pub use backend::{Backend, MemoryBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::Driver;
pub use engine::CacheEngine;
pub use entry::Envelope;
pub use pipeline::{CipherFn, ConvertFn, Encryption, ParseFn, Pipeline, RawValue};
pub use stats::CacheStats;

//! Foundational low-level helpers shared across Giftwire crates.
//!
//! Provides alias normalization, transmission-safe message chunking, and the
//! atomic text-file write used for the delivery log artifact.

pub mod atomic_io;
pub mod chunk;
pub mod normalize;

pub use atomic_io::write_text_atomic;
pub use chunk::chunk_message;
pub use normalize::normalize_alias;

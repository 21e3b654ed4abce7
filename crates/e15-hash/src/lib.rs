//! Incremental hashing for e15.
//!
//! This crate provides two streaming hash algorithms sharing one shape: a
//! mutable core that accepts input in any chunking, and a fixed-width digest
//! value read back from it at any time.
//!
//! - [`Sha1Core`] / [`Sha1`] - SHA-1 (legacy content digest, not for security)
//! - [`Crc32Core`] / [`Crc32`] - CRC-32 (zlib / ISO-HDLC variant)
//! - [`HashValue`] - digest bytes with hex rendering and case-insensitive comparison
//! - [`HashEngine`] - the trait both cores implement
//! - [`stream`] - reader, writer and file adapters feeding the cores
//! - [`manifest`] - `sha1sum`-style checksum lists
//!
//! # Example
//!
//! ```
//! use e15_hash::{Crc32, Sha1Core};
//!
//! let mut core = Sha1Core::new();
//! core.append(b"1");
//! let partial = core.get();
//! core.append(b"23");
//!
//! assert_ne!(partial, core.get());
//! assert_eq!(core.get().to_hex(), "40bd001563085fc35165329ea1ff5c5ecbdbbeef");
//! assert_eq!(Crc32::digest(b"123"), "884863D2");
//! ```

mod algorithm;
mod engine;
mod error;
mod hash_value;

pub mod crc32;
pub mod manifest;
pub mod sha1;
pub mod stream;

pub use algorithm::{Algorithm, Checksum};
pub use crc32::{Crc32, Crc32Core};
pub use engine::{hash, HashEngine};
pub use error::{Error, IoFailure, Result};
pub use hash_value::{Crc32Hash, HashValue, Sha1Hash};
pub use sha1::{Sha1, Sha1Core};
pub use stream::{HashingReader, HashingWriter};

//! Byte-stream adapters that feed hash cores.
//!
//! The cores only ever see `&[u8]` chunks. This module connects them to
//! [`Read`] and [`Write`] implementations and to files on disk, turning
//! source and sink failures into the distinguishable [`Error::Open`],
//! [`Error::ReadShort`] and [`Error::WriteShort`] conditions.
//!
//! # Example
//!
//! ```
//! use std::io::Write;
//!
//! use e15_hash::{Crc32Core, HashingWriter};
//!
//! let mut writer = HashingWriter::<_, Crc32Core>::new(Vec::new());
//! writer.write_all(b"123")?;
//! let (bytes, hash) = writer.finish();
//! assert_eq!(bytes, b"123");
//! assert_eq!(hash.to_hex(), "884863d2");
//! # Ok::<(), std::io::Error>(())
//! ```

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use memmap2::Mmap;

use crate::engine::HashEngine;
use crate::{Error, Result};

/// Size of the stack buffer used when pumping a reader.
pub const BUFFER_SIZE: usize = 8 * 1024;

/// Feed everything `reader` yields into `engine`.
///
/// Memory use is a fixed stack buffer regardless of input size. Returns the
/// number of bytes hashed.
pub fn hash_reader<R: Read, E: HashEngine>(mut reader: R, engine: &mut E) -> Result<u64> {
    let mut buf = [0u8; BUFFER_SIZE];
    let mut total = 0u64;

    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                engine.append(&buf[..n]);
                total += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    log::trace!("{}: hashed {} bytes from reader", E::NAME, total);
    Ok(total)
}

/// Open a file for hashing, reporting failure as [`Error::Open`].
pub fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Hash a file through buffered reads.
pub fn hash_file<E: HashEngine>(path: impl AsRef<Path>) -> Result<E::Hash> {
    let path = path.as_ref();
    let file = open_file(path)?;

    let mut engine = E::default();
    let len = hash_reader(file, &mut engine)?;

    log::debug!("{} {}: {} bytes", E::NAME, path.display(), len);
    Ok(engine.get())
}

/// Hash a file through a read-only memory map.
///
/// Empty files are hashed as empty input without creating a map.
pub fn hash_file_mapped<E: HashEngine>(path: impl AsRef<Path>) -> Result<E::Hash> {
    let path = path.as_ref();
    let file = open_file(path)?;
    let len = file.metadata()?.len();

    let mut engine = E::default();
    if len > 0 {
        let mmap = unsafe { Mmap::map(&file)? };
        engine.append(&mmap);
    }

    log::debug!("{} {} (mapped): {} bytes", E::NAME, path.display(), len);
    Ok(engine.get())
}

/// A reader that hashes every byte it hands out.
#[derive(Debug)]
pub struct HashingReader<R, E> {
    inner: R,
    engine: E,
    count: u64,
}

impl<R: Read, E: HashEngine> HashingReader<R, E> {
    /// Wrap `inner` with a fresh engine.
    pub fn new(inner: R) -> Self {
        Self::with_engine(inner, E::default())
    }

    /// Wrap `inner`, continuing from an existing engine.
    pub fn with_engine(inner: R, engine: E) -> Self {
        Self {
            inner,
            engine,
            count: 0,
        }
    }

    /// The engine holding the bytes read so far.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Digest of the bytes read so far.
    pub fn get(&self) -> E::Hash {
        self.engine.get()
    }

    /// Number of bytes read through this adapter.
    pub fn bytes_read(&self) -> u64 {
        self.count
    }

    /// Fill `buf` completely or fail with [`Error::ReadShort`].
    ///
    /// Bytes read before the source ran dry stay hashed.
    pub fn read_exact_checked(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(Error::ReadShort {
                        expected: buf.len(),
                        actual: filled,
                    })
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Read until the source is exhausted, discarding the bytes.
    pub fn drain(&mut self) -> Result<u64> {
        let mut buf = [0u8; BUFFER_SIZE];
        let start = self.count;
        loop {
            match self.read(&mut buf) {
                Ok(0) => return Ok(self.count - start),
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Unwrap into the inner reader and the final digest.
    pub fn finish(self) -> (R, E::Hash) {
        let hash = self.engine.get();
        (self.inner, hash)
    }
}

impl<R: Read, E: HashEngine> Read for HashingReader<R, E> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.engine.append(&buf[..n]);
        self.count += n as u64;
        Ok(n)
    }
}

/// A writer that hashes every byte its inner writer accepts.
#[derive(Debug)]
pub struct HashingWriter<W, E> {
    inner: W,
    engine: E,
    count: u64,
}

impl<W: Write, E: HashEngine> HashingWriter<W, E> {
    /// Wrap `inner` with a fresh engine.
    pub fn new(inner: W) -> Self {
        Self::with_engine(inner, E::default())
    }

    /// Wrap `inner`, continuing from an existing engine.
    pub fn with_engine(inner: W, engine: E) -> Self {
        Self {
            inner,
            engine,
            count: 0,
        }
    }

    /// The engine holding the bytes written so far.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Digest of the bytes written so far.
    pub fn get(&self) -> E::Hash {
        self.engine.get()
    }

    /// Number of bytes accepted by the inner writer.
    pub fn bytes_written(&self) -> u64 {
        self.count
    }

    /// Write all of `buf` or fail with [`Error::WriteShort`].
    pub fn write_all_checked(&mut self, buf: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < buf.len() {
            match self.write(&buf[written..]) {
                Ok(0) => {
                    return Err(Error::WriteShort {
                        expected: buf.len(),
                        actual: written,
                    })
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Pump `reader` into this writer, returning the number of bytes copied.
    pub fn copy_from<R: Read>(&mut self, mut reader: R) -> Result<u64> {
        let mut buf = [0u8; BUFFER_SIZE];
        let mut total = 0u64;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            self.write_all_checked(&buf[..n])?;
            total += n as u64;
        }
        self.flush()?;
        Ok(total)
    }

    /// Unwrap into the inner writer and the final digest.
    pub fn finish(self) -> (W, E::Hash) {
        let hash = self.engine.get();
        (self.inner, hash)
    }
}

impl<W: Write, E: HashEngine> Write for HashingWriter<W, E> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.engine.append(&buf[..n]);
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

//! SHA-1 streaming hash.
//!
//! SHA-1 is kept as a legacy content digest. It is not collision resistant and
//! must not be relied on for security.
//!
//! [`Sha1Core`] holds the running state and accepts input in any chunking;
//! [`Sha1`] is a value wrapper with convenience constructors.

use std::borrow::Borrow;
use std::io;

use byteorder::{BigEndian, ByteOrder};

use crate::engine::HashEngine;
use crate::hash_value::Sha1Hash;

/// Size of one SHA-1 input block in bytes.
pub const BLOCK_SIZE: usize = 64;

/// Offset of the 64-bit message length in the final block.
const LENGTH_OFFSET: usize = BLOCK_SIZE - 8;

const INITIAL_STATE: [u32; 5] = [0x6745_2301, 0xefcd_ab89, 0x98ba_dcfe, 0x1032_5476, 0xc3d2_e1f0];

/// Running SHA-1 state.
///
/// Between calls the pending buffer always holds fewer than [`BLOCK_SIZE`]
/// bytes. The struct is `Copy`, and [`get`](Self::get) finalizes a copy, so
/// reading the digest never disturbs the live state.
#[derive(Debug, Clone, Copy)]
pub struct Sha1Core {
    state: [u32; 5],
    buffer: [u8; BLOCK_SIZE],
    buffer_len: usize,
    blocks: u64,
}

impl Sha1Core {
    /// Create an empty core.
    pub const fn new() -> Self {
        Self {
            state: INITIAL_STATE,
            buffer: [0; BLOCK_SIZE],
            buffer_len: 0,
            blocks: 0,
        }
    }

    /// Create a core pre-seeded with `data`.
    pub fn with_data(data: &[u8]) -> Self {
        let mut core = Self::new();
        core.append(data);
        core
    }

    /// Restore the initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feed bytes into the core.
    pub fn append(&mut self, mut data: &[u8]) {
        if self.buffer_len > 0 {
            let take = (BLOCK_SIZE - self.buffer_len).min(data.len());
            self.buffer[self.buffer_len..self.buffer_len + take].copy_from_slice(&data[..take]);
            self.buffer_len += take;
            data = &data[take..];

            if self.buffer_len < BLOCK_SIZE {
                return;
            }
            transform(&mut self.state, &self.buffer);
            self.blocks += 1;
            self.buffer_len = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_SIZE);
        for block in &mut blocks {
            transform(&mut self.state, block);
            self.blocks += 1;
        }

        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffer_len = rest.len();
    }

    /// Digest of everything appended so far.
    pub fn get(&self) -> Sha1Hash {
        (*self).finalize()
    }

    /// Number of complete blocks run through the transform.
    pub const fn blocks_processed(&self) -> u64 {
        self.blocks
    }

    /// Number of bytes waiting for a complete block.
    pub const fn pending_len(&self) -> usize {
        self.buffer_len
    }

    /// Total number of bytes appended.
    pub const fn total_len(&self) -> u64 {
        self.blocks
            .wrapping_mul(BLOCK_SIZE as u64)
            .wrapping_add(self.buffer_len as u64)
    }

    fn finalize(mut self) -> Sha1Hash {
        let bit_len = self.total_len().wrapping_mul(8);

        let mut len = self.buffer_len;
        self.buffer[len] = 0x80;
        len += 1;
        self.buffer[len..].fill(0);

        // No room left for the length field: flush and pad a fresh block.
        if len > LENGTH_OFFSET {
            transform(&mut self.state, &self.buffer);
            self.buffer = [0; BLOCK_SIZE];
        }

        self.buffer[LENGTH_OFFSET..].copy_from_slice(&bit_len.to_be_bytes());
        transform(&mut self.state, &self.buffer);

        let mut out = [0u8; 20];
        BigEndian::write_u32_into(&self.state, &mut out);
        Sha1Hash::from_bytes(out)
    }
}

/// Mix one 64-byte block into the running state.
fn transform(state: &mut [u32; 5], block: &[u8]) {
    debug_assert_eq!(block.len(), BLOCK_SIZE);

    let mut w = [0u32; 80];
    BigEndian::read_u32_into(block, &mut w[..16]);
    for i in 16..80 {
        w[i] = (w[i - 3] ^ w[i - 8] ^ w[i - 14] ^ w[i - 16]).rotate_left(1);
    }

    let [mut a, mut b, mut c, mut d, mut e] = *state;

    for (i, &wi) in w.iter().enumerate() {
        let (f, k) = match i {
            0..=19 => ((b & (c ^ d)) ^ d, 0x5a82_7999),
            20..=39 => (b ^ c ^ d, 0x6ed9_eba1),
            40..=59 => ((b & c) | (b & d) | (c & d), 0x8f1b_bcdc),
            _ => (b ^ c ^ d, 0xca62_c1d6),
        };

        let temp = a
            .rotate_left(5)
            .wrapping_add(f)
            .wrapping_add(e)
            .wrapping_add(k)
            .wrapping_add(wi);
        e = d;
        d = c;
        c = b.rotate_left(30);
        b = a;
        a = temp;
    }

    for (word, value) in state.iter_mut().zip([a, b, c, d, e]) {
        *word = word.wrapping_add(value);
    }
}

impl Default for Sha1Core {
    fn default() -> Self {
        Self::new()
    }
}

// Bytes past `buffer_len` are leftovers from earlier blocks and carry no state.
impl PartialEq for Sha1Core {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
            && self.blocks == other.blocks
            && self.buffer_len == other.buffer_len
            && self.buffer[..self.buffer_len] == other.buffer[..other.buffer_len]
    }
}

impl Eq for Sha1Core {}

impl HashEngine for Sha1Core {
    type Hash = Sha1Hash;

    const NAME: &'static str = "sha1";

    fn append(&mut self, data: &[u8]) {
        Sha1Core::append(self, data)
    }

    fn get(&self) -> Sha1Hash {
        Sha1Core::get(self)
    }

    fn reset(&mut self) {
        Sha1Core::reset(self)
    }

    fn total_len(&self) -> u64 {
        Sha1Core::total_len(self)
    }
}

impl<B: Borrow<u8>> Extend<B> for Sha1Core {
    fn extend<I: IntoIterator<Item = B>>(&mut self, iter: I) {
        self.append_iter(iter);
    }
}

impl io::Write for Sha1Core {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// SHA-1 value wrapper.
///
/// # Example
///
/// ```
/// use e15_hash::Sha1;
///
/// let mut sha1 = Sha1::from_data(b"1");
/// sha1.core_mut().append(b"23");
/// assert_eq!(sha1.get(), Sha1::digest(b"123"));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha1 {
    core: Sha1Core,
}

impl Sha1 {
    /// Create a wrapper around an empty core.
    pub const fn new() -> Self {
        Self { core: Sha1Core::new() }
    }

    /// Create a wrapper whose core has already consumed `data`.
    pub fn from_data(data: &[u8]) -> Self {
        Self { core: Sha1Core::with_data(data) }
    }

    /// Hash `data` in one call.
    pub fn digest(data: &[u8]) -> Sha1Hash {
        Sha1Core::with_data(data).get()
    }

    /// Digest of everything the core has consumed.
    pub fn get(&self) -> Sha1Hash {
        self.core.get()
    }

    /// The wrapped core.
    pub fn core(&self) -> &Sha1Core {
        &self.core
    }

    /// Mutable access to the wrapped core, for appending more data.
    pub fn core_mut(&mut self) -> &mut Sha1Core {
        &mut self.core
    }

    /// Unwrap into the core.
    pub fn into_core(self) -> Sha1Core {
        self.core
    }
}

impl From<Sha1Core> for Sha1 {
    fn from(core: Sha1Core) -> Self {
        Self { core }
    }
}

impl<B: Borrow<u8>> FromIterator<B> for Sha1 {
    fn from_iter<I: IntoIterator<Item = B>>(iter: I) -> Self {
        let mut core = Sha1Core::new();
        core.append_iter(iter);
        Self { core }
    }
}

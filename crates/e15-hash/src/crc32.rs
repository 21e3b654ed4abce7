//! CRC-32 streaming checksum.
//!
//! This is the reflected CRC-32 used by zlib, PNG and Ethernet
//! (CRC-32/ISO-HDLC): polynomial `0xEDB88320`, initial value and final XOR
//! `0xFFFFFFFF`. It detects accidental corruption and offers no security.

use std::borrow::Borrow;
use std::io;

use crate::engine::HashEngine;
use crate::hash_value::Crc32Hash;

/// Reversed CRC-32 polynomial.
pub const POLYNOMIAL: u32 = 0xEDB8_8320;

const INITIAL: u32 = 0xFFFF_FFFF;
const FINAL_XOR: u32 = 0xFFFF_FFFF;

const fn make_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut checksum = i as u32;
        let mut bit = 0;
        while bit < 8 {
            checksum = (checksum >> 1) ^ if checksum & 1 != 0 { POLYNOMIAL } else { 0 };
            bit += 1;
        }
        table[i] = checksum;
        i += 1;
    }
    table
}

/// Byte-at-a-time lookup table, built at compile time.
pub static TABLE: [u32; 256] = make_table();

/// Compute the CRC-32 of a byte slice.
#[inline]
pub fn checksum(data: &[u8]) -> u32 {
    Crc32Core::with_data(data).value()
}

/// Running CRC-32 state.
///
/// The accumulator is the only state; there is no pending buffer, every byte
/// is folded in as it arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc32Core {
    crc: u32,
    len: u64,
}

impl Crc32Core {
    /// Create an empty core.
    pub const fn new() -> Self {
        Self { crc: INITIAL, len: 0 }
    }

    /// Create a core pre-seeded with `data`.
    pub fn with_data(data: &[u8]) -> Self {
        let mut core = Self::new();
        core.append(data);
        core
    }

    /// Continue from a previously finalized checksum.
    ///
    /// `Crc32Core::resume(checksum(a))` followed by appending `b` yields
    /// `checksum(a ++ b)`. The byte count restarts at zero.
    pub const fn resume(checksum: u32) -> Self {
        Self { crc: checksum ^ FINAL_XOR, len: 0 }
    }

    /// Restore the initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feed bytes into the core.
    pub fn append(&mut self, data: &[u8]) {
        self.crc = data.iter().fold(self.crc, |crc, &byte| {
            TABLE[((crc ^ byte as u32) & 0xff) as usize] ^ (crc >> 8)
        });
        self.len = self.len.wrapping_add(data.len() as u64);
    }

    /// Digest of everything appended so far.
    pub fn get(&self) -> Crc32Hash {
        Crc32Hash::from_u32(self.value())
    }

    /// Numeric checksum of everything appended so far.
    pub const fn value(&self) -> u32 {
        self.crc ^ FINAL_XOR
    }

    /// Total number of bytes appended.
    pub const fn total_len(&self) -> u64 {
        self.len
    }
}

impl Default for Crc32Core {
    fn default() -> Self {
        Self::new()
    }
}

impl HashEngine for Crc32Core {
    type Hash = Crc32Hash;

    const NAME: &'static str = "crc32";

    fn append(&mut self, data: &[u8]) {
        Crc32Core::append(self, data)
    }

    fn get(&self) -> Crc32Hash {
        Crc32Core::get(self)
    }

    fn reset(&mut self) {
        Crc32Core::reset(self)
    }

    fn total_len(&self) -> u64 {
        Crc32Core::total_len(self)
    }
}

impl<B: Borrow<u8>> Extend<B> for Crc32Core {
    fn extend<I: IntoIterator<Item = B>>(&mut self, iter: I) {
        self.append_iter(iter);
    }
}

impl io::Write for Crc32Core {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// CRC-32 value wrapper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc32 {
    core: Crc32Core,
}

impl Crc32 {
    /// Create a wrapper around an empty core.
    pub const fn new() -> Self {
        Self { core: Crc32Core::new() }
    }

    /// Create a wrapper whose core has already consumed `data`.
    pub fn from_data(data: &[u8]) -> Self {
        Self { core: Crc32Core::with_data(data) }
    }

    /// Hash `data` in one call.
    pub fn digest(data: &[u8]) -> Crc32Hash {
        Crc32Core::with_data(data).get()
    }

    /// Digest of everything the core has consumed.
    pub fn get(&self) -> Crc32Hash {
        self.core.get()
    }

    /// The wrapped core.
    pub fn core(&self) -> &Crc32Core {
        &self.core
    }

    /// Mutable access to the wrapped core, for appending more data.
    pub fn core_mut(&mut self) -> &mut Crc32Core {
        &mut self.core
    }

    /// Unwrap into the core.
    pub fn into_core(self) -> Crc32Core {
        self.core
    }
}

impl From<Crc32Core> for Crc32 {
    fn from(core: Crc32Core) -> Self {
        Self { core }
    }
}

impl<B: Borrow<u8>> FromIterator<B> for Crc32 {
    fn from_iter<I: IntoIterator<Item = B>>(iter: I) -> Self {
        let mut core = Crc32Core::new();
        core.append_iter(iter);
        Self { core }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table() {
        assert_eq!(TABLE[0], 0);
        assert_eq!(TABLE[1], 0x7707_3096);
        assert_eq!(TABLE[128], POLYNOMIAL);
        assert_eq!(TABLE[255], 0x2d02_ef8d);
    }

    #[test]
    fn test_empty_hash() {
        assert_eq!(Crc32::new().get().to_u32(), 0);
        assert_eq!(Crc32::new().get().to_hex(), "00000000");
        assert_eq!(checksum(&[]), 0);
    }

    #[test]
    fn test_known_hash() {
        let s = "123";
        assert_eq!(Crc32::from_data(s.as_bytes()).get().to_u32(), 2_286_445_522);
        assert_eq!(Crc32::digest(s.as_bytes()).to_hex(), "884863d2");
        assert_eq!(s.bytes().collect::<Crc32>().get().to_u32(), 2_286_445_522);
        assert_eq!(s.as_bytes().iter().collect::<Crc32>().get().to_hex(), "884863d2");
        assert_eq!(checksum(b"123456789"), 0xcbf4_3926);
    }

    #[test]
    fn test_compare() {
        let nil = Crc32::new();
        let crc32 = Crc32::from_data(b"123");
        assert_eq!(crc32.get(), crc32.get());
        assert_ne!(nil.get(), crc32.get());
        assert!(crc32.get() == "884863d2");
        assert!(crc32.get() == "884863D2");
        assert!(crc32.get() != nil.get().to_hex());
    }

    #[test]
    fn test_append_data() {
        let parts = ["The quick brown ", "fox jumps over ", "the lazy dog"];
        let mut crc32 = Crc32::new();

        crc32.core_mut().append(parts[0].as_bytes());
        assert_eq!(crc32.get().to_hex(), "c81b2a7c");

        crc32.core_mut().extend(parts[1].bytes());
        assert_eq!(crc32.get().to_hex(), "88022e8c");

        crc32.core_mut().append_iter(parts[2].as_bytes().iter());
        assert_eq!(crc32.get().to_hex(), "414fa339");

        assert_eq!(
            crc32.get(),
            Crc32::digest(b"The quick brown fox jumps over the lazy dog")
        );
        assert_eq!(crc32.core().total_len(), 43);
    }

    #[test]
    fn test_get_is_non_destructive() {
        let mut core = Crc32Core::with_data(b"1");
        let before = core;
        let _ = core.get();
        assert_eq!(core, before);

        core.append(b"23");
        assert_eq!(core.get().to_hex(), "884863d2");
    }

    #[test]
    fn test_resume() {
        let first = checksum(b"The quick brown ");
        let mut core = Crc32Core::resume(first);
        core.append(b"fox jumps over the lazy dog");
        assert_eq!(core.value(), 0x414f_a339);
    }

    #[test]
    fn test_reset() {
        let mut core = Crc32Core::with_data(b"123");
        core.reset();
        assert_eq!(core.get().to_hex(), "00000000");
    }

    #[test]
    fn test_take_resets_source() {
        let mut crc1 = Crc32::from_data(b"123");
        let crc2 = std::mem::take(&mut crc1);
        assert_eq!(crc2.get().to_hex(), "884863d2");
        assert_ne!(crc1.get().to_hex(), "884863d2");
    }
}

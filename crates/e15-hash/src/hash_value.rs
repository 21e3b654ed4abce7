//! Fixed-width digest values.
//!
//! A [`HashValue`] is an immutable snapshot of a hash core's output. The digest
//! width is part of the type, so comparing a SHA-1 digest against a CRC-32
//! digest does not compile.

use std::fmt;
use std::str::FromStr;

use byteorder::{BigEndian, ByteOrder};

use crate::Error;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// A digest of `N` bytes.
///
/// Renders as `2 * N` lowercase hex characters and compares against hex
/// strings case-insensitively.
///
/// # Example
///
/// ```
/// use e15_hash::Sha1;
///
/// let hash = Sha1::digest(b"123");
/// assert_eq!(hash.to_hex(), "40bd001563085fc35165329ea1ff5c5ecbdbbeef");
/// assert!(hash == "40BD001563085FC35165329EA1FF5C5ECBDBBEEF");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashValue<const N: usize> {
    bytes: [u8; N],
}

/// SHA-1 digest (20 bytes, 40 hex characters).
pub type Sha1Hash = HashValue<20>;

/// CRC-32 digest (4 bytes, 8 hex characters).
pub type Crc32Hash = HashValue<4>;

impl<const N: usize> HashValue<N> {
    /// Width of the digest in bytes.
    pub const LEN: usize = N;

    /// Length of the rendered hex string.
    pub const HEX_LEN: usize = N * 2;

    /// Create a digest from raw bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; N]) -> Self {
        Self { bytes }
    }

    /// Get the raw bytes of the digest.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Consume the digest and return its bytes.
    #[inline]
    pub const fn to_byte_array(self) -> [u8; N] {
        self.bytes
    }

    /// Render as lowercase hex.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(N * 2);
        for &byte in &self.bytes {
            out.push(HEX_DIGITS[(byte >> 4) as usize] as char);
            out.push(HEX_DIGITS[(byte & 0x0f) as usize] as char);
        }
        out
    }

    /// Compare against a hex string, ignoring ASCII case.
    ///
    /// A string of the wrong length is simply not equal.
    pub fn eq_hex(&self, hex: &str) -> bool {
        let hex = hex.as_bytes();
        if hex.len() != N * 2 {
            return false;
        }

        self.bytes.iter().zip(hex.chunks_exact(2)).all(|(&byte, pair)| {
            pair[0].to_ascii_lowercase() == HEX_DIGITS[(byte >> 4) as usize]
                && pair[1].to_ascii_lowercase() == HEX_DIGITS[(byte & 0x0f) as usize]
        })
    }
}

impl HashValue<4> {
    /// Build a CRC-32 digest from its numeric value.
    #[inline]
    pub fn from_u32(value: u32) -> Self {
        Self { bytes: value.to_be_bytes() }
    }

    /// Numeric value of a CRC-32 digest.
    #[inline]
    pub fn to_u32(&self) -> u32 {
        u32::from_be_bytes(self.bytes)
    }
}

impl HashValue<20> {
    /// The five big-endian state words of a SHA-1 digest.
    pub fn to_words(&self) -> [u32; 5] {
        let mut words = [0u32; 5];
        BigEndian::read_u32_into(&self.bytes, &mut words);
        words
    }
}

impl<const N: usize> Default for HashValue<N> {
    fn default() -> Self {
        Self { bytes: [0; N] }
    }
}

impl<const N: usize> From<[u8; N]> for HashValue<N> {
    fn from(bytes: [u8; N]) -> Self {
        Self { bytes }
    }
}

impl<const N: usize> From<HashValue<N>> for [u8; N] {
    fn from(value: HashValue<N>) -> Self {
        value.bytes
    }
}

impl<const N: usize> AsRef<[u8]> for HashValue<N> {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl<const N: usize> PartialEq<str> for HashValue<N> {
    fn eq(&self, other: &str) -> bool {
        self.eq_hex(other)
    }
}

impl<const N: usize> PartialEq<&str> for HashValue<N> {
    fn eq(&self, other: &&str) -> bool {
        self.eq_hex(other)
    }
}

impl<const N: usize> PartialEq<String> for HashValue<N> {
    fn eq(&self, other: &String) -> bool {
        self.eq_hex(other)
    }
}

impl<const N: usize> fmt::Debug for HashValue<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashValue<{}>({})", N, self)
    }
}

impl<const N: usize> fmt::Display for HashValue<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}

impl<const N: usize> fmt::LowerHex for HashValue<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.bytes {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl<const N: usize> fmt::UpperHex for HashValue<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.bytes {
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

impl<const N: usize> FromStr for HashValue<N> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != N * 2 {
            return Err(Error::InvalidHexLength {
                expected: N * 2,
                actual: s.len(),
            });
        }

        // Every byte before `position` is ASCII, so it is a char boundary.
        let invalid = |position: usize| Error::InvalidHexDigit {
            position,
            found: s[position..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER),
        };

        let mut bytes = [0u8; N];
        for (i, pair) in s.as_bytes().chunks_exact(2).enumerate() {
            let high = hex_value(pair[0]).ok_or_else(|| invalid(i * 2))?;
            let low = hex_value(pair[1]).ok_or_else(|| invalid(i * 2 + 1))?;
            bytes[i] = (high << 4) | low;
        }

        Ok(Self { bytes })
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[cfg(feature = "serde")]
impl<const N: usize> serde::Serialize for HashValue<N> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de, const N: usize> serde::Deserialize<'de> for HashValue<N> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zero() {
        let hash = Crc32Hash::default();
        assert_eq!(hash.to_hex(), "00000000");
        assert_eq!(hash.to_u32(), 0);
    }

    #[test]
    fn test_hex_rendering_is_zero_padded() {
        let hash = Crc32Hash::from_u32(0x0000_0a0f);
        assert_eq!(hash.to_hex(), "00000a0f");
        assert_eq!(hash.to_string(), "00000a0f");
        assert_eq!(format!("{:X}", hash), "00000A0F");
    }

    #[test]
    fn test_eq_hex_ignores_case() {
        let hash = Crc32Hash::from_u32(0x8848_63d2);
        assert!(hash.eq_hex("884863d2"));
        assert!(hash.eq_hex("884863D2"));
        assert!(hash == "884863D2");
        assert!(hash == String::from("884863d2"));
        assert!(!hash.eq_hex("884863d3"));
    }

    #[test]
    fn test_eq_hex_length_mismatch() {
        let hash = Crc32Hash::from_u32(0x8848_63d2);
        assert!(!hash.eq_hex("884863d"));
        assert!(!hash.eq_hex("884863d20"));
        assert!(!hash.eq_hex(""));
    }

    #[test]
    fn test_parse() {
        let hash: Sha1Hash = "DA39A3EE5E6B4B0D3255BFEF95601890AFD80709".parse().unwrap();
        assert_eq!(hash.to_hex(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
        assert_eq!(
            hash.to_words(),
            [0xda39a3ee, 0x5e6b4b0d, 0x3255bfef, 0x95601890, 0xafd80709]
        );
    }

    #[test]
    fn test_parse_invalid_length() {
        let err = "abc".parse::<Crc32Hash>().unwrap_err();
        assert!(matches!(err, Error::InvalidHexLength { expected: 8, actual: 3 }));
    }

    #[test]
    fn test_parse_invalid_digit() {
        let err = "8848g3d2".parse::<Crc32Hash>().unwrap_err();
        assert!(matches!(err, Error::InvalidHexDigit { position: 4, found: 'g' }));
    }

    #[test]
    fn test_byte_equality() {
        let a = Crc32Hash::from_bytes([0x88, 0x48, 0x63, 0xd2]);
        let b = Crc32Hash::from_u32(0x8848_63d2);
        assert_eq!(a, b);
        assert_ne!(a, Crc32Hash::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_as_hex_string() {
        let hash = Crc32Hash::from_u32(0x414f_a339);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, "\"414fa339\"");
        let back: Crc32Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}

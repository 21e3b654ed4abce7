//! Runtime algorithm selection.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::crc32::Crc32Core;
use crate::engine::HashEngine;
use crate::hash_value::{Crc32Hash, Sha1Hash};
use crate::sha1::Sha1Core;
use crate::stream;
use crate::{Error, Result};

/// A supported hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Algorithm {
    #[default]
    Sha1,
    Crc32,
}

impl Algorithm {
    /// All supported algorithms.
    pub const ALL: [Algorithm; 2] = [Algorithm::Sha1, Algorithm::Crc32];

    /// Short lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Algorithm::Sha1 => Sha1Core::NAME,
            Algorithm::Crc32 => Crc32Core::NAME,
        }
    }

    /// Digest width in bytes.
    pub const fn digest_len(self) -> usize {
        match self {
            Algorithm::Sha1 => Sha1Hash::LEN,
            Algorithm::Crc32 => Crc32Hash::LEN,
        }
    }

    /// Length of the rendered hex digest.
    pub const fn hex_len(self) -> usize {
        self.digest_len() * 2
    }

    /// Hash a byte slice.
    pub fn hash_bytes(self, data: &[u8]) -> Checksum {
        match self {
            Algorithm::Sha1 => Checksum::Sha1(Sha1Core::with_data(data).get()),
            Algorithm::Crc32 => Checksum::Crc32(Crc32Core::with_data(data).get()),
        }
    }

    /// Hash everything a reader yields.
    pub fn hash_reader<R: Read>(self, reader: R) -> Result<Checksum> {
        Ok(match self {
            Algorithm::Sha1 => Checksum::Sha1(run::<Sha1Core, _>(reader)?),
            Algorithm::Crc32 => Checksum::Crc32(run::<Crc32Core, _>(reader)?),
        })
    }

    /// Hash a file through buffered reads.
    pub fn hash_file(self, path: impl AsRef<Path>) -> Result<Checksum> {
        Ok(match self {
            Algorithm::Sha1 => Checksum::Sha1(stream::hash_file::<Sha1Core>(path)?),
            Algorithm::Crc32 => Checksum::Crc32(stream::hash_file::<Crc32Core>(path)?),
        })
    }

    /// Hash a file through a read-only memory map.
    pub fn hash_file_mapped(self, path: impl AsRef<Path>) -> Result<Checksum> {
        Ok(match self {
            Algorithm::Sha1 => Checksum::Sha1(stream::hash_file_mapped::<Sha1Core>(path)?),
            Algorithm::Crc32 => Checksum::Crc32(stream::hash_file_mapped::<Crc32Core>(path)?),
        })
    }

    /// Guess the algorithm from the length of a hex digest.
    pub fn from_hex_len(len: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.hex_len() == len)
    }
}

fn run<E: HashEngine, R: Read>(reader: R) -> Result<E::Hash> {
    let mut engine = E::default();
    stream::hash_reader(reader, &mut engine)?;
    Ok(engine.get())
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(Algorithm::Sha1),
            "crc32" | "crc-32" => Ok(Algorithm::Crc32),
            _ => Err(Error::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// A digest tagged with the algorithm that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Checksum {
    Sha1(Sha1Hash),
    Crc32(Crc32Hash),
}

impl Checksum {
    /// The algorithm that produced this digest.
    pub const fn algorithm(&self) -> Algorithm {
        match self {
            Checksum::Sha1(_) => Algorithm::Sha1,
            Checksum::Crc32(_) => Algorithm::Crc32,
        }
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Checksum::Sha1(hash) => hash.as_ref(),
            Checksum::Crc32(hash) => hash.as_ref(),
        }
    }

    /// Render as lowercase hex.
    pub fn to_hex(&self) -> String {
        match self {
            Checksum::Sha1(hash) => hash.to_hex(),
            Checksum::Crc32(hash) => hash.to_hex(),
        }
    }

    /// Compare against a hex string, ignoring ASCII case.
    pub fn eq_hex(&self, hex: &str) -> bool {
        match self {
            Checksum::Sha1(hash) => hash.eq_hex(hex),
            Checksum::Crc32(hash) => hash.eq_hex(hex),
        }
    }

    /// Parse a hex digest for the given algorithm.
    pub fn parse(algorithm: Algorithm, hex: &str) -> Result<Self> {
        Ok(match algorithm {
            Algorithm::Sha1 => Checksum::Sha1(hex.parse()?),
            Algorithm::Crc32 => Checksum::Crc32(hex.parse()?),
        })
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Checksum::Sha1(hash) => fmt::Display::fmt(hash, f),
            Checksum::Crc32(hash) => fmt::Display::fmt(hash, f),
        }
    }
}

impl From<Sha1Hash> for Checksum {
    fn from(hash: Sha1Hash) -> Self {
        Checksum::Sha1(hash)
    }
}

impl From<Crc32Hash> for Checksum {
    fn from(hash: Crc32Hash) -> Self {
        Checksum::Crc32(hash)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Checksum {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("sha1".parse::<Algorithm>().unwrap(), Algorithm::Sha1);
        assert_eq!("SHA-1".parse::<Algorithm>().unwrap(), Algorithm::Sha1);
        assert_eq!("crc32".parse::<Algorithm>().unwrap(), Algorithm::Crc32);
        assert_eq!("CRC-32".parse::<Algorithm>().unwrap(), Algorithm::Crc32);
        assert!(matches!(
            "md5".parse::<Algorithm>(),
            Err(Error::UnknownAlgorithm(name)) if name == "md5"
        ));
    }

    #[test]
    fn test_display_roundtrip() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.to_string().parse::<Algorithm>().unwrap(), algorithm);
        }
    }

    #[test]
    fn test_lengths() {
        assert_eq!(Algorithm::Sha1.digest_len(), 20);
        assert_eq!(Algorithm::Sha1.hex_len(), 40);
        assert_eq!(Algorithm::Crc32.digest_len(), 4);
        assert_eq!(Algorithm::Crc32.hex_len(), 8);
        assert_eq!(Algorithm::from_hex_len(40), Some(Algorithm::Sha1));
        assert_eq!(Algorithm::from_hex_len(8), Some(Algorithm::Crc32));
        assert_eq!(Algorithm::from_hex_len(32), None);
    }

    #[test]
    fn test_hash_bytes() {
        let sha1 = Algorithm::Sha1.hash_bytes(b"123");
        assert_eq!(sha1.algorithm(), Algorithm::Sha1);
        assert_eq!(sha1.to_hex(), "40bd001563085fc35165329ea1ff5c5ecbdbbeef");

        let crc32 = Algorithm::Crc32.hash_bytes(b"123");
        assert_eq!(crc32.to_string(), "884863d2");
        assert!(crc32.eq_hex("884863D2"));
        assert_eq!(crc32.as_bytes(), &[0x88, 0x48, 0x63, 0xd2]);
    }

    #[test]
    fn test_hash_reader_matches_bytes() {
        let data = vec![0xa5u8; 10_000];
        for algorithm in Algorithm::ALL {
            let streamed = algorithm.hash_reader(&data[..]).unwrap();
            assert_eq!(streamed, algorithm.hash_bytes(&data));
        }
    }

    #[test]
    fn test_checksum_parse() {
        let parsed = Checksum::parse(Algorithm::Crc32, "884863D2").unwrap();
        assert_eq!(parsed, Algorithm::Crc32.hash_bytes(b"123"));
        assert!(Checksum::parse(Algorithm::Sha1, "884863d2").is_err());
    }
}

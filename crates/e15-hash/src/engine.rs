//! The interface shared by every hash core.

use std::borrow::Borrow;
use std::fmt::Debug;

/// Number of bytes staged on the stack when appending from an iterator.
const ITER_CHUNK: usize = 64;

/// A streaming hash core.
///
/// A core accepts input in any chunking and can produce its digest at any
/// point without being consumed or altered, so further input continues the
/// same computation.
pub trait HashEngine: Clone + Default + Debug {
    /// The digest type produced by [`get`](Self::get).
    type Hash;

    /// Short lowercase algorithm name.
    const NAME: &'static str;

    /// Feed bytes into the core.
    fn append(&mut self, data: &[u8]);

    /// Read the digest of everything appended so far.
    fn get(&self) -> Self::Hash;

    /// Return the core to its freshly constructed state.
    fn reset(&mut self);

    /// Total number of bytes appended since construction or the last reset.
    fn total_len(&self) -> u64;

    /// Feed bytes from any iterator of byte-like items.
    fn append_iter<I>(&mut self, iter: I)
    where
        I: IntoIterator,
        I::Item: Borrow<u8>,
    {
        let mut chunk = [0u8; ITER_CHUNK];
        let mut filled = 0;
        for byte in iter {
            chunk[filled] = *byte.borrow();
            filled += 1;
            if filled == ITER_CHUNK {
                self.append(&chunk);
                filled = 0;
            }
        }
        self.append(&chunk[..filled]);
    }
}

/// Hash a byte slice in one call.
pub fn hash<E: HashEngine>(data: &[u8]) -> E::Hash {
    let mut engine = E::default();
    engine.append(data);
    engine.get()
}

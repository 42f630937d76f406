//! Growing secret buffers without leaving copies behind
//!
//! `Vec`'s own growth reallocates and frees the old block as-is, so a
//! `Zeroizing<Vec<u8>>` only wipes the final allocation. Appending through
//! [`extend_wiped`] moves the contents into a new allocation instead and
//! lets the old one wipe itself on drop.

use zeroize::Zeroizing;

/// Smallest allocation made for a secret buffer.
const MIN_CAPACITY: usize = 64;

/// Append `bytes` to `buf`, never reallocating it in place.
pub fn extend_wiped(buf: &mut Zeroizing<Vec<u8>>, bytes: &[u8]) {
    let needed = buf.len() + bytes.len();
    if needed > buf.capacity() {
        let capacity = needed.max(buf.capacity() * 2).max(MIN_CAPACITY);
        let mut grown = Zeroizing::new(Vec::with_capacity(capacity));
        grown.extend_from_slice(&buf[..]);
        std::mem::swap(buf, &mut grown);
    }
    buf.extend_from_slice(bytes);
}

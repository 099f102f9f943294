//!
//! Display-order byte fields.
//!
//! Hashes and the `nBits` field are stored on disk in the reverse of
//! the order in which they are displayed and compared. Both directions
//! go through `reverse_bytes`.
//!
use crate::parser::errors::{OpError, OpResult};
use bitcoin_hashes::hex::{FromHex, ToHex};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Reverse the byte order of a fixed-size field.
#[inline]
pub fn reverse_bytes<const N: usize>(mut bytes: [u8; N]) -> [u8; N] {
    bytes.reverse();
    bytes
}

///
/// `N` bytes held in display order.
///
/// Serialized and formatted as lowercase hex.
///
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReversedBytes<const N: usize>([u8; N]);

/// 32-byte block, transaction and merkle hashes.
pub type Hash256 = ReversedBytes<32>;

/// The 4-byte difficulty field, kept opaque.
pub type Bits = ReversedBytes<4>;

impl<const N: usize> ReversedBytes<N> {
    /// from bytes in on-disk order
    #[inline]
    pub fn from_wire(wire: [u8; N]) -> Self {
        ReversedBytes(reverse_bytes(wire))
    }

    /// from bytes already in display order
    #[inline]
    pub fn from_display(display: [u8; N]) -> Self {
        ReversedBytes(display)
    }

    /// back to on-disk order
    #[inline]
    pub fn to_wire(&self) -> [u8; N] {
        reverse_bytes(self.0)
    }

    #[inline]
    pub fn as_display(&self) -> &[u8; N] {
        &self.0
    }

    pub fn from_hex(hex: &str) -> OpResult<Self> {
        let bytes = Vec::<u8>::from_hex(hex)?;
        if bytes.len() != N {
            return Err(OpError::from(
                format!("expected {} hex bytes, got {}", N, bytes.len()).as_str(),
            ));
        }
        let mut display = [0u8; N];
        display.copy_from_slice(&bytes);
        Ok(ReversedBytes(display))
    }
}

impl<const N: usize> Default for ReversedBytes<N> {
    fn default() -> Self {
        ReversedBytes([0u8; N])
    }
}

impl<const N: usize> fmt::Display for ReversedBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0[..].to_hex())
    }
}

impl<const N: usize> fmt::Debug for ReversedBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<const N: usize> FromStr for ReversedBytes<N> {
    type Err = OpError;

    fn from_str(s: &str) -> OpResult<Self> {
        ReversedBytes::from_hex(s)
    }
}

impl<const N: usize> Serialize for ReversedBytes<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

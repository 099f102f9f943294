use crate::parser::errors::OpResult;
use crate::parser::reversed::{Bits, Hash256};
use byteorder::{LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};

/// compact-size prefix announcing a following u16
const COMPACT_U16: u8 = 0xfd;
/// compact-size prefix announcing a following u32
const COMPACT_U32: u8 = 0xfe;
/// compact-size prefix announcing a following u64
const COMPACT_U64: u8 = 0xff;

pub trait BlockchainRead: std::io::Read {
    ///
    /// Read a compact-size integer.
    ///
    /// The first byte is the value itself when below 0xfd, otherwise it
    /// announces a little-endian u16, u32 or u64 that follows it.
    ///
    fn read_compact_size(&mut self) -> OpResult<u64> {
        let n = match self.read_u8()? {
            COMPACT_U16 => ReadBytesExt::read_u16::<LittleEndian>(self)? as u64,
            COMPACT_U32 => ReadBytesExt::read_u32::<LittleEndian>(self)? as u64,
            COMPACT_U64 => ReadBytesExt::read_u64::<LittleEndian>(self)?,
            small => small as u64,
        };
        Ok(n)
    }

    #[inline]
    fn read_u8(&mut self) -> OpResult<u8> {
        let mut slice = [0u8; 1];
        self.read_exact(&mut slice)?;
        Ok(slice[0])
    }

    #[inline]
    fn read_u256(&mut self) -> OpResult<[u8; 32]> {
        let mut arr = [0u8; 32];
        self.read_exact(&mut arr)?;
        Ok(arr)
    }

    /// 32 bytes, reversed into display order
    #[inline]
    fn read_hash(&mut self) -> OpResult<Hash256> {
        Ok(Hash256::from_wire(self.read_u256()?))
    }

    /// 4 bytes, reversed into display order
    #[inline]
    fn read_bits(&mut self) -> OpResult<Bits> {
        let mut arr = [0u8; 4];
        self.read_exact(&mut arr)?;
        Ok(Bits::from_wire(arr))
    }

    #[inline]
    fn read_u32(&mut self) -> OpResult<u32> {
        let u = ReadBytesExt::read_u32::<LittleEndian>(self)?;
        Ok(u)
    }

    #[inline]
    fn read_u64(&mut self) -> OpResult<u64> {
        let u = ReadBytesExt::read_u64::<LittleEndian>(self)?;
        Ok(u)
    }

    ///
    /// Read exactly `count` raw bytes.
    ///
    /// The buffer grows with the data actually present, so a corrupt
    /// length prefix ends in an end-of-stream error instead of a huge
    /// allocation.
    ///
    fn read_u8_vec(&mut self, count: u64) -> OpResult<Vec<u8>> {
        let mut arr = Vec::new();
        Read::take(&mut *self, count).read_to_end(&mut arr)?;
        if (arr.len() as u64) < count {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {} bytes, found {}", count, arr.len()),
            )
            .into());
        }
        Ok(arr)
    }
}

impl BlockchainRead for Cursor<&[u8]> {}
impl BlockchainRead for Cursor<Vec<u8>> {}
impl BlockchainRead for BufReader<File> {}
impl BlockchainRead for &[u8] {}
impl<R: Read> BlockchainRead for ByteCounter<R> {}

///
/// Forwarding reader that counts the bytes it hands out.
///
pub struct ByteCounter<R> {
    inner: R,
    consumed: u64,
}

impl<R: Read> ByteCounter<R> {
    pub fn new(inner: R) -> Self {
        ByteCounter { inner, consumed: 0 }
    }

    /// total bytes read so far
    #[inline]
    pub fn consumed(&self) -> u64 {
        self.consumed
    }
}

impl<R: Read> Read for ByteCounter<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed += n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::{BlockchainRead, ByteCounter};
    use std::io::Cursor;

    #[test]
    fn test_compact_size_widths() {
        let cases: Vec<(Vec<u8>, u64)> = vec![
            (vec![0x00], 0),
            (vec![0xfc], 252),
            (vec![0xfd, 0xfd, 0x00], 253),
            (vec![0xfd, 0xff, 0xff], 0xffff),
            (vec![0xfe, 0x00, 0x00, 0x01, 0x00], 0x10000),
            (vec![0xfe, 0xff, 0xff, 0xff, 0xff], 0xffff_ffff),
            (vec![0xff, 0, 0, 0, 0, 1, 0, 0, 0], 0x1_0000_0000),
            (vec![0xff; 9], u64::MAX),
        ];
        for (bytes, expected) in cases {
            let mut reader = Cursor::new(bytes.as_slice());
            assert_eq!(reader.read_compact_size().unwrap(), expected);
            assert_eq!(reader.position() as usize, bytes.len());
        }
    }

    #[test]
    fn test_compact_size_truncated() {
        let mut reader = Cursor::new(&[0xfeu8, 0x01, 0x02][..]);
        assert!(reader.read_compact_size().unwrap_err().is_eof());
    }

    #[test]
    fn test_read_hash_reverses() {
        let mut wire = [0u8; 32];
        wire[0] = 0x6f;
        wire[31] = 0x01;
        let mut reader = Cursor::new(&wire[..]);
        let hash = reader.read_hash().unwrap();
        assert_eq!(hash.as_display()[0], 0x01);
        assert_eq!(hash.as_display()[31], 0x6f);
        assert!(hash.to_string().starts_with("01"));
        assert!(hash.to_string().ends_with("6f"));
    }

    #[test]
    fn test_read_hash_short() {
        let mut reader = Cursor::new(&[0u8; 31][..]);
        assert!(reader.read_hash().unwrap_err().is_eof());
    }

    #[test]
    fn test_little_endian_integers() {
        let bytes = [0x29u8, 0xab, 0x5f, 0x49, 0x00, 0xf2, 0x05, 0x2a, 0x01, 0, 0, 0];
        let mut reader = Cursor::new(&bytes[..]);
        assert_eq!(reader.read_u32().unwrap(), 1231006505);
        assert_eq!(reader.read_u64().unwrap(), 5_000_000_000);
    }

    #[test]
    fn test_read_u8_vec() {
        let mut reader = Cursor::new(&[1u8, 2, 3, 4][..]);
        assert_eq!(reader.read_u8_vec(3).unwrap(), vec![1, 2, 3]);
        assert!(reader.read_u8_vec(2).unwrap_err().is_eof());
    }

    #[test]
    fn test_read_u8_vec_huge_length() {
        let mut reader = Cursor::new(&[0u8; 8][..]);
        assert!(reader.read_u8_vec(u64::MAX).unwrap_err().is_eof());
    }

    #[test]
    fn test_byte_counter() {
        let mut reader = ByteCounter::new(&[0xfdu8, 0x10, 0x00, 7, 7][..]);
        assert_eq!(reader.read_compact_size().unwrap(), 16);
        assert_eq!(reader.consumed(), 3);
        reader.read_u8().unwrap();
        assert_eq!(reader.consumed(), 4);
    }
}

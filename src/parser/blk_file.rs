use crate::parser::errors::{FormatError, OpError, OpResult};
use crate::parser::proto::full_proto::Block;
use crate::parser::reader::{BlockchainRead, ByteCounter};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Delimiter written in front of every block (main-net).
pub const MAGIC: [u8; 4] = [0xf9, 0xbe, 0xb4, 0xd9];

/// A raw blk file: magic, declared size and block, repeated.
#[derive(Debug, Clone)]
pub struct BlkFile {
    path: PathBuf,
}

impl BlkFile {
    pub(crate) fn new(path: &Path) -> OpResult<BlkFile> {
        if !path.is_file() {
            return Err(
                OpError::from("input file not found").join_msg(&path.display().to_string())
            );
        }
        Ok(BlkFile {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    ///
    /// Decode every block of the file, in order.
    ///
    /// The file handle lives inside this call only and is closed on
    /// every return path.
    ///
    pub(crate) fn read_blocks(&self) -> OpResult<Vec<Block>> {
        let file = File::open(&self.path)?;
        info!("Start reading blocks from {}", self.path.display());
        let blocks = BlkReader::new(BufReader::new(file)).collect::<OpResult<Vec<Block>>>()?;
        info!("Decoded {} blocks", blocks.len());
        Ok(blocks)
    }
}

///
/// Splits a byte stream into blocks.
///
/// Yields one `Block` per magic-delimited record until the stream is
/// exhausted. The first error is yielded once, after which the iterator
/// is finished.
///
/// The declared size of each block is read but never enforced. A
/// mismatch with the bytes actually decoded is logged and the next
/// delimiter is searched right where the decoder stopped.
///
pub struct BlkReader<R: Read> {
    reader: ByteCounter<R>,
    height: usize,
    finished: bool,
}

impl<R: Read> BlkReader<R> {
    pub fn new(reader: R) -> Self {
        BlkReader {
            reader: ByteCounter::new(reader),
            height: 0,
            finished: false,
        }
    }

    /// number of blocks yielded so far
    pub fn height(&self) -> usize {
        self.height
    }

    /// `None` on a clean end of stream
    fn read_magic(&mut self) -> OpResult<Option<[u8; 4]>> {
        let mut magic = [0u8; 4];
        let mut filled = 0;
        while filled < magic.len() {
            match self.reader.read(&mut magic[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        match filled {
            0 => Ok(None),
            4 => Ok(Some(magic)),
            _ => Err(FormatError::BadMagic {
                height: self.height,
                found: magic[..filled].to_vec(),
            }
            .into()),
        }
    }

    fn next_block(&mut self) -> OpResult<Option<Block>> {
        let magic = match self.read_magic()? {
            None => return Ok(None),
            Some(magic) => magic,
        };
        if magic != MAGIC {
            return Err(FormatError::BadMagic {
                height: self.height,
                found: magic.to_vec(),
            }
            .into());
        }
        let height = self.height;
        let truncated = |e: OpError| {
            if e.is_eof() {
                OpError::from(FormatError::Truncated { height })
            } else {
                e
            }
        };
        let declared = self.reader.read_u32().map_err(truncated)?;
        let start = self.reader.consumed();
        let block = Block::parse(&mut self.reader).map_err(truncated)?;
        let actual = self.reader.consumed() - start;
        if actual != declared as u64 {
            warn!(
                "block {} declares {} bytes but {} were decoded",
                height, declared, actual
            );
        }
        debug!(
            "block {}: {} ({} txs)",
            height,
            block.block_hash(),
            block.tx_count()
        );
        self.height += 1;
        Ok(Some(block))
    }
}

impl<R: Read> Iterator for BlkReader<R> {
    type Item = OpResult<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_block() {
            Ok(Some(block)) => Some(Ok(block)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::errors::OpErrorKind;
    use crate::parser::proto::full_proto::tests::{genesis_bytes, GENESIS_HASH};

    fn framed(block: &[u8], declared: u32) -> Vec<u8> {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&declared.to_le_bytes());
        bytes.extend_from_slice(block);
        bytes
    }

    fn format_error(err: OpError) -> FormatError {
        match err.kind() {
            OpErrorKind::FormatError(e) => e.clone(),
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_stream() {
        let mut reader = BlkReader::new(&b""[..]);
        assert!(reader.next().is_none());
        assert_eq!(reader.height(), 0);
    }

    #[test]
    fn test_two_blocks() {
        let genesis = genesis_bytes();
        let mut bytes = framed(&genesis, genesis.len() as u32);
        bytes.extend(framed(&genesis, genesis.len() as u32));
        let blocks = BlkReader::new(bytes.as_slice())
            .collect::<OpResult<Vec<Block>>>()
            .unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].block_hash().to_string(), GENESIS_HASH);
    }

    #[test]
    fn test_bad_magic() {
        let genesis = genesis_bytes();
        let mut bytes = framed(&genesis, genesis.len() as u32);
        bytes.extend_from_slice(&[0x0b, 0x11, 0x09, 0x07]);
        let mut reader = BlkReader::new(bytes.as_slice());
        assert!(reader.next().unwrap().is_ok());
        let err = format_error(reader.next().unwrap().unwrap_err());
        assert_eq!(
            err,
            FormatError::BadMagic {
                height: 1,
                found: vec![0x0b, 0x11, 0x09, 0x07]
            }
        );
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_partial_magic() {
        let mut reader = BlkReader::new(&MAGIC[..2]);
        let err = format_error(reader.next().unwrap().unwrap_err());
        assert_eq!(err.height(), 0);
        assert!(matches!(err, FormatError::BadMagic { .. }));
    }

    /// hands out one byte per call and fails every other call with `Interrupted`
    struct Stuttering<'a> {
        bytes: &'a [u8],
        interrupt: bool,
    }

    impl Read for Stuttering<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
            }
            if self.bytes.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[0];
            self.bytes = &self.bytes[1..];
            Ok(1)
        }
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let genesis = genesis_bytes();
        let mut bytes = framed(&genesis, genesis.len() as u32);
        bytes.extend(framed(&genesis, genesis.len() as u32));
        let reader = Stuttering {
            bytes: &bytes,
            interrupt: false,
        };
        let blocks = BlkReader::new(reader)
            .collect::<OpResult<Vec<Block>>>()
            .unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].block_hash().to_string(), GENESIS_HASH);
    }

    #[test]
    fn test_truncated_block() {
        let genesis = genesis_bytes();
        let bytes = framed(&genesis[..100], genesis.len() as u32);
        let mut reader = BlkReader::new(bytes.as_slice());
        let err = format_error(reader.next().unwrap().unwrap_err());
        assert_eq!(err, FormatError::Truncated { height: 0 });
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_truncated_declared_size() {
        let mut reader = BlkReader::new(&[0xf9u8, 0xbe, 0xb4, 0xd9, 0x1d][..]);
        let err = format_error(reader.next().unwrap().unwrap_err());
        assert_eq!(err, FormatError::Truncated { height: 0 });
    }

    #[test]
    fn test_declared_size_is_not_checked() {
        let genesis = genesis_bytes();
        let mut bytes = framed(&genesis, 1);
        bytes.extend(framed(&genesis, 1_000_000));
        let blocks = BlkReader::new(bytes.as_slice())
            .collect::<OpResult<Vec<Block>>>()
            .unwrap();
        assert_eq!(blocks.len(), 2);
    }
}

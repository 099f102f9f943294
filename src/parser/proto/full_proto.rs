///
/// Blocks and transactions exactly as laid out in a blk stream.
///
use crate::parser::errors::OpResult;
use crate::parser::reader::BlockchainRead;
use crate::parser::reversed::{Bits, Hash256};
use bitcoin_hashes::{sha256d, Hash};
use byteorder::{ByteOrder, LittleEndian};

/// serialized size of a block header
pub const HEADER_SIZE: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub txdata: Vec<Transaction>,
}

impl Block {
    /// decode the header followed by a compact-size counted transaction list
    pub fn parse<R: BlockchainRead + ?Sized>(reader: &mut R) -> OpResult<Block> {
        let header = BlockHeader::parse(reader)?;
        let tx_count = reader.read_compact_size()?;
        let mut txdata = Vec::new();
        for _ in 0..tx_count {
            txdata.push(Transaction::parse(reader)?);
        }
        Ok(Block { header, txdata })
    }

    #[inline]
    pub fn tx_count(&self) -> usize {
        self.txdata.len()
    }

    #[inline]
    pub fn block_hash(&self) -> Hash256 {
        self.header.block_hash()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: u32,
    pub prev_blockhash: Hash256,
    pub merkle_root: Hash256,
    /// unix seconds
    pub time: u32,
    /// kept as stored, never interpreted as a target
    pub bits: Bits,
    pub nonce: u32,
}

impl BlockHeader {
    pub fn parse<R: BlockchainRead + ?Sized>(reader: &mut R) -> OpResult<BlockHeader> {
        Ok(BlockHeader {
            version: reader.read_u32()?,
            prev_blockhash: reader.read_hash()?,
            merkle_root: reader.read_hash()?,
            time: reader.read_u32()?,
            bits: reader.read_bits()?,
            nonce: reader.read_u32()?,
        })
    }

    ///
    /// The 80 header bytes in on-disk order.
    ///
    pub fn header_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        LittleEndian::write_u32(&mut buf[0..4], self.version);
        buf[4..36].copy_from_slice(&self.prev_blockhash.to_wire());
        buf[36..68].copy_from_slice(&self.merkle_root.to_wire());
        LittleEndian::write_u32(&mut buf[68..72], self.time);
        buf[72..76].copy_from_slice(&self.bits.to_wire());
        LittleEndian::write_u32(&mut buf[76..80], self.nonce);
        buf
    }

    ///
    /// Double SHA-256 of the header, in display order.
    ///
    /// Comparable with the `prev_blockhash` of the next block.
    ///
    pub fn block_hash(&self) -> Hash256 {
        let digest = sha256d::Hash::hash(&self.header_bytes());
        Hash256::from_wire(digest.into_inner())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    /// List of inputs
    pub input: Vec<TxIn>,
    /// List of outputs
    pub output: Vec<TxOut>,
    pub lock_time: u32,
}

impl Transaction {
    ///
    /// Structural decode only, no field is checked here.
    ///
    pub fn parse<R: BlockchainRead + ?Sized>(reader: &mut R) -> OpResult<Transaction> {
        let version = reader.read_u32()?;
        let in_count = reader.read_compact_size()?;
        let mut input = Vec::new();
        for _ in 0..in_count {
            input.push(TxIn::parse(reader)?);
        }
        let out_count = reader.read_compact_size()?;
        let mut output = Vec::new();
        for _ in 0..out_count {
            output.push(TxOut::parse(reader)?);
        }
        Ok(Transaction {
            version,
            input,
            output,
            lock_time: reader.read_u32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    pub prev_txid: Hash256,
    pub vout: u32,
    /// opaque, never executed
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

impl TxIn {
    pub fn parse<R: BlockchainRead + ?Sized>(reader: &mut R) -> OpResult<TxIn> {
        let prev_txid = reader.read_hash()?;
        let vout = reader.read_u32()?;
        let script_len = reader.read_compact_size()?;
        Ok(TxIn {
            prev_txid,
            vout,
            script_sig: reader.read_u8_vec(script_len)?,
            sequence: reader.read_u32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    /// satoshis
    pub value: u64,
    pub script_pubkey: Vec<u8>,
}

impl TxOut {
    pub fn parse<R: BlockchainRead + ?Sized>(reader: &mut R) -> OpResult<TxOut> {
        let value = reader.read_u64()?;
        let script_len = reader.read_compact_size()?;
        Ok(TxOut {
            value,
            script_pubkey: reader.read_u8_vec(script_len)?,
        })
    }
}

///
/// Output document layout.
///
/// These records borrow from the decoded blocks and only exist to be
/// serialized, with hashes as display-order hex and scripts as hex with
/// their size in bytes.
///
use crate::parser::proto::full_proto::{Block, Transaction, TxIn, TxOut};
use crate::parser::reversed::{Bits, Hash256};
use bitcoin_hashes::hex::ToHex;
use chrono::{TimeZone, Utc};
use serde::Serialize;

const READABLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Serialize)]
pub struct JChain<'a> {
    pub blocks: Vec<JBlock<'a>>,
    pub height: usize,
}

impl<'a> JChain<'a> {
    pub fn parse(blocks: &'a [Block]) -> JChain<'a> {
        JChain {
            blocks: blocks
                .iter()
                .enumerate()
                .map(|(height, block)| JBlock::parse(height, block))
                .collect(),
            height: blocks.len(),
        }
    }
}

#[derive(Serialize)]
pub struct JBlock<'a> {
    pub height: usize,
    pub version: u32,
    pub previous_hash: &'a Hash256,
    pub merkle_hash: &'a Hash256,
    pub timestamp: u32,
    pub timestamp_readable: String,
    pub nbits: &'a Bits,
    pub nonce: u32,
    pub txn_count: usize,
    pub transactions: Vec<JTransaction>,
}

impl<'a> JBlock<'a> {
    pub fn parse(height: usize, block: &'a Block) -> JBlock<'a> {
        let header = &block.header;
        JBlock {
            height,
            version: header.version,
            previous_hash: &header.prev_blockhash,
            merkle_hash: &header.merkle_root,
            timestamp: header.time,
            timestamp_readable: readable_time(header.time),
            nbits: &header.bits,
            nonce: header.nonce,
            txn_count: block.tx_count(),
            transactions: block.txdata.iter().map(JTransaction::parse).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct JTransaction {
    pub version: u32,
    pub txn_in_count: usize,
    pub txn_inputs: Vec<JTxIn>,
    pub txn_out_count: usize,
    pub txn_outputs: Vec<JTxOut>,
    pub lock_time: u32,
}

impl JTransaction {
    pub fn parse(tx: &Transaction) -> JTransaction {
        JTransaction {
            version: tx.version,
            txn_in_count: tx.input.len(),
            txn_inputs: tx.input.iter().map(JTxIn::parse).collect(),
            txn_out_count: tx.output.len(),
            txn_outputs: tx.output.iter().map(JTxOut::parse).collect(),
            lock_time: tx.lock_time,
        }
    }
}

#[derive(Serialize)]
pub struct JTxIn {
    pub txn_hash: String,
    pub index: u32,
    pub input_script_size: usize,
    pub input_script_bytes: String,
    pub sequence: u32,
}

impl JTxIn {
    pub fn parse(tx_in: &TxIn) -> JTxIn {
        JTxIn {
            txn_hash: tx_in.prev_txid.to_string(),
            index: tx_in.vout,
            input_script_size: tx_in.script_sig.len(),
            input_script_bytes: tx_in.script_sig.to_hex(),
            sequence: tx_in.sequence,
        }
    }
}

#[derive(Serialize)]
pub struct JTxOut {
    pub satoshis: u64,
    pub output_script_size: usize,
    pub output_script_bytes: String,
}

impl JTxOut {
    pub fn parse(out: &TxOut) -> JTxOut {
        JTxOut {
            satoshis: out.value,
            output_script_size: out.script_pubkey.len(),
            output_script_bytes: out.script_pubkey.to_hex(),
        }
    }
}

/// UTC calendar time of a block timestamp
pub fn readable_time(time: u32) -> String {
    Utc.timestamp_opt(time as i64, 0)
        .single()
        .map(|dt| dt.format(READABLE_TIME_FORMAT).to_string())
        .unwrap_or_else(|| time.to_string())
}

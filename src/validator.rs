//!
//! Chain checks over a decoded block sequence.
//!
//! Blocks are visited in height order carrying only the previous block.
//! The first broken rule stops the walk.
//!
//! Not everything a full node checks is checked here, see
//! [`KNOWN_LIMITATIONS`].
//!
use crate::parser::proto::full_proto::Block;
use log::{debug, info};
use std::fmt;

/// the only block and transaction version accepted
pub const SUPPORTED_VERSION: u32 = 1;

/// how far (seconds) a block time may lag behind its predecessor, exclusive
pub const MAX_TIME_LAG: i64 = 2 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// block version is `SUPPORTED_VERSION`
    BlockVersion,
    /// `prev_blockhash` is the hash of the previous header
    PrevHashLink,
    /// time is later than previous time minus `MAX_TIME_LAG`
    Timestamp,
    /// every transaction version is `SUPPORTED_VERSION`
    TxVersion,
}

impl Rule {
    /// number printed in error reports
    pub fn number(&self) -> u8 {
        match self {
            Rule::BlockVersion => 2,
            Rule::PrevHashLink => 3,
            Rule::Timestamp => 4,
            Rule::TxVersion => 5,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::BlockVersion => "block version",
            Rule::PrevHashLink => "previous header hash",
            Rule::Timestamp => "timestamp",
            Rule::TxVersion => "transaction version",
        };
        write!(f, "rule {} ({})", self.number(), name)
    }
}

/// The first rule a block sequence breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleViolation {
    pub rule: Rule,
    pub height: usize,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} broken by block {}", self.rule, self.height)
    }
}

///
/// Checks this crate does not perform.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Limitation {
    /// the size written before each block is never compared with the block
    DeclaredSizeUnchecked,
    /// merkle roots are not recomputed
    MerkleRootUnchecked,
    /// header hashes are not compared with `nBits`
    ProofOfWorkUnchecked,
    /// scripts are carried as opaque bytes
    ScriptsUnchecked,
}

pub const KNOWN_LIMITATIONS: [Limitation; 4] = [
    Limitation::DeclaredSizeUnchecked,
    Limitation::MerkleRootUnchecked,
    Limitation::ProofOfWorkUnchecked,
    Limitation::ScriptsUnchecked,
];

impl Limitation {
    pub fn description(&self) -> &'static str {
        match self {
            Limitation::DeclaredSizeUnchecked => {
                "declared block sizes are not enforced; a wrong size desynchronizes the stream"
            }
            Limitation::MerkleRootUnchecked => {
                "merkle roots are not recomputed; altered transactions go unnoticed"
            }
            Limitation::ProofOfWorkUnchecked => "proof of work is not verified against nBits",
            Limitation::ScriptsUnchecked => "scripts are neither parsed nor executed",
        }
    }
}

impl fmt::Display for Limitation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

///
/// Check `blocks` in order.
///
/// Returns the number of blocks checked, or the first violation found.
///
pub fn validate(blocks: &[Block]) -> Result<usize, RuleViolation> {
    blocks
        .iter()
        .enumerate()
        .try_fold(None, |prev, (height, block)| match check_block(prev, block) {
            Ok(()) => {
                debug!("block {} passed", height);
                Ok(Some(block))
            }
            Err(rule) => Err(RuleViolation { rule, height }),
        })?;
    info!("Validated {} blocks", blocks.len());
    Ok(blocks.len())
}

///
/// Check a single block given its predecessor, in rule order.
///
pub fn check_block(prev: Option<&Block>, block: &Block) -> Result<(), Rule> {
    let header = &block.header;
    if header.version != SUPPORTED_VERSION {
        return Err(Rule::BlockVersion);
    }
    if let Some(prev) = prev {
        if prev.block_hash() != header.prev_blockhash {
            return Err(Rule::PrevHashLink);
        }
        if header.time as i64 <= prev.header.time as i64 - MAX_TIME_LAG {
            return Err(Rule::Timestamp);
        }
    }
    if block
        .txdata
        .iter()
        .any(|tx| tx.version != SUPPORTED_VERSION)
    {
        return Err(Rule::TxVersion);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::proto::full_proto::{BlockHeader, Transaction};
    use crate::parser::reversed::{Bits, Hash256};

    fn tx(version: u32) -> Transaction {
        Transaction {
            version,
            input: Vec::new(),
            output: Vec::new(),
            lock_time: 0,
        }
    }

    fn block_after(prev: Option<&Block>, time: u32) -> Block {
        Block {
            header: BlockHeader {
                version: 1,
                prev_blockhash: prev.map(Block::block_hash).unwrap_or_default(),
                merkle_root: Hash256::default(),
                time,
                bits: Bits::from_display([0x1d, 0x00, 0xff, 0xff]),
                nonce: 0,
            },
            txdata: vec![tx(1)],
        }
    }

    /// linked chain with one block every ten minutes
    fn chain(len: usize) -> Vec<Block> {
        let mut blocks: Vec<Block> = Vec::new();
        for i in 0..len {
            let block = block_after(blocks.last(), 1_700_000_000 + 600 * i as u32);
            blocks.push(block);
        }
        blocks
    }

    fn relink(blocks: &mut [Block], from: usize) {
        for h in from.max(1)..blocks.len() {
            blocks[h].header.prev_blockhash = blocks[h - 1].block_hash();
        }
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(validate(&[]), Ok(0));
    }

    #[test]
    fn test_valid_chain() {
        assert_eq!(validate(&chain(5)), Ok(5));
    }

    #[test]
    fn test_first_block_is_not_linked() {
        let mut blocks = chain(1);
        blocks[0].header.prev_blockhash = Hash256::from_display([7u8; 32]);
        blocks[0].header.time = 0;
        assert_eq!(validate(&blocks), Ok(1));
    }

    #[test]
    fn test_block_version() {
        let mut blocks = chain(4);
        blocks[2].header.version = 2;
        relink(&mut blocks, 3);
        assert_eq!(
            validate(&blocks),
            Err(RuleViolation {
                rule: Rule::BlockVersion,
                height: 2
            })
        );
    }

    #[test]
    fn test_broken_link() {
        let mut blocks = chain(3);
        blocks[1].header.prev_blockhash = Hash256::default();
        let err = validate(&blocks).unwrap_err();
        assert_eq!(err.rule.number(), 3);
        assert_eq!(err.height, 1);
    }

    #[test]
    fn test_altered_predecessor_breaks_link() {
        let mut blocks = chain(3);
        blocks[1].header.nonce = 42;
        let err = validate(&blocks).unwrap_err();
        assert_eq!((err.rule, err.height), (Rule::PrevHashLink, 2));
    }

    #[test]
    fn test_timestamp_tolerance() {
        let base = 1_700_000_000;
        for (lag, expected) in &[(7199u32, true), (7200, false), (7201, false)] {
            let first = block_after(None, base);
            let second = block_after(Some(&first), base - lag);
            let result = validate(&[first, second]);
            if *expected {
                assert_eq!(result, Ok(2), "lag {}", lag);
            } else {
                assert_eq!(
                    result,
                    Err(RuleViolation {
                        rule: Rule::Timestamp,
                        height: 1
                    }),
                    "lag {}",
                    lag
                );
            }
        }
    }

    #[test]
    fn test_timestamp_near_epoch() {
        // previous time minus the lag goes negative
        let first = block_after(None, 100);
        let second = block_after(Some(&first), 0);
        assert_eq!(validate(&[first, second]), Ok(2));
    }

    #[test]
    fn test_transaction_version() {
        let mut blocks = chain(3);
        blocks[1].txdata.push(tx(2));
        relink(&mut blocks, 2);
        assert_eq!(
            validate(&blocks),
            Err(RuleViolation {
                rule: Rule::TxVersion,
                height: 1
            })
        );
    }

    #[test]
    fn test_first_failure_wins() {
        let mut blocks = chain(4);
        blocks[1].txdata[0].version = 3;
        blocks[3].header.version = 0;
        relink(&mut blocks, 2);
        let err = validate(&blocks).unwrap_err();
        assert_eq!((err.rule, err.height), (Rule::TxVersion, 1));
    }

    #[test]
    fn test_version_checked_before_link() {
        let mut blocks = chain(2);
        blocks[1].header.version = 4;
        blocks[1].header.prev_blockhash = Hash256::default();
        assert_eq!(check_block(Some(&blocks[0]), &blocks[1]), Err(Rule::BlockVersion));
    }

    #[test]
    fn test_limitations_are_described() {
        for limitation in KNOWN_LIMITATIONS.iter() {
            assert!(!limitation.description().is_empty());
        }
    }
}

//!
//! Crates APIs, essential structs, functions, methods are all here!
//!
//! To quickly understand how to use this crate, have a look at the
//! documentation for `blk_validator::BlkValidator`.
//!
//! # Example
//!
//! ```rust
//! use blk_validator::BlkValidator;
//! use std::path::Path;
//!
//! let path = Path::new("/Users/me/blk00000.dat");
//!
//! // decode, validate, then write /Users/me/blk00000.dat.json
//! let validator = BlkValidator::new(path).unwrap();
//! let height = validator.run(None).unwrap();
//! ```
//!

pub mod emit;

use crate::parser::blk_file::BlkFile;
use log::info;
use std::path::{Path, PathBuf};
// re-exports
pub use crate::api::emit::{default_output_path, write_json};
pub use crate::parser::blk_file::{BlkReader, MAGIC};
pub use crate::parser::errors::{FormatError, OpError, OpErrorKind, OpResult};
pub use crate::parser::proto::full_proto::{Block, BlockHeader, Transaction, TxIn, TxOut};
pub use crate::parser::proto::json_proto::JChain;
pub use crate::parser::reversed::{Bits, Hash256, ReversedBytes};
pub use crate::validator::{
    check_block, validate, Limitation, Rule, RuleViolation, KNOWN_LIMITATIONS,
};

///
/// All blocks of one input, in stream order.
///
/// The index of a block is its height.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSequence {
    blocks: Vec<Block>,
}

impl BlockSequence {
    pub fn new(blocks: Vec<Block>) -> BlockSequence {
        BlockSequence { blocks }
    }

    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, height: usize) -> Option<&Block> {
        self.blocks.get(height)
    }

    ///
    /// Run every chain rule over the sequence.
    ///
    /// Returns the number of blocks validated.
    ///
    pub fn validate(&self) -> OpResult<usize> {
        Ok(validate(&self.blocks)?)
    }

    /// the output document, borrowing from this sequence
    pub fn to_json(&self) -> JChain<'_> {
        JChain::parse(&self.blocks)
    }
}

///
/// This is the main struct of this crate!! Click and read the doc.
///
/// It ties one input file to the decode, validate and emit steps.
///
pub struct BlkValidator {
    pub blk_file: BlkFile,
}

impl BlkValidator {
    ///
    /// Fails when `path` is not an existing file.
    ///
    /// # Example
    ///
    /// ```rust
    /// use blk_validator::BlkValidator;
    /// use std::path::Path;
    ///
    /// let validator = BlkValidator::new(Path::new("blk00000.dat")).unwrap();
    /// ```
    pub fn new(path: &Path) -> OpResult<BlkValidator> {
        Ok(BlkValidator {
            blk_file: BlkFile::new(path)?,
        })
    }

    pub fn input_path(&self) -> &Path {
        self.blk_file.path()
    }

    ///
    /// Decode every block of the input.
    ///
    /// Stops at the first bad magic delimiter or truncated block.
    ///
    pub fn read_blocks(&self) -> OpResult<BlockSequence> {
        Ok(BlockSequence::new(self.blk_file.read_blocks()?))
    }

    ///
    /// Decode and validate the input, without writing anything.
    ///
    pub fn check(&self) -> OpResult<BlockSequence> {
        let sequence = self.read_blocks()?;
        sequence.validate()?;
        Ok(sequence)
    }

    ///
    /// Decode, validate and write the JSON document.
    ///
    /// `output` defaults to the input path with `.json` appended.
    /// Nothing is written when decoding or validation fails.
    /// Returns the number of blocks validated.
    ///
    pub fn run(&self, output: Option<&Path>) -> OpResult<usize> {
        let sequence = self.check()?;
        let output: PathBuf = match output {
            Some(p) => p.to_path_buf(),
            None => default_output_path(self.input_path()),
        };
        write_json(&sequence, &output)?;
        info!("Wrote {} blocks to {}", sequence.len(), output.display());
        Ok(sequence.len())
    }
}

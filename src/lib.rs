//!
//! # Introduction
//!
//! This library decodes a stream of serialized Bitcoin blocks, as
//! found in Bitcoin Core `blk*.dat` files, checks a few chain rules
//! over the decoded sequence and dumps it as JSON.
//!
//! Every block is preceded by the main-net magic `f9beb4d9` and a
//! declared size. Headers, transactions, inputs and outputs are
//! decoded field by field; scripts are kept as opaque bytes.
//!
//! The rules checked, in order, for the block at height `h`:
//! - rule 2: block version is 1
//! - rule 3: `prev_blockhash` is the double SHA-256 of block `h - 1`
//! - rule 4: time is later than the time of block `h - 1` minus 7200 seconds
//! - rule 5: every transaction version is 1
//!
//! Malformed framing and truncated blocks are reported as rule 1.
//!
//! ## Caveat
//!
//! Declared block sizes, merkle roots, proof of work and scripts are
//! not checked. See `KNOWN_LIMITATIONS`.
//!
//! A bad magic delimiter is reported as `Error 1 Block <h>` with `h` the
//! height of the block it precedes, not always as block 0.
//!
//! # Example
//!
//! ```rust
//! use blk_validator::BlkValidator;
//! use std::path::Path;
//!
//! let path = Path::new("/Users/me/blk00000.dat");
//!
//! let validator = BlkValidator::new(path).unwrap();
//!
//! // decode and validate only
//! let blocks = validator.check().unwrap();
//!
//! // decode, validate and write /Users/me/blk00000.dat.json
//! let height = validator.run(None).unwrap();
//! ```
//!

pub(crate) mod api;
pub mod parser;
pub mod validator;

#[doc(inline)]
pub use crate::api::*;

//!
//! ## Block Types
//!
//! - `full_proto::Block`: everything a blk stream stores about a block,
//!   with hashes and `nBits` turned into display order.
//! - `json_proto::JChain`: the output document, borrowing from a
//!   decoded block sequence.
//!

/// blocks, transactions, inputs and outputs as decoded from disk
pub mod full_proto;

/// serde layout of the output document
pub mod json_proto;

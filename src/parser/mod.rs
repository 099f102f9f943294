//!
//! This module defines how to parse binary data on disk to Block structs defined in proto.
//!

/// split a blk stream into magic-delimited blocks
pub mod blk_file;

/// define binary readers
pub mod reader;

/// display-order byte fields (hashes, nBits)
pub mod reversed;

/// blockchain data representation
pub mod proto;

/// error handling
pub mod errors;

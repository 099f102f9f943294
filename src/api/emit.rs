use crate::api::BlockSequence;
use crate::parser::errors::OpResult;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

const INDENT: &[u8] = b"    ";

///
/// `<input>.json`, appended to the full file name.
///
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(".json");
    PathBuf::from(name)
}

///
/// Render the whole document in memory.
///
pub fn to_json_bytes(sequence: &BlockSequence) -> OpResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    sequence.to_json().serialize(&mut serializer)?;
    Ok(buf)
}

///
/// Write the document with a single write once it is fully rendered.
///
pub fn write_json(sequence: &BlockSequence, output: &Path) -> OpResult<()> {
    let bytes = to_json_bytes(sequence)?;
    fs::write(output, bytes)?;
    Ok(())
}

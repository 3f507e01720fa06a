use std::fs::File;
use std::io::{prelude::*, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::Result;

/// Opens `path` for buffered reading, transparently gunzipping `.gz` files.
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let is_gz = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);
    if is_gz {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Calls `callback` with the 1-based line number and text of every line that
/// is neither blank nor a `#` comment.
pub fn for_each_line_in_file(
    path: &Path,
    mut callback: impl FnMut(usize, &str) -> Result<()>,
) -> Result<()> {
    let reader = open_reader(path)?;
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        callback(idx + 1, trimmed)?;
    }
    Ok(())
}

/// Parses an integer written either in decimal or as hex with a `0x` prefix.
pub fn parse_code(field: &str) -> Option<u64> {
    let field = field.trim();
    if let Some(hex) = field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
        .or_else(|| field.strip_prefix('#'))
    {
        u64::from_str_radix(hex, 16).ok()
    } else {
        field.parse::<u64>().ok()
    }
}

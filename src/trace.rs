/// Trace-file loading for the driver.
/// A trace is a plain text file with one byte address per line, written in
/// decimal or `0x`-prefixed hex. Blank lines and `#` comments are skipped.
use std::fs;
use std::io;
use std::path::Path;

/// Parse a single trace line into an address.
fn parse_address(line: &str) -> Option<u64> {
    if let Some(hex) = line.strip_prefix("0x").or_else(|| line.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        line.parse().ok()
    }
}

/// Load every address from a trace file, in order.
/// A malformed line fails the whole load with its line number; the driver
/// surfaces the error rather than simulating a partial trace.
pub fn load_trace(path: &Path) -> io::Result<Vec<u64>> {
    let text = fs::read_to_string(path)?;
    parse_trace(&text)
        .map_err(|line_no| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{}: bad address on line {}", path.display(), line_no),
            )
        })
}

/// Parse trace text; on failure returns the 1-based offending line number.
pub fn parse_trace(text: &str) -> Result<Vec<u64>, usize> {
    let mut addresses = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_address(line) {
            Some(addr) => addresses.push(addr),
            None => return Err(idx + 1),
        }
    }
    Ok(addresses)
}

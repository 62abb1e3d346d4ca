use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

/// Unified input reader that handles both file and pipe input with buffered reading
pub struct InputReader {
    reader: Box<dyn Read>,
}

impl InputReader {
    /// Create a new InputReader from a path
    /// Use "-" for stdin pipe input
    pub fn new<P: AsRef<Path>>(input_path: P) -> Result<Self> {
        let input_path = input_path.as_ref();

        let reader: Box<dyn Read> = if input_path.as_os_str() == "-" {
            Box::new(io::stdin().lock())
        } else {
            let file = File::open(input_path)
                .with_context(|| format!("Cannot open {}", input_path.display()))?;
            Box::new(BufReader::new(file))
        };

        Ok(Self { reader })
    }

    /// Read all remaining data
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        Ok(data)
    }
}

/// Reads one descriptor payload, decoding it from hex text when `hex` is set.
pub fn read_descriptor(input_path: &Path, hex: bool) -> Result<Vec<u8>> {
    let data = InputReader::new(input_path)?.read_all()?;

    if hex { decode_hex_text(&data) } else { Ok(data) }
}

/// Decodes hex digits, ignoring ASCII whitespace and an optional `0x` prefix.
pub fn decode_hex_text(text: &[u8]) -> Result<Vec<u8>> {
    let digits: Vec<u8> = text
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let digits = digits
        .strip_prefix(b"0x")
        .or_else(|| digits.strip_prefix(b"0X"))
        .unwrap_or(&digits);

    hex::decode(digits).context("Input is not valid hexadecimal text")
}

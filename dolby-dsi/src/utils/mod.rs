//! Supporting infrastructure shared by the descriptor parsers.
//!
//! Provides the bit cursor and the error types raised while parsing.

pub mod bitstream_io;
pub mod errors;

#[cfg(test)]
pub(crate) mod test_support;

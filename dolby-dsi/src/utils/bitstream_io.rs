//! Bit-level reader for decoder specific information payloads.
//!
//! Fields are read most-significant-bit first. Every read and skip is checked
//! against the buffer length before the underlying reader is touched, so a
//! failed operation leaves the cursor where it was.

use std::io;

use bitstream_io::{BigEndian, BitRead, BitReader, UnsignedInteger};

use crate::utils::errors::BitReadError;

pub const MAX_READ_BITS: u32 = 32;

pub type BitResult<T> = Result<T, BitReadError>;

#[derive(Debug)]
pub struct BitCursor<'a> {
    bs: BitReader<io::Cursor<&'a [u8]>, BigEndian>,
    position: u64,
    len: u64,
}

impl<'a> BitCursor<'a> {
    pub fn from_slice(buf: &'a [u8]) -> Self {
        Self {
            bs: BitReader::new(io::Cursor::new(buf)),
            position: 0,
            len: (buf.len() as u64) << 3,
        }
    }

    #[inline(always)]
    pub fn read_flag(&mut self) -> BitResult<bool> {
        self.ensure_available(1)?;
        let bit = self.bs.read_bit()?;
        self.position += 1;

        Ok(bit)
    }

    /// Reads an `n`-bit unsigned field, `1 <= n <= 32`.
    ///
    /// Zero-width reads are rejected rather than returning 0.
    #[inline(always)]
    pub fn read_bits<I: UnsignedInteger>(&mut self, n: u32) -> BitResult<I> {
        if n == 0 {
            return Err(BitReadError::ZeroWidth(self.position));
        }

        if n > MAX_READ_BITS {
            return Err(BitReadError::TooWide {
                requested: n,
                max: MAX_READ_BITS,
            });
        }

        self.ensure_available(n as u64)?;
        let value = self.bs.read_unsigned_var(n)?;
        self.position += n as u64;

        Ok(value)
    }

    /// Skips `n` bits. Skipping zero bits is a no-op.
    #[inline(always)]
    pub fn skip_bits(&mut self, n: u64) -> BitResult<()> {
        self.ensure_available(n)?;

        let mut remaining = n;
        while remaining > 0 {
            let step = remaining.min(u32::MAX as u64) as u32;
            self.bs.skip(step)?;
            remaining -= step as u64;
        }

        self.position += n;

        Ok(())
    }

    /// Advances to the next multiple of 8 bits from the start of the buffer.
    #[inline(always)]
    pub fn byte_align(&mut self) {
        let pad = (8 - (self.position & 7)) & 7;
        self.bs.byte_align();
        self.position += pad;
    }

    #[inline(always)]
    pub fn bit_position(&self) -> u64 {
        self.position
    }

    #[inline(always)]
    pub fn available(&self) -> u64 {
        self.len - self.position
    }

    #[inline(always)]
    pub fn len_bits(&self) -> u64 {
        self.len
    }

    #[inline(always)]
    fn ensure_available(&self, n: u64) -> BitResult<()> {
        if n > self.available() {
            return Err(BitReadError::OutOfBounds {
                requested: n,
                position: self.position,
                length: self.len,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::BitCursor;
    use crate::utils::errors::BitReadError;
    use anyhow::Result;

    #[test]
    fn reads_msb_first() -> Result<()> {
        let mut reader = BitCursor::from_slice(&[0b1010_0110, 0xF0]);

        assert!(reader.read_flag()?);
        assert_eq!(reader.read_bits::<u8>(3)?, 0b010);
        assert_eq!(reader.read_bits::<u16>(8)?, 0b0110_1111);
        assert_eq!(reader.bit_position(), 12);
        assert_eq!(reader.available(), 4);

        Ok(())
    }

    #[test]
    fn read_across_bytes_into_u32() -> Result<()> {
        let mut reader = BitCursor::from_slice(&[0x12, 0x34, 0x56, 0x78, 0x9A]);

        reader.skip_bits(4)?;
        assert_eq!(reader.read_bits::<u32>(32)?, 0x2345_6789);
        assert_eq!(reader.bit_position(), 36);

        Ok(())
    }

    #[test]
    fn overrun_fails_and_keeps_position() -> Result<()> {
        let mut reader = BitCursor::from_slice(&[0xFF]);
        reader.skip_bits(5)?;

        let err = reader.read_bits::<u8>(4).unwrap_err();
        assert!(matches!(
            err,
            BitReadError::OutOfBounds {
                requested: 4,
                position: 5,
                length: 8
            }
        ));
        assert_eq!(reader.bit_position(), 5);

        assert!(reader.skip_bits(4).unwrap_err().is_out_of_bounds());
        assert_eq!(reader.bit_position(), 5);

        assert_eq!(reader.read_bits::<u8>(3)?, 0b111);
        assert!(reader.read_flag().unwrap_err().is_out_of_bounds());
        assert_eq!(reader.bit_position(), 8);

        Ok(())
    }

    #[test]
    fn empty_buffer_rejects_everything() {
        let mut reader = BitCursor::from_slice(&[]);

        assert!(reader.read_flag().is_err());
        assert!(reader.read_bits::<u32>(1).is_err());
        assert!(reader.skip_bits(1).is_err());
        assert_eq!(reader.bit_position(), 0);
    }

    #[test]
    fn zero_width() -> Result<()> {
        let mut reader = BitCursor::from_slice(&[0xAA]);

        assert!(matches!(
            reader.read_bits::<u8>(0),
            Err(BitReadError::ZeroWidth(0))
        ));

        reader.skip_bits(0)?;
        assert_eq!(reader.bit_position(), 0);

        Ok(())
    }

    #[test]
    fn too_wide() {
        let mut reader = BitCursor::from_slice(&[0; 8]);

        assert!(matches!(
            reader.read_bits::<u64>(33),
            Err(BitReadError::TooWide {
                requested: 33,
                max: 32
            })
        ));
        assert_eq!(reader.bit_position(), 0);
    }

    #[test]
    fn byte_align_from_origin() -> Result<()> {
        let mut reader = BitCursor::from_slice(&[0x00, 0x5A, 0x00]);

        reader.byte_align();
        assert_eq!(reader.bit_position(), 0);

        reader.skip_bits(3)?;
        reader.byte_align();
        assert_eq!(reader.bit_position(), 8);
        assert_eq!(reader.read_bits::<u8>(8)?, 0x5A);

        reader.skip_bits(8)?;
        reader.byte_align();
        assert_eq!(reader.bit_position(), 24);
        assert_eq!(reader.available(), 0);

        Ok(())
    }

    #[test]
    fn skip_to_exact_end() -> Result<()> {
        let data = vec![0u8; 1024];
        let mut reader = BitCursor::from_slice(&data);

        reader.skip_bits(1024 * 8)?;
        assert_eq!(reader.bit_position(), reader.len_bits());
        assert!(reader.skip_bits(u64::MAX).is_err());

        Ok(())
    }
}

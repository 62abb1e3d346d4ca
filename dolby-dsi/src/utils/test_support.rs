//! Builders for synthetic descriptors used by the unit tests.

use std::io;

use bitstream_io::{BigEndian, BitWrite, BitWriter};

pub type TestWriter<'a> = BitWriter<&'a mut Vec<u8>, BigEndian>;

/// Packs whatever `build` writes into bytes, zero-padding the last byte.
pub fn pack(build: impl FnOnce(&mut TestWriter<'_>) -> io::Result<()>) -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut w = BitWriter::endian(&mut bytes, BigEndian);
        build(&mut w).unwrap();
        w.byte_align().unwrap();
    }
    bytes
}

/// Frame-level fields of an `ac4_dsi_v1()` wrapped around a prebuilt presentation.
#[derive(Debug, Clone)]
pub struct Dac4Builder {
    pub bitstream_version: u8,
    pub n_presentations: u16,
    /// `Some(extended)` writes a program id, with the 128-bit uuid when `extended`.
    pub program_id: Option<bool>,
    pub presentation_version: u8,
    /// Declared presentation length; defaults to the length of the body.
    pub pres_bytes: Option<u64>,
}

impl Default for Dac4Builder {
    fn default() -> Self {
        Self {
            bitstream_version: 2,
            n_presentations: 1,
            program_id: None,
            presentation_version: 1,
            pres_bytes: None,
        }
    }
}

impl Dac4Builder {
    pub fn build(&self, presentation: &[u8]) -> Vec<u8> {
        let pres_bytes = self.pres_bytes.unwrap_or(presentation.len() as u64);

        pack(|w| {
            // ac4_dsi_version
            w.write_var(3, 1u8)?;
            w.write_var(7, self.bitstream_version)?;
            // fs_index, frame_rate_index
            w.write_var(5, 0b1_0110u8)?;
            w.write_var(9, self.n_presentations)?;

            if self.bitstream_version > 1 {
                w.write_bit(self.program_id.is_some())?;
                if let Some(extended) = self.program_id {
                    w.write_var(16, 0xBEEFu16)?;
                    w.write_bit(extended)?;
                    if extended {
                        w.write_bytes(&[0x5A; 16])?;
                    }
                }
            }

            // ac4_bitrate_dsi
            w.write_var(2, 0u8)?;
            w.write_var(32, 0u32)?;
            w.write_var(32, 0xFFFF_FFFFu32)?;
            w.byte_align()?;

            w.write_var(8, self.presentation_version)?;
            if pres_bytes >= 255 {
                w.write_var(8, 255u8)?;
                w.write_var(32, (pres_bytes - 255) as u32)?;
            } else {
                w.write_var(8, pres_bytes as u8)?;
            }

            w.write_bytes(presentation)
        })
    }
}

//! `ac4_substream_group_dsi()` (ETSI TS 103 190-2, E.11).
//!
//! Only the shape of the group matters to the caller: the bitrate, channel
//! mode and language fields are skipped so the cursor lands on whatever
//! follows the group.

use log::trace;

use crate::utils::bitstream_io::{BitCursor, BitResult};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubstreamGroupDsi {
    pub b_substreams_present: bool,
    pub b_hsf_ext: bool,
    pub b_channel_coded: bool,
    pub n_substreams: u8,
    pub b_content_type: bool,
}

impl SubstreamGroupDsi {
    pub fn read(reader: &mut BitCursor) -> BitResult<Self> {
        let mut group = Self {
            b_substreams_present: reader.read_flag()?,
            b_hsf_ext: reader.read_flag()?,
            b_channel_coded: reader.read_flag()?,
            n_substreams: reader.read_bits(8)?,
            ..Default::default()
        };

        for _ in 0..group.n_substreams {
            // dsi_sf_multiplier, b_substream_bitrate_indicator, substream_bitrate_indicator
            reader.skip_bits(2)?;
            if reader.read_flag()? {
                reader.skip_bits(5)?;
            }

            if group.b_channel_coded {
                // dsi_substream_channel_mask
                reader.skip_bits(24)?;
            } else {
                // b_ajoc
                if reader.read_flag()? {
                    // b_static_dmx
                    if !reader.read_flag()? {
                        reader.skip_bits(4)?;
                    }
                    // n_dmx_objects_minus1
                    reader.skip_bits(6)?;
                }
                // n_umx_objects_minus1
                reader.skip_bits(4)?;
            }
        }

        group.b_content_type = reader.read_flag()?;
        if group.b_content_type {
            // content_classifier
            reader.skip_bits(3)?;
            if reader.read_flag()? {
                let n_language_tag_bytes: u8 = reader.read_bits(6)?;
                reader.skip_bits(n_language_tag_bytes as u64 * 8)?;
            }
        }

        trace!("{group:?}");

        Ok(group)
    }
}

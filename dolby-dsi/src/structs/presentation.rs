//! `ac4_presentation_v1_dsi()` (ETSI TS 103 190-2, E.10).
//!
//! ## Layout
//!
//! **Identification**: `presentation_config_v1`, `mdcompat`, the presentation
//! channel mask and the core/filter blocks. These feed the codec string and
//! channel configuration reported for the stream.
//!
//! **Tail**: substream groups, additional EMDF substreams, bitrate and
//! alternative info, then an optional trailer carrying the Dolby Atmos
//! indicator when at least one declared byte remains.
//!
//! A descriptor whose buffer ends inside the tail of a presentation that
//! declares more bytes than are present is accepted with the identification
//! fields only; see [`ParsedPresentation::truncated`].

use log::{trace, warn};

use crate::structs::substream_group::SubstreamGroupDsi;
use crate::utils::bitstream_io::{BitCursor, BitResult};

/// `presentation_config_v1` (5 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationConfig {
    /// 0, 1, 2: two substream groups.
    TwoGroups(u8),
    /// 3, 4: three substream groups.
    ThreeGroups(u8),
    /// 5: `n_substream_groups_minus2 + 2` groups.
    VariableGroups,
    /// 6: additional EMDF substreams only.
    EmdfOnly,
    /// 7..=30: unknown configuration, skipped via `n_skip_bytes`.
    Extension(u8),
    /// 31: a single substream group.
    SingleGroup,
}

impl From<u8> for PresentationConfig {
    fn from(value: u8) -> Self {
        match value {
            0..=2 => Self::TwoGroups(value),
            3 | 4 => Self::ThreeGroups(value),
            5 => Self::VariableGroups,
            6 => Self::EmdfOnly,
            0x1F => Self::SingleGroup,
            _ => Self::Extension(value),
        }
    }
}

impl PresentationConfig {
    fn read_substream_groups(self, reader: &mut BitCursor) -> BitResult<()> {
        if !matches!(self, Self::SingleGroup | Self::EmdfOnly) {
            // b_multi_pid
            reader.skip_bits(1)?;
        }

        let n_groups = match self {
            // carries no groups, only additional EMDF substreams
            Self::EmdfOnly => 0,
            Self::SingleGroup => 1,
            Self::TwoGroups(_) => 2,
            Self::ThreeGroups(_) => 3,
            Self::VariableGroups => reader.read_bits::<u8>(3)? + 2,
            Self::Extension(_) => {
                let n_skip_bytes: u8 = reader.read_bits(7)?;
                reader.skip_bits(n_skip_bytes as u64 * 8)?;
                0
            }
        };

        for _ in 0..n_groups {
            SubstreamGroupDsi::read(reader)?;
        }

        Ok(())
    }
}

/// Fields extracted from one `ac4_presentation_v1_dsi()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedPresentation {
    pub presentation_config: PresentationConfig,
    /// 0 when the presentation carries no `mdcompat` (EMDF-only configuration).
    pub mdcompat: u8,
    /// Raw `presentation_channel_config`, 0 when not channel coded.
    pub channel_config: u32,
    pub dolby_atmos: bool,
    pub bits_consumed: u64,
    /// The buffer ended inside the presentation tail before its declared end.
    /// `dolby_atmos` is false and `bits_consumed` stops where the data ran out.
    pub truncated: bool,
}

impl ParsedPresentation {
    pub fn read(reader: &mut BitCursor, pres_bytes: u64) -> BitResult<Self> {
        let start = reader.bit_position();
        let declared_bits = pres_bytes << 3;

        let mut pres = Self {
            presentation_config: reader.read_bits::<u8>(5)?.into(),
            mdcompat: 0,
            channel_config: 0,
            dolby_atmos: false,
            bits_consumed: 0,
            truncated: false,
        };

        if pres.presentation_config != PresentationConfig::EmdfOnly {
            pres.read_identification(reader)?;
        }

        match pres.read_tail(reader, start, declared_bits) {
            Ok(dolby_atmos) => pres.dolby_atmos = dolby_atmos,
            Err(e) if e.is_out_of_bounds() && reader.len_bits() < start + declared_bits => {
                warn!(
                    "dac4 ends {} bits into a presentation declaring {pres_bytes} bytes; \
                     ignoring the remainder: {e}",
                    reader.bit_position() - start
                );
                pres.truncated = true;
            }
            Err(e) => return Err(e),
        }

        pres.bits_consumed = reader.bit_position() - start;

        trace!("{pres:?}");

        Ok(pres)
    }

    fn read_identification(&mut self, reader: &mut BitCursor) -> BitResult<()> {
        self.mdcompat = reader.read_bits(3)?;

        // b_presentation_group_index, presentation_group_index
        if reader.read_flag()? {
            reader.skip_bits(5)?;
        }

        // dsi_frame_rate_multiply_info, dsi_frame_rate_fractions_info,
        // presentation_emdf_version, presentation_key_id
        reader.skip_bits(19)?;

        // b_presentation_channel_coded
        if reader.read_flag()? {
            let dsi_presentation_ch_mode: u8 = reader.read_bits(5)?;
            if (11..=14).contains(&dsi_presentation_ch_mode) {
                // pres_b_4_back_channels_present, pres_top_channel_pairs
                reader.skip_bits(3)?;
            }
            self.channel_config = reader.read_bits(24)?;
        }

        // b_presentation_core_differs
        if reader.read_flag()? {
            // b_presentation_core_channel_coded, dsi_presentation_channel_mode_core
            if reader.read_flag()? {
                reader.skip_bits(2)?;
            }
        }

        // b_presentation_filter
        if reader.read_flag()? {
            // b_enable_presentation
            reader.skip_bits(1)?;
            let n_filter_bytes: u8 = reader.read_bits(8)?;
            reader.skip_bits(n_filter_bytes as u64 * 8)?;
        }

        Ok(())
    }

    /// Returns the Dolby Atmos indicator, false when the trailer is absent.
    fn read_tail(
        &self,
        reader: &mut BitCursor,
        start: u64,
        declared_bits: u64,
    ) -> BitResult<bool> {
        let b_add_emdf_substreams = if self.presentation_config == PresentationConfig::EmdfOnly {
            true
        } else {
            self.presentation_config.read_substream_groups(reader)?;
            // b_pre_virtualized
            reader.skip_bits(1)?;
            reader.read_flag()?
        };

        if b_add_emdf_substreams {
            // emdf_version(5), key_id(10) per substream
            let n_add_emdf_substreams: u8 = reader.read_bits(7)?;
            reader.skip_bits(n_add_emdf_substreams as u64 * 15)?;
        }

        // b_presentation_bitrate_info, ac4_bitrate_dsi
        if reader.read_flag()? {
            reader.skip_bits(66)?;
        }

        // b_alternative, alternative_info
        if reader.read_flag()? {
            reader.byte_align();
            let name_len: u16 = reader.read_bits(16)?;
            reader.skip_bits(name_len as u64 * 8)?;
            let n_targets: u8 = reader.read_bits(5)?;
            reader.skip_bits(n_targets as u64 * 11)?;
        }

        reader.byte_align();

        if reader.bit_position() - start + 8 > declared_bits {
            return Ok(false);
        }

        // de_indicator
        reader.skip_bits(1)?;
        let dolby_atmos_indicator = reader.read_flag()?;
        // reserved
        reader.skip_bits(4)?;
        // b_extended_presentation_group_index
        if reader.read_flag()? {
            reader.skip_bits(9)?;
        } else {
            reader.skip_bits(1)?;
        }

        Ok(dolby_atmos_indicator)
    }
}

use anyhow::{Result, bail};
use log::{debug, trace, warn};

use crate::structs::channel_config::{channel_config_or_default, mpeg_scheme_value};
use crate::structs::presentation::ParsedPresentation;
use crate::utils::bitstream_io::BitCursor;
use crate::utils::errors::Ac4DsiError;

/// Fields of one `ac4_dsi_v1()` needed to signal the stream.
///
/// Only the first presentation is parsed; see [`extract`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedFrame {
    pub bitstream_version: u8,
    /// Declared `n_presentations`, before the single-presentation policy.
    pub n_presentations: u16,
    pub presentation_version: u8,
    /// Declared length of the first presentation in bytes.
    pub presentation_bytes: u64,
    /// `presentation_version == 2`.
    pub is_ims: bool,
    pub mdcompat: u8,
    /// Raw `presentation_channel_config`, 0 when the presentation carries none.
    pub presentation_channel_config: u32,
    pub dolby_atmos: bool,
    /// The payload ended before the declared end of the presentation.
    pub truncated: bool,
}

impl ParsedFrame {
    /// Channel configuration mask, `0x800000` when none was signalled.
    pub fn channel_config(&self) -> u32 {
        channel_config_or_default(self.presentation_channel_config)
    }

    /// MPEG `ChannelConfiguration` of the raw mask, -1 when unmapped.
    pub fn channel_config_mpeg_scheme(&self) -> i32 {
        mpeg_scheme_value(self.presentation_channel_config)
    }

    /// RFC 6381 codec string, `ac-4.BB.PP.MM`.
    pub fn codec_string(&self) -> String {
        format!(
            "ac-4.{:02}.{:02}.{:02}",
            self.bitstream_version, self.presentation_version, self.mdcompat
        )
    }

    /// Bit 1 is the Dolby Atmos indicator, bit 0 the IMS flag.
    pub fn ims_and_atmos_flags(&self) -> u32 {
        ((self.dolby_atmos as u32) << 1) | self.is_ims as u32
    }
}

/// Parses a `dac4` payload (ETSI TS 103 190-2, E.6).
///
/// Only a single presentation is supported: one presentation of version 1, or
/// a version 2 (IMS) presentation with its companion. Other shapes are
/// rejected with [`Ac4DsiError::MultiplePresentations`]; accepted streams
/// have only their first presentation parsed.
///
/// # Errors
///
/// - [`Ac4DsiError`] for empty payloads and unsupported versions or shapes.
/// - [`BitReadError`](crate::utils::errors::BitReadError) when the payload
///   ends inside the frame header or the presentation identification.
pub fn extract(data: &[u8]) -> Result<ParsedFrame> {
    if data.is_empty() {
        bail!(Ac4DsiError::EmptyDescriptor);
    }

    let reader = &mut BitCursor::from_slice(data);

    // ac4_dsi_version
    reader.skip_bits(3)?;
    let bitstream_version: u8 = reader.read_bits(7)?;
    // fs_index, frame_rate_index
    reader.skip_bits(5)?;
    let n_presentations: u16 = reader.read_bits(9)?;

    match bitstream_version {
        0 => {
            warn!("Bitstream version 0 is not supported");
            bail!(Ac4DsiError::UnsupportedBitstreamVersion(bitstream_version));
        }
        1 | 100.. => {
            warn!("Invalid bitstream version {bitstream_version}");
            bail!(Ac4DsiError::UnsupportedBitstreamVersion(bitstream_version));
        }
        _ => {}
    }

    // b_program_id
    if reader.read_flag()? {
        // short_program_id
        reader.skip_bits(16)?;
        // b_uuid, program_uuid
        if reader.read_flag()? {
            reader.skip_bits(128)?;
        }
    }

    // ac4_bitrate_dsi
    reader.skip_bits(66)?;
    reader.byte_align();

    let presentation_version: u8 = reader.read_bits(8)?;

    if (presentation_version == 2 && n_presentations > 2)
        || (presentation_version == 1 && n_presentations > 1)
    {
        let err = Ac4DsiError::MultiplePresentations {
            presentation_version,
            n_presentation: n_presentations,
        };
        warn!("{err}");
        bail!(err);
    }

    if n_presentations > 1 {
        debug!("Parsing the first of {n_presentations} presentations");
    }

    let mut presentation_bytes: u64 = reader.read_bits(8)?;
    if presentation_bytes == 255 {
        // add_pres_bytes
        presentation_bytes += reader.read_bits::<u32>(32)? as u64;
    }

    let pres = match presentation_version {
        1 | 2 => ParsedPresentation::read(reader, presentation_bytes)?,
        _ => {
            warn!("Presentation version {presentation_version} is not supported");
            bail!(Ac4DsiError::UnsupportedPresentationVersion(
                presentation_version
            ));
        }
    };

    let mut truncated = pres.truncated;

    if !truncated {
        let declared_bits = presentation_bytes << 3;
        let Some(skip) = declared_bits.checked_sub(pres.bits_consumed) else {
            bail!(Ac4DsiError::PresentationOverrun {
                declared_bits,
                consumed_bits: pres.bits_consumed,
            });
        };

        if skip > reader.available() {
            warn!(
                "dac4 ends {} bits before the declared end of the presentation",
                skip - reader.available()
            );
            truncated = true;
        } else {
            reader.skip_bits(skip)?;
        }
    }

    let frame = ParsedFrame {
        bitstream_version,
        n_presentations,
        presentation_version,
        presentation_bytes,
        is_ims: presentation_version == 2,
        mdcompat: pres.mdcompat,
        presentation_channel_config: pres.channel_config,
        dolby_atmos: pres.dolby_atmos,
        truncated,
    };

    trace!("{frame:?}");

    Ok(frame)
}

/// Channel configuration mask of the presentation, `0x800000` when absent.
///
/// Like the other wrappers, this succeeds on a payload that ends inside the
/// presentation tail; call [`extract`] to see [`ParsedFrame::truncated`].
pub fn channel_config(data: &[u8]) -> Result<u32> {
    Ok(extract(data)?.channel_config())
}

/// MPEG `ChannelConfiguration` of the raw presentation mask, -1 when unmapped.
///
/// Succeeds on truncated payloads, see [`ParsedFrame::truncated`].
pub fn channel_config_mpeg_scheme(data: &[u8]) -> Result<i32> {
    Ok(extract(data)?.channel_config_mpeg_scheme())
}

/// RFC 6381 codec string. Succeeds on truncated payloads, see
/// [`ParsedFrame::truncated`].
pub fn codec_string(data: &[u8]) -> Result<String> {
    Ok(extract(data)?.codec_string())
}

/// `dolby_atmos << 1 | is_ims`.
///
/// A truncated payload reports no Dolby Atmos, since the indicator lives in
/// the presentation trailer; see [`ParsedFrame::truncated`].
pub fn ims_and_atmos_flags(data: &[u8]) -> Result<u32> {
    Ok(extract(data)?.ims_and_atmos_flags())
}

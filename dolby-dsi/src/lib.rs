//! Bit-exact parsers for Dolby decoder specific information.
//!
//! ## Technical Overview
//!
//! MP4 sample entries for AC-4 and E-AC-3 carry a small, bit-packed
//! descriptor (`dac4`, ETSI TS 103 190-2 Annex E; `dec3`, ETSI TS 102 366
//! Annex F). Packagers read them to signal the stream in a manifest: the
//! channel layout, an MPEG `ChannelConfiguration`, the RFC 6381 codec string
//! and whether the stream carries immersive or object audio.
//!
//! ### Descriptor Organization
//!
//! **`dac4`**: a frame header (bitstream version, presentation count, optional
//! program id, bitrate), then length-prefixed presentations. Each presentation
//! holds an identification block, a configuration-dependent number of
//! substream groups and an optional trailer with the Dolby Atmos indicator.
//!
//! **`dec3`**: a data rate, then one record per independent substream with its
//! audio coding mode and the locations of dependent substream channels,
//! optionally followed by the JOC extension.
//!
//! Only the first presentation (or independent substream) is interpreted.
//!
//! ## Quick Start
//!
//! ```rust
//! use dolby_dsi::process::{EXAMPLE_DAC4, EXAMPLE_DEC3, ac4, ec3};
//!
//! let frame = ac4::extract(EXAMPLE_DAC4)?;
//! assert_eq!(frame.codec_string(), "ac-4.02.02.00");
//! assert_eq!(ac4::channel_config_mpeg_scheme(EXAMPLE_DAC4)?, 2);
//!
//! assert_eq!(ec3::num_channels(EXAMPLE_DEC3)?, 6);
//! assert_eq!(ec3::joc_flag_and_complexity(EXAMPLE_DEC3)?, (true, 16));
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! All functions are pure: each call parses its input from scratch and keeps
//! no state between calls.

/// Descriptor extraction and the values derived from it.
///
/// 1. **AC-4** ([`process::ac4`]): channel configuration, MPEG scheme value,
///    codec string, IMS and Atmos flags.
///
/// 2. **E-AC-3** ([`process::ec3`]): channel map, channel count, MPEG scheme
///    value, JOC flag and complexity.
pub mod process;

/// Data structures representing descriptor components.
///
/// - **Presentations** ([`structs::presentation`]): `ac4_presentation_v1_dsi`
/// - **Substream Groups** ([`structs::substream_group`]): `ac4_substream_group_dsi`
/// - **Channel Configuration** ([`structs::channel_config`]): Table G.1 mapping
/// - **Independent Substreams** ([`structs::ec3`]): `dec3` records and channel maps
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Bitstream I/O** ([`utils::bitstream_io`]): Bounds-checked bit reading
/// - **Error Handling** ([`utils::errors`]): Error types
pub mod utils;

/// Encryption key sources used by packaging pipelines alongside the parsers.
pub mod key_source;

pub use process::ac4::{
    ParsedFrame, channel_config, channel_config_mpeg_scheme, codec_string, ims_and_atmos_flags,
};
pub use process::ec3::{channel_map, channel_map_mpeg_scheme, joc_flag_and_complexity, num_channels};

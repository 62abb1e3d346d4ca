//! AC-4 presentation channel configuration.
//!
//! The 24-bit `presentation_channel_config` carried in `ac4_presentation_v1_dsi`
//! is a speaker-group mask (ETSI TS 103 190-2, Table A.27). Bit 0 is the
//! L/R pair, bit 1 C, bit 2 Ls/Rs, bit 6 LFE and so on.

/// Reported when a presentation carries no explicit channel configuration.
pub const DEFAULT_CHANNEL_CONFIG: u32 = 0x80_00_00;

/// Returned by [`mpeg_scheme_value`] for masks outside the table.
pub const UNMAPPED_MPEG_SCHEME: i32 = -1;

/// Channel configuration masks and their MPEG `ChannelConfiguration` values
/// (ETSI TS 103 190-2, Table G.1).
pub const MPEG_SCHEME_TABLE: [(u32, i32); 27] = [
    (0x2, 1),
    (0x1, 2),
    (0x3, 3),
    (0x8003, 4),
    (0x7, 5),
    (0x47, 6),
    (0x20047, 7),
    (0x8001, 9),
    (0x5, 10),
    (0x8047, 11),
    (0x4f, 12),
    (0x2ff7f, 13),
    (0x6ff6f, 13),
    (0x57, 14),
    (0x40047, 14),
    (0x145f, 15),
    (0x4144f, 15),
    (0x77, 16),
    (0x40067, 16),
    (0xa77, 17),
    (0x40a67, 17),
    (0xa7f, 18),
    (0x40a6f, 18),
    (0x7f, 19),
    (0x4006f, 19),
    (0x1007f, 20),
    (0x5006f, 20),
];

pub fn mpeg_scheme_value(channel_config: u32) -> i32 {
    MPEG_SCHEME_TABLE
        .iter()
        .find(|&&(mask, _)| mask == channel_config)
        .map_or(UNMAPPED_MPEG_SCHEME, |&(_, value)| value)
}

/// Substitutes [`DEFAULT_CHANNEL_CONFIG`] for an absent (zero) mask.
pub fn channel_config_or_default(channel_config: u32) -> u32 {
    if channel_config == 0 {
        DEFAULT_CHANNEL_CONFIG
    } else {
        channel_config
    }
}

/// `dac4` extraction.
///
/// Provides [`extract`](ac4::extract) for walking a whole descriptor into a
/// [`ParsedFrame`](ac4::ParsedFrame), and the four projections callers use to
/// signal the stream in a manifest.
pub mod ac4;

/// `dec3` extraction.
///
/// Provides [`extract`](ec3::extract) and the channel map, channel count,
/// MPEG scheme and JOC projections of the first independent substream.
pub mod ec3;

/// `dac4` payload of a stereo, IMS presentation. The presentation declares 18
/// bytes but the payload ends after 10 of them.
pub const EXAMPLE_DAC4: &[u8] = &[
    0x20, 0xa6, 0x02, 0x40, 0x00, 0x00, 0x00, 0x1f, 0xff, 0xff, 0xff, 0xe0, 0x02, 0x12, 0xf8, 0x80,
    0x00, 0x00, 0x42, 0x00, 0x00, 0x02, 0x50, 0x10,
];

/// `dec3` payload of a 5.1 stream carrying JOC objects, complexity index 16.
pub const EXAMPLE_DEC3: &[u8] = &[0x18, 0x00, 0x20, 0x0f, 0x00, 0x01, 0x10];

use anyhow::{Result, bail};

use crate::structs::ec3::{Ec3Dsi, channel_count, mpeg_scheme_value};
use crate::utils::bitstream_io::BitCursor;
use crate::utils::errors::Ec3DsiError;

/// Parses a `dec3` payload.
///
/// # Errors
///
/// - [`Ec3DsiError::EmptyDescriptor`] for an empty payload.
/// - [`BitReadError`](crate::utils::errors::BitReadError) when the payload
///   ends inside an independent substream record.
pub fn extract(data: &[u8]) -> Result<Ec3Dsi> {
    if data.is_empty() {
        bail!(Ec3DsiError::EmptyDescriptor);
    }

    let reader = &mut BitCursor::from_slice(data);
    Ok(Ec3Dsi::read(reader)?)
}

/// 16-bit `chanmap` of the first independent substream and its dependents.
pub fn channel_map(data: &[u8]) -> Result<u32> {
    Ok(extract(data)?.channel_map())
}

pub fn num_channels(data: &[u8]) -> Result<usize> {
    Ok(channel_count(extract(data)?.channel_map()))
}

/// MPEG `ChannelConfiguration` of the channel map, -1 when unmapped.
pub fn channel_map_mpeg_scheme(data: &[u8]) -> Result<i32> {
    Ok(mpeg_scheme_value(extract(data)?.channel_map()))
}

/// `flag_ec3_extension_type_a` and `complexity_index_type_a`, i.e. whether the
/// stream carries JOC objects and how many.
pub fn joc_flag_and_complexity(data: &[u8]) -> Result<(bool, u8)> {
    let dsi = extract(data)?;
    Ok((dsi.flag_ec3_extension_type_a, dsi.complexity_index_type_a))
}

//! `EC3SpecificBox` payload, `dec3` (ETSI TS 102 366, F.6).
//!
//! ## Channel Map
//!
//! Layouts are reported as the 16-bit `chanmap` of Table E.1.4, bit 0 being
//! the most significant: L, C, R, Ls, Rs, Lc/Rc, Lrs/Rrs, Cs, Ts, Lsd/Rsd,
//! Lw/Rw, Lvh/Rvh, Cvh, Lts/Rts, LFE2, LFE.
//!
//! Only the first independent substream contributes to the channel map, the
//! same single-program policy applied to AC-4 presentations.

use log::trace;

use crate::utils::bitstream_io::{BitCursor, BitResult};

pub const LEFT: u32 = 0x8000;
pub const CENTER: u32 = 0x4000;
pub const RIGHT: u32 = 0x2000;
pub const LEFT_SURROUND: u32 = 0x1000;
pub const RIGHT_SURROUND: u32 = 0x800;
pub const LC_RC_PAIR: u32 = 0x400;
pub const LRS_RRS_PAIR: u32 = 0x200;
pub const CENTER_SURROUND: u32 = 0x100;
pub const TOP_CENTER_SURROUND: u32 = 0x80;
pub const LSD_RSD_PAIR: u32 = 0x40;
pub const LW_RW_PAIR: u32 = 0x20;
pub const LVH_RVH_PAIR: u32 = 0x10;
pub const CENTER_VERTICAL_HEIGHT: u32 = 0x8;
pub const LTS_RTS_PAIR: u32 = 0x4;
pub const LFE2: u32 = 0x2;
pub const LFE: u32 = 0x1;

const PAIRS: u32 =
    LC_RC_PAIR | LRS_RRS_PAIR | LSD_RSD_PAIR | LW_RW_PAIR | LVH_RVH_PAIR | LTS_RTS_PAIR;

/// Speakers of each `acmod` (Table 4.3). Mono surround maps to Cs.
const ACMOD_CHANNEL_MAP: [u32; 8] = [
    LEFT | RIGHT,
    CENTER,
    LEFT | RIGHT,
    LEFT | CENTER | RIGHT,
    LEFT | RIGHT | CENTER_SURROUND,
    LEFT | CENTER | RIGHT | CENTER_SURROUND,
    LEFT | RIGHT | LEFT_SURROUND | RIGHT_SURROUND,
    LEFT | CENTER | RIGHT | LEFT_SURROUND | RIGHT_SURROUND,
];

const FIVE_ONE: u32 = LEFT | CENTER | RIGHT | LEFT_SURROUND | RIGHT_SURROUND | LFE;

const MPEG_SCHEME_TABLE: [(u32, i32); 12] = [
    (CENTER, 1),
    (LEFT | RIGHT, 2),
    (LEFT | CENTER | RIGHT, 3),
    (LEFT | CENTER | RIGHT | CENTER_SURROUND, 4),
    (LEFT | CENTER | RIGHT | LEFT_SURROUND | RIGHT_SURROUND, 5),
    (FIVE_ONE, 6),
    (FIVE_ONE | LW_RW_PAIR, 7),
    (LEFT | RIGHT | CENTER_SURROUND, 9),
    (LEFT | RIGHT | LEFT_SURROUND | RIGHT_SURROUND, 10),
    (FIVE_ONE | CENTER_SURROUND, 11),
    (FIVE_ONE | LRS_RRS_PAIR, 12),
    (FIVE_ONE | LVH_RVH_PAIR, 14),
];

/// Maps a `chanmap` to its MPEG `ChannelConfiguration`, -1 when unmapped.
pub fn mpeg_scheme_value(channel_map: u32) -> i32 {
    MPEG_SCHEME_TABLE
        .iter()
        .find(|&&(map, _)| map == channel_map)
        .map_or(-1, |&(_, value)| value)
}

/// Number of speakers in a `chanmap`; pair bits count twice.
pub fn channel_count(channel_map: u32) -> usize {
    let channel_map = channel_map & 0xFFFF;
    (channel_map.count_ones() + (channel_map & PAIRS).count_ones()) as usize
}

/// Maps `chan_loc` (Table F.6.1, bit 0 first) onto `chanmap` bits.
///
/// Lc/Rc through Cvh line up with `chanmap` bits 5..=12; LFE2 skips the
/// Lts/Rts position.
pub fn chan_loc_to_channel_map(chan_loc: u16) -> u32 {
    let chan_loc = chan_loc as u32;
    ((chan_loc & 0x1FE) << 2) | ((chan_loc & 0x1) << 1)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IndependentSubstream {
    pub fscod: u8,
    pub bsid: u8,
    pub asvc: bool,
    pub bsmod: u8,
    pub acmod: u8,
    pub lfeon: bool,
    pub num_dep_sub: u8,
    pub chan_loc: u16,
}

impl IndependentSubstream {
    fn read(reader: &mut BitCursor) -> BitResult<Self> {
        let mut sub = Self {
            fscod: reader.read_bits(2)?,
            bsid: reader.read_bits(5)?,
            ..Default::default()
        };

        reader.skip_bits(1)?;
        sub.asvc = reader.read_flag()?;
        sub.bsmod = reader.read_bits(3)?;
        sub.acmod = reader.read_bits(3)?;
        sub.lfeon = reader.read_flag()?;
        reader.skip_bits(3)?;
        sub.num_dep_sub = reader.read_bits(4)?;

        if sub.num_dep_sub > 0 {
            sub.chan_loc = reader.read_bits(9)?;
        } else {
            reader.skip_bits(1)?;
        }

        Ok(sub)
    }

    pub fn channel_map(&self) -> u32 {
        let mut channel_map = ACMOD_CHANNEL_MAP[self.acmod as usize & 7];

        if self.lfeon {
            channel_map |= LFE;
        }

        if self.num_dep_sub > 0 {
            channel_map |= chan_loc_to_channel_map(self.chan_loc);
        }

        channel_map
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Ec3Dsi {
    pub data_rate: u16,
    pub substreams: Vec<IndependentSubstream>,
    pub flag_ec3_extension_type_a: bool,
    pub complexity_index_type_a: u8,
}

impl Ec3Dsi {
    pub fn read(reader: &mut BitCursor) -> BitResult<Self> {
        let mut dsi = Self {
            data_rate: reader.read_bits(13)?,
            ..Default::default()
        };

        let num_ind_sub = reader.read_bits::<u8>(3)? + 1;
        for _ in 0..num_ind_sub {
            dsi.substreams.push(IndependentSubstream::read(reader)?);
        }

        reader.byte_align();

        if reader.available() >= 16 {
            reader.skip_bits(7)?;
            dsi.flag_ec3_extension_type_a = reader.read_flag()?;
            if dsi.flag_ec3_extension_type_a {
                dsi.complexity_index_type_a = reader.read_bits(8)?;
            }
        }

        trace!("{dsi:?}");

        Ok(dsi)
    }

    /// The substream the channel map is derived from. Always present after a
    /// successful [`Ec3Dsi::read`].
    pub fn primary(&self) -> IndependentSubstream {
        self.substreams.first().copied().unwrap_or_default()
    }

    pub fn channel_map(&self) -> u32 {
        self.primary().channel_map()
    }
}

//! Data structures representing descriptor components.
//!
//! Contains structured representations of the `dac4` presentation and
//! substream group grammars, the channel configuration tables, and the
//! `dec3` independent substream records.

pub mod channel_config;
pub mod ec3;
pub mod presentation;
pub mod substream_group;

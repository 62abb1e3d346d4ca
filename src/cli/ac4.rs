use anyhow::Result;
use indicatif::MultiProgress;
use serde::Serialize;

use super::command::{Cli, DsiArgs};
use super::report::{DescriptorReport, run};
use dolby_dsi::process::ac4::{ParsedFrame, extract};

#[derive(Debug, Serialize)]
pub struct Ac4Report {
    pub codec_string: String,
    pub bitstream_version: u8,
    pub presentation_version: u8,
    pub n_presentations: u16,
    pub presentation_bytes: u64,
    pub mdcompat: u8,
    pub channel_config: String,
    pub mpeg_scheme: i32,
    pub ims: bool,
    pub dolby_atmos: bool,
    pub ims_and_atmos_flags: u32,
    pub truncated: bool,
}

impl From<&ParsedFrame> for Ac4Report {
    fn from(frame: &ParsedFrame) -> Self {
        Self {
            codec_string: frame.codec_string(),
            bitstream_version: frame.bitstream_version,
            presentation_version: frame.presentation_version,
            n_presentations: frame.n_presentations,
            presentation_bytes: frame.presentation_bytes,
            mdcompat: frame.mdcompat,
            channel_config: format!("0x{:06X}", frame.channel_config()),
            mpeg_scheme: frame.channel_config_mpeg_scheme(),
            ims: frame.is_ims,
            dolby_atmos: frame.dolby_atmos,
            ims_and_atmos_flags: frame.ims_and_atmos_flags(),
            truncated: frame.truncated,
        }
    }
}

impl DescriptorReport for Ac4Report {
    const BOX_NAME: &'static str = "dac4";

    fn text_lines(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Codec string", self.codec_string.clone()),
            ("Bitstream version", self.bitstream_version.to_string()),
            ("Presentation version", self.presentation_version.to_string()),
            ("Presentations", self.n_presentations.to_string()),
            ("Presentation size", format!("{} bytes", self.presentation_bytes)),
            ("Channel configuration", self.channel_config.clone()),
            ("MPEG scheme value", self.mpeg_scheme.to_string()),
            ("IMS", self.ims.to_string()),
            ("Dolby Atmos", self.dolby_atmos.to_string()),
            ("IMS/Atmos flags", self.ims_and_atmos_flags.to_string()),
            ("Truncated", self.truncated.to_string()),
        ]
    }

    fn strict_warning(&self) -> Option<String> {
        self.truncated.then(|| {
            format!(
                "dac4 ends before the declared {} byte presentation",
                self.presentation_bytes
            )
        })
    }
}

pub fn cmd_ac4(args: &DsiArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Inspecting {} dac4 payload(s)", args.inputs.len());

    run(args, cli, multi, |data| {
        Ok(Ac4Report::from(&extract(data)?))
    })
}

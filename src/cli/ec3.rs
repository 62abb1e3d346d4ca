use anyhow::Result;
use indicatif::MultiProgress;
use serde::Serialize;

use super::command::{Cli, DsiArgs};
use super::report::{DescriptorReport, run};
use dolby_dsi::process::ec3::extract;
use dolby_dsi::structs::ec3::{Ec3Dsi, channel_count, mpeg_scheme_value};

/// `chanmap` locations, most significant bit first.
const CHANNEL_LABELS: [&str; 16] = [
    "L", "C", "R", "Ls", "Rs", "Lc/Rc", "Lrs/Rrs", "Cs", "Ts", "Lsd/Rsd", "Lw/Rw", "Lvh/Rvh",
    "Cvh", "Lts/Rts", "LFE2", "LFE",
];

fn channel_labels(channel_map: u32) -> Vec<&'static str> {
    CHANNEL_LABELS
        .iter()
        .enumerate()
        .filter(|&(i, _)| channel_map & (0x8000 >> i) != 0)
        .map(|(_, &label)| label)
        .collect()
}

#[derive(Debug, Serialize)]
pub struct Ec3Report {
    pub data_rate_kbps: u16,
    pub independent_substreams: usize,
    pub acmod: u8,
    pub lfe: bool,
    pub dependent_substreams: u8,
    pub channel_map: String,
    pub channels: Vec<&'static str>,
    pub num_channels: usize,
    pub mpeg_scheme: i32,
    pub joc: bool,
    pub joc_complexity: u8,
}

impl From<&Ec3Dsi> for Ec3Report {
    fn from(dsi: &Ec3Dsi) -> Self {
        let primary = dsi.primary();
        let channel_map = dsi.channel_map();

        Self {
            data_rate_kbps: dsi.data_rate,
            independent_substreams: dsi.substreams.len(),
            acmod: primary.acmod,
            lfe: primary.lfeon,
            dependent_substreams: primary.num_dep_sub,
            channel_map: format!("0x{channel_map:04X}"),
            channels: channel_labels(channel_map),
            num_channels: channel_count(channel_map),
            mpeg_scheme: mpeg_scheme_value(channel_map),
            joc: dsi.flag_ec3_extension_type_a,
            joc_complexity: dsi.complexity_index_type_a,
        }
    }
}

impl DescriptorReport for Ec3Report {
    const BOX_NAME: &'static str = "dec3";

    fn text_lines(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Data rate", format!("{} kbps", self.data_rate_kbps)),
            ("Independent substreams", self.independent_substreams.to_string()),
            ("Audio coding mode", self.acmod.to_string()),
            ("LFE", self.lfe.to_string()),
            ("Dependent substreams", self.dependent_substreams.to_string()),
            ("Channel map", self.channel_map.clone()),
            ("Channel assignment", self.channels.join(", ")),
            ("Number of channels", self.num_channels.to_string()),
            ("MPEG scheme value", self.mpeg_scheme.to_string()),
            ("JOC", self.joc.to_string()),
            ("JOC complexity", self.joc_complexity.to_string()),
        ]
    }

    fn strict_warning(&self) -> Option<String> {
        (self.independent_substreams > 1).then(|| {
            format!(
                "only the first of {} independent substreams is described",
                self.independent_substreams
            )
        })
    }
}

pub fn cmd_ec3(args: &DsiArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Inspecting {} dec3 payload(s)", args.inputs.len());

    run(args, cli, multi, |data| Ok(Ec3Report::from(&extract(data)?)))
}

use std::path::Path;

use anyhow::{Result, bail};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde::Serialize;

use super::command::{Cli, DsiArgs, ReportFormat};
use crate::input::read_descriptor;

/// Label column width of text reports.
pub const LABEL_WIDTH: usize = 26;

/// A parsed descriptor that can be printed as text or serialized.
pub trait DescriptorReport: Serialize {
    /// Box name used in headings, e.g. `dac4`.
    const BOX_NAME: &'static str;

    fn text_lines(&self) -> Vec<(&'static str, String)>;

    /// Warning that `--strict` turns into a failure.
    fn strict_warning(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Serialize)]
struct InputReport<R> {
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    descriptor: Option<R>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Parses every input with `parse` and prints the reports.
///
/// Failures are logged and reported per input unless `--strict` is set, in
/// which case the first one aborts.
pub fn run<R, F>(args: &DsiArgs, cli: &Cli, multi: Option<&MultiProgress>, parse: F) -> Result<()>
where
    R: DescriptorReport,
    F: Fn(&[u8]) -> Result<R>,
{
    let pb = match multi {
        Some(multi) => {
            let pb = multi.add(ProgressBar::new(args.inputs.len() as u64));
            pb.set_style(ProgressStyle::with_template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )?);
            Some(pb)
        }
        None => None,
    };

    let mut reports = Vec::with_capacity(args.inputs.len());
    let mut failures = 0usize;

    for input in &args.inputs {
        if let Some(ref pb) = pb {
            pb.set_message(input.display().to_string());
        }

        let report = match parse_input(input, args.hex, cli.strict, &parse) {
            Ok(descriptor) => InputReport {
                input: input.display().to_string(),
                descriptor: Some(descriptor),
                error: None,
            },
            Err(e) => {
                if cli.strict {
                    if let Some(ref pb) = pb {
                        pb.abandon();
                    }
                    return Err(e.context(format!("Failed to parse {}", input.display())));
                }
                log::warn!("Skipping {}: {e:#}", input.display());
                failures += 1;
                InputReport {
                    input: input.display().to_string(),
                    descriptor: None,
                    error: Some(format!("{e:#}")),
                }
            }
        };

        if args.format == ReportFormat::Text {
            let text = render_text(&report);
            match pb {
                Some(ref pb) => pb.suspend(|| print!("{text}")),
                None => print!("{text}"),
            }
        }

        reports.push(report);

        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    }

    if let Some(ref pb) = pb {
        pb.finish_and_clear();
    }

    if args.format == ReportFormat::Yaml {
        print!("{}", serde_yaml_ng::to_string(&reports)?);
    }

    if failures > 0 {
        log::warn!(
            "{failures} of {} {} payloads could not be parsed",
            args.inputs.len(),
            R::BOX_NAME
        );
    }

    Ok(())
}

fn parse_input<R, F>(input: &Path, hex: bool, strict: bool, parse: &F) -> Result<R>
where
    R: DescriptorReport,
    F: Fn(&[u8]) -> Result<R>,
{
    let data = read_descriptor(input, hex)?;
    log::debug!("Read {} bytes from {}", data.len(), input.display());

    let report = parse(&data)?;

    if strict {
        if let Some(warning) = report.strict_warning() {
            bail!(warning);
        }
    }

    Ok(report)
}

fn render_text<R: DescriptorReport>(report: &InputReport<R>) -> String {
    let mut text = format!("{} {}\n", R::BOX_NAME, report.input);

    if let Some(descriptor) = &report.descriptor {
        for (label, value) in descriptor.text_lines() {
            text.push_str(&format!("  {label:LABEL_WIDTH$}{value}\n"));
        }
    }

    if let Some(error) = &report.error {
        text.push_str(&format!("  {:LABEL_WIDTH$}{error}\n", "Error"));
    }

    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::cli::command::Commands;
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;

    #[derive(Debug, Serialize)]
    struct Dummy {
        value: u32,
        #[serde(skip)]
        warning: Option<&'static str>,
    }

    impl DescriptorReport for Dummy {
        const BOX_NAME: &'static str = "dummy";

        fn text_lines(&self) -> Vec<(&'static str, String)> {
            vec![("Value", self.value.to_string())]
        }

        fn strict_warning(&self) -> Option<String> {
            self.warning.map(str::to_string)
        }
    }

    /// Reports the payload length, warning on payloads longer than two bytes.
    fn parse_dummy(data: &[u8]) -> Result<Dummy> {
        if data.is_empty() {
            bail!("dummy payload is empty");
        }
        Ok(Dummy {
            value: data.len() as u32,
            warning: (data.len() > 2).then_some("dummy payload has trailing bytes"),
        })
    }

    fn write_input(name: &str, data: &[u8]) -> Result<PathBuf> {
        let path = std::env::temp_dir().join(format!("dsinfo-{}-{name}", std::process::id()));
        fs::write(&path, data)?;
        Ok(path)
    }

    fn cli_for(args: &[&str]) -> Result<(Cli, DsiArgs)> {
        let mut cli = Cli::try_parse_from(args.iter().copied())?;
        let args = match &mut cli.command {
            Commands::Ac4(args) | Commands::Ec3(args) => DsiArgs {
                inputs: std::mem::take(&mut args.inputs),
                hex: args.hex,
                format: args.format,
            },
        };
        Ok((cli, args))
    }

    #[test]
    fn strict_turns_warnings_into_errors() -> Result<()> {
        let path = write_input("warning.bin", &[1, 2, 3])?;

        let report = parse_input(&path, false, false, &parse_dummy)?;
        assert_eq!(report.value, 3);

        let err = parse_input(&path, false, true, &parse_dummy).unwrap_err();
        assert_eq!(err.to_string(), "dummy payload has trailing bytes");

        fs::remove_file(&path)?;
        Ok(())
    }

    #[test]
    fn strict_accepts_clean_payloads() -> Result<()> {
        let path = write_input("clean.txt", b"0a 0b\n")?;

        let report = parse_input(&path, true, true, &parse_dummy)?;
        assert_eq!(report.value, 2);

        fs::remove_file(&path)?;
        Ok(())
    }

    #[test]
    fn lenient_run_skips_failed_inputs() -> Result<()> {
        let good = write_input("lenient-good.bin", &[1])?;
        let empty = write_input("lenient-empty.bin", &[])?;
        let good_arg = good.to_string_lossy().into_owned();
        let empty_arg = empty.to_string_lossy().into_owned();

        let (cli, args) = cli_for(&["dsinfo", "ac4", &good_arg, &empty_arg, "--format", "yaml"])?;
        run(&args, &cli, None, parse_dummy)?;

        let (cli, args) = cli_for(&["dsinfo", "ac4", &good_arg, &empty_arg, "--strict"])?;
        let err = run(&args, &cli, None, parse_dummy).unwrap_err();
        assert!(format!("{err:#}").contains("dummy payload is empty"), "{err:#}");
        assert!(err.to_string().starts_with("Failed to parse"), "{err}");

        fs::remove_file(&good)?;
        fs::remove_file(&empty)?;
        Ok(())
    }

    #[test]
    fn text_layout() {
        let report = InputReport {
            input: "a.bin".to_string(),
            descriptor: Some(Dummy {
                value: 7,
                warning: None,
            }),
            error: None,
        };

        assert_eq!(
            render_text(&report),
            "dummy a.bin\n  Value                     7\n\n"
        );
    }

    #[test]
    fn failed_input_layout() {
        let report: InputReport<Dummy> = InputReport {
            input: "b.bin".to_string(),
            descriptor: None,
            error: Some("dac4 payload is empty".to_string()),
        };

        assert_eq!(
            render_text(&report),
            "dummy b.bin\n  Error                     dac4 payload is empty\n\n"
        );
    }

    #[test]
    fn yaml_skips_missing_fields() -> Result<()> {
        let reports = [InputReport {
            input: "a.bin".to_string(),
            descriptor: Some(Dummy {
                value: 7,
                warning: None,
            }),
            error: None,
        }];

        let yaml = serde_yaml_ng::to_string(&reports)?;
        assert_eq!(yaml, "- input: a.bin\n  descriptor:\n    value: 7\n");

        Ok(())
    }
}

use std::path::PathBuf;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ngit:       ",
    env!("VERGEN_GIT_DESCRIBE"),
    "\ndolby-dsi: ",
    env!("DSI_VERSION"),
    "\nbuilt:     ",
    env!("BUILD_TIMESTAMP"),
);

#[derive(Debug, ClapParser)]
#[command(
    name         = env!("CARGO_PKG_NAME"),
    version      = env!("CARGO_PKG_VERSION"),
    long_version = LONG_VERSION,
    author       = env!("CARGO_PKG_AUTHORS"),
    about        = "Tools for inspecting AC-4 and E-AC-3 decoder specific information",
    long_about   = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Treat warnings as fatal errors (fail on the first descriptor that does not parse cleanly).
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress bars during operations.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print channel configuration, codec string and IMS/Atmos flags of dac4 payloads.
    Ac4(DsiArgs),

    /// Print channel map, channel count and JOC information of dec3 payloads.
    Ec3(DsiArgs),
}

#[derive(Debug, Args)]
pub struct DsiArgs {
    /// Files holding one descriptor payload each (use "-" for stdin).
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Read inputs as hexadecimal text instead of raw bytes.
    #[arg(long)]
    pub hex: bool,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert LogLevel to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum ReportFormat {
    /// Aligned human-readable text.
    Text,
    /// One YAML document listing every input.
    Yaml,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dsinfo", "ec3", "a.bin", "b.bin", "--hex", "--format", "yaml", "--strict",
        ])
        .unwrap();

        assert!(cli.strict);
        let Commands::Ec3(args) = cli.command else {
            panic!("expected ec3");
        };
        assert_eq!(args.inputs, [PathBuf::from("a.bin"), PathBuf::from("b.bin")]);
        assert!(args.hex);
        assert_eq!(args.format, ReportFormat::Yaml);
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["dsinfo", "ac4"]).is_err());
    }
}

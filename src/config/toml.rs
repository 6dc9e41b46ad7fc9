//! TOML configuration file parsing
//!
//! A config file may set any benchmark option. Values are layered with
//! command-line options first, then the file, then built-in defaults:
//!
//! ```toml
//! device = "/dev/nvme0n1"
//! num_workers = 64
//! duration_seconds = 5
//! pattern = "sequential"
//!
//! [output]
//! format = "json"
//! units = "si"
//! ```

use super::cli::Cli;
use super::cli_convert::{convert_format, convert_pattern, parse_block_size, parse_duration};
use super::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Benchmark settings as they appear in a config file; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub device: Option<PathBuf>,
    pub num_workers: Option<u32>,
    pub duration_seconds: Option<u32>,
    pub pattern: Option<Pattern>,
    pub fixed_block_size: Option<u32>,
    pub direct: Option<bool>,
    pub seed: Option<u64>,
    pub output: Option<FileOutputConfig>,
}

/// `[output]` table of a config file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileOutputConfig {
    pub format: Option<OutputFormat>,
    pub units: Option<UnitMode>,
}

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<FileConfig> {
    let config: FileConfig = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Build the run configuration from CLI arguments and the optional config file
pub fn build_config(cli: &Cli) -> Result<BenchmarkConfig> {
    let file = match &cli.config {
        Some(path) => parse_toml_file(path)?,
        None => FileConfig::default(),
    };
    merge_cli_with_config(cli, file)
}

/// Merge CLI arguments with file configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, file: FileConfig) -> Result<BenchmarkConfig> {
    let device = cli
        .device
        .clone()
        .or(file.device)
        .context("No device given: pass DEVICE or set `device` in the config file")?;

    let mut config = BenchmarkConfig::new(device);

    if let Some(workers) = cli.num_workers.or(file.num_workers) {
        config.num_workers = workers;
    }

    if let Some(time) = &cli.time {
        config.duration_seconds = parse_duration(time).context("Invalid time")?;
    } else if let Some(seconds) = file.duration_seconds {
        config.duration_seconds = seconds;
    }

    if let Some(pattern) = cli.pattern {
        config.pattern = convert_pattern(pattern);
    } else if let Some(pattern) = file.pattern {
        config.pattern = pattern;
    }

    if let Some(block_size) = &cli.block_size {
        config.fixed_block_size = Some(parse_block_size(block_size).context("Invalid block size")?);
    } else {
        config.fixed_block_size = file.fixed_block_size;
    }

    config.direct = cli.direct || file.direct.unwrap_or(false);
    config.seed = cli.seed.or(file.seed);

    let file_output = file.output.unwrap_or_default();
    config.output.format = match cli.format {
        Some(format) => convert_format(format),
        None => file_output.format.unwrap_or_default(),
    };
    config.output.units = if cli.machine_readable {
        UnitMode::Raw
    } else if cli.si {
        UnitMode::Si
    } else {
        file_output.units.unwrap_or_default()
    };

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::{FormatArg, PatternArg};
    use std::io::Write;

    fn cli_for(device: &str) -> Cli {
        Cli {
            device: Some(PathBuf::from(device)),
            ..Default::default()
        }
    }

    #[test]
    fn test_cli_only_defaults() {
        let config = merge_cli_with_config(&cli_for("/dev/sdb"), FileConfig::default()).unwrap();
        assert_eq!(config, BenchmarkConfig::new("/dev/sdb"));
    }

    #[test]
    fn test_parse_toml_string() {
        let toml = r#"
            device = "/dev/nvme0n1"
            num_workers = 64
            duration_seconds = 5
            pattern = "sequential"
            fixed_block_size = 4096

            [output]
            format = "json"
            units = "si"
        "#;

        let file = parse_toml_string(toml).unwrap();
        assert_eq!(file.device, Some(PathBuf::from("/dev/nvme0n1")));
        assert_eq!(file.num_workers, Some(64));
        assert_eq!(file.pattern, Some(Pattern::Sequential));
        assert_eq!(
            file.output,
            Some(FileOutputConfig {
                format: Some(OutputFormat::Json),
                units: Some(UnitMode::Si),
            })
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(parse_toml_string("queue_depth = 4").is_err());
    }

    #[test]
    fn test_file_values_apply() {
        let file = parse_toml_string("device = \"/tmp/disk.img\"\nnum_workers = 4\nduration_seconds = 7").unwrap();
        let config = merge_cli_with_config(&Cli::default(), file).unwrap();
        assert_eq!(config.device, PathBuf::from("/tmp/disk.img"));
        assert_eq!(config.num_workers, 4);
        assert_eq!(config.duration_seconds, 7);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = parse_toml_string(
            "device = \"/tmp/a\"\nnum_workers = 4\npattern = \"sequential\"\n[output]\nformat = \"json\"",
        )
        .unwrap();
        let cli = Cli {
            device: Some(PathBuf::from("/tmp/b")),
            num_workers: Some(16),
            time: Some("3s".to_string()),
            block_size: Some("8k".to_string()),
            pattern: Some(PatternArg::Random),
            format: Some(FormatArg::Text),
            machine_readable: true,
            ..Default::default()
        };

        let config = merge_cli_with_config(&cli, file).unwrap();
        assert_eq!(config.device, PathBuf::from("/tmp/b"));
        assert_eq!(config.num_workers, 16);
        assert_eq!(config.duration_seconds, 3);
        assert_eq!(config.fixed_block_size, Some(8192));
        assert_eq!(config.pattern, Pattern::Random);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.output.units, UnitMode::Raw);
    }

    #[test]
    fn test_missing_device() {
        assert!(merge_cli_with_config(&Cli::default(), FileConfig::default()).is_err());
    }

    #[test]
    fn test_si_flag() {
        let cli = Cli {
            si: true,
            ..cli_for("/dev/sdb")
        };
        let config = merge_cli_with_config(&cli, FileConfig::default()).unwrap();
        assert_eq!(config.output.units, UnitMode::Si);
    }

    #[test]
    fn test_parse_toml_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "device = \"/dev/sdc\"\nseed = 42").unwrap();
        let cli = Cli {
            config: Some(tmp.path().to_path_buf()),
            ..Default::default()
        };

        let config = build_config(&cli).unwrap();
        assert_eq!(config.device, PathBuf::from("/dev/sdc"));
        assert_eq!(config.seed, Some(42));
    }
}

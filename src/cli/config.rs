use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::cli::flags::{Cli, Command, ExportFormatArg};
use crate::config::{load_config, AppConfig};

/// Loaded config plus the per-invocation overrides from the command line.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub app: AppConfig,
    pub export_dir: PathBuf,
    pub formats: Vec<ExportFormatArg>,
}

pub fn resolve_config(cli: &Cli) -> Result<RunConfig> {
    let app = load_config(cli.config.as_deref())?;

    let (output, formats) = match &cli.command {
        Command::Scan { export, .. }
        | Command::Batch { export, .. }
        | Command::Recent { export, .. } => (export.output.clone(), dedup(&export.export)),
        Command::Console { output } => (output.clone(), Vec::new()),
    };
    let export_dir = output.unwrap_or_else(|| PathBuf::from(&app.export_dir));

    Ok(RunConfig {
        app,
        export_dir,
        formats,
    })
}

/// Batch text from `--file` (or stdin for `-`), else the inline argument.
pub fn read_batch_input(input: Option<&str>, file: Option<&Path>) -> Result<String> {
    match (file, input) {
        (Some(path), _) if path == Path::new("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading batch list from stdin")?;
            Ok(buf)
        }
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("reading batch list {}", path.display())),
        (None, Some(inline)) => Ok(inline.to_string()),
        (None, None) => Err(anyhow!("batch needs an inline list or --file")),
    }
}

fn dedup(formats: &[ExportFormatArg]) -> Vec<ExportFormatArg> {
    let mut out = Vec::with_capacity(formats.len());
    for f in formats {
        if !out.contains(f) {
            out.push(*f);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn output_flag_overrides_config_export_dir() {
        let cli = Cli::try_parse_from([
            "bharat-osint",
            "--config",
            "does/not/exist.toml",
            "scan",
            "9123456789",
            "--export",
            "csv,csv",
        ])
        .unwrap();
        let cfg = resolve_config(&cli).unwrap();
        assert_eq!(cfg.export_dir, PathBuf::from("out"));
        assert_eq!(cfg.formats, vec![ExportFormatArg::Csv]);

        let cli = Cli::try_parse_from([
            "bharat-osint",
            "--config",
            "does/not/exist.toml",
            "console",
            "--output",
            "exports",
        ])
        .unwrap();
        assert_eq!(resolve_config(&cli).unwrap().export_dir, PathBuf::from("exports"));
    }

    #[test]
    fn batch_input_prefers_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");
        std::fs::write(&path, "9123456789\n9876543210\n").unwrap();
        let text = read_batch_input(Some("ignored"), Some(&path)).unwrap();
        assert_eq!(text, "9123456789\n9876543210\n");
        assert_eq!(read_batch_input(Some("1,2"), None).unwrap(), "1,2");
        assert!(read_batch_input(None, None).is_err());
    }
}

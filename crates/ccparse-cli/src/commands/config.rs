//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use tracing::debug;

use ccparse_core::CcparseConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "ocr.language")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(),
        ConfigCommand::Init(init_args) => init_config(init_args),
        ConfigCommand::Get { key } => get_config(&key),
        ConfigCommand::Set { key, value } => set_config(&key, &value),
        ConfigCommand::Path => show_path(),
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ccparse")
        .join("config.json")
}

/// Configuration for a command: the explicit `--config` file, else the
/// default file when it exists, else built-in defaults.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<CcparseConfig> {
    if let Some(path) = explicit {
        return CcparseConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(CcparseConfig::from_file(&default_path)?)
    } else {
        Ok(CcparseConfig::default())
    }
}

fn show_config() -> anyhow::Result<()> {
    let config_path = default_config_path();

    let config = if config_path.exists() {
        CcparseConfig::from_file(&config_path)?
    } else {
        eprintln!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
        CcparseConfig::default()
    };

    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(default_config_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    CcparseConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

/// Look up a dotted key in the JSON form of the configuration.
fn lookup<'a>(json: &'a serde_json::Value, key: &str) -> anyhow::Result<&'a serde_json::Value> {
    key.split('.').try_fold(json, |current, part| {
        current
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })
}

/// Set a dotted key, re-validating the result against the config schema.
fn assign(config: &CcparseConfig, key: &str, value: &str) -> anyhow::Result<(CcparseConfig, serde_json::Value)> {
    let parsed_value: serde_json::Value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));

    let mut json = serde_json::to_value(config)?;
    let (parent_key, last) = match key.rsplit_once('.') {
        Some((parent, last)) => (Some(parent), last),
        None => (None, key),
    };

    let parent = match parent_key {
        Some(parent_key) => parent_key.split('.').try_fold(&mut json, |current, part| {
            current
                .get_mut(part)
                .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))
        })?,
        None => &mut json,
    };

    let obj = parent
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("Cannot set value at non-object path"))?;
    if !obj.contains_key(last) {
        anyhow::bail!("Configuration key not found: {}", key);
    }
    obj.insert(last.to_string(), parsed_value.clone());

    let updated: CcparseConfig = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;
    Ok((updated, parsed_value))
}

fn get_config(key: &str) -> anyhow::Result<()> {
    let config = load_config(None)?;
    let json = serde_json::to_value(&config)?;

    println!("{}", serde_json::to_string_pretty(lookup(&json, key)?)?);

    Ok(())
}

fn set_config(key: &str, value: &str) -> anyhow::Result<()> {
    let config_path = default_config_path();
    let config = load_config(None)?;

    let (config, parsed_value) = assign(&config, key, value)?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(&config_path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed_value)?
    );

    Ok(())
}

fn show_path() -> anyhow::Result<()> {
    let config_path = default_config_path();

    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'ccparse config init' to create a configuration file.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccparse_core::models::config::{OcrBackendKind, RendererKind};

    #[test]
    fn test_lookup_nested_key() {
        let json = serde_json::to_value(CcparseConfig::default()).unwrap();
        assert_eq!(lookup(&json, "ocr.language").unwrap(), "eng");
        assert!(lookup(&json, "ocr.nope").is_err());
    }

    #[test]
    fn test_assign_parses_json_and_strings() {
        let config = CcparseConfig::default();
        let (config, _) = assign(&config, "pdf.render_dpi", "150").unwrap();
        assert_eq!(config.pdf.render_dpi, 150);
        let (config, _) = assign(&config, "ocr.backend", "onnx").unwrap();
        assert_eq!(config.ocr.backend, OcrBackendKind::Onnx);
        let (config, _) = assign(&config, "pdf.renderer", "pdftoppm").unwrap();
        assert_eq!(config.pdf.renderer, RendererKind::Pdftoppm);
    }

    #[test]
    fn test_assign_rejects_bad_values() {
        let config = CcparseConfig::default();
        assert!(assign(&config, "pdf.render_dpi", "lots").is_err());
        assert!(assign(&config, "pdf.unknown_key", "1").is_err());
        assert!(assign(&config, "missing.section", "1").is_err());
    }

    #[test]
    fn test_load_explicit_missing_file() {
        assert!(load_config(Some("/nonexistent/ccparse.json")).is_err());
    }
}

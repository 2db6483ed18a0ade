use std::{fs, path::PathBuf};

use anyhow::{Context, Result, bail};
use shared::config::ClientConfig;

/// Serialize the default configuration as `yaml` or `json`.
pub fn render_default(format: &str) -> Result<String> {
    let config = ClientConfig::with_defaults();
    let serialized = match format {
        "yaml" | "yml" => serde_yml::to_string(&config)?,
        "json" => serde_json::to_string_pretty(&config)?,
        other => bail!("unsupported format `{other}`; use yaml or json"),
    };
    Ok(serialized)
}

/// Writes a default configuration file, `config.<format>` unless `output`
/// names another path.
pub fn generate_config(format: &str, output: Option<PathBuf>) -> Result<PathBuf> {
    let serialized = render_default(format)?;
    let path = output.unwrap_or_else(|| PathBuf::from(format!("config.{format}")));
    fs::write(&path, serialized)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("Configuration file '{}' generated successfully.", path.display());
    Ok(path)
}

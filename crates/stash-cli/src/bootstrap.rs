use anyhow::Context;
use stash_config::StashConfig;

use crate::cli::GlobalFlags;

/// Load `.env` from the working directory, then the layered configuration.
///
/// An explicit `--config` file is layered above the discovered TOML files.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<StashConfig> {
    load_dotenv()?;
    match &flags.config {
        Some(path) => StashConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => StashConfig::load().context("failed to load configuration"),
    }
}

fn load_dotenv() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let env_path = cwd.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }
    Ok(())
}

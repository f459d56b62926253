use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context as _;
use serde::de::DeserializeOwned;

/// Reads a JSON configuration file into the requested type.
///
/// Missing fields fall back to the type's defaults, so partial override
/// files work.
pub(crate) fn read_config_file<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path)
        .with_context(|| format!("failed to open config file: {}", path.display()))?;
    let config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    Ok(config)
}

use std::path::Path;

use anyhow::Context;
use gltf_bundle_core::options::GltfPluginOptions;
use gltf_bundle_core::FileSystem;

/// Option values given on the command line, applied over the config file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OptionOverrides {
  pub inline: bool,
  pub inline_asset_limit: Option<u64>,
  pub include: Vec<String>,
  pub exclude: Vec<String>,
}

pub fn load_options(
  file_system: &dyn FileSystem,
  config_path: Option<&Path>,
  overrides: OptionOverrides,
) -> anyhow::Result<GltfPluginOptions> {
  let mut options = match config_path {
    None => GltfPluginOptions::default(),
    Some(config_path) => {
      let contents = file_system
        .read_to_string(config_path)
        .with_context(|| format!("Failed to read config {}", config_path.display()))?;

      serde_json::from_str(&contents)
        .with_context(|| format!("Invalid glTF plugin config {}", config_path.display()))?
    }
  };

  if overrides.inline {
    options.inline = true;
  }

  if let Some(limit) = overrides.inline_asset_limit {
    options.inline_asset_limit = limit;
  }

  if !overrides.include.is_empty() {
    options.include = overrides.include;
  }

  options.exclude.extend(overrides.exclude);

  tracing::debug!(?options, "Resolved glTF plugin options");

  Ok(options)
}

use std::path::Path;
use std::path::PathBuf;

use glob_match::glob_match;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::project_path::to_base_relative_path;
use crate::project_path::to_slash_string;
use crate::types::FileType;

/// Images strictly larger than this many bytes are copied instead of embedded
pub const DEFAULT_INLINE_ASSET_LIMIT: u64 = 75 * 1024;

pub const DEFAULT_INCLUDE: &str = "**/*.gltf";

/// User facing options of the glTF plugin
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct GltfPluginOptions {
  /// Glob patterns selecting descriptor files to process
  #[serde(deserialize_with = "one_or_many")]
  pub include: Vec<String>,

  /// Glob patterns removing files that `include` selected
  #[serde(deserialize_with = "one_or_many")]
  pub exclude: Vec<String>,

  pub inline_asset_limit: u64,

  /// Embed the whole rewritten descriptor into the module instead of emitting its path
  pub inline: bool,
}

impl Default for GltfPluginOptions {
  fn default() -> Self {
    Self {
      include: vec![String::from(DEFAULT_INCLUDE)],
      exclude: Vec::new(),
      inline_asset_limit: DEFAULT_INLINE_ASSET_LIMIT,
      inline: false,
    }
  }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum OneOrMany {
    One(String),
    Many(Vec<String>),
  }

  Ok(match OneOrMany::deserialize(deserializer)? {
    OneOrMany::One(pattern) => vec![pattern],
    OneOrMany::Many(patterns) => patterns,
  })
}

/// Decides which file paths the plugin handles
#[derive(Clone, Debug)]
pub struct AssetFilter {
  base_dir: PathBuf,
  include: Vec<String>,
  exclude: Vec<String>,
}

impl AssetFilter {
  pub fn new(base_dir: &Path, options: &GltfPluginOptions) -> Self {
    let include = if options.include.is_empty() {
      vec![String::from(DEFAULT_INCLUDE)]
    } else {
      options.include.clone()
    };

    Self {
      base_dir: base_dir.to_path_buf(),
      include,
      exclude: options.exclude.clone(),
    }
  }

  /// Patterns are matched against the path relative to the base directory. Files outside of it
  /// are matched by their absolute path.
  pub fn is_in_scope(&self, path: &Path) -> bool {
    if FileType::from_path(path) != FileType::Gltf {
      return false;
    }

    let candidate = if path.is_absolute() {
      let relative = to_base_relative_path(&self.base_dir, path);
      if relative.starts_with("..") {
        to_slash_string(path)
      } else {
        to_slash_string(&relative)
      }
    } else {
      to_slash_string(path)
    };

    let included = self
      .include
      .iter()
      .any(|pattern| glob_match(pattern, &candidate));

    included
      && !self
        .exclude
        .iter()
        .any(|pattern| glob_match(pattern, &candidate))
  }
}

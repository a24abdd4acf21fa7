use std::fmt::Debug;
use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::FileSystemRef;

/// Everything a plugin receives from the host when it is created
pub struct PluginContext {
  /// Directory containing the bundle's entry module. Asset paths are made relative to it.
  pub base_dir: PathBuf,
  pub file_system: FileSystemRef,
}

/// Module produced for a file the plugin handled
#[derive(Clone, Debug, PartialEq)]
pub struct ModuleSource {
  /// Complete module code, `export default <value>;`
  pub code: String,

  /// The JavaScript literal the module exports by default
  pub default_export: String,
}

impl ModuleSource {
  pub fn with_default_export(default_export: String) -> Self {
    Self {
      code: format!("export default {};\n", default_export),
      default_export,
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoadResult {
  /// The host should fall back to its default handling
  NotHandled,
  Module(ModuleSource),
}

/// The capabilities a bundler plugin exposes to its host
///
/// The host asks `is_in_scope` before loading, calls `on_load` once per candidate file (possibly
/// concurrently), and calls `on_bundle_write` once after the output location is known.
#[async_trait]
pub trait BundlerPlugin: Debug + Send + Sync {
  fn name(&self) -> &'static str;

  fn is_in_scope(&self, path: &Path) -> bool;

  /// Produce the module that replaces `path` in the bundle
  async fn on_load(&self, path: &Path, contents: &[u8]) -> Result<LoadResult, anyhow::Error>;

  /// Perform file-system side effects once the bundle has been written to `output_file`
  async fn on_bundle_write(&self, output_file: &Path) -> Result<(), anyhow::Error>;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug)]
  struct TestBundlerPlugin {}

  #[async_trait]
  impl BundlerPlugin for TestBundlerPlugin {
    fn name(&self) -> &'static str {
      "test"
    }

    fn is_in_scope(&self, _path: &Path) -> bool {
      false
    }

    async fn on_load(&self, _path: &Path, _contents: &[u8]) -> Result<LoadResult, anyhow::Error> {
      Ok(LoadResult::NotHandled)
    }

    async fn on_bundle_write(&self, _output_file: &Path) -> Result<(), anyhow::Error> {
      Ok(())
    }
  }

  #[test]
  fn can_be_dyn() {
    let _plugin: Box<dyn BundlerPlugin> = Box::new(TestBundlerPlugin {});
  }

  #[test]
  fn module_source_wraps_default_export() {
    let module = ModuleSource::with_default_export(String::from("\"assets/model.gltf\""));

    assert_eq!(module.code, "export default \"assets/model.gltf\";\n");
    assert_eq!(module.default_export, "\"assets/model.gltf\"");
  }
}

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use gltf_bundle_core::plugin::BundlerPlugin;
use gltf_bundle_core::plugin::LoadResult;
use gltf_bundle_core::plugin::ModuleSource;
use gltf_bundle_core::project_path::to_base_relative_path;
use gltf_bundle_core::project_path::to_slash_string;
use gltf_bundle_core::FileSystemRef;
use jwalk::WalkDir;
use tokio::task::JoinSet;
use tracing::Instrument;

/// What a bundling run produced
#[derive(Debug, Default, PartialEq)]
pub struct BundleSummary {
  /// Base relative paths of the modules spliced into the bundle
  pub modules: Vec<String>,
  /// Candidates no plugin handled
  pub unhandled: Vec<PathBuf>,
}

/// Minimal bundler host driving plugins over the files of an entry directory
pub struct BundleHost {
  entry_dir: PathBuf,
  file_system: FileSystemRef,
  plugins: Vec<Arc<dyn BundlerPlugin>>,
}

impl BundleHost {
  pub fn new(
    entry_dir: PathBuf,
    file_system: FileSystemRef,
    plugins: Vec<Arc<dyn BundlerPlugin>>,
  ) -> Self {
    Self {
      entry_dir,
      file_system,
      plugins,
    }
  }

  /// Files under the entry directory that some plugin wants, skipping `output_dir`
  pub fn discover(&self, output_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut candidates = Vec::new();

    for entry in WalkDir::new(&self.entry_dir).sort(true) {
      let entry = entry?;
      let path = entry.path();

      if !entry.file_type().is_file() || path.starts_with(output_dir) {
        continue;
      }

      if self.plugins.iter().any(|plugin| plugin.is_in_scope(&path)) {
        candidates.push(path);
      }
    }

    Ok(candidates)
  }

  #[tracing::instrument(level = "debug", skip_all, fields(output_file = %output_file.display()))]
  pub async fn bundle(&self, output_file: &Path) -> anyhow::Result<BundleSummary> {
    let output_dir = output_file
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_default();

    let candidates = self.discover(&output_dir)?;
    tracing::info!(
      "Loading {} candidates from {}",
      candidates.len(),
      self.entry_dir.display()
    );

    let mut jobs = JoinSet::new();
    for path in candidates {
      let file_system = self.file_system.clone();
      let plugins = self.plugins.clone();

      jobs.spawn(load_candidate(path, file_system, plugins).in_current_span());
    }

    let mut modules: Vec<(PathBuf, ModuleSource)> = Vec::new();
    let mut unhandled = Vec::new();
    while let Some(result) = jobs.join_next().await {
      match result?? {
        (path, Some(module)) => modules.push((path, module)),
        (path, None) => unhandled.push(path),
      }
    }

    modules.sort_by(|a, b| a.0.cmp(&b.0));
    unhandled.sort();

    let mut code = String::from("export default {\n");
    let mut names = Vec::with_capacity(modules.len());
    for (path, module) in modules {
      let name = to_slash_string(&to_base_relative_path(&self.entry_dir, &path));
      code.push_str(&format!(
        "  {}: {},\n",
        serde_json::to_string(&name)?,
        module.default_export
      ));
      names.push(name);
    }
    code.push_str("};\n");

    self.file_system.create_dir_all(&output_dir)?;
    self.file_system.write(output_file, code.as_bytes())?;

    for plugin in &self.plugins {
      tracing::debug!("Running {} bundle write", plugin.name());
      plugin.on_bundle_write(output_file).await?;
    }

    Ok(BundleSummary {
      modules: names,
      unhandled,
    })
  }
}

async fn load_candidate(
  path: PathBuf,
  file_system: FileSystemRef,
  plugins: Vec<Arc<dyn BundlerPlugin>>,
) -> anyhow::Result<(PathBuf, Option<ModuleSource>)> {
  let contents = match file_system.read(&path) {
    Ok(contents) => contents,
    Err(error) => {
      tracing::warn!("Skipping unreadable file {}: {}", path.display(), error);
      return Ok((path, None));
    }
  };

  for plugin in plugins.iter().filter(|plugin| plugin.is_in_scope(&path)) {
    if let LoadResult::Module(module) = plugin.on_load(&path, &contents).await? {
      return Ok((path, Some(module)));
    }
  }

  Ok((path, None))
}

#[cfg(test)]
mod tests {
  use assert_fs::prelude::*;
  use assert_fs::TempDir;
  use gltf_bundle_core::options::GltfPluginOptions;
  use gltf_bundle_core::plugin::PluginContext;
  use gltf_bundle_core::FileSystem;
  use gltf_bundle_filesystem::in_memory_file_system::InMemoryFileSystem;
  use gltf_bundle_filesystem::os_file_system::OsFileSystem;
  use gltf_bundle_plugin::GltfPlugin;
  use pretty_assertions::assert_eq;
  use tracing_test::traced_test;

  use super::*;

  fn setup_project(temp_dir: &TempDir) -> PathBuf {
    let project = temp_dir.child("project");
    project
      .child("assets/chest.gltf")
      .write_str(r#"{ "buffers": [{ "uri": "buffer.bin" }], "images": [{ "uri": "diffuse.png" }] }"#)
      .unwrap();
    project
      .child("assets/buffer.bin")
      .write_binary(&[1, 2, 3])
      .unwrap();
    project
      .child("assets/diffuse.png")
      .write_binary(&[4, 5, 6])
      .unwrap();
    project
      .child("assets/broken.gltf")
      .write_str("{ \"images\": [")
      .unwrap();
    project.child("index.js").write_str("").unwrap();

    project.path().to_path_buf()
  }

  fn create_host(entry_dir: &Path, options: GltfPluginOptions) -> BundleHost {
    let file_system: FileSystemRef = Arc::new(OsFileSystem);
    let plugin: Arc<dyn BundlerPlugin> = Arc::new(GltfPlugin::new(
      &PluginContext {
        base_dir: entry_dir.to_path_buf(),
        file_system: file_system.clone(),
      },
      options,
    ));

    BundleHost::new(entry_dir.to_path_buf(), file_system, vec![plugin])
  }

  #[test]
  fn discovers_in_scope_files() {
    let temp_dir = TempDir::new().unwrap();
    let entry_dir = setup_project(&temp_dir);
    let host = create_host(&entry_dir, GltfPluginOptions::default());

    assert_eq!(
      host.discover(&entry_dir.join("dist")).unwrap(),
      vec![
        entry_dir.join("assets/broken.gltf"),
        entry_dir.join("assets/chest.gltf"),
      ]
    );
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn writes_the_bundle_and_materializes_assets() {
    let temp_dir = TempDir::new().unwrap();
    let entry_dir = setup_project(&temp_dir);
    let host = create_host(
      &entry_dir,
      GltfPluginOptions {
        inline_asset_limit: 1,
        ..GltfPluginOptions::default()
      },
    );

    let output_file = temp_dir.path().join("dist/bundle.js");
    let summary = host.bundle(&output_file).await.unwrap();

    assert_eq!(
      summary,
      BundleSummary {
        modules: vec![String::from("assets/chest.gltf")],
        unhandled: vec![entry_dir.join("assets/broken.gltf")],
      }
    );
    assert_eq!(
      std::fs::read_to_string(&output_file).unwrap(),
      "export default {\n  \"assets/chest.gltf\": \"assets/chest.gltf\",\n};\n"
    );

    let dist = temp_dir.child("dist");
    assert!(dist.child("assets/chest.gltf").path().exists());
    assert!(dist.child("assets/buffer.bin").path().exists());
    assert!(dist.child("assets/diffuse.png").path().exists());
  }

  #[tokio::test(flavor = "multi_thread")]
  #[traced_test]
  async fn leaves_unreadable_candidates_unhandled() {
    let temp_dir = TempDir::new().unwrap();
    let entry_dir = setup_project(&temp_dir);

    // Discovery sees the files on disk but reads go to an empty file system
    let file_system = Arc::new(InMemoryFileSystem::default());
    let plugin: Arc<dyn BundlerPlugin> = Arc::new(GltfPlugin::new(
      &PluginContext {
        base_dir: entry_dir.clone(),
        file_system: file_system.clone(),
      },
      GltfPluginOptions::default(),
    ));
    let host = BundleHost::new(entry_dir.clone(), file_system.clone(), vec![plugin]);

    let output_file = entry_dir.join("dist/bundle.js");
    let summary = host.bundle(&output_file).await.unwrap();

    assert_eq!(
      summary,
      BundleSummary {
        modules: Vec::new(),
        unhandled: vec![
          entry_dir.join("assets/broken.gltf"),
          entry_dir.join("assets/chest.gltf"),
        ],
      }
    );
    assert_eq!(
      file_system.read_to_string(&output_file).unwrap(),
      "export default {\n};\n"
    );
    assert!(logs_contain("Skipping unreadable file"));
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn skips_its_own_output_inside_the_entry_directory() {
    let temp_dir = TempDir::new().unwrap();
    let entry_dir = setup_project(&temp_dir);
    let host = create_host(
      &entry_dir,
      GltfPluginOptions {
        inline_asset_limit: 1,
        ..GltfPluginOptions::default()
      },
    );

    let output_file = entry_dir.join("dist/bundle.js");
    let first = host.bundle(&output_file).await.unwrap();
    let second = host.bundle(&output_file).await.unwrap();

    assert_eq!(first, second);
    assert!(entry_dir.join("dist/assets/chest.gltf").exists());
  }
}

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Error;
use async_trait::async_trait;
use gltf_bundle_core::options::AssetFilter;
use gltf_bundle_core::options::GltfPluginOptions;
use gltf_bundle_core::plugin::BundlerPlugin;
use gltf_bundle_core::plugin::LoadResult;
use gltf_bundle_core::plugin::PluginContext;

use crate::GltfClassifier;
use crate::MaterializeReport;
use crate::Materializer;
use crate::PipelineState;

/// Bundler plugin that makes glTF descriptors and their dependencies deployable
///
/// Each instance owns the state of one bundling run. Writing the bundle drains it.
#[derive(Debug)]
pub struct GltfPlugin {
  base_dir: PathBuf,
  classifier: GltfClassifier,
  filter: AssetFilter,
  materializer: Materializer,
  options: Arc<GltfPluginOptions>,
  state: Arc<PipelineState>,
}

impl GltfPlugin {
  pub fn new(ctx: &PluginContext, options: GltfPluginOptions) -> Self {
    let options = Arc::new(options);

    GltfPlugin {
      base_dir: ctx.base_dir.clone(),
      classifier: GltfClassifier::new(
        ctx.base_dir.clone(),
        ctx.file_system.clone(),
        options.clone(),
      ),
      filter: AssetFilter::new(&ctx.base_dir, &options),
      materializer: Materializer::new(ctx.file_system.clone()),
      options,
      state: Arc::new(PipelineState::default()),
    }
  }

  pub fn state(&self) -> &PipelineState {
    &self.state
  }

  /// Write everything recorded so far into `output_dir`
  pub async fn materialize(&self, output_dir: &Path) -> MaterializeReport {
    let pending = self.state.drain();
    let descriptor_count = pending.copies.len();

    let report = self
      .materializer
      .materialize(output_dir, &self.base_dir, pending, self.options.inline)
      .await;

    tracing::info!(
      "Materialized {} glTF descriptors into {}: {} assets copied, {} descriptors written, {} failures",
      descriptor_count,
      output_dir.display(),
      report.copied.len(),
      report.written.len(),
      report.failures.len()
    );

    report
  }
}

#[async_trait]
impl BundlerPlugin for GltfPlugin {
  fn name(&self) -> &'static str {
    "gltf"
  }

  fn is_in_scope(&self, path: &Path) -> bool {
    self.filter.is_in_scope(path)
  }

  async fn on_load(&self, path: &Path, contents: &[u8]) -> Result<LoadResult, Error> {
    if !self.is_in_scope(path) {
      return Ok(LoadResult::NotHandled);
    }

    let classification = match self.classifier.classify(path, contents).await {
      Ok(classification) => classification,
      Err(error) => {
        tracing::warn!(
          asset = %error.path().display(),
          "Skipping glTF descriptor {}: {}",
          path.display(),
          error
        );
        return Ok(LoadResult::NotHandled);
      }
    };

    self.state.record(
      classification.descriptor_key,
      classification.copies,
      classification.descriptor_json,
    );

    Ok(LoadResult::Module(classification.module))
  }

  async fn on_bundle_write(&self, output_file: &Path) -> Result<(), Error> {
    let output_dir = output_file
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_default();

    self.materialize(&output_dir).await;
    Ok(())
  }
}

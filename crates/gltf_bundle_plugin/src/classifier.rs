use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine;
use gltf_bundle_core::error::GltfBundleError;
use gltf_bundle_core::error::GltfBundleResult;
use gltf_bundle_core::options::GltfPluginOptions;
use gltf_bundle_core::plugin::ModuleSource;
use gltf_bundle_core::project_path::normalize_path;
use gltf_bundle_core::project_path::to_base_relative_path;
use gltf_bundle_core::project_path::to_slash_string;
use gltf_bundle_core::types::Descriptor;
use gltf_bundle_core::types::FileType;
use gltf_bundle_core::FileSystemRef;
use tokio::task::JoinSet;

/// Result of classifying one descriptor
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
  /// Descriptor path relative to the base directory
  pub descriptor_key: PathBuf,

  pub descriptor: Descriptor,

  /// `descriptor` as two-space indented JSON
  pub descriptor_json: String,

  /// Absolute source paths that must be copied next to the bundle, buffers first
  pub copies: Vec<PathBuf>,

  pub module: ModuleSource,
}

/// What happens to a single image
#[derive(Clone, Debug, PartialEq)]
enum ImagePlacement {
  External,
  Embedded { data_uri: String },
}

/// Decides per dependency whether to embed or copy it, and rewrites the descriptor to match
///
/// Never writes to the file-system.
#[derive(Debug)]
pub struct GltfClassifier {
  base_dir: PathBuf,
  file_system: FileSystemRef,
  options: Arc<GltfPluginOptions>,
}

impl GltfClassifier {
  pub fn new(
    base_dir: PathBuf,
    file_system: FileSystemRef,
    options: Arc<GltfPluginOptions>,
  ) -> Self {
    Self {
      base_dir,
      file_system,
      options,
    }
  }

  #[tracing::instrument(
    level = "debug",
    skip_all,
    fields(descriptor = %descriptor_path.display())
  )]
  pub async fn classify(
    &self,
    descriptor_path: &Path,
    contents: &[u8],
  ) -> GltfBundleResult<Classification> {
    let descriptor_path = normalize_path(descriptor_path);
    let descriptor_dir = descriptor_path
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_default();
    let descriptor_key = to_base_relative_path(&self.base_dir, &descriptor_path);

    let mut descriptor =
      Descriptor::from_slice(contents).map_err(|source| GltfBundleError::MalformedDescriptor {
        path: descriptor_path.clone(),
        source,
      })?;

    let mut copies = Vec::new();

    for buffer in descriptor.buffers.iter_mut() {
      let Some(uri) = buffer.external_uri() else {
        continue;
      };

      let source = normalize_path(&descriptor_dir.join(uri));
      tracing::debug!("Copying buffer {}", source.display());

      if self.options.inline {
        buffer.uri = Some(self.output_relative_uri(&source));
      }
      copies.push(source);
    }

    let placements = self.place_images(&descriptor_dir, &descriptor).await?;

    for (image, placement) in descriptor.images.iter_mut().zip(placements) {
      let (Some(image), Some((source, placement))) = (image.as_mut(), placement) else {
        continue;
      };

      match placement {
        ImagePlacement::External => {
          if self.options.inline {
            image.uri = Some(self.output_relative_uri(&source));
          }
          copies.push(source);
        }
        ImagePlacement::Embedded { data_uri } => {
          image.uri = Some(data_uri);
        }
      }
    }

    let descriptor_json =
      descriptor
        .to_pretty_json()
        .map_err(|source| GltfBundleError::DescriptorSerializeFailure {
          path: descriptor_path.clone(),
          source,
        })?;

    let module = self.module_source(&descriptor_path, &descriptor_key, &descriptor)?;

    Ok(Classification {
      descriptor_key,
      descriptor,
      descriptor_json,
      copies,
      module,
    })
  }

  /// Stat, and where small enough read, every image concurrently
  ///
  /// The result has one slot per entry in `descriptor.images`, `None` for entries that stay as
  /// they are.
  async fn place_images(
    &self,
    descriptor_dir: &Path,
    descriptor: &Descriptor,
  ) -> GltfBundleResult<Vec<Option<(PathBuf, ImagePlacement)>>> {
    let mut placements = vec![None; descriptor.images.len()];
    let mut jobs = JoinSet::new();

    for (index, image) in descriptor.images.iter().enumerate() {
      let Some(uri) = image.as_ref().and_then(|image| image.external_uri()) else {
        continue;
      };

      let source = normalize_path(&descriptor_dir.join(uri));
      let file_system = self.file_system.clone();
      let inline_asset_limit = self.options.inline_asset_limit;

      jobs.spawn_blocking(move || {
        let placement = place_image(&file_system, &source, inline_asset_limit);
        (index, source, placement)
      });
    }

    while let Some(result) = jobs.join_next().await {
      let (index, source, placement) = result.map_err(|error| GltfBundleError::TaskFailure {
        path: descriptor_dir.to_path_buf(),
        message: error.to_string(),
      })?;

      placements[index] = Some((source, placement?));
    }

    Ok(placements)
  }

  /// Uri of a copied asset as seen from the output directory
  fn output_relative_uri(&self, source: &Path) -> String {
    to_slash_string(&to_base_relative_path(&self.base_dir, source))
  }

  fn module_source(
    &self,
    descriptor_path: &Path,
    descriptor_key: &Path,
    descriptor: &Descriptor,
  ) -> GltfBundleResult<ModuleSource> {
    let serialize_error = |source| GltfBundleError::DescriptorSerializeFailure {
      path: descriptor_path.to_path_buf(),
      source,
    };

    let value = if self.options.inline {
      descriptor.to_compact_json().map_err(serialize_error)?
    } else {
      to_slash_string(descriptor_key)
    };

    let literal = serde_json::to_string(&value).map_err(serialize_error)?;

    Ok(ModuleSource::with_default_export(literal))
  }
}

fn place_image(
  file_system: &FileSystemRef,
  source: &Path,
  inline_asset_limit: u64,
) -> GltfBundleResult<ImagePlacement> {
  let size = file_system
    .file_size(source)
    .map_err(|source_error| GltfBundleError::AssetStatFailure {
      path: source.to_path_buf(),
      source: source_error,
    })?;

  if size > inline_asset_limit {
    tracing::debug!(
      "Copying image {} ({} bytes > {} byte limit)",
      source.display(),
      size,
      inline_asset_limit
    );
    return Ok(ImagePlacement::External);
  }

  let Some(mime_type) = FileType::from_path(source).mime_type() else {
    tracing::debug!(
      "Copying image {} since no mime type is known for it",
      source.display()
    );
    return Ok(ImagePlacement::External);
  };

  let bytes = file_system
    .read(source)
    .map_err(|source_error| GltfBundleError::AssetReadFailure {
      path: source.to_path_buf(),
      source: source_error,
    })?;

  tracing::debug!("Embedding image {} ({} bytes)", source.display(), size);

  Ok(ImagePlacement::Embedded {
    data_uri: format!(
      "data:{};base64,{}",
      mime_type,
      base64::engine::general_purpose::STANDARD.encode(bytes)
    ),
  })
}

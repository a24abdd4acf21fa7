use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use gltf_bundle_core::error::GltfBundleError;
use gltf_bundle_core::project_path::to_base_relative_path;
use gltf_bundle_core::FileSystemRef;
use tokio::task::JoinSet;

use crate::PendingBundle;

/// What a materialization did
#[derive(Debug, Default)]
pub struct MaterializeReport {
  /// Destination paths of copied assets
  pub copied: Vec<PathBuf>,
  /// Destination paths of written descriptors
  pub written: Vec<PathBuf>,
  /// Everything that failed; nothing here stopped the rest of the work
  pub failures: Vec<GltfBundleError>,
}

impl MaterializeReport {
  fn merge(&mut self, other: MaterializeReport) {
    self.copied.extend(other.copied);
    self.written.extend(other.written);
    self.failures.extend(other.failures);
  }
}

/// Writes the files classification scheduled once the output directory is known
#[derive(Debug)]
pub struct Materializer {
  file_system: FileSystemRef,
}

struct DescriptorJob {
  descriptor_key: PathBuf,
  sources: Vec<PathBuf>,
  descriptor_json: Option<String>,
}

impl Materializer {
  pub fn new(file_system: FileSystemRef) -> Self {
    Self { file_system }
  }

  /// Copy every pending asset to `output_dir`, mirroring its location relative to `base_dir`, and
  /// unless `inline` is set write each rewritten descriptor there too.
  ///
  /// Failures are logged and collected, they never abort the remaining work.
  #[tracing::instrument(
    level = "debug",
    skip_all,
    fields(output_dir = %output_dir.display())
  )]
  pub async fn materialize(
    &self,
    output_dir: &Path,
    base_dir: &Path,
    pending: PendingBundle,
    inline: bool,
  ) -> MaterializeReport {
    let PendingBundle {
      copies,
      mut descriptors,
    } = pending;

    let mut claimed = HashSet::new();
    let mut jobs = JoinSet::new();

    for (descriptor_key, sources) in copies {
      // Descriptors sharing an asset copy it once
      let sources = sources
        .into_iter()
        .filter(|source| claimed.insert(source.clone()))
        .collect::<Vec<PathBuf>>();

      let descriptor_json = if inline {
        None
      } else {
        descriptors.remove(&descriptor_key)
      };

      let job = DescriptorJob {
        descriptor_key,
        sources,
        descriptor_json,
      };
      let file_system = self.file_system.clone();
      let output_dir = output_dir.to_path_buf();
      let base_dir = base_dir.to_path_buf();

      jobs.spawn_blocking(move || {
        materialize_descriptor(&file_system, &output_dir, &base_dir, job)
      });
    }

    let mut report = MaterializeReport::default();
    while let Some(result) = jobs.join_next().await {
      match result {
        Ok(descriptor_report) => {
          for failure in &descriptor_report.failures {
            tracing::warn!(asset = %failure.path().display(), "{}", failure);
          }
          report.merge(descriptor_report);
        }
        Err(error) => {
          tracing::warn!("Materialization task did not complete: {}", error);
          report.failures.push(GltfBundleError::TaskFailure {
            path: output_dir.to_path_buf(),
            message: error.to_string(),
          });
        }
      }
    }

    report.copied.sort();
    report.written.sort();
    report
  }
}

fn materialize_descriptor(
  file_system: &FileSystemRef,
  output_dir: &Path,
  base_dir: &Path,
  job: DescriptorJob,
) -> MaterializeReport {
  let mut report = MaterializeReport::default();

  for source in job.sources {
    let destination = output_dir.join(to_base_relative_path(base_dir, &source));

    match copy_asset(file_system, &source, &destination) {
      Ok(()) => report.copied.push(destination),
      Err(error) => report.failures.push(error),
    }
  }

  if let Some(descriptor_json) = job.descriptor_json {
    let destination = output_dir.join(&job.descriptor_key);

    match write_descriptor(file_system, &destination, &descriptor_json) {
      Ok(()) => report.written.push(destination),
      Err(error) => report.failures.push(error),
    }
  }

  report
}

fn ensure_parent_dir(file_system: &FileSystemRef, path: &Path) -> Result<(), GltfBundleError> {
  let Some(parent) = path.parent() else {
    return Ok(());
  };

  file_system
    .create_dir_all(parent)
    .map_err(|source| GltfBundleError::DirectoryCreateFailure {
      path: parent.to_path_buf(),
      source,
    })
}

fn copy_asset(
  file_system: &FileSystemRef,
  source: &Path,
  destination: &Path,
) -> Result<(), GltfBundleError> {
  ensure_parent_dir(file_system, destination)?;

  let bytes = file_system
    .copy(source, destination)
    .map_err(|error| GltfBundleError::AssetCopyFailure {
      from: source.to_path_buf(),
      to: destination.to_path_buf(),
      source: error,
    })?;

  tracing::debug!(
    "Copied {} to {} ({} bytes)",
    source.display(),
    destination.display(),
    bytes
  );
  Ok(())
}

fn write_descriptor(
  file_system: &FileSystemRef,
  destination: &Path,
  descriptor_json: &str,
) -> Result<(), GltfBundleError> {
  ensure_parent_dir(file_system, destination)?;

  file_system
    .write(destination, descriptor_json.as_bytes())
    .map_err(|source| GltfBundleError::DescriptorWriteFailure {
      path: destination.to_path_buf(),
      source,
    })?;

  tracing::debug!("Wrote descriptor {}", destination.display());
  Ok(())
}

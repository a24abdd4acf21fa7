use std::path::PathBuf;

use thiserror::Error;

pub type GltfBundleResult<T> = std::result::Result<T, GltfBundleError>;

/// Failures the classifier and materializer contain and report
#[derive(Error, Debug)]
pub enum GltfBundleError {
  #[error("Failed to parse glTF descriptor {}: {source}", path.display())]
  MalformedDescriptor {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("Failed to serialize glTF descriptor {}: {source}", path.display())]
  DescriptorSerializeFailure {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("Failed to stat asset {}: {source}", path.display())]
  AssetStatFailure {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to read asset {}: {source}", path.display())]
  AssetReadFailure {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to create directory {}: {source}", path.display())]
  DirectoryCreateFailure {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to copy asset {} to {}: {source}", from.display(), to.display())]
  AssetCopyFailure {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to write glTF descriptor {}: {source}", path.display())]
  DescriptorWriteFailure {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A blocking file-system task panicked or was cancelled
  #[error("Asset task for {} did not complete: {message}", path.display())]
  TaskFailure { path: PathBuf, message: String },
}

impl GltfBundleError {
  /// The file the failure is about
  pub fn path(&self) -> &PathBuf {
    match self {
      GltfBundleError::MalformedDescriptor { path, .. }
      | GltfBundleError::DescriptorSerializeFailure { path, .. }
      | GltfBundleError::AssetStatFailure { path, .. }
      | GltfBundleError::AssetReadFailure { path, .. }
      | GltfBundleError::DirectoryCreateFailure { path, .. }
      | GltfBundleError::DescriptorWriteFailure { path, .. }
      | GltfBundleError::TaskFailure { path, .. } => path,
      GltfBundleError::AssetCopyFailure { from, .. } => from,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::io;

  use super::*;

  #[test]
  fn messages_name_the_offending_path_and_cause() {
    let error = GltfBundleError::AssetStatFailure {
      path: PathBuf::from("/project/assets/diffuse.png"),
      source: io::Error::new(io::ErrorKind::NotFound, "File not found"),
    };

    assert_eq!(
      error.to_string(),
      "Failed to stat asset /project/assets/diffuse.png: File not found"
    );
    assert_eq!(error.path(), &PathBuf::from("/project/assets/diffuse.png"));
  }

  #[test]
  fn copy_failures_report_the_source() {
    let error = GltfBundleError::AssetCopyFailure {
      from: PathBuf::from("/project/assets/buffer.bin"),
      to: PathBuf::from("/dist/assets/buffer.bin"),
      source: io::Error::new(io::ErrorKind::NotFound, "missing"),
    };

    assert_eq!(error.path(), &PathBuf::from("/project/assets/buffer.bin"));
    assert!(error.to_string().contains("/dist/assets/buffer.bin"));
  }
}

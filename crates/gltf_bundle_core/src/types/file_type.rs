use std::path::Path;

/// Represents a file type by its extension
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileType {
  /// glTF scene descriptor
  Gltf,
  /// Binary buffer referenced by a descriptor
  Bin,
  Jpeg,
  Png,
  Other(String),
}

impl FileType {
  pub fn extension(&self) -> &str {
    match self {
      FileType::Gltf => "gltf",
      FileType::Bin => "bin",
      FileType::Jpeg => "jpg",
      FileType::Png => "png",
      FileType::Other(s) => s.as_str(),
    }
  }

  /// Only the extensions the data URI encoder knows a mime type for are recognised as images.
  /// Anything else, `.jpeg` and `.webp` included, is `Other`.
  pub fn from_extension(ext: &str) -> Self {
    match ext {
      "gltf" => FileType::Gltf,
      "bin" => FileType::Bin,
      "jpg" => FileType::Jpeg,
      "png" => FileType::Png,
      ext => FileType::Other(ext.to_string()),
    }
  }

  /// File type of a path or uri, judged by its final extension
  pub fn from_path(path: impl AsRef<Path>) -> Self {
    let ext = path
      .as_ref()
      .extension()
      .map(|ext| ext.to_string_lossy())
      .unwrap_or_default();

    Self::from_extension(&ext)
  }

  pub fn mime_type(&self) -> Option<&'static str> {
    match self {
      FileType::Jpeg => Some("image/jpeg"),
      FileType::Png => Some("image/png"),
      _ => None,
    }
  }
}

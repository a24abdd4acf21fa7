use std::path::Path;

use crate::FileSystem;

#[derive(Default, Debug)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
  fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
    std::fs::read(path)
  }

  fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
    std::fs::read_to_string(path)
  }

  fn file_size(&self, path: &Path) -> std::io::Result<u64> {
    let metadata = std::fs::metadata(path)?;
    if metadata.is_dir() {
      return Err(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        "Path is a directory",
      ));
    }

    Ok(metadata.len())
  }

  fn is_file(&self, path: &Path) -> bool {
    path.is_file()
  }

  fn is_dir(&self, path: &Path) -> bool {
    path.is_dir()
  }

  fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
  }

  fn copy(&self, from: &Path, to: &Path) -> std::io::Result<u64> {
    std::fs::copy(from, to)
  }

  fn write(&self, path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
  }
}

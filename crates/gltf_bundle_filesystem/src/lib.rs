use std::path::Path;
use std::sync::Arc;

/// In-memory file-system for testing
pub mod in_memory_file_system;

/// File-system implementation using std::fs
pub mod os_file_system;

/// FileSystem abstraction instance
///
/// This should be `OsFileSystem` for non-testing environments and `InMemoryFileSystem` for testing.
pub type FileSystemRef = Arc<dyn FileSystem + Send + Sync>;

/// Trait abstracting the file-system operations the plugin needs
///
/// Implementations must mirror `std::fs` semantics: `write` and `copy` fail with `NotFound` when
/// the destination's parent directory is missing, and `create_dir_all` succeeds when the directory
/// already exists.
#[mockall::automock]
pub trait FileSystem: std::fmt::Debug {
  fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;

  fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
    let bytes = self.read(path)?;
    String::from_utf8(bytes).map_err(|_| std::io::Error::other("Unable to read file as string"))
  }

  /// Size in bytes of the file at `path`
  fn file_size(&self, path: &Path) -> std::io::Result<u64>;

  fn is_file(&self, path: &Path) -> bool;
  fn is_dir(&self, path: &Path) -> bool;

  /// Create a directory and all of its missing parents
  fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;

  /// Copy the bytes of `from` to `to`, returning the number of bytes copied
  fn copy(&self, from: &Path, to: &Path) -> std::io::Result<u64>;

  fn write(&self, path: &Path, contents: &[u8]) -> std::io::Result<()>;
}

use std::collections::HashMap;
use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use parking_lot::RwLock;

use crate::FileSystem;

#[cfg(not(target_os = "windows"))]
fn root_dir() -> PathBuf {
  PathBuf::from("/")
}

#[cfg(target_os = "windows")]
fn root_dir() -> PathBuf {
  PathBuf::from("C:/")
}

/// In memory implementation of a file-system entry
#[derive(Debug)]
enum InMemoryFileSystemEntry {
  File { contents: Vec<u8> },
  Directory,
}

/// In memory implementation of the `FileSystem` trait, for testing purposes.
#[derive(Debug)]
pub struct InMemoryFileSystem {
  files: RwLock<HashMap<PathBuf, InMemoryFileSystemEntry>>,
}

impl Default for InMemoryFileSystem {
  fn default() -> Self {
    let mut files = HashMap::new();
    files.insert(root_dir(), InMemoryFileSystemEntry::Directory);

    Self {
      files: RwLock::new(files),
    }
  }
}

impl InMemoryFileSystem {
  /// Seed a file, creating all of its parent directories
  pub fn write_file(&self, path: &Path, contents: impl AsRef<[u8]>) {
    let path = self.canonicalize(path);
    let mut files = self.files.write();

    let mut dir = path.parent();
    while let Some(parent) = dir {
      files.insert(parent.to_path_buf(), InMemoryFileSystemEntry::Directory);
      dir = parent.parent();
    }

    files.insert(
      path,
      InMemoryFileSystemEntry::File {
        contents: contents.as_ref().to_vec(),
      },
    );
  }

  /// Every file path currently stored, sorted
  pub fn files(&self) -> Vec<PathBuf> {
    let mut paths = self
      .files
      .read()
      .iter()
      .filter(|(_, entry)| matches!(entry, InMemoryFileSystemEntry::File { .. }))
      .map(|(path, _)| path.clone())
      .collect::<Vec<PathBuf>>();

    paths.sort();
    paths
  }

  /// Relative paths resolve from the root directory
  fn canonicalize(&self, path: &Path) -> PathBuf {
    let root = root_dir();
    let mut result = if path.is_absolute() {
      vec![]
    } else {
      root.components().collect()
    };

    for component in path.components() {
      match component {
        Component::Prefix(prefix) => {
          result = vec![Component::Prefix(prefix)];
        }
        Component::RootDir => {
          result.push(Component::RootDir);
        }
        Component::CurDir => {}
        Component::ParentDir => {
          result.pop();
        }
        Component::Normal(path) => {
          result.push(Component::Normal(path));
        }
      }
    }

    PathBuf::from_iter(result)
  }

  fn ensure_parent_dir(
    files: &HashMap<PathBuf, InMemoryFileSystemEntry>,
    path: &Path,
  ) -> io::Result<()> {
    match path.parent().map(|parent| files.get(parent)) {
      None | Some(Some(InMemoryFileSystemEntry::Directory)) => Ok(()),
      Some(_) => Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("Parent directory of {} does not exist", path.display()),
      )),
    }
  }
}

impl FileSystem for InMemoryFileSystem {
  fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
    let path = self.canonicalize(path);
    let files = self.files.read();
    match files.get(&path) {
      None => Err(io::Error::new(io::ErrorKind::NotFound, "File not found")),
      Some(InMemoryFileSystemEntry::File { contents }) => Ok(contents.clone()),
      Some(InMemoryFileSystemEntry::Directory) => Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        "Path is a directory",
      )),
    }
  }

  fn file_size(&self, path: &Path) -> io::Result<u64> {
    let path = self.canonicalize(path);
    let files = self.files.read();
    match files.get(&path) {
      None => Err(io::Error::new(io::ErrorKind::NotFound, "File not found")),
      Some(InMemoryFileSystemEntry::File { contents }) => Ok(contents.len() as u64),
      Some(InMemoryFileSystemEntry::Directory) => Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        "Path is a directory",
      )),
    }
  }

  fn is_file(&self, path: &Path) -> bool {
    let path = self.canonicalize(path);
    matches!(
      self.files.read().get(&path),
      Some(InMemoryFileSystemEntry::File { .. })
    )
  }

  fn is_dir(&self, path: &Path) -> bool {
    let path = self.canonicalize(path);
    matches!(
      self.files.read().get(&path),
      Some(InMemoryFileSystemEntry::Directory)
    )
  }

  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    let path = self.canonicalize(path);
    let mut files = self.files.write();

    let mut dir = Some(path.as_path());
    while let Some(current) = dir {
      if let Some(InMemoryFileSystemEntry::File { .. }) = files.get(current) {
        return Err(io::Error::new(
          io::ErrorKind::AlreadyExists,
          format!("{} exists and is not a directory", current.display()),
        ));
      }
      dir = current.parent();
    }

    let mut dir = Some(path.as_path());
    while let Some(current) = dir {
      files.insert(current.to_path_buf(), InMemoryFileSystemEntry::Directory);
      dir = current.parent();
    }

    Ok(())
  }

  fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
    let contents = self.read(from)?;
    let to = self.canonicalize(to);
    let mut files = self.files.write();

    Self::ensure_parent_dir(&files, &to)?;

    let len = contents.len() as u64;
    files.insert(to, InMemoryFileSystemEntry::File { contents });
    Ok(len)
  }

  fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
    let path = self.canonicalize(path);
    let mut files = self.files.write();

    Self::ensure_parent_dir(&files, &path)?;

    files.insert(
      path,
      InMemoryFileSystemEntry::File {
        contents: contents.to_vec(),
      },
    );
    Ok(())
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_read_file() {
    let fs = InMemoryFileSystem::default();
    fs.write_file(&PathBuf::from("/foo/bar"), "contents");
    let result = fs.read_to_string(Path::new("/foo/bar")).unwrap();
    assert_eq!(result, "contents");
  }

  #[test]
  fn test_read_file_not_found() {
    let fs = InMemoryFileSystem::default();
    let result = fs.read_to_string(Path::new("/foo/bar"));
    assert!(result.is_err());
  }

  #[test]
  fn test_file_size() {
    let fs = InMemoryFileSystem::default();
    fs.write_file(Path::new("/assets/buffer.bin"), vec![0u8; 1024]);

    assert_eq!(fs.file_size(Path::new("/assets/buffer.bin")).unwrap(), 1024);
    assert!(fs.file_size(Path::new("/assets")).is_err());
    assert!(fs.file_size(Path::new("/assets/missing.bin")).is_err());
  }

  #[test]
  fn test_is_dir() {
    let fs = InMemoryFileSystem::default();

    fs.create_dir_all(&PathBuf::from("/foo"))
      .expect("Expected /foo directory to be created");

    assert!(fs.is_dir(Path::new("/foo")));
    assert!(!fs.is_dir(Path::new("/foo/bar")));
  }

  #[test]
  fn test_create_dir_all_creates_nested_parents() {
    let fs = InMemoryFileSystem::default();

    fs.create_dir_all(Path::new("/out/a/b/c")).unwrap();
    fs.create_dir_all(Path::new("/out/a/b/c")).unwrap();
    fs.create_dir_all(Path::new("/out/a")).unwrap();

    assert!(fs.is_dir(Path::new("/out")));
    assert!(fs.is_dir(Path::new("/out/a/b")));
    assert!(fs.is_dir(Path::new("/out/a/b/c")));
  }

  #[test]
  fn test_create_dir_all_fails_over_a_file() {
    let fs = InMemoryFileSystem::default();
    fs.write_file(Path::new("/out/a"), "file");

    let error = fs.create_dir_all(Path::new("/out/a/b")).unwrap_err();
    assert_eq!(error.kind(), io::ErrorKind::AlreadyExists);
  }

  #[test]
  fn test_write_requires_parent_directory() {
    let fs = InMemoryFileSystem::default();

    let error = fs.write(Path::new("/out/model.gltf"), b"{}").unwrap_err();
    assert_eq!(error.kind(), io::ErrorKind::NotFound);

    fs.create_dir_all(Path::new("/out")).unwrap();
    fs.write(Path::new("/out/model.gltf"), b"{}").unwrap();
    assert!(fs.is_file(Path::new("/out/model.gltf")));
  }

  #[test]
  fn test_copy() {
    let fs = InMemoryFileSystem::default();
    fs.write_file(Path::new("/src/buffer.bin"), [1u8, 2, 3]);

    assert!(fs
      .copy(Path::new("/src/buffer.bin"), Path::new("/out/buffer.bin"))
      .is_err());

    fs.create_dir_all(Path::new("/out")).unwrap();
    assert_eq!(
      fs.copy(Path::new("/src/buffer.bin"), Path::new("/out/buffer.bin"))
        .unwrap(),
      3
    );
    assert_eq!(fs.read(Path::new("/out/buffer.bin")).unwrap(), vec![1, 2, 3]);
    assert_eq!(
      fs.files(),
      vec![
        PathBuf::from("/out/buffer.bin"),
        PathBuf::from("/src/buffer.bin")
      ]
    );
  }

  #[test]
  fn test_relative_paths_resolve_from_the_root() {
    let fs = InMemoryFileSystem::default();

    fs.write_file(Path::new("foo/bar"), "");
    assert!(fs.is_file(Path::new("foo/bar")));
    assert!(fs.is_file(Path::new("/foo/bar")));
    assert!(fs.is_file(Path::new("/foo/./baz/../bar")));
  }
}

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use path_slash::PathExt;

/// Resolve `.` and `..` components without touching the file-system
pub fn normalize_path(path: &Path) -> PathBuf {
  let mut result: Vec<Component<'_>> = Vec::new();

  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => match result.last() {
        Some(Component::Normal(_)) => {
          result.pop();
        }
        Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
        _ => result.push(component),
      },
      component => result.push(component),
    }
  }

  PathBuf::from_iter(result)
}

/// Converts the path so that it is relative to the base directory
///
/// Paths outside the base directory keep their `..` segments, so they still resolve from it.
pub fn to_base_relative_path(base_dir: &Path, file_path: &Path) -> PathBuf {
  let file_path = normalize_path(file_path);
  pathdiff::diff_paths(&file_path, normalize_path(base_dir)).unwrap_or(file_path)
}

/// Forward-slash form of a path, regardless of the host separator
pub fn to_slash_string(path: &Path) -> String {
  path.to_slash_lossy()
}

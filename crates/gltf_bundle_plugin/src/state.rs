use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use gltf_bundle_shared_map::SharedHashMap;

/// Work accumulated while descriptors are loaded, waiting for the bundle to be written
///
/// Both maps are keyed by the descriptor's path relative to the base directory.
#[derive(Debug, Default)]
pub struct PipelineState {
  /// Absolute source paths of the files each descriptor needs copied to the output directory
  pending_copies: SharedHashMap<PathBuf, Vec<PathBuf>>,

  /// Pretty printed rewritten descriptor JSON
  descriptors: SharedHashMap<PathBuf, String>,
}

/// Everything drained from a `PipelineState`
#[derive(Debug, Default)]
pub struct PendingBundle {
  pub copies: Vec<(PathBuf, Vec<PathBuf>)>,
  pub descriptors: HashMap<PathBuf, String>,
}

impl PipelineState {
  pub fn record(&self, descriptor_key: PathBuf, copies: Vec<PathBuf>, descriptor_json: String) {
    self.pending_copies.ensure_bucket(descriptor_key.clone());
    for source in copies {
      self.pending_copies.append(descriptor_key.clone(), source);
    }

    self.descriptors.insert(descriptor_key, descriptor_json);
  }

  pub fn pending_copies(&self, descriptor_key: &Path) -> Option<Vec<PathBuf>> {
    self.pending_copies.get(descriptor_key)
  }

  pub fn descriptor_json(&self, descriptor_key: &Path) -> Option<String> {
    self.descriptors.get(descriptor_key)
  }

  pub fn is_empty(&self) -> bool {
    self.pending_copies.is_empty() && self.descriptors.is_empty()
  }

  /// Take everything recorded so far, leaving the state empty for the next run
  pub fn drain(&self) -> PendingBundle {
    let mut copies = self.pending_copies.drain();
    copies.sort_by(|(a, _), (b, _)| a.cmp(b));

    PendingBundle {
      copies,
      descriptors: self.descriptors.drain().into_iter().collect(),
    }
  }
}

pub mod error;
pub mod options;
pub mod plugin;
pub mod project_path;
pub mod types;

// Re-export this from core so plugins only need one dependency
pub use gltf_bundle_filesystem::FileSystem;
pub use gltf_bundle_filesystem::FileSystemRef;

pub use classifier::*;
pub use gltf_plugin::*;
pub use materializer::*;
pub use state::*;

mod classifier;
mod gltf_plugin;
mod materializer;
mod state;

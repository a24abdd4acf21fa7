use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use gltf_bundle_core::plugin::BundlerPlugin;
use gltf_bundle_core::plugin::PluginContext;
use gltf_bundle_core::FileSystemRef;
use gltf_bundle_filesystem::os_file_system::OsFileSystem;
use gltf_bundle_plugin::GltfPlugin;
use tracing::error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::load_options;
use crate::config::OptionOverrides;
use crate::host::BundleHost;

mod config;
mod host;

/// Bundle glTF descriptors together with their buffers and images
#[derive(Parser)]
struct Args {
  /// Directory containing the descriptors. Asset paths are made relative to it.
  entry: PathBuf,

  /// Bundle file to write. Assets are materialized next to it.
  #[arg(short, long, default_value = "dist/bundle.js")]
  output: PathBuf,

  /// JSON file with glTF plugin options
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Embed descriptors into the bundle instead of writing them out
  #[arg(long)]
  inline: bool,

  /// Largest image size in bytes that is embedded as a data URI
  #[arg(long)]
  inline_asset_limit: Option<u64>,

  #[arg(long)]
  include: Vec<String>,

  #[arg(long)]
  exclude: Vec<String>,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
  initialize_tracing();

  let args = Args::parse();
  run(args).await.unwrap_or_else(|e| {
    error!("Failed to bundle glTF descriptors: {:#}", e);
    std::process::exit(1);
  });
}

async fn run(args: Args) -> anyhow::Result<()> {
  let cwd = std::env::current_dir()?;
  let entry_dir = cwd.join(&args.entry);
  let output_file = cwd.join(&args.output);

  let file_system: FileSystemRef = Arc::new(OsFileSystem);
  let options = load_options(
    file_system.as_ref(),
    args.config.as_deref(),
    OptionOverrides {
      inline: args.inline,
      inline_asset_limit: args.inline_asset_limit,
      include: args.include,
      exclude: args.exclude,
    },
  )?;

  let plugin: Arc<dyn BundlerPlugin> = Arc::new(GltfPlugin::new(
    &PluginContext {
      base_dir: entry_dir.clone(),
      file_system: file_system.clone(),
    },
    options,
  ));

  let host = BundleHost::new(entry_dir, file_system, vec![plugin]);
  let summary = host.bundle(&output_file).await?;

  info!(
    "Wrote {} with {} glTF modules ({} files not handled)",
    output_file.display(),
    summary.modules.len(),
    summary.unhandled.len()
  );

  Ok(())
}

fn initialize_tracing() {
  let filter = EnvFilter::try_from_env("GLTF_BUNDLE_LOG")
    .or_else(|_| EnvFilter::try_from_default_env())
    .unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::fmt().with_env_filter(filter).init();
}

// SPDX-License-Identifier: MIT
//! GLB packing CLI
//!
//! Packs a glTF manifest and one or more binary payload files into a single
//! GLB container. The payload files are concatenated into the embedded buffer,
//! each starting on a 4-byte boundary.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use glb_writer::{
    temp_file_store, BufferWriter, FileStreamWriter, GlbResourceWriter, StagingKind, StagingStore,
    WriterConfig, GLB_BUFFER_ID,
};

#[derive(Parser)]
#[command(name = "glb-pack")]
#[command(about = "Pack a glTF manifest and binary payload into a GLB container", long_about = None)]
struct Cli {
    /// glTF JSON manifest
    #[arg(short, long)]
    manifest: PathBuf,

    /// Output URI, relative to the configured output root
    #[arg(short, long)]
    output: String,

    /// Binary payload files, embedded in order
    #[arg(short, long = "buffer")]
    buffers: Vec<PathBuf>,

    /// TOML config file (default: GLB_* environment variables)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the staging store
    #[arg(long, value_enum)]
    staging: Option<StagingKind>,

    /// Keep the manifest pretty-printed instead of compacting it
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => WriterConfig::from_toml_file(path)?,
        None => WriterConfig::from_env()?,
    };
    if let Some(staging) = cli.staging {
        config.staging = staging;
    }
    config.validate()?;

    init_tracing(config.log_json);
    info!(?config, "Configuration loaded and validated");

    let manifest = load_manifest(&cli)?;
    let streams = FileStreamWriter::new(&config.output_root);

    let builder = GlbResourceWriter::builder(streams).uri_prefix(config.uri_prefix.clone());
    match config.staging {
        StagingKind::Memory => pack(builder.build(), &cli, &manifest),
        StagingKind::TempFile => {
            let staging = temp_file_store().context("Failed to create staging temp file")?;
            pack(builder.staging(staging).build(), &cli, &manifest)
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Read the manifest and make sure it is well-formed JSON
fn load_manifest(cli: &Cli) -> Result<String> {
    let raw = fs::read_to_string(&cli.manifest)
        .with_context(|| format!("Failed to read manifest {:?}", cli.manifest))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Manifest {:?} is not valid JSON", cli.manifest))?;

    let manifest = if cli.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(manifest)
}

fn pack<S: StagingStore>(
    mut writer: GlbResourceWriter<S>,
    cli: &Cli,
    manifest: &str,
) -> Result<()> {
    for path in &cli.buffers {
        let data = fs::read(path).with_context(|| format!("Failed to read buffer {:?}", path))?;
        let view = writer.write_buffer_view_aligned(GLB_BUFFER_ID, &data, 4)?;
        info!(
            path = %path.display(),
            byte_offset = view.byte_offset,
            byte_length = view.byte_length,
            "Buffer staged"
        );
    }

    let layout = writer
        .finalize(manifest, &cli.output)
        .with_context(|| format!("Failed to write container {}", cli.output))?;

    info!(
        output = %cli.output,
        total_len = layout.total_len,
        json_chunk = layout.json_chunk_len(),
        bin_chunk = layout.bin_chunk_len(),
        "GLB container written"
    );
    Ok(())
}

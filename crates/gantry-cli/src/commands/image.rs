//! `gantry image` — store, get, and delete image metadata.

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use gantry_core::CliRender;
use gantry_store::{ImageStore, record};

pub async fn store(store: &ImageStore, key: &str, path: &Path) -> anyhow::Result<()> {
    let mut reader = File::open(path)
        .with_context(|| format!("could not read metadata file {}", path.display()))?;
    let meta = record::parse_metadata(&mut reader)?;
    store.store(key, meta).await?;
    println!("Stored {key}");
    Ok(())
}

pub async fn get(store: &ImageStore, name: &str) -> anyhow::Result<()> {
    let list = store.list(name).await?;
    list.render_cli(&mut std::io::stdout())?;
    Ok(())
}

pub async fn delete(store: &ImageStore, key: &str) -> anyhow::Result<()> {
    store.delete(key).await?;
    println!("Deleted {key}");
    Ok(())
}

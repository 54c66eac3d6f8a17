// src/main.rs
// Pack a JSON table manifest into a binary tables file.
// Usage:
//   cargo run -- manifest.json                # writes tables/lexer_tables.bin
//   cargo run -- manifest.json /path/out.bin

use std::{env, fs, io::BufWriter, path::PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use lxtables::{config::PackManifest, tables::write_tables};

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let Some(manifest_path) = args.next().map(PathBuf::from) else {
        bail!("usage: lxtables <manifest.json> [out.bin]");
    };
    let out_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tables/lexer_tables.bin"));

    let manifest = PackManifest::load(&manifest_path).map_err(|e| anyhow!(e))?;
    manifest.validate().map_err(|e| anyhow!(e))?;
    let compress = manifest.compress;
    let (header, mut records) = manifest
        .into_parts()
        .context("building tables from manifest")?;

    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let f = fs::File::create(&out_path)
        .with_context(|| format!("create {}", out_path.display()))?;

    println!(
        "[lxtables] packing {} tables for {:?} (compress={})",
        records.len(),
        header.name(),
        compress
    );
    let (_, summary) = write_tables(BufWriter::new(f), &header, &mut records, compress)
        .with_context(|| format!("write {}", out_path.display()))?;

    for r in &records {
        println!(
            "[lxtables]   {:<20} {:>8} ints x {}B",
            r.id().to_string(),
            r.element_count(),
            r.width()
        );
    }
    println!(
        "[lxtables] wrote {} bytes (header {}, section {}) → {}",
        summary.total_bytes,
        summary.header_bytes,
        summary.section_bytes,
        out_path.display()
    );
    Ok(())
}

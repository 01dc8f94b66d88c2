//! マニフェストCSVの読み書き
//!
//! 2列（相対パス, ラベル）、ヘッダーなし、改行はCRLF。

use crate::error::Result;
use openset_common::SampleRecord;
use sha2::{Digest, Sha256};
use std::path::Path;

pub fn write_manifest(path: &Path, rows: &[SampleRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_path(path)?;

    for row in rows {
        let label = row.label.to_string();
        writer.write_record([row.path.as_str(), label.as_str()])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn read_manifest(path: &Path) -> Result<Vec<SampleRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let (path, label): (String, i64) = record?;
        rows.push(SampleRecord::new(path, label));
    }
    Ok(rows)
}

/// ファイル内容のSHA-256（16進）
pub fn file_sha256(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

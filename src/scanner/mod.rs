use crate::error::{ProtocolError, Result};
use std::path::Path;
use walkdir::WalkDir;

/// 学習データのディレクトリ名
pub const TRAIN_DIR: &str = "train";
/// ILSVRC2012検証データ（本ツールではテストセットとして使用）
pub const VAL_DIR: &str = "val";

/// データセットのルートが `train/` を持つか確認
///
/// クラス集合は `train/` から得るため必須。`val/` が無い場合はtestが空になるだけ。
pub fn ensure_dataset_root(data_root: &Path) -> Result<()> {
    let dir = data_root.join(TRAIN_DIR);
    if !dir.is_dir() {
        return Err(ProtocolError::FolderNotFound(dir.display().to_string()));
    }
    Ok(())
}

/// `<data_root>/<split_dir>/<wnid>/` 直下のサンプルを列挙
///
/// 戻り値はデータセットルートからの相対パス（`train/n02113799/n02113799_78.JPEG`）で、
/// ファイル名順に並ぶ。ディレクトリが無い場合は空を返す。
pub fn list_class_samples(data_root: &Path, split_dir: &str, wnid: &str) -> Vec<String> {
    let class_dir = data_root.join(split_dir).join(wnid);
    if !class_dir.is_dir() {
        tracing::warn!(dir = %class_dir.display(), "class directory not found, skipping");
        return Vec::new();
    }

    let samples: Vec<String> = WalkDir::new(&class_dir)
        .min_depth(1)
        .max_depth(1) // 直下のみ
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| !is_hidden(name))
        .map(|name| format!("{}/{}/{}", split_dir, wnid, name))
        .collect();

    tracing::debug!(wnid, split = split_dir, count = samples.len(), "listed class samples");
    samples
}

fn is_hidden(file_name: &str) -> bool {
    file_name.starts_with('.')
}

//! マニフェスト生成の一連の処理
//!
//! 1. 階層読み込み
//! 2. クラス分割・ラベル付与
//! 3. train / val / test 分割
//! 4. CSV出力・サマリ出力

use crate::config::Config;
use crate::error::Result;
use crate::export::{self, RunSummary, WrittenFile};
use crate::partition::{self, Partition};
use crate::scanner;
use crate::split::{self, ProtocolSplits};
use openset_common::{ImageNetHierarchy, ProtocolDefinition};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub config: Config,
    /// グループ間の重複をエラーにする
    pub strict: bool,
    /// ファイルを書き出さない
    pub dry_run: bool,
    pub show_progress: bool,
}

#[derive(Debug)]
pub struct BuildReport {
    pub partition: Partition,
    pub splits: ProtocolSplits,
    pub files: Vec<WrittenFile>,
    pub summary_path: Option<PathBuf>,
}

pub fn load_hierarchy(data_root: &Path, info_root: &Path) -> Result<ImageNetHierarchy> {
    scanner::ensure_dataset_root(data_root)?;
    let hierarchy = ImageNetHierarchy::load(data_root, info_root)?;
    tracing::info!(
        nodes = hierarchy.node_count(),
        classes = hierarchy.in_wnids().len(),
        "loaded WordNet hierarchy"
    );
    Ok(hierarchy)
}

/// 分割のみ行い、グループ間の重複を検査する
pub fn check_protocol(
    definition: &ProtocolDefinition,
    hierarchy: &ImageNetHierarchy,
) -> Result<Partition> {
    let partition = partition::partition(hierarchy, definition)?;
    for overlap in partition.overlaps() {
        tracing::warn!(%overlap, "classes shared between groups");
    }
    Ok(partition)
}

pub fn build_protocol(
    definition: &ProtocolDefinition,
    hierarchy: &ImageNetHierarchy,
    options: &BuildOptions,
) -> Result<BuildReport> {
    let config = &options.config;
    config.validate()?;

    let partition = check_protocol(definition, hierarchy)?;
    if options.strict {
        partition.ensure_disjoint()?;
    }
    println!(
        "✔ 既知 {}クラス / 既知の未知 {}クラス / 未知の未知 {}クラス",
        partition.known.len(),
        partition.known_unknown.len(),
        partition.unknown_unknown.len()
    );

    let labels = partition.label_map();
    let splits = split::build_splits(
        &config.data_root,
        &partition,
        &labels,
        config.train_ratio,
        options.show_progress,
    )?;

    if options.dry_run {
        return Ok(BuildReport {
            partition,
            splits,
            files: Vec::new(),
            summary_path: None,
        });
    }

    let files = export::export_protocol(&splits, &config.output_dir, &definition.tag)?;
    let summary = RunSummary::new(
        definition,
        &partition,
        &config.data_root,
        config.train_ratio,
        files.clone(),
    );
    let summary_path = summary.write(&config.output_dir)?;

    Ok(BuildReport {
        partition,
        splits,
        files,
        summary_path: Some(summary_path),
    })
}

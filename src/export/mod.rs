pub mod manifest;
pub mod summary;

use crate::error::Result;
use crate::split::ProtocolSplits;
use openset_common::{LabelGroup, SampleRecord, Split};
use serde::Serialize;
use std::path::Path;

pub use summary::RunSummary;

/// 出力予定のマニフェスト1件
#[derive(Debug, Clone)]
pub struct ManifestPlan {
    pub file_name: String,
    /// 結合マニフェストはNone
    pub group: Option<LabelGroup>,
    pub split: Split,
    pub rows: Vec<SampleRecord>,
}

/// 書き出したファイルの記録
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    pub file_name: String,
    pub group: Option<LabelGroup>,
    pub split: Split,
    pub rows: usize,
    pub sha256: String,
}

/// `train_kkp1.csv` 形式
pub fn group_file_name(split: Split, group: LabelGroup, tag: &str) -> String {
    format!("{}_{}{}.csv", split, group.code(), tag)
}

/// `train_p1.csv` 形式
pub fn merged_file_name(split: Split, tag: &str) -> String {
    format!("{}_{}.csv", split, tag)
}

/// 出力するマニフェストの一覧（書き出し順）
pub fn plan_manifests(splits: &ProtocolSplits, tag: &str) -> Vec<ManifestPlan> {
    let mut plans = Vec::new();

    let group_plan = |group: LabelGroup, split: Split| ManifestPlan {
        file_name: group_file_name(split, group, tag),
        group: Some(group),
        split,
        rows: splits.get(group).rows(split).to_vec(),
    };

    // グループ別 train / val
    for group in [LabelGroup::Known, LabelGroup::KnownUnknown] {
        plans.push(group_plan(group, Split::Train));
        plans.push(group_plan(group, Split::Val));
    }
    // グループ別 test
    for group in LabelGroup::ALL {
        plans.push(group_plan(group, Split::Test));
    }
    // 結合
    for split in Split::ALL {
        plans.push(ManifestPlan {
            file_name: merged_file_name(split, tag),
            group: None,
            split,
            rows: splits.merged(split),
        });
    }

    plans
}

/// 全マニフェストを書き出す
pub fn export_protocol(
    splits: &ProtocolSplits,
    output_dir: &Path,
    tag: &str,
) -> Result<Vec<WrittenFile>> {
    std::fs::create_dir_all(output_dir)?;

    let mut written = Vec::new();
    for plan in plan_manifests(splits, tag) {
        let path = output_dir.join(&plan.file_name);
        manifest::write_manifest(&path, &plan.rows)?;
        let sha256 = manifest::file_sha256(&path)?;

        tracing::info!(file = %path.display(), rows = plan.rows.len(), "wrote manifest");
        println!("✔ {} ({}行)", plan.file_name, plan.rows.len());

        written.push(WrittenFile {
            file_name: plan.file_name,
            group: plan.group,
            split: plan.split,
            rows: plan.rows.len(),
            sha256,
        });
    }

    Ok(written)
}

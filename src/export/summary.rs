//! 実行サマリ（summary_<tag>.json）

use super::WrittenFile;
use crate::error::Result;
use crate::partition::Partition;
use openset_common::{LabelGroup, ProtocolDefinition};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct KnownClass {
    pub label: i64,
    pub wnid: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupCounts {
    pub known: usize,
    pub known_unknown: usize,
    pub unknown_unknown: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub protocol_tag: String,
    pub protocol_name: String,
    /// 生成日時（RFC 3339）
    pub generated_at: String,
    pub data_root: String,
    pub train_ratio: f64,
    pub classes: GroupCounts,
    pub known_classes: Vec<KnownClass>,
    pub known_unknown_classes: Vec<String>,
    pub unknown_unknown_classes: Vec<String>,
    pub overlaps: Vec<String>,
    pub files: Vec<WrittenFile>,
}

impl RunSummary {
    pub fn new(
        definition: &ProtocolDefinition,
        partition: &Partition,
        data_root: &Path,
        train_ratio: f64,
        files: Vec<WrittenFile>,
    ) -> Self {
        let wnids = |group: LabelGroup| -> Vec<String> {
            partition.get(group).wnids().map(|w| w.to_string()).collect()
        };

        Self {
            protocol_tag: definition.tag.clone(),
            protocol_name: definition.name.clone(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            data_root: data_root.display().to_string(),
            train_ratio,
            classes: GroupCounts {
                known: partition.known.len(),
                known_unknown: partition.known_unknown.len(),
                unknown_unknown: partition.unknown_unknown.len(),
            },
            known_classes: partition
                .known
                .classes()
                .iter()
                .enumerate()
                .map(|(idx, c)| KnownClass {
                    label: idx as i64,
                    wnid: c.wnid.clone(),
                    name: c.name.clone(),
                })
                .collect(),
            known_unknown_classes: wnids(LabelGroup::KnownUnknown),
            unknown_unknown_classes: wnids(LabelGroup::UnknownUnknown),
            overlaps: partition.overlaps().iter().map(|o| o.to_string()).collect(),
            files,
        }
    }

    pub fn file_name(tag: &str) -> String {
        format!("summary_{}.json", tag)
    }

    pub fn write(&self, output_dir: &Path) -> Result<std::path::PathBuf> {
        let path = output_dir.join(Self::file_name(&self.protocol_tag));
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

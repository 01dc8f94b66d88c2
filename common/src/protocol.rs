//! プロトコル定義
//!
//! 各ラベルグループの根となるWordNet IDを保持する。
//! 組み込みのProtocol 1のほか、JSONファイルから読み込んだ定義も扱う。

use crate::error::Result;
use crate::types::LabelGroup;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// オープンセット評価プロトコルの定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolDefinition {
    /// 出力ファイル名に使う識別子（例: `p1`）
    pub tag: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub known_roots: Vec<String>,
    pub known_unknown_roots: Vec<String>,
    pub unknown_unknown_roots: Vec<String>,
}

impl ProtocolDefinition {
    /// Protocol 1: 犬 / 四足動物 / 動物以外
    pub fn protocol1() -> Self {
        Self {
            tag: "p1".into(),
            name: "Protocol 1".into(),
            description: "known: all dog classes; known-unknown: some 4-legged animals; \
                          unknown-unknown: some non-animal classes"
                .into(),
            // dog
            known_roots: vec!["n02084071".into()],
            // fox, wild dog, wolf, feline, bear, musteline mammal, ungulate, primate
            known_unknown_roots: [
                "n02118333", "n02115335", "n02114100", "n02120997", "n02131653", "n02441326",
                "n02370806", "n02469914",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            // food, motor vehicle, device
            unknown_unknown_roots: ["n07555863", "n03791235", "n03183080"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// JSONファイルから読み込み
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// グループの根リスト
    pub fn roots(&self, group: LabelGroup) -> &[String] {
        match group {
            LabelGroup::Known => &self.known_roots,
            LabelGroup::KnownUnknown => &self.known_unknown_roots,
            LabelGroup::UnknownUnknown => &self.unknown_unknown_roots,
        }
    }
}

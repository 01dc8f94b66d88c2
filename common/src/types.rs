//! プロトコル共通の型定義
//!
//! - LabelGroup: 既知 / 既知の未知 / 未知の未知
//! - Split: train / val / test
//! - SampleRecord: マニフェストの1行（相対パス, ラベル）

use serde::{Deserialize, Serialize};

/// 既知の未知クラスに付与するラベル
pub const KNOWN_UNKNOWN_LABEL: i64 = -1;
/// 未知の未知クラスに付与するラベル
pub const UNKNOWN_UNKNOWN_LABEL: i64 = -2;

/// ラベルグループ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelGroup {
    /// 学習対象の既知クラス
    Known,
    /// 学習時に負例として見せる近傍クラス
    KnownUnknown,
    /// テスト時にのみ現れるクラス
    UnknownUnknown,
}

impl LabelGroup {
    pub const ALL: [LabelGroup; 3] = [
        LabelGroup::Known,
        LabelGroup::KnownUnknown,
        LabelGroup::UnknownUnknown,
    ];

    /// ファイル名に埋め込む短縮コード
    pub fn code(&self) -> &'static str {
        match self {
            LabelGroup::Known => "kk",
            LabelGroup::KnownUnknown => "ku",
            LabelGroup::UnknownUnknown => "uu",
        }
    }

    /// 負のセンチネルラベル（既知クラスはクラスごとに決まるのでNone）
    pub fn sentinel_label(&self) -> Option<i64> {
        match self {
            LabelGroup::Known => None,
            LabelGroup::KnownUnknown => Some(KNOWN_UNKNOWN_LABEL),
            LabelGroup::UnknownUnknown => Some(UNKNOWN_UNKNOWN_LABEL),
        }
    }

    /// train/valに含めるグループか
    pub fn in_training(&self) -> bool {
        !matches!(self, LabelGroup::UnknownUnknown)
    }
}

impl std::fmt::Display for LabelGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelGroup::Known => write!(f, "known"),
            LabelGroup::KnownUnknown => write!(f, "known-unknown"),
            LabelGroup::UnknownUnknown => write!(f, "unknown-unknown"),
        }
    }
}

/// データ分割
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// マニフェストの1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// データセットルートからの相対パス（区切りは常に `/`）
    pub path: String,
    pub label: i64,
}

impl SampleRecord {
    pub fn new(path: impl Into<String>, label: i64) -> Self {
        Self {
            path: path.into(),
            label,
        }
    }
}

//! プロトコル定義の選択と検証

use crate::error::{ProtocolError, Result};
use openset_common::{LabelGroup, ProtocolDefinition};
use regex::Regex;
use std::path::PathBuf;

/// `--protocol` 引数: 組み込み名またはJSONファイル
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtocolSource {
    Builtin(u8),
    File(PathBuf),
}

impl std::str::FromStr for ProtocolSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "p1" => Ok(ProtocolSource::Builtin(1)),
            _ if s.ends_with(".json") => Ok(ProtocolSource::File(PathBuf::from(s))),
            _ => Err(format!(
                "Unknown protocol: {}. Use p1 or a path to a JSON definition",
                s
            )),
        }
    }
}

impl ProtocolSource {
    /// 定義を解決して検証する
    pub fn resolve(&self) -> Result<ProtocolDefinition> {
        let definition = match self {
            ProtocolSource::Builtin(_) => ProtocolDefinition::protocol1(),
            ProtocolSource::File(path) => {
                if !path.exists() {
                    return Err(ProtocolError::FileNotFound(path.display().to_string()));
                }
                ProtocolDefinition::from_json_file(path)?
            }
        };
        validate(&definition)?;
        Ok(definition)
    }
}

pub fn is_wnid(s: &str) -> bool {
    lazy_static::lazy_static! {
        static ref WNID_RE: Regex = Regex::new(r"^n\d{8}$").unwrap();
    }
    WNID_RE.is_match(s)
}

/// タグ・根IDの形式を検証
pub fn validate(definition: &ProtocolDefinition) -> Result<()> {
    lazy_static::lazy_static! {
        static ref TAG_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
    }

    if !TAG_RE.is_match(&definition.tag) {
        return Err(ProtocolError::InvalidProtocol(format!(
            "タグにはファイル名に使える英数字を指定してください: `{}`",
            definition.tag
        )));
    }

    if definition.roots(LabelGroup::Known).is_empty() {
        return Err(ProtocolError::InvalidProtocol(
            "既知クラスの根が指定されていません".into(),
        ));
    }

    for group in LabelGroup::ALL {
        if let Some(bad) = definition.roots(group).iter().find(|w| !is_wnid(w)) {
            return Err(ProtocolError::InvalidWnid(bad.clone()));
        }
    }

    Ok(())
}

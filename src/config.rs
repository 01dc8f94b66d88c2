use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_DATA_ROOT: &str = "/local/scratch/datasets/ImageNet/ILSVRC2012";
pub const DEFAULT_TRAIN_RATIO: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// ILSVRC2012のルート（`train/` と `val/` を含む）
    pub data_root: PathBuf,
    /// 階層ファイル（wordnet.is_a.txt 等）の場所
    pub info_root: PathBuf,
    pub output_dir: PathBuf,
    pub train_ratio: f64,
}

impl Default for Config {
    fn default() -> Self {
        let data_root = PathBuf::from(DEFAULT_DATA_ROOT);
        Self {
            info_root: data_root.join("robustness"),
            data_root,
            output_dir: PathBuf::from("data"),
            train_ratio: DEFAULT_TRAIN_RATIO,
        }
    }
}

/// コマンドラインで上書きされた設定
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_root: Option<PathBuf>,
    pub info_root: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub train_ratio: Option<f64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ProtocolError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("openset-proto").join("config.json"))
    }

    /// CLI引数を適用した設定を返す
    pub fn with_overrides(&self, overrides: &Overrides) -> Self {
        Self {
            data_root: overrides.data_root.clone().unwrap_or_else(|| self.data_root.clone()),
            info_root: overrides.info_root.clone().unwrap_or_else(|| self.info_root.clone()),
            output_dir: overrides.output_dir.clone().unwrap_or_else(|| self.output_dir.clone()),
            train_ratio: overrides.train_ratio.unwrap_or(self.train_ratio),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_ratio(self.train_ratio)
    }
}

/// `0 < ratio <= 1` を満たすか
pub fn validate_ratio(ratio: f64) -> Result<()> {
    if ratio > 0.0 && ratio <= 1.0 {
        Ok(())
    } else {
        Err(ProtocolError::InvalidRatio(ratio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.train_ratio, 0.8);
        assert!(config.info_root.ends_with("robustness"));
        assert!(config.info_root.starts_with(&config.data_root));
    }

    #[test]
    fn test_overrides() {
        let config = Config::default();
        let merged = config.with_overrides(&Overrides {
            data_root: Some(PathBuf::from("/tmp/in")),
            train_ratio: Some(0.5),
            ..Default::default()
        });
        assert_eq!(merged.data_root, PathBuf::from("/tmp/in"));
        assert_eq!(merged.info_root, config.info_root);
        assert_eq!(merged.output_dir, config.output_dir);
        assert_eq!(merged.train_ratio, 0.5);
    }

    #[test]
    fn test_validate_ratio() {
        assert!(validate_ratio(0.8).is_ok());
        assert!(validate_ratio(1.0).is_ok());
        assert!(matches!(validate_ratio(0.0), Err(ProtocolError::InvalidRatio(_))));
        assert!(validate_ratio(1.5).is_err());
        assert!(validate_ratio(f64::NAN).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join("openset-proto-config-test");
        let path = dir.join("config.json");
        let config = Config {
            output_dir: PathBuf::from("out"),
            train_ratio: 0.7,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let dir = std::env::temp_dir().join("openset-proto-config-partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"train_ratio": 0.9}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.train_ratio, 0.9);
        assert_eq!(loaded.output_dir, PathBuf::from("data"));

        std::fs::remove_dir_all(&dir).ok();
    }
}

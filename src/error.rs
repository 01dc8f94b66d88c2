use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("WordNet IDの形式が不正: {0}")]
    InvalidWnid(String),

    #[error("WordNet階層に存在しないID: {0}")]
    UnknownWnid(String),

    #[error("プロトコル定義が不正: {0}")]
    InvalidProtocol(String),

    #[error("学習データ比率が不正: {0}（0より大きく1以下で指定してください）")]
    InvalidRatio(f64),

    #[error("グループ間でクラスが重複しています: {0}")]
    GroupOverlap(String),

    #[error("CSV出力エラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] openset_common::Error),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

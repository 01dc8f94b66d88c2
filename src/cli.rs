use crate::config::Overrides;
use crate::protocol::ProtocolSource;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "openset-proto")]
#[command(about = "ImageNetオープンセット評価プロトコルのマニフェスト生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// データセットと階層ファイルの場所
#[derive(Args, Clone, Debug, Default)]
pub struct DatasetArgs {
    /// ILSVRC2012のルート（train/ と val/ を含む）
    #[arg(long)]
    pub data_root: Option<PathBuf>,

    /// wordnet.is_a.txt / words.txt / imagenet_class_index.json のディレクトリ
    #[arg(long)]
    pub info_root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// プロトコルのCSVを生成
    Build {
        /// プロトコル (p1 またはJSON定義ファイル)
        #[arg(short, long, default_value = "p1")]
        protocol: ProtocolSource,

        #[command(flatten)]
        dataset: DatasetArgs,

        /// 出力ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 学習画像のうちtrainに使う比率（残りはval）
        #[arg(long)]
        train_ratio: Option<f64>,

        /// グループ間でクラスが重複していたらエラー
        #[arg(long)]
        strict: bool,

        /// ドライラン（ファイルを書き出さず件数のみ表示）
        #[arg(long)]
        dry_run: bool,
    },

    /// グループ分割と重複のみ検査
    Check {
        /// プロトコル (p1 またはJSON定義ファイル)
        #[arg(short, long, default_value = "p1")]
        protocol: ProtocolSource,

        #[command(flatten)]
        dataset: DatasetArgs,
    },

    /// WordNet階層を調べる
    Inspect {
        /// 配下のImageNetクラスを表示するWordNet ID
        wnid: Option<String>,

        /// 名称で検索
        #[arg(short, long)]
        search: Option<String>,

        /// 子孫数の多いノードを上位N件表示
        #[arg(short, long, default_value = "20")]
        top: usize,

        #[command(flatten)]
        dataset: DatasetArgs,
    },

    /// 設定を表示/編集
    Config {
        #[arg(long)]
        set_data_root: Option<PathBuf>,

        #[arg(long)]
        set_info_root: Option<PathBuf>,

        #[arg(long)]
        set_output_dir: Option<PathBuf>,

        #[arg(long)]
        set_train_ratio: Option<f64>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

impl DatasetArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            data_root: self.data_root.clone(),
            info_root: self.info_root.clone(),
            ..Default::default()
        }
    }
}

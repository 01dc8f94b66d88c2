use clap::Parser;
use openset_protocols::{cli, config, error, pipeline, protocol};
use cli::{Cli, Commands};
use config::{Config, Overrides};
use error::{ProtocolError, Result};
use openset_common::ImageNetHierarchy;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Build { protocol, dataset, output, train_ratio, strict, dry_run } => {
            println!("🐕 openset-proto - マニフェスト生成\n");

            let definition = protocol.resolve()?;
            let config = config.with_overrides(&Overrides {
                output_dir: output,
                train_ratio,
                ..dataset.overrides()
            });
            config.validate()?;

            println!("[1/3] WordNet階層を読み込み中...");
            let hierarchy = pipeline::load_hierarchy(&config.data_root, &config.info_root)?;
            println!("✔ {}ノード / {}クラス\n", hierarchy.node_count(), hierarchy.in_wnids().len());

            println!("[2/3] {}のクラスを分割中...", definition.name);
            let options = pipeline::BuildOptions {
                config: config.clone(),
                strict,
                dry_run,
                show_progress: !cli.verbose,
            };
            let report = pipeline::build_protocol(&definition, &hierarchy, &options)?;

            println!("\n[3/3] 件数");
            for group in openset_common::LabelGroup::ALL {
                let g = report.splits.get(group);
                println!(
                    "  {:<16} train {:>7} / val {:>7} / test {:>7}",
                    group.to_string(),
                    g.train.len(),
                    g.val.len(),
                    g.test.len()
                );
            }

            if dry_run {
                println!("\n(ドライラン: ファイルは書き出していません)");
            } else if let Some(summary) = report.summary_path {
                println!("\n✔ {}ファイルを出力: {}", report.files.len(), config.output_dir.display());
                println!("✔ サマリ: {}", summary.display());
            }

            println!("\n✅ 完了");
        }

        Commands::Check { protocol, dataset } => {
            let definition = protocol.resolve()?;
            let config = config.with_overrides(&dataset.overrides());
            let hierarchy = pipeline::load_hierarchy(&config.data_root, &config.info_root)?;
            let partition = pipeline::check_protocol(&definition, &hierarchy)?;

            println!("{} ({})", definition.name, definition.tag);
            println!("  既知:         {}クラス", partition.known.len());
            println!("  既知の未知:   {}クラス", partition.known_unknown.len());
            println!("  未知の未知:   {}クラス", partition.unknown_unknown.len());

            let overlaps = partition.overlaps();
            if overlaps.is_empty() {
                println!("✔ グループ間の重複なし");
            } else {
                for overlap in &overlaps {
                    println!("✖ {}", overlap);
                }
                partition.ensure_disjoint()?;
            }
        }

        Commands::Inspect { wnid, search, top, dataset } => {
            let config = config.with_overrides(&dataset.overrides());
            let hierarchy = pipeline::load_hierarchy(&config.data_root, &config.info_root)?;
            inspect(&hierarchy, wnid.as_deref(), search.as_deref(), top)?;
        }

        Commands::Config { set_data_root, set_info_root, set_output_dir, set_train_ratio, show } => {
            let mut config = config;
            let mut changed = false;

            if let Some(path) = set_data_root {
                config.data_root = path;
                changed = true;
            }
            if let Some(path) = set_info_root {
                config.info_root = path;
                changed = true;
            }
            if let Some(path) = set_output_dir {
                config.output_dir = path;
                changed = true;
            }
            if let Some(ratio) = set_train_ratio {
                config::validate_ratio(ratio)?;
                config.train_ratio = ratio;
                changed = true;
            }

            if changed {
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                println!("設定:");
                println!("  データルート: {}", config.data_root.display());
                println!("  階層ファイル: {}", config.info_root.display());
                println!("  出力先: {}", config.output_dir.display());
                println!("  train比率: {}", config.train_ratio);
            }
        }
    }

    Ok(())
}

fn inspect(
    hierarchy: &ImageNetHierarchy,
    wnid: Option<&str>,
    search: Option<&str>,
    top: usize,
) -> Result<()> {
    if let Some(query) = search {
        for (wnid, name) in hierarchy.search(query) {
            let mark = if hierarchy.is_imagenet_class(wnid) { "*" } else { " " };
            println!("{} {}  {}", mark, wnid, name);
        }
        return Ok(());
    }

    if let Some(wnid) = wnid {
        if !protocol::is_wnid(wnid) {
            return Err(ProtocolError::InvalidWnid(wnid.to_string()));
        }
        let classes = hierarchy
            .imagenet_descendants(wnid)
            .ok_or_else(|| ProtocolError::UnknownWnid(wnid.to_string()))?;

        println!("{} {}", wnid, hierarchy.name(wnid).unwrap_or(""));
        for class in &classes {
            println!(
                "  {:>4}  {}  {}",
                hierarchy
                    .class_number(class)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "-".into()),
                class,
                hierarchy.name(class).unwrap_or("")
            );
        }
        println!("✔ ImageNetクラス {}件", classes.len());
        return Ok(());
    }

    // 子孫数の多い順
    println!("{:<10} {:>8} {:>8}  名称", "wnid", "ImageNet", "全体");
    for stats in hierarchy.wnid_sorted().into_iter().take(top) {
        println!(
            "{:<10} {:>8} {:>8}  {}",
            stats.wnid,
            stats.descendants_in_imagenet,
            stats.descendants_total,
            hierarchy.name(&stats.wnid).unwrap_or("")
        );
    }
    Ok(())
}

//! train / val / test 分割
//!
//! 学習画像はクラスごとにファイル名順で先頭 `floor(n * ratio)` 枚をtrain、
//! 残りをvalとする（シャッフルなし）。ILSVRC2012の検証画像はすべてtestに入る。
//! 未知の未知クラスはtestのみ。

use crate::error::{ProtocolError, Result};
use crate::partition::{LabelMap, Partition};
use crate::scanner::{self, TRAIN_DIR, VAL_DIR};
use indicatif::{ProgressBar, ProgressStyle};
use openset_common::{LabelGroup, SampleRecord, Split};
use std::path::Path;

/// 1グループ分の分割結果
#[derive(Debug, Clone)]
pub struct GroupSplits {
    pub group: LabelGroup,
    pub train: Vec<SampleRecord>,
    pub val: Vec<SampleRecord>,
    pub test: Vec<SampleRecord>,
}

impl GroupSplits {
    fn new(group: LabelGroup) -> Self {
        Self {
            group,
            train: Vec::new(),
            val: Vec::new(),
            test: Vec::new(),
        }
    }

    pub fn rows(&self, split: Split) -> &[SampleRecord] {
        match split {
            Split::Train => &self.train,
            Split::Val => &self.val,
            Split::Test => &self.test,
        }
    }

    /// このグループが出力するsplit（未知の未知はtestのみ）
    pub fn splits(&self) -> &'static [Split] {
        if self.group.in_training() {
            &Split::ALL
        } else {
            &[Split::Test]
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProtocolSplits {
    pub known: GroupSplits,
    pub known_unknown: GroupSplits,
    pub unknown_unknown: GroupSplits,
}

impl ProtocolSplits {
    pub fn get(&self, group: LabelGroup) -> &GroupSplits {
        match group {
            LabelGroup::Known => &self.known,
            LabelGroup::KnownUnknown => &self.known_unknown,
            LabelGroup::UnknownUnknown => &self.unknown_unknown,
        }
    }

    fn get_mut(&mut self, group: LabelGroup) -> &mut GroupSplits {
        match group {
            LabelGroup::Known => &mut self.known,
            LabelGroup::KnownUnknown => &mut self.known_unknown,
            LabelGroup::UnknownUnknown => &mut self.unknown_unknown,
        }
    }

    /// 結合マニフェスト（既知 → 既知の未知 → 未知の未知の順）
    pub fn merged(&self, split: Split) -> Vec<SampleRecord> {
        LabelGroup::ALL
            .iter()
            .map(|g| self.get(*g))
            .filter(|g| g.splits().contains(&split))
            .flat_map(|g| g.rows(split).iter().cloned())
            .collect()
    }
}

/// trainに回す枚数
pub fn train_count(total: usize, ratio: f64) -> usize {
    (total as f64 * ratio) as usize
}

/// 先頭 `train_count` 件をtrain、残りをvalに分ける
pub fn split_at_ratio(
    rows: Vec<SampleRecord>,
    ratio: f64,
) -> (Vec<SampleRecord>, Vec<SampleRecord>) {
    let cut = train_count(rows.len(), ratio);
    let mut train = rows;
    let val = train.split_off(cut);
    (train, val)
}

fn to_records(paths: Vec<String>, label: i64) -> Vec<SampleRecord> {
    paths
        .into_iter()
        .map(|path| SampleRecord::new(path, label))
        .collect()
}

fn progress_bar(total: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::with_template("  {bar:40.cyan/blue} {pos}/{len} {msg}") {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

/// 全グループの分割を構築
pub fn build_splits(
    data_root: &Path,
    partition: &Partition,
    labels: &LabelMap,
    ratio: f64,
    show_progress: bool,
) -> Result<ProtocolSplits> {
    crate::config::validate_ratio(ratio)?;

    let mut splits = ProtocolSplits {
        known: GroupSplits::new(LabelGroup::Known),
        known_unknown: GroupSplits::new(LabelGroup::KnownUnknown),
        unknown_unknown: GroupSplits::new(LabelGroup::UnknownUnknown),
    };

    let total: usize = LabelGroup::ALL.iter().map(|g| partition.get(*g).len()).sum();
    let pb = progress_bar(total, show_progress);

    for group in LabelGroup::ALL {
        let target = splits.get_mut(group);

        for wnid in partition.get(group).wnids() {
            pb.set_message(format!("{} {}", group.code(), wnid));

            let label = labels
                .label(group, wnid)
                .ok_or_else(|| ProtocolError::UnknownWnid(wnid.to_string()))?;

            if group.in_training() {
                let rows = to_records(scanner::list_class_samples(data_root, TRAIN_DIR, wnid), label);
                let (train, val) = split_at_ratio(rows, ratio);
                tracing::debug!(wnid, train = train.len(), val = val.len(), "split training samples");
                target.train.extend(train);
                target.val.extend(val);
            }

            target
                .test
                .extend(to_records(scanner::list_class_samples(data_root, VAL_DIR, wnid), label));

            pb.inc(1);
        }

        tracing::info!(
            group = %group,
            train = target.train.len(),
            val = target.val.len(),
            test = target.test.len(),
            "group samples collected"
        );
    }

    pb.finish_and_clear();
    Ok(splits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize, label: i64) -> Vec<SampleRecord> {
        (0..n)
            .map(|i| SampleRecord::new(format!("train/n00000001/{:04}.JPEG", i), label))
            .collect()
    }

    #[test]
    fn test_train_count_floor() {
        assert_eq!(train_count(1000, 0.8), 800);
        assert_eq!(train_count(1300, 0.8), 1040);
        assert_eq!(train_count(7, 0.8), 5);
        assert_eq!(train_count(1, 0.8), 0);
        assert_eq!(train_count(0, 0.8), 0);
        assert_eq!(train_count(9, 1.0), 9);
    }

    #[test]
    fn test_split_is_positional() {
        let (train, val) = split_at_ratio(rows(10, 3), 0.8);
        assert_eq!(train.len(), 8);
        assert_eq!(val.len(), 2);
        assert_eq!(train[0].path, "train/n00000001/0000.JPEG");
        assert_eq!(val[0].path, "train/n00000001/0008.JPEG");
        assert!(train.iter().chain(val.iter()).all(|r| r.label == 3));
    }

    #[test]
    fn test_merged_order_and_uu_test_only() {
        let mut splits = ProtocolSplits {
            known: GroupSplits::new(LabelGroup::Known),
            known_unknown: GroupSplits::new(LabelGroup::KnownUnknown),
            unknown_unknown: GroupSplits::new(LabelGroup::UnknownUnknown),
        };
        splits.known.train = rows(2, 0);
        splits.known.test = rows(1, 0);
        splits.known_unknown.train = rows(1, -1);
        splits.known_unknown.test = rows(1, -1);
        splits.unknown_unknown.test = rows(3, -2);

        let train = splits.merged(Split::Train);
        assert_eq!(train.iter().map(|r| r.label).collect::<Vec<_>>(), vec![0, 0, -1]);

        let test = splits.merged(Split::Test);
        assert_eq!(test.len(), 5);
        assert_eq!(test.last().map(|r| r.label), Some(-2));

        assert_eq!(splits.unknown_unknown.splits(), &[Split::Test]);
        assert_eq!(splits.known.splits().len(), 3);
    }
}

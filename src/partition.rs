//! クラス分割モジュール
//!
//! プロトコル定義の根IDをWordNet階層で展開し、ImageNetクラスを
//! 3つのラベルグループに振り分ける。

use crate::error::{ProtocolError, Result};
use openset_common::{ImageNetHierarchy, LabelGroup, ProtocolDefinition};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// グループに属する1クラス
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassEntry {
    pub wnid: String,
    pub name: String,
}

/// 挿入順を保持するクラス集合
#[derive(Debug, Clone)]
pub struct ClassGroup {
    pub group: LabelGroup,
    classes: Vec<ClassEntry>,
    members: HashSet<String>,
}

impl ClassGroup {
    pub fn new(group: LabelGroup) -> Self {
        Self {
            group,
            classes: Vec::new(),
            members: HashSet::new(),
        }
    }

    /// 追加（既にあれば最初の位置のまま）
    pub fn insert(&mut self, wnid: &str, name: &str) -> bool {
        if !self.members.insert(wnid.to_string()) {
            return false;
        }
        self.classes.push(ClassEntry {
            wnid: wnid.to_string(),
            name: name.to_string(),
        });
        true
    }

    pub fn contains(&self, wnid: &str) -> bool {
        self.members.contains(wnid)
    }

    pub fn classes(&self) -> &[ClassEntry] {
        &self.classes
    }

    pub fn wnids(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.wnid.as_str())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// 2グループ間の重複
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
    pub first: LabelGroup,
    pub second: LabelGroup,
    pub wnids: Vec<String>,
}

impl std::fmt::Display for Overlap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}: {}", self.first, self.second, self.wnids.join(", "))
    }
}

#[derive(Debug, Clone)]
pub struct Partition {
    pub known: ClassGroup,
    pub known_unknown: ClassGroup,
    pub unknown_unknown: ClassGroup,
}

impl Partition {
    pub fn get(&self, group: LabelGroup) -> &ClassGroup {
        match group {
            LabelGroup::Known => &self.known,
            LabelGroup::KnownUnknown => &self.known_unknown,
            LabelGroup::UnknownUnknown => &self.unknown_unknown,
        }
    }

    fn get_mut(&mut self, group: LabelGroup) -> &mut ClassGroup {
        match group {
            LabelGroup::Known => &mut self.known,
            LabelGroup::KnownUnknown => &mut self.known_unknown,
            LabelGroup::UnknownUnknown => &mut self.unknown_unknown,
        }
    }

    /// グループ間で共有されているクラス（空のペアは含まない）
    pub fn overlaps(&self) -> Vec<Overlap> {
        let pairs = [
            (LabelGroup::Known, LabelGroup::KnownUnknown),
            (LabelGroup::Known, LabelGroup::UnknownUnknown),
            (LabelGroup::KnownUnknown, LabelGroup::UnknownUnknown),
        ];

        pairs
            .into_iter()
            .filter_map(|(first, second)| {
                let other = self.get(second);
                let wnids: Vec<String> = self
                    .get(first)
                    .wnids()
                    .filter(|w| other.contains(w))
                    .map(|w| w.to_string())
                    .collect();
                (!wnids.is_empty()).then_some(Overlap {
                    first,
                    second,
                    wnids,
                })
            })
            .collect()
    }

    /// 重複があればエラー
    pub fn ensure_disjoint(&self) -> Result<()> {
        let overlaps = self.overlaps();
        if overlaps.is_empty() {
            return Ok(());
        }
        let detail: Vec<String> = overlaps.iter().map(|o| o.to_string()).collect();
        Err(ProtocolError::GroupOverlap(detail.join("; ")))
    }

    pub fn label_map(&self) -> LabelMap {
        LabelMap::from_known(&self.known)
    }
}

/// 定義の根を展開してグループを構築する
///
/// グループ間の重複はここでは解消しない（`overlaps` で確認する）。
pub fn partition(
    hierarchy: &ImageNetHierarchy,
    definition: &ProtocolDefinition,
) -> Result<Partition> {
    let mut partition = Partition {
        known: ClassGroup::new(LabelGroup::Known),
        known_unknown: ClassGroup::new(LabelGroup::KnownUnknown),
        unknown_unknown: ClassGroup::new(LabelGroup::UnknownUnknown),
    };

    for group in LabelGroup::ALL {
        for root in definition.roots(group) {
            let descendants = hierarchy
                .imagenet_descendants(root)
                .ok_or_else(|| ProtocolError::UnknownWnid(root.clone()))?;

            tracing::debug!(
                group = %group,
                root = root.as_str(),
                root_name = hierarchy.name(root).unwrap_or(""),
                classes = descendants.len(),
                "expanded root"
            );

            let target = partition.get_mut(group);
            for wnid in descendants {
                let name = hierarchy.name(wnid).unwrap_or(wnid);
                target.insert(wnid, name);
            }
        }
    }

    Ok(partition)
}

/// 既知クラスの整数ラベル（0..K、グループ内の挿入順）
#[derive(Debug, Clone, Default)]
pub struct LabelMap {
    known: HashMap<String, i64>,
}

impl LabelMap {
    pub fn from_known(known: &ClassGroup) -> Self {
        let known = known
            .wnids()
            .enumerate()
            .map(|(idx, wnid)| (wnid.to_string(), idx as i64))
            .collect();
        Self { known }
    }

    /// グループとクラスに対応するラベル
    pub fn label(&self, group: LabelGroup, wnid: &str) -> Option<i64> {
        match group.sentinel_label() {
            Some(label) => Some(label),
            None => self.known.get(wnid).copied(),
        }
    }

    pub fn num_known(&self) -> usize {
        self.known.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // mammal ─┬─ dog ─┬─ poodle*, beagle*
    //         ├─ fox ── red_fox*
    //         └─ cat*
    // food ── pizza*
    const IS_A: &str = "\
n10000000 n10000001
n10000001 n10000011
n10000001 n10000012
n10000000 n10000002
n10000002 n10000021
n10000000 n10000003
n20000000 n20000001
";

    const WORDS: &str = "\
n10000000\tmammal
n10000001\tdog
n10000011\tpoodle
n10000012\tbeagle
n10000002\tfox
n10000021\tred fox
n10000003\tcat
n20000000\tfood
n20000001\tpizza
";

    fn hierarchy() -> ImageNetHierarchy {
        ImageNetHierarchy::from_parts(
            ["n10000011", "n10000012", "n10000021", "n10000003", "n20000001"],
            IS_A,
            WORDS,
            "{}",
        )
        .unwrap()
    }

    fn definition(known: &[&str], ku: &[&str], uu: &[&str]) -> ProtocolDefinition {
        let owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect();
        ProtocolDefinition {
            tag: "t".into(),
            name: "test".into(),
            description: String::new(),
            known_roots: owned(known),
            known_unknown_roots: owned(ku),
            unknown_unknown_roots: owned(uu),
        }
    }

    #[test]
    fn test_partition_groups() {
        let def = definition(&["n10000001"], &["n10000002"], &["n20000000"]);
        let p = partition(&hierarchy(), &def).unwrap();

        assert_eq!(p.known.wnids().collect::<Vec<_>>(), vec!["n10000011", "n10000012"]);
        assert_eq!(p.known.classes()[0].name, "poodle");
        assert_eq!(p.known_unknown.wnids().collect::<Vec<_>>(), vec!["n10000021"]);
        assert_eq!(p.unknown_unknown.wnids().collect::<Vec<_>>(), vec!["n20000001"]);
        assert!(p.overlaps().is_empty());
        assert!(p.ensure_disjoint().is_ok());
    }

    #[test]
    fn test_duplicate_within_group_keeps_first_position() {
        // mammal expands to dog subtree too; dog again must not duplicate
        let def = definition(&["n10000001", "n10000000"], &[], &[]);
        let p = partition(&hierarchy(), &def).unwrap();

        assert_eq!(
            p.known.wnids().collect::<Vec<_>>(),
            vec!["n10000011", "n10000012", "n10000003", "n10000021"]
        );
    }

    #[test]
    fn test_overlap_across_groups_is_kept_and_reported() {
        let def = definition(&["n10000001"], &["n10000000"], &[]);
        let p = partition(&hierarchy(), &def).unwrap();

        assert!(p.known.contains("n10000011"));
        assert!(p.known_unknown.contains("n10000011"));

        let overlaps = p.overlaps();
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].first, LabelGroup::Known);
        assert_eq!(overlaps[0].second, LabelGroup::KnownUnknown);
        assert_eq!(overlaps[0].wnids, vec!["n10000011", "n10000012"]);
        assert!(matches!(p.ensure_disjoint(), Err(ProtocolError::GroupOverlap(_))));
    }

    #[test]
    fn test_unknown_root() {
        let def = definition(&["n99999999"], &[], &[]);
        let result = partition(&hierarchy(), &def);
        assert!(matches!(result, Err(ProtocolError::UnknownWnid(w)) if w == "n99999999"));
    }

    #[test]
    fn test_label_map() {
        let def = definition(&["n10000001"], &["n10000002"], &["n20000000"]);
        let p = partition(&hierarchy(), &def).unwrap();
        let labels = p.label_map();

        assert_eq!(labels.num_known(), 2);
        assert_eq!(labels.label(LabelGroup::Known, "n10000011"), Some(0));
        assert_eq!(labels.label(LabelGroup::Known, "n10000012"), Some(1));
        assert_eq!(labels.label(LabelGroup::Known, "n10000021"), None);
        assert_eq!(labels.label(LabelGroup::KnownUnknown, "n10000021"), Some(-1));
        assert_eq!(labels.label(LabelGroup::UnknownUnknown, "n20000001"), Some(-2));
    }

    #[test]
    fn test_partition_is_deterministic() {
        let def = definition(&["n10000000"], &[], &["n20000000"]);
        let a = partition(&hierarchy(), &def).unwrap();
        let b = partition(&hierarchy(), &def).unwrap();
        assert_eq!(a.known.classes(), b.known.classes());
    }
}

//! WordNet階層モジュール
//!
//! ImageNetのクラス分類に使用するWordNet階層を管理する。
//! 以下のファイルから読み込み、部分木の展開とImageNetクラス判定を行う。
//!
//! - `wordnet.is_a.txt`: `親 子` のペア（1行1ペア）
//! - `words.txt`: `wnid<TAB>名称`
//! - `imagenet_class_index.json`: `{"0": ["n01440764", "tench"], ...}`
//! - `<data_root>/train/`: `n` で始まるエントリがデータセットのクラス集合
//!
//! 各ノードの親は1つだけ保持する（`wordnet.is_a.txt` で複数の親を持つ場合は
//! 最後に現れた親）。子孫はデータセットのクラスから親をたどって伝播させるため、
//! どのクラスも1本の祖先系列にのみ属する。

use crate::error::{Error, Result};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

pub const IS_A_FILE: &str = "wordnet.is_a.txt";
pub const WORDS_FILE: &str = "words.txt";
pub const CLASS_INDEX_FILE: &str = "imagenet_class_index.json";

/// 階層の1ノード
#[derive(Debug, Clone, Default)]
pub struct HierarchyNode {
    pub wnid: String,
    /// 最後に読み込んだ親
    pub parent: Option<String>,
    /// データセットのクラスと、そこから自身までの中間ノード
    pub descendants_all: BTreeSet<String>,
}

/// 子孫数の統計（`wnid_sorted` の1要素）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStats {
    pub wnid: String,
    /// 子孫のうちImageNetクラスである数
    pub descendants_in_imagenet: usize,
    /// 子孫の総数
    pub descendants_total: usize,
}

/// ImageNet階層全体を管理する構造体
#[derive(Debug, Clone, Default)]
pub struct ImageNetHierarchy {
    tree: HashMap<String, HierarchyNode>,
    in_wnids: BTreeSet<String>,
    wnid_to_name: HashMap<String, String>,
    wnid_to_num: HashMap<String, usize>,
}

impl ImageNetHierarchy {
    /// データセットと階層ファイルのディレクトリから読み込み
    pub fn load(data_root: &Path, info_root: &Path) -> Result<Self> {
        let mut in_wnids = Vec::new();
        for entry in std::fs::read_dir(data_root.join("train"))? {
            let name = entry?.file_name().to_string_lossy().to_string();
            if name.starts_with('n') {
                in_wnids.push(name);
            }
        }

        let is_a = std::fs::read_to_string(info_root.join(IS_A_FILE))?;
        let words = std::fs::read_to_string(info_root.join(WORDS_FILE))?;
        let class_index = std::fs::read_to_string(info_root.join(CLASS_INDEX_FILE))?;

        Self::from_parts(in_wnids, &is_a, &words, &class_index)
    }

    /// 文字列から構築
    pub fn from_parts<I, S>(in_wnids: I, is_a: &str, words: &str, class_index: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut hierarchy = Self {
            in_wnids: in_wnids.into_iter().map(Into::into).collect(),
            ..Default::default()
        };

        for (idx, line) in is_a.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 2 {
                return Err(Error::Parse {
                    file: IS_A_FILE.into(),
                    line: idx + 1,
                    message: format!("expected `parent child`, got `{}`", line),
                });
            }
            hierarchy.add_edge(fields[0], fields[1]);
        }

        for (idx, line) in words.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (wnid, name) = line.split_once('\t').ok_or_else(|| Error::Parse {
                file: WORDS_FILE.into(),
                line: idx + 1,
                message: "missing tab separator".into(),
            })?;
            hierarchy
                .wnid_to_name
                .insert(wnid.trim().to_string(), name.trim().to_string());
        }

        let index: HashMap<String, (String, String)> = serde_json::from_str(class_index)?;
        for (num, (wnid, _short_name)) in index {
            let num: usize = num.parse().map_err(|_| Error::Parse {
                file: CLASS_INDEX_FILE.into(),
                line: 0,
                message: format!("class number `{}` is not an integer", num),
            })?;
            hierarchy.wnid_to_num.insert(wnid, num);
        }

        hierarchy.propagate_descendants();
        Ok(hierarchy)
    }

    fn add_edge(&mut self, parent: &str, child: &str) {
        self.tree.entry(parent.to_string()).or_insert_with(|| HierarchyNode {
            wnid: parent.to_string(),
            ..Default::default()
        });

        let child_node = self.tree.entry(child.to_string()).or_insert_with(|| HierarchyNode {
            wnid: child.to_string(),
            ..Default::default()
        });
        child_node.parent = Some(parent.to_string());
    }

    /// データセットの各クラスから親をたどり、祖先に子孫を登録する
    fn propagate_descendants(&mut self) {
        for wnid in &self.in_wnids {
            if !self.tree.contains_key(wnid) {
                continue;
            }

            let mut chain: Vec<String> = vec![wnid.clone()];
            let mut visited: HashSet<String> = HashSet::from([wnid.clone()]);
            let mut current = wnid.clone();

            while let Some(parent) = self.tree.get(&current).and_then(|n| n.parent.clone()) {
                // 循環
                if !visited.insert(parent.clone()) {
                    break;
                }
                if let Some(node) = self.tree.get_mut(&parent) {
                    node.descendants_all.extend(chain.iter().cloned());
                }
                chain.push(parent.clone());
                current = parent;
            }
        }
    }

    /// 階層に含まれるノードか
    pub fn contains(&self, wnid: &str) -> bool {
        self.tree.contains_key(wnid)
    }

    pub fn node(&self, wnid: &str) -> Option<&HierarchyNode> {
        self.tree.get(wnid)
    }

    pub fn node_count(&self) -> usize {
        self.tree.len()
    }

    /// データセットのクラス集合
    pub fn in_wnids(&self) -> &BTreeSet<String> {
        &self.in_wnids
    }

    pub fn is_imagenet_class(&self, wnid: &str) -> bool {
        self.in_wnids.contains(wnid)
    }

    pub fn name(&self, wnid: &str) -> Option<&str> {
        self.wnid_to_name.get(wnid).map(|s| s.as_str())
    }

    /// `imagenet_class_index.json` 上のクラス番号
    pub fn class_number(&self, wnid: &str) -> Option<usize> {
        self.wnid_to_num.get(wnid).copied()
    }

    /// 子孫（自身は含まない）。データセットのクラスに至る系列上のノードのみ。
    pub fn descendants_all(&self, wnid: &str) -> Option<&BTreeSet<String>> {
        self.tree.get(wnid).map(|n| &n.descendants_all)
    }

    /// ImageNetクラスである子孫（wnid昇順）
    pub fn imagenet_descendants(&self, wnid: &str) -> Option<Vec<&str>> {
        let all = self.descendants_all(wnid)?;
        Some(
            all.iter()
                .filter(|w| self.in_wnids.contains(*w))
                .map(|w| w.as_str())
                .collect(),
        )
    }

    /// 子孫総数の降順（同数はwnid昇順）に並べたノード一覧
    pub fn wnid_sorted(&self) -> Vec<NodeStats> {
        let mut stats: Vec<NodeStats> = self
            .tree
            .keys()
            .filter_map(|wnid| {
                let all = self.descendants_all(wnid)?;
                Some(NodeStats {
                    wnid: wnid.clone(),
                    descendants_in_imagenet: all
                        .iter()
                        .filter(|w| self.in_wnids.contains(*w))
                        .count(),
                    descendants_total: all.len(),
                })
            })
            .collect();

        stats.sort_by(|a, b| {
            b.descendants_total
                .cmp(&a.descendants_total)
                .then_with(|| a.wnid.cmp(&b.wnid))
        });
        stats
    }

    /// 名称の部分一致検索（大文字小文字を区別しない、wnid昇順）
    pub fn search(&self, query: &str) -> Vec<(&str, &str)> {
        let query = query.to_lowercase();
        let mut hits: Vec<(&str, &str)> = self
            .wnid_to_name
            .iter()
            .filter(|(_, name)| name.to_lowercase().contains(&query))
            .map(|(wnid, name)| (wnid.as_str(), name.as_str()))
            .collect();
        hits.sort();
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // canine ─┬─ dog ─┬─ poodle*
    //         │       └─ toy_dog ─ chihuahua*
    //         └─ fox*
    // animal is listed first as parent of dog and fox, so canine wins.
    const IS_A: &str = "\
n00000001 n00000002
n00000002 n00000003
n00000002 n00000004
n00000004 n00000005
n00000001 n00000006
n00000007 n00000002
n00000007 n00000006
";

    const WORDS: &str = "\
n00000001\tanimal
n00000002\tdog, domestic dog
n00000003\tpoodle
n00000004\ttoy dog
n00000005\tChihuahua
n00000006\tfox
n00000007\tcanine
";

    const CLASS_INDEX: &str = r#"{"0": ["n00000003", "poodle"], "1": ["n00000005", "Chihuahua"], "2": ["n00000006", "fox"]}"#;

    fn sample() -> ImageNetHierarchy {
        ImageNetHierarchy::from_parts(
            ["n00000003", "n00000005", "n00000006"],
            IS_A,
            WORDS,
            CLASS_INDEX,
        )
        .unwrap()
    }

    #[test]
    fn test_load_parts() {
        let h = sample();
        assert_eq!(h.node_count(), 7);
        assert_eq!(h.in_wnids().len(), 3);
        assert_eq!(h.name("n00000002"), Some("dog, domestic dog"));
        assert_eq!(h.class_number("n00000005"), Some(1));
    }

    #[test]
    fn test_descendants_all_excludes_self() {
        let h = sample();
        let desc = h.descendants_all("n00000002").unwrap();
        assert_eq!(
            desc.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            vec!["n00000003", "n00000004", "n00000005"]
        );
    }

    #[test]
    fn test_last_parent_wins() {
        let h = sample();
        assert_eq!(h.node("n00000002").unwrap().parent.as_deref(), Some("n00000007"));
        assert_eq!(h.node("n00000006").unwrap().parent.as_deref(), Some("n00000007"));

        // animal lost both children to canine
        assert!(h.descendants_all("n00000001").unwrap().is_empty());
        assert!(h.imagenet_descendants("n00000001").unwrap().is_empty());

        let canine = h.imagenet_descendants("n00000007").unwrap();
        assert_eq!(canine, vec!["n00000003", "n00000005", "n00000006"]);
    }

    #[test]
    fn test_descendants_unknown_wnid() {
        let h = sample();
        assert!(h.descendants_all("n99999999").is_none());
    }

    #[test]
    fn test_imagenet_descendants_filtered_and_sorted() {
        let h = sample();
        assert_eq!(
            h.imagenet_descendants("n00000002").unwrap(),
            vec!["n00000003", "n00000005"]
        );
        assert!(h.imagenet_descendants("n00000005").unwrap().is_empty());
    }

    #[test]
    fn test_wnid_sorted() {
        let h = sample();
        let sorted = h.wnid_sorted();
        // canine: dog, poodle, toy dog, chihuahua, fox
        assert_eq!(sorted[0].wnid, "n00000007");
        assert_eq!(sorted[0].descendants_total, 5);
        assert_eq!(sorted[0].descendants_in_imagenet, 3);
        assert_eq!(sorted[1].wnid, "n00000002");
        assert_eq!(sorted[1].descendants_total, 3);
        assert_eq!(sorted[2].wnid, "n00000004");
        assert_eq!(sorted.last().unwrap().descendants_total, 0);
    }

    #[test]
    fn test_parent_cycle_terminates() {
        let h = ImageNetHierarchy::from_parts(
            ["n00000003"],
            "n00000001 n00000002\nn00000002 n00000001\nn00000002 n00000003\n",
            WORDS,
            CLASS_INDEX,
        )
        .unwrap();
        assert_eq!(h.imagenet_descendants("n00000001").unwrap(), vec!["n00000003"]);
        assert_eq!(h.imagenet_descendants("n00000002").unwrap(), vec!["n00000003"]);
    }

    #[test]
    fn test_search_case_insensitive() {
        let h = sample();
        let hits = h.search("chihua");
        assert_eq!(hits, vec![("n00000005", "Chihuahua")]);
        assert_eq!(h.search("dog").len(), 2);
    }

    #[test]
    fn test_malformed_is_a_line() {
        let result = ImageNetHierarchy::from_parts(
            Vec::<String>::new(),
            "n00000001 n00000002\nbroken\n",
            WORDS,
            CLASS_INDEX,
        );
        match result {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_words_missing_tab() {
        let result =
            ImageNetHierarchy::from_parts(Vec::<String>::new(), IS_A, "n00000001 animal\n", CLASS_INDEX);
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = std::env::temp_dir().join("openset-hierarchy-load");
        let train = dir.join("train");
        std::fs::create_dir_all(train.join("n00000003")).unwrap();
        std::fs::create_dir_all(train.join("n00000006")).unwrap();
        std::fs::create_dir_all(train.join("README")).unwrap();
        std::fs::write(dir.join(IS_A_FILE), IS_A).unwrap();
        std::fs::write(dir.join(WORDS_FILE), WORDS).unwrap();
        std::fs::write(dir.join(CLASS_INDEX_FILE), CLASS_INDEX).unwrap();

        let h = ImageNetHierarchy::load(&dir, &dir).unwrap();
        assert_eq!(h.in_wnids().len(), 2);
        assert!(h.is_imagenet_class("n00000003"));
        assert!(!h.is_imagenet_class("n00000005"));

        std::fs::remove_dir_all(&dir).ok();
    }
}

// library.rs - 出版物分组与筛选
//! 按原始标题行聚合记录，并支持按标题筛选子集
//!
//! 分组键是原始标题行本身，仅空白不同的键视为不同出版物；
//! 筛选粒度是派生出的标题，同一标题的多个键一起选中/排除

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{ClippingRecord, Publication};

/// 全部出版物的聚合 (保留首次出现顺序)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Library {
    /// 键的首次出现顺序
    order: Vec<String>,
    /// 键 -> 出版物聚合
    publications: HashMap<String, Publication>,
}

impl Library {
    /// 按出版物键分组记录；首次出现的标题/作者生效
    pub fn from_records(records: Vec<ClippingRecord>) -> Self {
        let mut library = Library::default();
        for record in records {
            let key = record.publication_key.clone();
            let publication = library.publications.entry(key.clone()).or_insert_with(|| {
                library.order.push(key.clone());
                Publication {
                    key,
                    title: record.title.clone(),
                    author: record.author.clone(),
                    records: Vec::new(),
                }
            });
            publication.records.push(record);
        }
        library
    }

    /// 按首次出现顺序遍历出版物
    pub fn publications(&self) -> impl Iterator<Item = &Publication> {
        self.order
            .iter()
            .filter_map(|key| self.publications.get(key))
    }

    /// 去重后按字典序排序的标题列表 (供外部选择)
    pub fn titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self
            .publications()
            .map(|p| p.title.clone())
            .collect();
        titles.sort();
        titles.dedup();
        titles
    }

    /// 筛选标题在给定集合中的出版物，保持原顺序
    pub fn select(&self, selected_titles: &[String]) -> Vec<&Publication> {
        self.publications()
            .filter(|p| selected_titles.iter().any(|t| t == &p.title))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteDate;

    fn record(key: &str, title: &str, author: &str, text: &str) -> ClippingRecord {
        ClippingRecord {
            publication_key: key.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            note_type: "Highlight".to_string(),
            location: "loc.1".to_string(),
            raw_date: "Tuesday, May 1, 2024 3:00:00 PM".to_string(),
            date: NoteDate::parse("Tuesday, May 1, 2024 3:00:00 PM"),
            text: text.to_string(),
            hash: crate::hash::content_hash(text),
        }
    }

    #[test]
    fn test_grouping_preserves_first_seen_order() {
        let records = vec![
            record("B (Y)", "B", "Y", "one"),
            record("A (X)", "A", "X", "two"),
            record("B (Y)", "B", "Y", "three"),
        ];
        let library = Library::from_records(records);
        let keys: Vec<&str> = library.publications().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["B (Y)", "A (X)"]);
        assert_eq!(library.publications().next().unwrap().records.len(), 2);
    }

    #[test]
    fn test_titles_sorted_and_deduped() {
        let records = vec![
            record("Dune (Frank Herbert)", "Dune", "Frank Herbert", "one"),
            record("Dune  (Frank Herbert)", "Dune", "Frank Herbert", "two"),
            record("Arrival (Ted Chiang)", "Arrival", "Ted Chiang", "three"),
        ];
        let library = Library::from_records(records);
        // 两个键仅空白不同 -> 两个出版物，但标题去重后只剩一个 "Dune"
        assert_eq!(library.len(), 3);
        assert_eq!(library.titles(), vec!["Arrival", "Dune"]);
    }

    #[test]
    fn test_select_by_title_moves_all_matching_keys() {
        let records = vec![
            record("Dune (Frank Herbert)", "Dune", "Frank Herbert", "one"),
            record("Dune  (Frank Herbert)", "Dune", "Frank Herbert", "two"),
            record("Arrival (Ted Chiang)", "Arrival", "Ted Chiang", "three"),
        ];
        let library = Library::from_records(records);
        let selected = library.select(&["Dune".to_string()]);
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|p| p.title == "Dune"));
    }

    #[test]
    fn test_whitespace_distinct_keys_are_distinct_publications() {
        let records = vec![
            record("Dune", "Dune", "Unknown", "one"),
            record("Dune ", "Dune", "Unknown", "two"),
        ];
        let library = Library::from_records(records);
        assert_eq!(library.len(), 2);
    }
}

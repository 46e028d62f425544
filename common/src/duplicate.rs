//! 重复行检测
//!
//! 默认策略：与任意前序行全部15列完全相同即为重复，首次出现的行不标记。

use crate::types::WorkOrder;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// 查重策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// 全部列相同，且与任意前序行比较
    #[default]
    FullRow,
    /// 除序号外的列相同，且只与紧邻的上一行比较
    ///
    /// 旧版处理流程使用的判定方式。两者结果可能不同，采用哪一种需业务确认。
    #[serde(alias = "adjacent")]
    AdjacentIgnoringSequence,
}

impl DuplicatePolicy {
    /// 标记重复行，返回0起算的下标集合
    pub fn mark(&self, rows: &[WorkOrder]) -> BTreeSet<usize> {
        match self {
            DuplicatePolicy::FullRow => mark_duplicates(rows),
            DuplicatePolicy::AdjacentIgnoringSequence => mark_adjacent_duplicates(rows),
        }
    }
}

/// 全列一致的重复行（保留首次出现）
pub fn mark_duplicates(rows: &[WorkOrder]) -> BTreeSet<usize> {
    let mut seen: HashSet<&WorkOrder> = HashSet::with_capacity(rows.len());
    rows.iter()
        .enumerate()
        .filter(|(_, row)| !seen.insert(*row))
        .map(|(i, _)| i)
        .collect()
}

/// 与上一行除序号外完全一致的行
pub fn mark_adjacent_duplicates(rows: &[WorkOrder]) -> BTreeSet<usize> {
    rows.windows(2)
        .enumerate()
        .filter(|(_, pair)| same_except_sequence(&pair[0], &pair[1]))
        .map(|(i, _)| i + 1)
        .collect()
}

fn same_except_sequence(a: &WorkOrder, b: &WorkOrder) -> bool {
    WorkOrder {
        sequence: None,
        ..a.clone()
    } == WorkOrder {
        sequence: None,
        ..b.clone()
    }
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full-row" | "full" => Ok(DuplicatePolicy::FullRow),
            "adjacent" | "adjacent-ignoring-sequence" => {
                Ok(DuplicatePolicy::AdjacentIgnoringSequence)
            }
            _ => Err(format!("未知的查重策略: {}（可选 full-row / adjacent）", s)),
        }
    }
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DuplicatePolicy::FullRow => write!(f, "full-row"),
            DuplicatePolicy::AdjacentIgnoringSequence => write!(f, "adjacent"),
        }
    }
}

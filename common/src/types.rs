//! 作业计划的数据类型
//!
//! - Frame: 按表头行切分后的原始表格（全部为文本）
//! - WorkOrder: 15列的作业计划记录
//! - MergedDataset: 合并、排序、查重后的结果

use crate::duplicate::DuplicatePolicy;
use crate::schema::{column_positions, COLUMN_COUNT};
use crate::timefmt::parse_datetime;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;

/// 单元格文本（空白单元格为 `None`）
pub type Cell = Option<String>;

/// 按15列投影后的原始记录（时间尚未解析）
pub type RawRecord = [Cell; COLUMN_COUNT];

/// 表头行之后的表格
///
/// `headers` 为表头行文本，`rows` 为其后的所有行，宽度与表头一致。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Frame {
    /// 以 `header_offset` 行为表头切分网格
    pub fn from_grid(grid: &[Vec<Cell>], header_offset: usize) -> Self {
        let width = grid
            .iter()
            .skip(header_offset)
            .map(|row| row.len())
            .max()
            .unwrap_or(0);

        let headers = match grid.get(header_offset) {
            Some(row) => (0..width)
                .map(|col| row.get(col).cloned().flatten().unwrap_or_default())
                .collect(),
            None => Vec::new(),
        };

        let rows = grid
            .iter()
            .skip(header_offset + 1)
            .map(|row| (0..width).map(|col| row.get(col).cloned().flatten()).collect())
            .collect();

        Self { headers, rows }
    }

    /// 按必需列顺序投影各行（多余列丢弃）
    pub fn records(&self) -> Vec<RawRecord> {
        let positions = column_positions(&self.headers);
        self.rows
            .iter()
            .map(|row| {
                let mut record: RawRecord = Default::default();
                for (slot, position) in record.iter_mut().zip(positions.iter()) {
                    *slot = position.and_then(|p| row.get(p).cloned().flatten());
                }
                record
            })
            .collect()
    }
}

/// 只有序号、其余列全空的行
pub fn is_orphan_sequence(record: &RawRecord) -> bool {
    record[0].is_some() && record[1..].iter().all(Option::is_none)
}

/// 全空行
pub fn is_blank(record: &RawRecord) -> bool {
    record.iter().all(Option::is_none)
}

/// 作业计划（15列）
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct WorkOrder {
    pub sequence: Cell,            // 序号
    pub job_type: Cell,            // 作业类型（内容）
    pub managing_unit: Cell,       // 项目管理单位/部门
    pub substation: Cell,          // 供电所
    pub contractor: Cell,          // 施工单位
    pub site: Cell,                // 施工地点
    pub start_time: Option<NaiveDateTime>, // 工作开始时间
    pub end_time: Option<NaiveDateTime>,   // 工作结束时间
    pub responsible_contact: Cell, // 工作负责人及电话
    pub specialty: Cell,           // 专业
    pub risk_level: Cell,          // 基准风险等级
    pub power_cut: Cell,           // 是否需要停电
    pub worker_count: Cell,        // 施工人数
    pub video_supervision: Cell,   // 是否纳入视频监督
    pub remarks: Cell,             // 备注
}

/// 单元格的值（渲染用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Time(&'a NaiveDateTime),
    Empty,
}

impl WorkOrder {
    /// 原始记录 → 作业计划（解析时间列）
    pub fn from_record(record: RawRecord) -> Self {
        let [
            sequence,
            job_type,
            managing_unit,
            substation,
            contractor,
            site,
            start,
            end,
            responsible_contact,
            specialty,
            risk_level,
            power_cut,
            worker_count,
            video_supervision,
            remarks,
        ] = record;

        Self {
            sequence,
            job_type,
            managing_unit,
            substation,
            contractor,
            site,
            start_time: start.as_deref().and_then(parse_datetime),
            end_time: end.as_deref().and_then(parse_datetime),
            responsible_contact,
            specialty,
            risk_level,
            power_cut,
            worker_count,
            video_supervision,
            remarks,
        }
    }

    /// 第 `index` 列（0起算）的值
    pub fn field(&self, index: usize) -> FieldValue<'_> {
        let text = match index {
            0 => &self.sequence,
            1 => &self.job_type,
            2 => &self.managing_unit,
            3 => &self.substation,
            4 => &self.contractor,
            5 => &self.site,
            6 => return self.start_time.as_ref().map_or(FieldValue::Empty, FieldValue::Time),
            7 => return self.end_time.as_ref().map_or(FieldValue::Empty, FieldValue::Time),
            8 => &self.responsible_contact,
            9 => &self.specialty,
            10 => &self.risk_level,
            11 => &self.power_cut,
            12 => &self.worker_count,
            13 => &self.video_supervision,
            14 => &self.remarks,
            _ => return FieldValue::Empty,
        };
        text.as_deref().map_or(FieldValue::Empty, FieldValue::Text)
    }

    /// 是否只有序号有值
    pub fn is_orphan_sequence(&self) -> bool {
        self.sequence.is_some()
            && (1..COLUMN_COUNT).all(|i| matches!(self.field(i), FieldValue::Empty))
    }
}

/// 合并结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedDataset {
    /// 按工作开始时间排序后的记录（下标即0起算的行号）
    pub rows: Vec<WorkOrder>,
    /// 重复行的下标
    pub duplicates: BTreeSet<usize>,
}

impl MergedDataset {
    /// 拼接后的记录 → 合并结果
    ///
    /// 再次去除只有序号的行（拼接后同样可能出现），按开始时间稳定排序
    /// （无法解析的时间排在最后），最后查重。
    pub fn build(rows: Vec<WorkOrder>, policy: DuplicatePolicy) -> Self {
        let mut rows: Vec<WorkOrder> = rows
            .into_iter()
            .filter(|row| !row.is_orphan_sequence())
            .collect();

        rows.sort_by(|a, b| match (&a.start_time, &b.start_time) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        let duplicates = policy.mark(&rows);
        Self { rows, duplicates }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 第 `index` 行是否重复
    pub fn is_duplicate(&self, index: usize) -> bool {
        self.duplicates.contains(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::REQUIRED_COLUMNS;
    use chrono::NaiveDate;

    fn text(s: &str) -> Cell {
        Some(s.to_string())
    }

    fn header_row() -> Vec<Cell> {
        REQUIRED_COLUMNS.iter().map(|s| text(s)).collect()
    }

    fn order(seq: &str, job: &str, start: Option<&str>) -> WorkOrder {
        let mut record: RawRecord = Default::default();
        record[0] = text(seq);
        record[1] = text(job);
        record[6] = start.map(|s| s.to_string());
        WorkOrder::from_record(record)
    }

    #[test]
    fn test_frame_from_grid_pads_width() {
        let grid = vec![
            vec![text("标题")],
            header_row(),
            vec![text("1"), text("巡视")],
        ];
        let frame = Frame::from_grid(&grid, 1);
        assert_eq!(frame.headers.len(), 15);
        assert_eq!(frame.rows.len(), 1);
        assert_eq!(frame.rows[0].len(), 15);
        assert_eq!(frame.rows[0][1], text("巡视"));
        assert_eq!(frame.rows[0][14], None);
    }

    #[test]
    fn test_frame_header_offset_out_of_range() {
        let grid = vec![vec![text("a")]];
        let frame = Frame::from_grid(&grid, 3);
        assert!(frame.headers.is_empty());
        assert!(frame.rows.is_empty());
    }

    #[test]
    fn test_records_follow_column_names() {
        // 施工地点与备注互换位置
        let mut headers = header_row();
        headers.swap(5, 14);
        let mut row: Vec<Cell> = vec![None; 15];
        row[5] = text("备注内容");
        row[14] = text("某小区");
        let frame = Frame::from_grid(&[headers, row], 0);

        let records = frame.records();
        assert_eq!(records[0][5], text("某小区"));
        assert_eq!(records[0][14], text("备注内容"));
    }

    #[test]
    fn test_orphan_and_blank_records() {
        let mut record: RawRecord = Default::default();
        assert!(is_blank(&record));
        assert!(!is_orphan_sequence(&record));

        record[0] = text("3");
        assert!(is_orphan_sequence(&record));
        assert!(!is_blank(&record));

        record[4] = text("施工队");
        assert!(!is_orphan_sequence(&record));
    }

    #[test]
    fn test_work_order_parses_times() {
        let mut record: RawRecord = Default::default();
        record[6] = text("2024-05-01 08:00");
        record[7] = text("待定");
        let wo = WorkOrder::from_record(record);
        assert_eq!(
            wo.start_time,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(8, 0, 0)
        );
        assert_eq!(wo.end_time, None);
        assert!(matches!(wo.field(6), FieldValue::Time(_)));
        assert_eq!(wo.field(7), FieldValue::Empty);
    }

    #[test]
    fn test_build_sorts_and_keeps_nulls_last() {
        let rows = vec![
            order("1", "C", Some("2024-05-03")),
            order("2", "X", None),
            order("3", "A", Some("2024-05-01")),
            order("4", "Y", Some("无")),
            order("5", "B", Some("2024-05-02")),
        ];
        let dataset = MergedDataset::build(rows, DuplicatePolicy::FullRow);
        let jobs: Vec<&str> = dataset
            .rows
            .iter()
            .map(|r| r.job_type.as_deref().unwrap())
            .collect();
        assert_eq!(jobs, vec!["A", "B", "C", "X", "Y"]);
    }

    #[test]
    fn test_build_drops_orphans_after_concat() {
        let mut orphan: RawRecord = Default::default();
        orphan[0] = text("9");
        let rows = vec![
            order("1", "A", Some("2024-05-01")),
            WorkOrder::from_record(orphan),
        ];
        let dataset = MergedDataset::build(rows, DuplicatePolicy::FullRow);
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_orphan_after_time_parse_failure() {
        // 只有序号和无法解析的时间 → 解析后视为只有序号
        let mut record: RawRecord = Default::default();
        record[0] = text("7");
        record[6] = text("待定");
        let wo = WorkOrder::from_record(record);
        assert!(wo.is_orphan_sequence());
    }
}

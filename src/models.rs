// models.rs - 剪贴记录与出版物聚合结构
//! 定义解析后的数据结构

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 一条解析后的高亮/笔记记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClippingRecord {
    /// 原始标题行 (分组键，保留原样)
    pub publication_key: String,
    /// 标题 (从 `Title (Author)` 拆出，无括号时取整行)
    pub title: String,
    /// 作者 (无括号时为 "Unknown")
    pub author: String,
    /// 笔记类型 (Highlight / Note / Bookmark ...)
    pub note_type: String,
    /// 位置描述，如 "loc.120-125, p.45"，可能为空
    pub location: String,
    /// "Added on" 之后的原始日期文本
    pub raw_date: String,
    /// 解析后的日期 (解析失败时保留原文)
    pub date: NoteDate,
    /// 笔记正文 (已去除首尾空白)
    pub text: String,
    /// 正文的 8 位十六进制内容指纹
    pub hash: String,
}

/// 笔记日期 - 区分解析成功与原文回退
///
/// 原文回退 (Raw) 不参与文件时间戳计算
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NoteDate {
    /// 无时区的本地时间
    Local(NaiveDateTime),
    /// 带时区偏移的时间
    Zoned(DateTime<FixedOffset>),
    /// 解析失败，保留原始字符串
    Raw(String),
}

/// Kindle 导出常见的日期格式 (星期前缀已单独剥离)
const DATE_FORMATS: &[&str] = &[
    // May 1, 2024 3:00:00 PM
    "%B %d, %Y %I:%M:%S %p",
    // May 1, 2024, 3:00 PM
    "%B %d, %Y, %I:%M %p",
    "%B %d, %Y %I:%M %p",
    // 1 May 2024 15:00:00
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

const WEEKDAYS: &[&str] = &[
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

/// 剥离开头的星期前缀，如 "Tuesday, "
///
/// 设备导出的星期偶尔与日期不一致，严格校验会误判为解析失败
fn strip_weekday(s: &str) -> &str {
    for day in WEEKDAYS {
        if let Some(rest) = s.strip_prefix(day) {
            return rest.trim_start_matches(',').trim_start();
        }
    }
    s
}

impl NoteDate {
    /// 按已知格式逐个尝试解析，全部失败则保留原文
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return NoteDate::Zoned(dt);
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
            return NoteDate::Zoned(dt);
        }
        let bare = strip_weekday(trimmed);
        for fmt in DATE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(bare, fmt) {
                return NoteDate::Local(dt);
            }
        }
        NoteDate::Raw(trimmed.to_string())
    }

    /// 是否解析成功
    pub fn is_parsed(&self) -> bool {
        !matches!(self, NoteDate::Raw(_))
    }

    /// Unix 时间戳 (秒)
    ///
    /// 无时区时间按朴素纪元换算，带时区时间换算到 UTC；原文回退返回 None
    pub fn timestamp(&self) -> Option<i64> {
        match self {
            NoteDate::Local(dt) => Some(dt.and_utc().timestamp()),
            NoteDate::Zoned(dt) => Some(dt.timestamp()),
            NoteDate::Raw(_) => None,
        }
    }
}

impl fmt::Display for NoteDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteDate::Local(dt) => write!(f, "{}", dt),
            NoteDate::Zoned(dt) => write!(f, "{}", dt),
            NoteDate::Raw(s) => write!(f, "{}", s),
        }
    }
}

/// 一个出版物 (书/文章) 的全部记录聚合
///
/// 以原始标题行为键；首次出现的标题/作者生效
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publication {
    pub key: String,
    pub title: String,
    pub author: String,
    /// 文件内出现顺序的记录列表
    pub records: Vec<ClippingRecord>,
}

impl Publication {
    /// 笔记数 <= 阈值的出版物归入共享短笔记文件
    pub fn is_short(&self, threshold: usize) -> bool {
        self.records.len() <= threshold
    }

    /// 统计不在已有指纹集合中的新笔记数
    pub fn new_note_count(&self, existing: &HashMap<String, String>) -> usize {
        self.records
            .iter()
            .filter(|r| !existing.contains_key(&r.hash))
            .count()
    }

    /// 全部记录中可解析日期的最大时间戳
    pub fn latest_timestamp(&self) -> Option<i64> {
        self.records.iter().filter_map(|r| r.date.timestamp()).max()
    }
}

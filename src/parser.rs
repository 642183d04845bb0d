// parser.rs - 剪贴文件解析器
//! 把 "My Clippings.txt" 的松散分块格式解析为结构化记录
//!
//! 每个块的形状:
//! - 标题行 (可能带 `Title (Author)` 形式的作者后缀)
//! - 元数据行 `- <类型> <位置信息> Added on <日期>`
//! - 空行
//! - 若干正文行，直到分隔线 `==========`

use once_cell::sync::Lazy;
use regex::Regex;

use crate::hash::content_hash;
use crate::models::{ClippingRecord, NoteDate};

/// 块分隔线
pub const NOTE_SEPARATOR: &str = "==========";

// 正则表达式预编译
static TITLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    // 贪婪匹配使作者取最后一组括号
    Regex::new(r"^(.*)\((.*)\)$").unwrap()
});

static INFO_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^- (\S+) (.*)[\s|]+Added on\s+(.+)$").unwrap()
});

static LOC_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"Loc\. ([\d\-]+)").unwrap());

static PAGE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"Page ([\d\-]+)").unwrap());

/// 解析错误
///
/// 元数据行不匹配说明输入不是可识别的导出文件，直接中止，不跳过坏块
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("metadata line {line} does not match expected format: {content}")]
    Metadata { line: usize, content: String },

    #[error("input ended unexpectedly inside a record (near line {line})")]
    UnexpectedEof { line: usize },
}

/// 惰性解析器 - 逐块产出记录
pub struct ClippingParser<'a> {
    lines: std::str::Lines<'a>,
    line_no: usize,
    done: bool,
}

impl<'a> ClippingParser<'a> {
    /// 创建解析器，跳过文件开头的单个控制字符 (导出编码的已知产物)
    pub fn new(input: &'a str) -> Self {
        let rest = match input.chars().next() {
            Some(c) if c == '\u{feff}' || c.is_control() => &input[c.len_utf8()..],
            _ => input,
        };
        Self {
            lines: rest.lines(),
            line_no: 0,
            done: false,
        }
    }

    /// 读取下一行并去除首尾空白
    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some(line.trim())
    }

    /// 解析一个完整的块 (标题行已读出)
    fn parse_block(&mut self, key: &str) -> Result<ClippingRecord, ParseError> {
        // 元数据行 - 硬格式假设
        let info = self.next_line().ok_or(ParseError::UnexpectedEof {
            line: self.line_no,
        })?;
        let caps = INFO_PATTERN.captures(info).ok_or_else(|| ParseError::Metadata {
            line: self.line_no,
            content: info.to_string(),
        })?;
        let note_type = caps[1].to_string();
        let loc_info = &caps[2];
        let raw_date = caps[3].trim().to_string();

        let (title, author) = split_title_author(key);
        let location = compose_location(loc_info);
        let date = NoteDate::parse(&raw_date);

        // 跳过空行
        self.next_line().ok_or(ParseError::UnexpectedEof {
            line: self.line_no,
        })?;

        // 正文: 逐行收集直到分隔线；零行正文也是合法记录
        let mut body: Vec<&str> = Vec::new();
        loop {
            let line = self.next_line().ok_or(ParseError::UnexpectedEof {
                line: self.line_no,
            })?;
            if line == NOTE_SEPARATOR {
                break;
            }
            body.push(line);
        }
        let text = body.join("\n").trim().to_string();
        let hash = content_hash(&text);

        Ok(ClippingRecord {
            publication_key: key.to_string(),
            title,
            author,
            note_type,
            location,
            raw_date,
            date,
            text,
            hash,
        })
    }
}

impl<'a> Iterator for ClippingParser<'a> {
    type Item = Result<ClippingRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        // 标题行；空行或文件结束则停止迭代
        let key = match self.next_line() {
            Some(line) if !line.is_empty() => line.to_string(),
            _ => {
                self.done = true;
                return None;
            }
        };
        let result = self.parse_block(&key);
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

/// 一次性解析整个导出文件
pub fn parse_clippings(input: &str) -> Result<Vec<ClippingRecord>, ParseError> {
    ClippingParser::new(input).collect()
}

/// 按 `Title (Author)` 拆分标题行，无括号时作者为 "Unknown"
fn split_title_author(key: &str) -> (String, String) {
    match TITLE_PATTERN.captures(key) {
        Some(caps) => (caps[1].trim().to_string(), caps[2].trim().to_string()),
        None => (key.to_string(), "Unknown".to_string()),
    }
}

/// 组合位置描述: `loc.<range>` 和/或 `p.<range>`，两者都有时用 ", " 连接
fn compose_location(loc_info: &str) -> String {
    let loc = LOC_PATTERN
        .captures(loc_info)
        .map(|c| c[1].to_string());
    let page = PAGE_PATTERN
        .captures(loc_info)
        .map(|c| c[1].to_string());

    let mut out = String::new();
    if let Some(loc) = loc {
        out.push_str("loc.");
        out.push_str(&loc);
    }
    if let Some(page) = page {
        if !out.is_empty() {
            out.push_str(", ");
        }
        out.push_str("p.");
        out.push_str(&page);
    }
    out
}

// writer.rs - 合并写入器
//! 把未见过的记录追加到对应的输出文件
//!
//! 追加内容先在内存里拼好，再做一次追加写入，
//! 避免循环中途崩溃留下半截文件

use anyhow::{Context, Result};
use filetime::FileTime;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::config::CONFIG;
use crate::models::{ClippingRecord, Publication};

/// 写入行为参数 (从全局配置取默认值)
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// 笔记数 <= 阈值 -> 共享短笔记文件
    pub short_note_threshold: usize,
    /// 共享短笔记文件名
    pub short_notes_filename: String,
    /// 短标题硬截断长度 (字符数)
    pub short_title_max_len: usize,
    /// 去重标记行前缀
    pub comment_prefix: String,
    /// 是否写入去重标记行 (重复运行的幂等性依赖它)
    pub write_markers: bool,
    /// 是否逐条打印进度
    pub verbose: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            short_note_threshold: 2,
            short_notes_filename: "short_notes.md".to_string(),
            short_title_max_len: 127,
            comment_prefix: ".. ".to_string(),
            write_markers: true,
            verbose: false,
        }
    }
}

impl WriterOptions {
    /// 从全局配置构造
    pub fn from_config() -> Self {
        Self {
            short_note_threshold: CONFIG.export.short_note_threshold,
            short_notes_filename: CONFIG.export.short_notes_filename.clone(),
            short_title_max_len: CONFIG.export.short_title_max_len,
            comment_prefix: CONFIG.export.comment_prefix.clone(),
            write_markers: CONFIG.export.write_markers,
            verbose: CONFIG.display.verbose,
        }
    }
}

/// 单个出版物的写入统计
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteStats {
    /// 本次追加的新笔记数
    pub appended: usize,
    /// 已存在而跳过的笔记数
    pub skipped: usize,
}

/// 合并写入器
pub struct MergeWriter<'a> {
    output_dir: &'a Path,
    existing: &'a HashMap<String, String>,
    options: WriterOptions,
    /// 运行开始时间 (没有可解析日期时的时间戳回退)
    run_start: i64,
}

impl<'a> MergeWriter<'a> {
    pub fn new(
        output_dir: &'a Path,
        existing: &'a HashMap<String, String>,
        options: WriterOptions,
    ) -> Self {
        Self {
            output_dir,
            existing,
            options,
            run_start: chrono::Utc::now().timestamp(),
        }
    }

    /// 写入一个出版物；没有新笔记时不碰任何文件，返回 None
    pub fn write_publication(&self, publication: &Publication) -> Result<Option<WriteStats>> {
        let new_notes = publication.new_note_count(self.existing);
        if new_notes == 0 {
            return Ok(None);
        }
        if self.options.verbose {
            println!(" [写入] {} 有 {} 条新笔记", publication.title, new_notes);
        }

        let short = publication.is_short(self.options.short_note_threshold);
        let filename = self.target_filename(publication, short);
        let path = self.output_dir.join(&filename);
        let file_existed = path.is_file();

        // 先在内存里拼出完整追加块
        let mut block = String::new();
        if short {
            // 短笔记共享文件: 每次追加都带出版物小标题
            block.push_str(&render_short_header(publication));
        } else if !file_existed {
            // 独立文件首次创建: 带完整头部
            block.push_str(&render_long_header(publication));
        }

        let mut stats = WriteStats::default();
        for record in &publication.records {
            if let Some(holder) = self.existing.get(&record.hash) {
                if self.options.verbose {
                    println!(" [跳过] 笔记 {} 已在 {} 中", record.hash, holder);
                }
                stats.skipped += 1;
                continue;
            }
            if self.options.write_markers {
                block.push_str(&self.render_marker(publication, record, short));
            }
            block.push_str("- ");
            block.push_str(&record.text);
            block.push('\n');
            stats.appended += 1;
            if self.options.verbose {
                println!(
                    " [新增] {} -> {} {} {} {}",
                    filename, record.hash, record.note_type, record.location, record.date
                );
            }
        }

        // 一次追加写入
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("无法打开输出文件 {:?}", path))?;
        file.write_all(block.as_bytes())
            .with_context(|| format!("写入 {:?} 失败", path))?;
        drop(file);

        // 文件修改时间 = 该出版物全部记录中最新的笔记日期
        let last_ts = publication.latest_timestamp().unwrap_or(self.run_start);
        filetime::set_file_mtime(&path, FileTime::from_unix_time(last_ts, 0))
            .with_context(|| format!("更新 {:?} 的修改时间失败", path))?;

        Ok(Some(stats))
    }

    /// 目标文件名: 短笔记共享文件或 "<作者> - <短标题>.md"
    fn target_filename(&self, publication: &Publication, short: bool) -> String {
        if short {
            return self.options.short_notes_filename.clone();
        }
        let short_title = shorten_title(&publication.title, self.options.short_title_max_len);
        sanitize_filename(&format!("{} - {}.md", publication.author, short_title))
    }

    /// 去重标记行: `<前缀><指纹> ; <类型> ; <位置> ; <日期>`
    ///
    /// 短笔记共享文件里额外带上作者和标题，便于人工溯源
    fn render_marker(&self, publication: &Publication, record: &ClippingRecord, short: bool) -> String {
        let mut line = format!(
            "{}{} ; {} ; {} ; {}",
            self.options.comment_prefix, record.hash, record.note_type, record.location, record.date
        );
        if short {
            line.push_str(&format!(" ; {} ; {}", publication.author, publication.title));
        }
        line.push('\n');
        line
    }
}

/// 独立文件头部 (首次创建时写一次)
fn render_long_header(publication: &Publication) -> String {
    let title_line = format!("Highlights from {}", publication.title);
    let mut header = String::new();
    header.push_str(&title_line);
    header.push('\n');
    header.push_str(&"=".repeat(title_line.chars().count()));
    header.push_str("\n\n");
    if publication.author != "Unknown" {
        header.push_str(&format!("Authors:: [[{}]]\n", publication.author));
    }
    header.push_str(&format!(
        "Recommended By:: \nTags:: [[📚 Books]]\n\n# {}\n\n### Highlights\n",
        publication.title
    ));
    header
}

/// 短笔记共享文件的小标题 (每次追加都写)
fn render_short_header(publication: &Publication) -> String {
    let title_line = if publication.author != "Unknown" {
        format!("{} - {}", publication.author, publication.title)
    } else {
        publication.title.clone()
    };
    format!(
        "{}\n{}\n\n",
        title_line,
        "-".repeat(title_line.chars().count())
    )
}

/// 依次在 `|`、` - `、`. ` 处截断标题，超长时硬截断
pub fn shorten_title(title: &str, max_len: usize) -> String {
    let mut short = title;
    for delimiter in ["|", " - ", ". "] {
        if let Some(head) = short.split(delimiter).next() {
            short = head;
        }
    }
    let short = short.trim();
    if short.chars().count() > max_len {
        short.chars().take(max_len).collect()
    } else {
        short.to_string()
    }
}

/// 过滤文件名中不安全的字符，保留字母数字、空白和少量标点
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| {
            c.is_alphanumeric()
                || c.is_whitespace()
                || matches!(c, '(' | ')' | '\'' | '.' | '?' | '!' | ':' | '-' | '_')
        })
        .collect()
}

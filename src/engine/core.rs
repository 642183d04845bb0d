// engine/core.rs - 导出引擎核心
//! 串联整条管线并汇总运行报告
//!
//! 严格顺序执行: 先扫描已有输出，再完整解析输入文件，
//! 然后逐个出版物处理；任何致命错误中止整次运行

use std::fs;
use std::path::{Path, PathBuf};

use crate::library::Library;
use crate::parser::{parse_clippings, ParseError};
use crate::scanner::OutputScanner;
use crate::select::SelectionProvider;
use crate::writer::{MergeWriter, WriterOptions};

/// 导出引擎错误类型
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("clippings parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("output scan error: {0}")]
    Scan(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("selection error: {0}")]
    Selection(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// 一次运行的汇总报告
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    /// 选中且实际写入的出版物数
    pub publications_written: usize,
    /// 没有新笔记而整体跳过的出版物数
    pub publications_skipped: usize,
    /// 追加的新笔记总数
    pub new_notes: usize,
    /// 已存在而跳过的笔记总数
    pub skipped_notes: usize,
    /// 扫描到的已有指纹数
    pub existing_hashes: usize,
    /// 输入文件中的记录总数
    pub parsed_records: usize,
}

/// 导出引擎
pub struct ExportEngine {
    pub(crate) input_path: PathBuf,
    pub(crate) fallback_paths: Vec<PathBuf>,
    pub(crate) output_path: PathBuf,
    pub(crate) selection: Box<dyn SelectionProvider>,
    pub(crate) options: WriterOptions,
}

impl ExportEngine {
    /// 执行完整管线
    pub fn run(&self) -> ExportResult<ExportReport> {
        // 1. 扫描已有输出，重建指纹集合
        if self.options.verbose {
            println!(" [扫描] 输出目录 {:?}", self.output_path);
        }
        let scanner = OutputScanner::new(&self.options.comment_prefix)
            .with_verbose(self.options.verbose);
        let existing = scanner
            .scan(&self.output_path)
            .map_err(|e| ExportError::Scan(e.to_string()))?;
        if self.options.verbose {
            println!(" [扫描] 共找到 {} 个已有指纹", existing.len());
        }

        // 2. 定位并完整读入输入文件
        let input = self.resolve_input()?;
        if self.options.verbose {
            println!(" [解析] 剪贴文件 {:?}", input);
        }
        let raw = fs::read_to_string(&input)?;
        let records = parse_clippings(&raw)?;
        let parsed_records = records.len();

        // 3. 分组并选择
        let library = Library::from_records(records);
        let titles = library.titles();
        let chosen = self
            .selection
            .choose(&titles)
            .map_err(|e| ExportError::Selection(e.to_string()))?;
        let selected = library.select(&chosen);

        // 4. 逐个出版物合并写入
        let writer = MergeWriter::new(&self.output_path, &existing, self.options.clone());
        let mut report = ExportReport {
            existing_hashes: existing.len(),
            parsed_records,
            ..Default::default()
        };
        for publication in selected {
            match writer
                .write_publication(publication)
                .map_err(|e| ExportError::Write(e.to_string()))?
            {
                Some(stats) => {
                    report.publications_written += 1;
                    report.new_notes += stats.appended;
                    report.skipped_notes += stats.skipped;
                }
                None => report.publications_skipped += 1,
            }
        }

        Ok(report)
    }

    /// 定位输入文件: 主路径不存在时依次探测备用路径
    ///
    /// 备用路径中的 `{user}` 替换为当前用户名
    fn resolve_input(&self) -> ExportResult<PathBuf> {
        if self.input_path.is_file() {
            return Ok(self.input_path.clone());
        }
        let user = std::env::var("USER").unwrap_or_default();
        for fallback in &self.fallback_paths {
            let candidate = PathBuf::from(
                fallback.to_string_lossy().replace("{user}", &user),
            );
            if candidate.is_file() {
                if self.options.verbose {
                    println!(" [输入] 使用备用路径 {:?}", candidate);
                }
                return Ok(candidate);
            }
        }
        Err(ExportError::InputNotFound(self.input_path.clone()))
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ExportEngineBuilder;
    use crate::select::StaticSelection;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE: &str = "\u{feff}Dune (Frank Herbert)\n- Highlight Loc. 10-12 | Added on Tuesday, May 1, 2024 3:00:00 PM\n\nfear is the mind-killer\n==========\nDune (Frank Herbert)\n- Highlight Loc. 20 | Added on Tuesday, May 1, 2024 4:00:00 PM\n\nthe spice must flow\n==========\nDune (Frank Herbert)\n- Note Page 45 | Added on Tuesday, May 1, 2024 5:00:00 PM\n\nplans within plans\n==========\nSample (Me)\n- Highlight Loc. 10-12 | Added on Tuesday, May 1, 2024 3:00:00 PM\n\nhello world\n==========\n";

    fn setup(temp: &Path) -> (PathBuf, PathBuf) {
        let input = temp.join("My Clippings.txt");
        let output = temp.join("clippings");
        fs::write(&input, SAMPLE).unwrap();
        (input, output)
    }

    fn quiet_options() -> WriterOptions {
        WriterOptions::default()
    }

    #[test]
    fn test_full_run_writes_long_and_short_files() {
        let temp_dir = tempdir().unwrap();
        let (input, output) = setup(temp_dir.path());

        let engine = ExportEngineBuilder::new()
            .with_input_path(&input)
            .with_output_path(&output)
            .with_options(quiet_options())
            .build()
            .unwrap();
        let report = engine.run().unwrap();

        assert_eq!(report.parsed_records, 4);
        assert_eq!(report.publications_written, 2);
        assert_eq!(report.new_notes, 4);
        // Dune 有 3 条 -> 独立文件；Sample 1 条 -> 共享短笔记文件
        assert!(output.join("Frank Herbert - Dune.md").is_file());
        let short = fs::read_to_string(output.join("short_notes.md")).unwrap();
        assert!(short.contains("Me - Sample\n"));
        assert!(short.contains("- hello world\n"));
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let temp_dir = tempdir().unwrap();
        let (input, output) = setup(temp_dir.path());

        let build = || {
            ExportEngineBuilder::new()
                .with_input_path(&input)
                .with_output_path(&output)
                .with_options(quiet_options())
                .build()
                .unwrap()
        };
        let first = build().run().unwrap();
        assert_eq!(first.new_notes, 4);

        let long_before = fs::read_to_string(output.join("Frank Herbert - Dune.md")).unwrap();
        let short_before = fs::read_to_string(output.join("short_notes.md")).unwrap();

        let second = build().run().unwrap();
        assert_eq!(second.new_notes, 0);
        assert_eq!(second.publications_skipped, 2);
        assert_eq!(
            fs::read_to_string(output.join("Frank Herbert - Dune.md")).unwrap(),
            long_before
        );
        assert_eq!(
            fs::read_to_string(output.join("short_notes.md")).unwrap(),
            short_before
        );
    }

    #[test]
    fn test_selection_isolation() {
        let temp_dir = tempdir().unwrap();
        let (input, output) = setup(temp_dir.path());

        let engine = ExportEngineBuilder::new()
            .with_input_path(&input)
            .with_output_path(&output)
            .with_selection(Box::new(StaticSelection::new(vec!["Sample".to_string()])))
            .with_options(quiet_options())
            .build()
            .unwrap();
        let report = engine.run().unwrap();

        assert_eq!(report.publications_written, 1);
        assert!(output.join("short_notes.md").is_file());
        assert!(!output.join("Frank Herbert - Dune.md").exists());
    }

    #[test]
    fn test_missing_input_is_reported_before_processing() {
        let temp_dir = tempdir().unwrap();
        let output = temp_dir.path().join("clippings");

        let engine = ExportEngineBuilder::new()
            .with_input_path(temp_dir.path().join("nope.txt"))
            .with_output_path(&output)
            .with_options(quiet_options())
            .build()
            .unwrap();
        let result = engine.run();
        assert!(matches!(result, Err(ExportError::InputNotFound(_))));
    }

    #[test]
    fn test_parse_error_aborts_run() {
        let temp_dir = tempdir().unwrap();
        let input = temp_dir.path().join("bad.txt");
        fs::write(&input, "Title\nbroken metadata line\n\ntext\n==========\n").unwrap();

        let engine = ExportEngineBuilder::new()
            .with_input_path(&input)
            .with_output_path(temp_dir.path().join("out"))
            .with_options(quiet_options())
            .build()
            .unwrap();
        let result = engine.run();
        assert!(matches!(result, Err(ExportError::Parse(_))));
    }
}

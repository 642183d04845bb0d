// main.rs
use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};

use clip_export_demo::config::CONFIG;
use clip_export_demo::engine::ExportEngineBuilder;
use clip_export_demo::select::PromptSelection;

/// 简易命令行解析: [输入文件] [-o <输出目录>]
fn parse_args() -> (Option<PathBuf>, Option<PathBuf>) {
    let mut input = None;
    let mut output = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" | "--output" => output = args.next().map(PathBuf::from),
            _ => input = Some(PathBuf::from(arg)),
        }
    }
    (input, output)
}

fn main() -> Result<()> {
    let (input, output) = parse_args();

    println!("--- Kindle 剪贴导出 ---");
    println!(
        " [输入] {:?}",
        input
            .as_deref()
            .unwrap_or_else(|| Path::new(&CONFIG.paths.input_path))
    );

    let mut builder = ExportEngineBuilder::new().with_selection(Box::new(PromptSelection));
    if let Some(input) = input {
        builder = builder.with_input_path(input);
    }
    if let Some(output) = output {
        builder = builder.with_output_path(output);
    }

    let engine = builder.build()?;
    let report = engine.run()?;

    println!(
        " [完成] 解析 {} 条记录，写入 {} 个出版物，新增 {} 条笔记，跳过 {} 条已有笔记",
        report.parsed_records, report.publications_written, report.new_notes, report.skipped_notes
    );

    Ok(())
}

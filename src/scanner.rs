// scanner.rs - 已有输出扫描器
//! 重建 "已导出指纹" 集合
//!
//! 每次运行都从头扫描输出目录下的全部 Markdown 文件，
//! 收集形如 `<注释前缀><8位十六进制>` 的标记行

use anyhow::Result;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// 输出目录扫描器
pub struct OutputScanner {
    marker: Regex,
    verbose: bool,
}

impl OutputScanner {
    /// 按注释前缀构造标记行匹配器
    pub fn new(comment_prefix: &str) -> Self {
        // 前缀尾部空白并入 \s*，和手写标记行保持兼容
        let pattern = format!(
            r"^{}\s*([a-fA-F0-9]+)\s*",
            regex::escape(comment_prefix.trim_end())
        );
        Self {
            marker: Regex::new(&pattern).expect("comment prefix produced invalid regex"),
            verbose: true,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// 扫描输出目录，返回 指纹 -> 文件名 的映射
    ///
    /// 目录不存在时创建空目录；非 Markdown 扩展名跳过；
    /// 同一指纹出现多次时后写入者生效
    pub fn scan(&self, output_dir: &Path) -> Result<HashMap<String, String>> {
        if !output_dir.is_dir() {
            fs::create_dir_all(output_dir)?;
        }

        let mut existing: HashMap<String, String> = HashMap::new();

        for entry in WalkDir::new(output_dir)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("");
            if !ext.eq_ignore_ascii_case("md") {
                if self.verbose {
                    println!(" [扫描] 跳过非 Markdown 文件: {:?}", path.file_name().unwrap_or_default());
                }
                continue;
            }

            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let content = fs::read_to_string(path)?;

            let mut lines = 0usize;
            let mut hashes = 0usize;
            for line in content.lines() {
                lines += 1;
                if let Some(caps) = self.marker.captures(line) {
                    existing.insert(caps[1].to_lowercase(), filename.clone());
                    hashes += 1;
                }
            }
            if self.verbose {
                println!(" [扫描] {}: {} 行中找到 {} 个指纹", filename, lines, hashes);
            }
        }

        Ok(existing)
    }
}

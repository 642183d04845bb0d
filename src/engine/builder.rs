// engine/builder.rs - 导出引擎构建器
//! 使用 Builder 模式构建 ExportEngine

use std::path::PathBuf;

use crate::config::CONFIG;
use crate::select::{SelectAll, SelectionProvider};
use crate::writer::WriterOptions;

use super::core::{ExportEngine, ExportResult};

/// 导出引擎构建器
pub struct ExportEngineBuilder {
    input_path: Option<PathBuf>,
    fallback_paths: Option<Vec<PathBuf>>,
    output_path: Option<PathBuf>,
    selection: Box<dyn SelectionProvider>,
    options: Option<WriterOptions>,
}

impl Default for ExportEngineBuilder {
    fn default() -> Self {
        Self {
            input_path: None,
            fallback_paths: None,
            output_path: None,
            selection: Box::new(SelectAll),
            options: None,
        }
    }
}

impl ExportEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置输入文件路径
    pub fn with_input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// 设置备用输入路径 (主路径不存在时依次探测)
    pub fn with_fallback_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.fallback_paths = Some(paths);
        self
    }

    /// 设置输出目录
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// 注入选择提供者 (默认全选)
    pub fn with_selection(mut self, selection: Box<dyn SelectionProvider>) -> Self {
        self.selection = selection;
        self
    }

    /// 覆盖写入行为参数
    pub fn with_options(mut self, options: WriterOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// 构建导出引擎，未设置的项取全局配置
    pub fn build(self) -> ExportResult<ExportEngine> {
        let input_path = self
            .input_path
            .unwrap_or_else(|| PathBuf::from(&CONFIG.paths.input_path));
        let fallback_paths = self.fallback_paths.unwrap_or_else(|| {
            CONFIG
                .paths
                .fallback_input_paths
                .iter()
                .map(PathBuf::from)
                .collect()
        });
        let output_path = self
            .output_path
            .unwrap_or_else(|| PathBuf::from(&CONFIG.paths.output_path));

        // 输出目录提前创建，保证后续扫描/写入可用
        std::fs::create_dir_all(&output_path)?;

        let options = self.options.unwrap_or_else(WriterOptions::from_config);

        Ok(ExportEngine {
            input_path,
            fallback_paths,
            output_path,
            selection: self.selection,
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builder() {
        let temp_dir = tempdir().unwrap();

        let result = ExportEngineBuilder::new()
            .with_input_path(temp_dir.path().join("clips.txt"))
            .with_output_path(temp_dir.path().join("out"))
            .with_options(WriterOptions::default())
            .build();

        assert!(result.is_ok());
        assert!(temp_dir.path().join("out").is_dir());
    }
}

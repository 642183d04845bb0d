// engine/mod.rs
//! 导出引擎: 扫描 -> 解析 -> 分组 -> 选择 -> 写入 的统一入口

pub mod builder;
pub mod core;

pub use builder::ExportEngineBuilder;
pub use core::{ExportEngine, ExportError, ExportReport, ExportResult};

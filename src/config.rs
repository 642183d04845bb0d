// 配置模块 - 支持外部配置文件
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// 配置文件路径
const CONFIG_FILE: &str = "./config.toml";

// ============== 配置结构体 ==============

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub export: ExportConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    /// 剪贴文件路径 (命令行参数优先)
    pub input_path: String,
    /// 找不到输入文件时依次探测的备用路径 ({user} 会被替换为当前用户名)
    pub fallback_input_paths: Vec<String>,
    /// 输出目录
    pub output_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    /// 笔记数 <= 阈值的出版物写入共享短笔记文件
    pub short_note_threshold: usize,
    /// 共享短笔记文件名
    pub short_notes_filename: String,
    /// 短标题硬截断长度 (字符数)
    pub short_title_max_len: usize,
    /// 去重标记行的注释前缀 (RST 风格注释)
    pub comment_prefix: String,
    /// 是否写入去重标记行
    pub write_markers: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    /// 是否逐条打印扫描/写入进度
    pub verbose: bool,
}

// ============== 默认配置 ==============

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig {
                input_path: "My Clippings.txt".to_string(),
                fallback_input_paths: vec![
                    "/media/{user}/Kindle/documents/My Clippings.txt".to_string(),
                ],
                output_path: "./clippings".to_string(),
            },
            export: ExportConfig {
                short_note_threshold: 2,
                short_notes_filename: "short_notes.md".to_string(),
                short_title_max_len: 127,
                comment_prefix: ".. ".to_string(),
                write_markers: true,
            },
            display: DisplayConfig { verbose: true },
        }
    }
}

// ============== 配置加载 ==============

impl AppConfig {
    /// 从配置文件加载，失败则使用默认配置
    pub fn load() -> Self {
        Self::load_from_file(CONFIG_FILE).unwrap_or_else(|e| {
            eprintln!(" [Config] 无法加载配置文件 '{}': {}", CONFIG_FILE, e);
            eprintln!(" [Config] 使用默认配置");
            Self::default()
        })
    }

    /// 从指定文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// 生成默认配置文件
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<(), Box<dyn std::error::Error>> {
        let default_content = include_str!("../config.toml");
        fs::write(path, default_content)?;
        Ok(())
    }
}

// ============== 全局配置实例 ==============

/// 全局配置实例 (懒加载)
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::load);

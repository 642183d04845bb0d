// select.rs - 出版物选择
//! 把 "选哪些书导出" 抽象成可注入的能力
//!
//! 交互式提示、命令行参数、配置文件都可以实现同一个 trait

use anyhow::Result;
use std::io::{self, Write};

/// 选择提供者: 给定可选标题，返回选中的子集
pub trait SelectionProvider {
    fn choose(&self, titles: &[String]) -> Result<Vec<String>>;
}

/// 全选
pub struct SelectAll;

impl SelectionProvider for SelectAll {
    fn choose(&self, titles: &[String]) -> Result<Vec<String>> {
        Ok(titles.to_vec())
    }
}

/// 固定子集 (测试和脚本场景)
pub struct StaticSelection {
    titles: Vec<String>,
}

impl StaticSelection {
    pub fn new(titles: Vec<String>) -> Self {
        Self { titles }
    }
}

impl SelectionProvider for StaticSelection {
    fn choose(&self, _titles: &[String]) -> Result<Vec<String>> {
        Ok(self.titles.clone())
    }
}

/// 交互式编号选择 (stdin)
///
/// 输入 0 表示全选；非法输入重新提示
pub struct PromptSelection;

impl SelectionProvider for PromptSelection {
    fn choose(&self, titles: &[String]) -> Result<Vec<String>> {
        println!("\n选择要导出的书 (可多选):");
        println!("[0]: 全部");
        for (i, title) in titles.iter().enumerate() {
            println!("[{}]: {}", i + 1, title);
        }

        loop {
            print!("\n输入一个或多个编号，空格分隔: ");
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            let numbers: Result<Vec<usize>, _> =
                input.split_whitespace().map(|s| s.parse()).collect();
            let numbers = match numbers {
                Ok(nums) if !nums.is_empty() => nums,
                _ => {
                    println!("请输入至少一个有效编号");
                    continue;
                }
            };

            if numbers.contains(&0) {
                return Ok(titles.to_vec());
            }
            if numbers.iter().any(|&n| n > titles.len()) {
                println!("请输入 0 到 {} 之间的编号", titles.len());
                continue;
            }

            return Ok(numbers.iter().map(|&n| titles[n - 1].clone()).collect());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_all_returns_everything() {
        let titles = vec!["A".to_string(), "B".to_string()];
        let chosen = SelectAll.choose(&titles).unwrap();
        assert_eq!(chosen, titles);
    }

    #[test]
    fn test_static_selection_ignores_available_list() {
        let provider = StaticSelection::new(vec!["B".to_string()]);
        let chosen = provider
            .choose(&["A".to_string(), "B".to_string()])
            .unwrap();
        assert_eq!(chosen, vec!["B".to_string()]);
    }
}

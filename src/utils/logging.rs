use anyhow::Result;
/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use std::fs;
use tracing::info;

use crate::models::Element;

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n题库导入日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `manifest`: 导入清单路径
/// - `output_folder`: 输出目录
pub fn log_startup(manifest: &str, output_folder: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 题库导入模式");
    info!("📋 导入清单: {}", manifest);
    info!("📁 输出目录: {}", output_folder);
    info!("{}", "=".repeat(60));
}

/// 记录单个题库的摘要：题库大小、考试题数和及格线
pub fn log_pool_summary(element: &Element) {
    info!("\n{}", "─".repeat(60));
    info!("[元素 {}] {}", element.number(), truncate_text(element.title(), 40));
    info!(
        "[元素 {}] 有效期: {} ~ {}",
        element.number(),
        element.valid_from().format("%Y-%m-%d"),
        element.valid_to().format("%Y-%m-%d")
    );
    info!("[元素 {}] 题库大小: {}", element.number(), element.pool_size());
    info!(
        "[元素 {}] 考试题数: {}",
        element.number(),
        element.default_questions_count()
    );
    info!(
        "[元素 {}] 及格线: {}",
        element.number(),
        element.default_minimum_correct()
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(success: usize, failed: usize, total: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部导入完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

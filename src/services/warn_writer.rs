//! 警告写入服务 - 业务能力层
//!
//! 只负责"写 warn.txt"能力，不关心流程

use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

use crate::error::AppResult;

/// 警告写入服务
///
/// 职责：
/// - 将处理失败的商品写入 warn.txt，便于事后单独重跑
/// - 只处理单个商品的警告
/// - 不关心流程顺序
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    /// 创建新的警告写入服务
    pub fn new() -> Self {
        Self {
            warn_file_path: "warn.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    /// 写入警告信息
    ///
    /// # 参数
    /// - `product_id`: 商品ID
    /// - `product_name`: 商品名称
    /// - `reason`: 失败原因
    pub async fn write(&self, product_id: u64, product_name: &str, reason: &str) -> AppResult<()> {
        debug!(
            "写入警告: 商品 {} | {} | 原因: {}",
            product_id, product_name, reason
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)?;

        let warn_msg = format!("商品 {} | {} | 原因: {}\n", product_id, product_name, reason);

        file.write_all(warn_msg.as_bytes())?;

        Ok(())
    }
}

impl Default for WarnWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_appends_lines() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let path = dir.path().join("warn.txt");
        let writer = WarnWriter::with_path(path.to_string_lossy().to_string());

        writer.write(1, "Boots", "生成失败").await.expect("写入失败");
        writer.write(2, "Scarf", "更新失败").await.expect("写入失败");

        let content = std::fs::read_to_string(&path).expect("读取失败");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("商品 1"));
        assert!(lines[1].contains("更新失败"));
    }
}

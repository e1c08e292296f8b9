use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单张图片的 alt 与标题文本
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageText {
    pub alt: String,
    pub title: String,
}

/// 内容生成的输出
///
/// 由生成能力产出，流程层据此构建更新载荷与结果记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizedContent {
    pub new_name: String,
    pub new_slug: String,
    /// 标题优化策略说明（模型给出）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_reason: Option<String>,
    /// 逗号分隔的关键词列表
    pub keywords: String,
    pub meta_description: String,
    pub description: String,
    /// 按图片位置（从 1 开始）索引的 alt/标题文本
    pub image_texts: BTreeMap<u32, ImageText>,
}

impl OptimizedContent {
    /// 主关键词（关键词列表的第一项）
    pub fn primary_keyword(&self) -> &str {
        self.keywords.split(',').next().unwrap_or("").trim()
    }
}

//! 关键词建议服务 - 业务能力层
//!
//! 只负责"关键词候选"能力：根据商品名称与分类生成基础关键词与长尾变体，
//! 供内容生成的提示词使用。完全确定性，不依赖外部服务。

use tracing::debug;

/// 电商常用修饰词（长尾变体用）
const MODIFIERS: &[&str] = &[
    "best",
    "top",
    "cheap",
    "premium",
    "luxury",
    "affordable",
    "buy",
    "online",
    "uk",
    "shop",
    "sale",
    "discount",
];

/// 关键词建议服务
pub struct KeywordResearch;

impl KeywordResearch {
    /// 创建新的关键词建议服务
    pub fn new() -> Self {
        Self
    }

    /// 基础词：商品名与分类按空白切分、小写化、去重（保持出现顺序）
    fn base_terms(&self, product_name: &str, category: &str) -> Vec<String> {
        let mut terms = Vec::new();
        for word in product_name
            .split_whitespace()
            .chain(category.split_whitespace())
        {
            let term = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if !term.is_empty() && !terms.contains(&term) {
                terms.push(term);
            }
        }
        terms
    }

    /// 生成关键词建议：基础词 + 修饰词组合的长尾变体，去重
    pub fn suggestions(&self, product_name: &str, category: &str) -> Vec<String> {
        let base = self.base_terms(product_name, category);

        let mut keywords = base.clone();
        for term in &base {
            for modifier in MODIFIERS {
                let prefixed = format!("{} {}", modifier, term);
                if !keywords.contains(&prefixed) {
                    keywords.push(prefixed);
                }
                let suffixed = format!("{} {}", term, modifier);
                if !keywords.contains(&suffixed) {
                    keywords.push(suffixed);
                }
            }
        }

        debug!(
            "为 '{}' 生成了 {} 个关键词候选",
            product_name,
            keywords.len()
        );

        keywords
    }
}

impl Default for KeywordResearch {
    fn default() -> Self {
        Self::new()
    }
}

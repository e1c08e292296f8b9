use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Yoast SEO 元描述的 meta 键
pub const META_DESC_KEY: &str = "_yoast_wpseo_metadesc";
/// Yoast SEO 焦点关键词的 meta 键
pub const FOCUS_KEYWORD_KEY: &str = "_yoast_wpseo_focuskw";

/// WooCommerce 商品数据结构
///
/// 编排层只持有只读副本，回写通过 [`ProductUpdate`] 进行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub meta_data: Vec<MetaItem>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Product {
    /// 读取指定 meta 键的文本值
    pub fn meta_text(&self, key: &str) -> Option<&str> {
        self.meta_data
            .iter()
            .find(|item| item.key == key)
            .and_then(|item| item.value.as_str())
    }

    /// 当前的 SEO 元描述（无则为空串）
    pub fn meta_description(&self) -> &str {
        self.meta_text(META_DESC_KEY).unwrap_or("")
    }

    /// 当前的焦点关键词（无则为空串）
    pub fn focus_keyword(&self) -> &str {
        self.meta_text(FOCUS_KEYWORD_KEY).unwrap_or("")
    }

    /// 商品分类名称（逗号拼接）
    pub fn category_names(&self) -> String {
        self.categories
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// 商品页面链接（permalink 为空时按 slug 拼接）
    pub fn link(&self, base_url: &str) -> String {
        if !self.permalink.is_empty() {
            self.permalink.clone()
        } else {
            format!("{}/product/{}", base_url.trim_end_matches('/'), self.slug)
        }
    }
}

/// 商品图片
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub src: String,
    /// 图片 alt 文本
    #[serde(default)]
    pub alt: String,
    /// 图片标题（WooCommerce 中为 name 字段）
    #[serde(default)]
    pub name: String,
}

/// 商品 meta 记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaItem {
    pub key: String,
    pub value: Value,
}

impl MetaItem {
    /// 创建文本值的 meta 记录
    pub fn text(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: json!(value),
        }
    }
}

/// 商品分类
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// 商品部分更新载荷
///
/// 只携带优化涉及的字段，其余字段由目录保持原值
#[derive(Debug, Clone, Serialize)]
pub struct ProductUpdate {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub meta_data: Vec<MetaItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ProductImage>,
}

use crate::models::content::OptimizedContent;
use crate::models::product::Product;
use crate::models::run_state::Mode;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 跳过商品时写入结果的状态说明
pub const SKIP_DETAIL: &str = "跳过 — 已优化";

/// 单个商品结果的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Success,
    Error,
}

/// 单个商品的优化结果
///
/// 每个拉取到的商品恰好产生一条记录（成功或失败），加入结果序列后不再修改；
/// 无论何种模式都同时记录新旧值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub product_id: u64,
    pub product_name: String,
    pub new_product_name: String,
    pub product_link: String,
    pub old_slug: String,
    pub new_slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_change_reason: Option<String>,
    pub old_description: String,
    pub new_description: String,
    pub old_meta_description: String,
    pub meta_description: String,
    pub old_keywords: String,
    pub keywords: String,
    /// 按图片位置（从 1 开始）索引
    pub old_image_alts: BTreeMap<u32, String>,
    pub new_image_alts: BTreeMap<u32, String>,
    pub old_image_titles: BTreeMap<u32, String>,
    pub new_image_titles: BTreeMap<u32, String>,
    pub status: ItemStatus,
    pub status_detail: String,
    pub timestamp: DateTime<Local>,
}

impl OptimizationResult {
    /// 基础记录：旧值取自商品，新值镜像旧值
    fn base(product: &Product, link: String) -> Self {
        let mut old_image_alts = BTreeMap::new();
        let mut old_image_titles = BTreeMap::new();
        for (idx, image) in product.images.iter().enumerate() {
            let position = idx as u32 + 1;
            old_image_alts.insert(position, image.alt.clone());
            old_image_titles.insert(position, image.name.clone());
        }

        Self {
            product_id: product.id,
            product_name: product.name.clone(),
            new_product_name: product.name.clone(),
            product_link: link,
            old_slug: product.slug.clone(),
            new_slug: product.slug.clone(),
            title_change_reason: None,
            old_description: product.description.clone(),
            new_description: product.description.clone(),
            old_meta_description: product.meta_description().to_string(),
            meta_description: product.meta_description().to_string(),
            old_keywords: product.focus_keyword().to_string(),
            keywords: product.focus_keyword().to_string(),
            new_image_alts: old_image_alts.clone(),
            new_image_titles: old_image_titles.clone(),
            old_image_alts,
            old_image_titles,
            status: ItemStatus::Success,
            status_detail: String::new(),
            timestamp: Local::now(),
        }
    }

    /// 跳过的商品（已优化且未强制更新）：新旧值一致，状态为成功
    pub fn skipped(product: &Product, link: String) -> Self {
        let mut result = Self::base(product, link);
        result.status_detail = SKIP_DETAIL.to_string();
        result
    }

    /// 生成成功的商品：新值取自生成内容
    pub fn generated(product: &Product, link: String, content: &OptimizedContent) -> Self {
        let mut result = Self::base(product, link);
        result.new_product_name = content.new_name.clone();
        result.new_slug = content.new_slug.clone();
        result.title_change_reason = content.change_reason.clone();
        result.new_description = content.description.clone();
        result.meta_description = content.meta_description.clone();
        result.keywords = content.keywords.clone();
        result.new_image_alts = content
            .image_texts
            .iter()
            .map(|(pos, text)| (*pos, text.alt.clone()))
            .collect();
        result.new_image_titles = content
            .image_texts
            .iter()
            .map(|(pos, text)| (*pos, text.title.clone()))
            .collect();
        result.status_detail = "优化完成".to_string();
        result
    }

    /// 处理失败的商品：旧值保持，状态为失败
    pub fn failed(product: &Product, link: String, detail: String) -> Self {
        let mut result = Self::base(product, link);
        result.status = ItemStatus::Error;
        result.status_detail = detail;
        result
    }

    /// 将已有记录降级为失败（用于写入模式下的回写失败）
    pub fn with_error(mut self, detail: String) -> Self {
        self.status = ItemStatus::Error;
        self.status_detail = detail;
        self
    }
}

/// 一次运行（一页商品）的汇总报告
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: Mode,
    /// 按页内原始顺序排列的结果序列
    pub results: Vec<OptimizationResult>,
    /// 下一个待处理的页码
    pub current_page: u32,
    pub total_pages: u32,
    pub total_products: u64,
    /// 累计已处理的商品数量
    pub products_processed: u64,
    /// 状态保存失败时的警告（存在时下次运行可能重复或跳页）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker_warning: Option<String>,
}

impl RunReport {
    /// 本页成功的商品数量（含跳过）
    pub fn succeeded(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == ItemStatus::Success)
            .count()
    }

    /// 本页失败的商品数量
    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == ItemStatus::Error)
            .count()
    }
}

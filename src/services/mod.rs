//! 业务能力层（Services）
//!
//! 描述"我能做什么"，只处理单个商品，不关心流程顺序。
//! 目录读写与内容生成以 trait 的形式暴露，流程层针对能力编程，
//! 测试时可注入内存替身。

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{OptimizedContent, Product, ProductUpdate};

/// 商品目录读写能力
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// 拉取一页商品，返回 (商品列表, 商品总数)
    async fn list_page(&self, page: u32, page_size: u32) -> AppResult<(Vec<Product>, u64)>;

    /// 更新单个商品
    async fn update(&self, product_id: u64, payload: &ProductUpdate) -> AppResult<()>;
}

/// 内容生成能力
///
/// 每个商品每次运行最多调用一次；重试（若有）是实现内部的事情，
/// 对流程层只呈现一次成功或失败
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn optimize(
        &self,
        product: &Product,
        suggested_keywords: &[String],
    ) -> AppResult<OptimizedContent>;
}

pub mod catalog_service;
pub mod keyword_research;
pub mod run_tracker;
pub mod seo_generator;
pub mod warn_writer;

pub use catalog_service::CatalogService;
pub use keyword_research::KeywordResearch;
pub use run_tracker::RunTracker;
pub use seo_generator::SeoGenerator;
pub use warn_writer::WarnWriter;

//! 商品处理流程 - 流程层
//!
//! 核心职责：定义"一个商品"的完整处理流程
//!
//! 流程顺序：
//! 1. 跳过判定（已优化且未强制更新 → 直接返回成功）
//! 2. 内容生成（LLM，带超时，每个商品最多调用一次）
//! 3. 写入模式下回写目录（失败则降级为 error，不影响其他商品）
//! 4. 构建 OptimizationResult（无论何种模式都记录新旧值）
//!
//! 任何一步失败都转化为该商品的终态结果，绝不向兄弟商品传播。

use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::{
    Mode, OptimizationResult, OptimizedContent, Product, ProductImage, ProductUpdate,
};
use crate::models::product::{MetaItem, FOCUS_KEYWORD_KEY, META_DESC_KEY};
use crate::services::{CatalogApi, ContentGenerator, KeywordResearch, WarnWriter};
use crate::utils::logging::truncate_text;
use crate::workflow::product_ctx::ProductCtx;

/// 商品处理流程
///
/// - 编排完整的商品处理流程
/// - 决定何时跳过、何时生成、何时回写
/// - 不持有 HTTP 连接之类的资源细节
/// - 只依赖业务能力（services）
pub struct ProductFlow<C, G> {
    catalog: Arc<C>,
    generator: Arc<G>,
    keyword_research: KeywordResearch,
    warn_writer: WarnWriter,
    mode: Mode,
    force_update: bool,
    wp_base_url: String,
    llm_timeout_secs: u64,
    verbose_logging: bool,
}

impl<C, G> ProductFlow<C, G>
where
    C: CatalogApi,
    G: ContentGenerator,
{
    /// 创建新的商品处理流程
    pub fn new(config: &Config, catalog: Arc<C>, generator: Arc<G>) -> Self {
        Self {
            catalog,
            generator,
            keyword_research: KeywordResearch::new(),
            warn_writer: WarnWriter::with_path(config.warn_file.clone()),
            mode: config.mode(),
            force_update: config.force_update,
            wp_base_url: config.wp_base_url.clone(),
            llm_timeout_secs: config.llm_timeout_secs,
            verbose_logging: config.verbose_logging,
        }
    }

    /// 处理单个商品，总是返回一个终态结果
    pub async fn run(&self, product: &Product, ctx: &ProductCtx) -> OptimizationResult {
        let link = product.link(&self.wp_base_url);

        info!(
            "{} 开始处理: {}",
            ctx,
            truncate_text(&product.name, 60)
        );

        // ========== 步骤 1: 跳过判定 ==========
        if !self.force_update && is_already_optimized(product) {
            info!("{} ⏭️ 已优化，跳过", ctx);
            return OptimizationResult::skipped(product, link);
        }

        // ========== 步骤 2: 内容生成（带超时） ==========
        let suggestions = self
            .keyword_research
            .suggestions(&product.name, &product.category_names());

        let generation = timeout(
            Duration::from_secs(self.llm_timeout_secs),
            self.generator.optimize(product, &suggestions),
        )
        .await;

        let content = match generation {
            Ok(Ok(content)) => content,
            Ok(Err(e)) => {
                error!("{} ❌ 内容生成失败: {}", ctx, e);
                self.record_warn(product, "内容生成失败").await;
                return OptimizationResult::failed(product, link, format!("内容生成失败: {}", e));
            }
            Err(_) => {
                error!(
                    "{} ❌ 内容生成超时 ({}秒)",
                    ctx, self.llm_timeout_secs
                );
                self.record_warn(product, "内容生成超时").await;
                return OptimizationResult::failed(
                    product,
                    link,
                    format!("内容生成超时 ({}秒)", self.llm_timeout_secs),
                );
            }
        };

        if self.verbose_logging {
            info!(
                "{} 标题: {} -> {}",
                ctx,
                truncate_text(&product.name, 40),
                truncate_text(&content.new_name, 40)
            );
            info!("{} 关键词: {}", ctx, truncate_text(&content.keywords, 80));
        }

        // ========== 步骤 3: 写入模式下回写目录 ==========
        // 预览模式对目录是纯读取路径，即使 force_update 也不产生写入
        if self.mode == Mode::Write {
            let payload = build_update_payload(product, &content);
            if let Err(e) = self.catalog.update(product.id, &payload).await {
                error!("{} ❌ 商品更新失败: {}", ctx, e);
                self.record_warn(product, "商品更新失败").await;
                return OptimizationResult::generated(product, link, &content)
                    .with_error(format!("商品更新失败: {}", e));
            }
            info!("{} ✓ 商品更新成功", ctx);
        }

        // ========== 步骤 4: 构建结果 ==========
        info!("{} ✅ 处理完成", ctx);
        OptimizationResult::generated(product, link, &content)
    }

    /// 写入警告记录（失败本身只记日志，不影响结果）
    async fn record_warn(&self, product: &Product, reason: &str) {
        if let Err(e) = self
            .warn_writer
            .write(product.id, &product.name, reason)
            .await
        {
            warn!("⚠️ 写入 warn 记录失败: {}", e);
        }
    }
}

/// 已优化判定
///
/// 判定规则（确定性）：Yoast 的焦点关键词与元描述在去除首尾空白后均非空，
/// 即视为已优化。只要有一项缺失就重新生成。
pub fn is_already_optimized(product: &Product) -> bool {
    !product.focus_keyword().trim().is_empty() && !product.meta_description().trim().is_empty()
}

/// 根据生成内容构建商品更新载荷
fn build_update_payload(product: &Product, content: &OptimizedContent) -> ProductUpdate {
    // 在原图数据上刷新 alt 与标题
    let images: Vec<ProductImage> = product
        .images
        .iter()
        .enumerate()
        .map(|(idx, image)| {
            let position = idx as u32 + 1;
            let mut image = image.clone();
            if let Some(text) = content.image_texts.get(&position) {
                image.alt = text.alt.clone();
                image.name = text.title.clone();
            }
            image
        })
        .collect();

    ProductUpdate {
        name: content.new_name.clone(),
        slug: content.new_slug.clone(),
        description: content.description.clone(),
        meta_data: vec![
            MetaItem::text(META_DESC_KEY, &content.meta_description),
            // Yoast 焦点关键词只取主关键词
            MetaItem::text(FOCUS_KEYWORD_KEY, content.primary_keyword()),
        ],
        images,
    }
}

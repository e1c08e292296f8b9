//! 单页商品处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责处理单页的所有商品，是页级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **并发控制**：使用 Semaphore 限制页内并发数量
//! 2. **错误隔离**：单个商品的失败（包括任务崩溃）转化为该商品的 error 结果
//! 3. **顺序保证**：全部商品达到终态后按页内原始顺序收集
//! 4. **不重不漏**：每个拉取到的商品恰好产生一条结果

use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::error::{AppError, AppResult};
use crate::models::{ItemStatus, OptimizationResult, Product};
use crate::services::{CatalogApi, ContentGenerator};
use crate::workflow::{ProductCtx, ProductFlow};

/// 页内处理统计
#[derive(Debug, Default)]
pub struct PageStats {
    pub succeeded: usize,
    pub failed: usize,
}

impl PageStats {
    /// 从结果序列汇总统计
    pub fn from_results(results: &[OptimizationResult]) -> Self {
        let mut stats = Self::default();
        for result in results {
            match result.status {
                ItemStatus::Success => stats.succeeded += 1,
                ItemStatus::Error => stats.failed += 1,
            }
        }
        stats
    }
}

/// 处理一页商品
///
/// 页内商品并发处理（Semaphore 限流），全部达到终态后按原始顺序返回结果。
/// 单个商品的失败绝不取消或阻塞兄弟商品。
pub async fn process_page<C, G>(
    flow: Arc<ProductFlow<C, G>>,
    products: Vec<Product>,
    page: u32,
    max_concurrent: usize,
) -> AppResult<Vec<OptimizationResult>>
where
    C: CatalogApi + 'static,
    G: ContentGenerator + 'static,
{
    let total = products.len();
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));

    let mut fallbacks = Vec::with_capacity(total);
    let mut handles = Vec::with_capacity(total);

    for (idx, product) in products.into_iter().enumerate() {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AppError::Other(format!("并发许可获取失败: {}", e)))?;

        let flow = flow.clone();
        let ctx = ProductCtx::new(page, idx + 1, total);

        // 任务崩溃时用于兜底构建结果
        fallbacks.push(product.clone());

        let handle = tokio::spawn(async move {
            let _permit = permit;
            flow.run(&product, &ctx).await
        });
        handles.push(handle);
    }

    // 等待本页所有商品达到终态（spawn 顺序即页内顺序）
    let joined = futures::future::join_all(handles).await;

    let mut results = Vec::with_capacity(total);
    for (product, outcome) in fallbacks.iter().zip(joined) {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                error!("[第{}页] 商品 {} 任务执行失败: {}", page, product.id, e);
                results.push(OptimizationResult::failed(
                    product,
                    product.link(""),
                    format!("任务执行失败: {}", e),
                ));
            }
        }
    }

    let stats = PageStats::from_results(&results);
    info!(
        "[第{}页] 商品统计: 成功 {}, 失败 {}, 总计 {}",
        page, stats.succeeded, stats.failed, total
    );

    Ok(results)
}

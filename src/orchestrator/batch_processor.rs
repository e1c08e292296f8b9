//! 批量优化处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次运行（一页商品）的编排与状态推进。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、创建目录客户端与内容生成服务、加载游标
//! 2. **起始页解析**：显式 start_page > 已保存游标 > 第 1 页
//! 3. **页级处理**：拉取一页商品，委托 page_processor 并发处理
//! 4. **游标推进**：本页全部终态后 current_page + 1 并持久化
//! 5. **报告汇总**：返回含新旧值与分页元信息的 RunReport
//!
//! ## 设计特点
//!
//! - **一次运行一页**：页间严格串行，游标未提交绝不碰下一页
//! - **运行级错误与条目级错误分离**：页拉取失败中止运行且不推进游标；
//!   单个商品的失败只体现在该商品的结果里
//! - **游标保存失败降级为警告**：本次结果照常返回，但提示下次可能重跑

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{run_state, Mode, RunReport};
use crate::orchestrator::page_processor;
use crate::services::{
    CatalogApi, CatalogService, ContentGenerator, RunTracker, SeoGenerator,
};
use crate::utils::logging;
use crate::workflow::ProductFlow;

/// 应用主结构
pub struct App<C, G> {
    config: Config,
    catalog: Arc<C>,
    generator: Arc<G>,
    tracker: RunTracker,
}

impl App<CatalogService, SeoGenerator> {
    /// 初始化应用（真实服务）
    pub async fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;

        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;
        log_startup(&config);

        let catalog = Arc::new(CatalogService::new(&config)?);
        let generator = Arc::new(SeoGenerator::new(&config));
        let tracker = RunTracker::load(&config.state_file).await?;

        Ok(Self {
            config,
            catalog,
            generator,
            tracker,
        })
    }
}

impl<C, G> App<C, G>
where
    C: CatalogApi + 'static,
    G: ContentGenerator + 'static,
{
    /// 使用自定义组件构建（测试注入用）
    pub fn with_components(
        config: Config,
        catalog: Arc<C>,
        generator: Arc<G>,
        tracker: RunTracker,
    ) -> AppResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            catalog,
            generator,
            tracker,
        })
    }

    /// 运行一次优化（处理一页商品）
    pub async fn run(&self) -> AppResult<RunReport> {
        let mode = self.config.mode();
        let page_size = self.config.page_size;

        let mut state = self.tracker.get_or_init(mode, page_size).await;

        // ========== 解析起始页 ==========
        let page = match self.config.start_page {
            Some(explicit) => explicit,
            None => state.current_page,
        };
        log_run_start(mode, page, page_size, self.config.force_update);

        // ========== 拉取一页商品 ==========
        // 拉取失败属于运行级错误：直接返回，游标不推进
        let (products, total_products) = self.catalog.list_page(page, page_size).await?;
        let total_pages = run_state::total_pages(total_products, page_size);

        // 起始页越界：本序列已全部处理完毕，游标保持不变
        if products.is_empty() && page > total_pages {
            info!(
                "✅ 第 {} 页超出范围（共 {} 页），本序列已全部处理完毕",
                page, total_pages
            );
            return Ok(RunReport {
                mode,
                results: Vec::new(),
                current_page: state.current_page,
                total_pages,
                total_products,
                products_processed: state.products_processed,
                tracker_warning: None,
            });
        }

        let fetched = products.len();
        info!(
            "✓ 第 {} 页拉取成功: {} 个商品 / 全站共 {} 个",
            page, fetched, total_products
        );

        // ========== 处理页内商品 ==========
        let flow = Arc::new(ProductFlow::new(
            &self.config,
            self.catalog.clone(),
            self.generator.clone(),
        ));
        let results = page_processor::process_page(
            flow,
            products,
            page,
            self.config.max_concurrent_products,
        )
        .await?;

        // ========== 推进并保存游标 ==========
        // 本页所有商品均已终态，才允许推进
        state.current_page = page + 1;
        state.total_pages = total_pages;
        state.total_products = total_products;
        state.products_processed += fetched as u64;

        let tracker_warning = match self.tracker.save(&state).await {
            Ok(()) => None,
            Err(e) => {
                warn!("⚠️ 游标保存失败，下次运行可能重复或跳过本页: {}", e);
                Some(format!("游标保存失败: {}", e))
            }
        };

        let report = RunReport {
            mode,
            results,
            current_page: state.current_page,
            total_pages,
            total_products,
            products_processed: state.products_processed,
            tracker_warning,
        };

        print_final_stats(&report);

        Ok(report)
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 商品 SEO 批量优化");
    info!("📊 运行模式: {}", config.mode().label());
    info!("📄 页大小: {} | 页内并发: {}", config.page_size, config.max_concurrent_products);
    info!("{}", "=".repeat(60));
}

fn log_run_start(mode: Mode, page: u32, page_size: u32, force_update: bool) {
    info!(
        "📦 本次运行: {} 模式 | 第 {} 页 | 每页 {} 个 | 强制更新: {}",
        mode.label(),
        page,
        page_size,
        force_update
    );
}

fn print_final_stats(report: &RunReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 本次运行完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", report.succeeded(), report.results.len());
    info!("❌ 失败: {}", report.failed());
    info!(
        "📖 分页: 下一页 {} / 共 {} 页 | 全站 {} 个商品 | 累计已处理 {}",
        report.current_page, report.total_pages, report.total_products, report.products_processed
    );
    if let Some(warning) = &report.tracker_warning {
        info!("⚠️ {}", warning);
    }
    info!("{}", "=".repeat(60));
}

//! 编排层集成测试
//!
//! 使用内存替身驱动完整的"拉取 → 处理 → 游标推进"流程，
//! 不依赖真实的商城与 LLM 服务。

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use wp_seo_optimizer::error::{AppError, AppResult, ConfigError};
use wp_seo_optimizer::models::{
    ItemStatus, Mode, OptimizedContent, Product, ProductUpdate, SKIP_DETAIL,
};
use wp_seo_optimizer::models::product::{MetaItem, FOCUS_KEYWORD_KEY, META_DESC_KEY};
use wp_seo_optimizer::services::{CatalogApi, ContentGenerator, RunTracker};
use wp_seo_optimizer::{App, Config};

// ========== 测试替身 ==========

/// 内存商品目录
struct FakeCatalog {
    products: Vec<Product>,
    update_calls: AtomicUsize,
    updated_ids: Mutex<Vec<u64>>,
    /// 指定商品的更新调用返回失败
    fail_update_for: Option<u64>,
    /// 列表接口直接失败（模拟目录不可达）
    fail_list: bool,
}

impl FakeCatalog {
    fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            update_calls: AtomicUsize::new(0),
            updated_ids: Mutex::new(Vec::new()),
            fail_update_for: None,
            fail_list: false,
        }
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn list_page(&self, page: u32, page_size: u32) -> AppResult<(Vec<Product>, u64)> {
        if self.fail_list {
            return Err(AppError::Other("目录不可达".to_string()));
        }
        let total = self.products.len() as u64;
        let start = ((page - 1) * page_size) as usize;
        let items = self
            .products
            .iter()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn update(&self, product_id: u64, _payload: &ProductUpdate) -> AppResult<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_update_for == Some(product_id) {
            return Err(AppError::Other(format!("更新被拒绝 (ID: {})", product_id)));
        }
        self.updated_ids.lock().unwrap().push(product_id);
        Ok(())
    }
}

/// 固定输出的内容生成器
struct FakeGenerator {
    calls: AtomicUsize,
    /// 指定商品的生成调用返回失败
    fail_for: Option<u64>,
}

impl FakeGenerator {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_for: None,
        }
    }

    fn failing_for(product_id: u64) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_for: Some(product_id),
        }
    }
}

#[async_trait]
impl ContentGenerator for FakeGenerator {
    async fn optimize(
        &self,
        product: &Product,
        _suggested_keywords: &[String],
    ) -> AppResult<OptimizedContent> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_for == Some(product.id) {
            return Err(AppError::Other("生成失败".to_string()));
        }
        Ok(OptimizedContent {
            new_name: format!("Premium {}", product.name),
            new_slug: format!("premium-{}", product.slug),
            change_reason: Some("added power words".to_string()),
            keywords: "keyword one, keyword two".to_string(),
            meta_description: "Generated meta description".to_string(),
            description: "<p>Generated body copy</p>".to_string(),
            image_texts: BTreeMap::new(),
        })
    }
}

// ========== 测试辅助函数 ==========

fn make_product(id: u64, name: &str) -> Product {
    Product {
        id,
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        permalink: String::new(),
        description: format!("Old copy for {}", name),
        images: Vec::new(),
        meta_data: Vec::new(),
        categories: Vec::new(),
    }
}

/// 带有 Yoast 优化标记的商品（会命中跳过判定）
fn make_optimized_product(id: u64, name: &str) -> Product {
    let mut product = make_product(id, name);
    product.meta_data = vec![
        MetaItem::text(META_DESC_KEY, "Existing meta"),
        MetaItem::text(FOCUS_KEYWORD_KEY, "shoes,boots"),
    ];
    product
}

fn test_config(dir: &tempfile::TempDir, page_size: u32, dry_run: bool) -> Config {
    Config {
        dry_run,
        page_size,
        wp_base_url: "https://shop.test".to_string(),
        llm_api_key: "test-key".to_string(),
        state_file: dir
            .path()
            .join("run_state.json")
            .to_string_lossy()
            .to_string(),
        warn_file: dir.path().join("warn.txt").to_string_lossy().to_string(),
        ..Config::default()
    }
}

async fn make_app(
    config: Config,
    catalog: Arc<FakeCatalog>,
    generator: Arc<FakeGenerator>,
) -> App<FakeCatalog, FakeGenerator> {
    let tracker = RunTracker::load(&config.state_file).await.expect("加载游标失败");
    App::with_components(config, catalog, generator, tracker).expect("构建应用失败")
}

// ========== 分页与恢复 ==========

/// 5 个商品、每页 2 个：连续运行应依次处理第 1/2/3 页，
/// 每个商品恰好处理一次，第 3 页只有 1 个商品
#[tokio::test]
async fn test_sequential_runs_cover_catalog_exactly_once() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let products: Vec<Product> = (1..=5)
        .map(|id| make_product(id, &format!("Product {}", id)))
        .collect();
    let catalog = Arc::new(FakeCatalog::new(products));
    let generator = Arc::new(FakeGenerator::new());

    let mut seen_ids = Vec::new();

    for expected_page in 1..=3u32 {
        // 每次运行重新加载游标，等价于进程重启后恢复
        let app = make_app(test_config(&dir, 2, true), catalog.clone(), generator.clone()).await;
        let report = app.run().await.expect("运行失败");

        assert_eq!(report.total_pages, 3);
        assert_eq!(report.total_products, 5);
        assert_eq!(report.current_page, expected_page + 1);

        let expected_len = if expected_page == 3 { 1 } else { 2 };
        assert_eq!(report.results.len(), expected_len);

        seen_ids.extend(report.results.iter().map(|r| r.product_id));
    }

    // 不重不漏
    assert_eq!(seen_ids, vec![1, 2, 3, 4, 5]);

    // 序列处理完毕后再运行：空结果，游标不动
    let app = make_app(test_config(&dir, 2, true), catalog.clone(), generator.clone()).await;
    let report = app.run().await.expect("运行失败");
    assert!(report.results.is_empty());
    assert_eq!(report.current_page, 4);
    assert_eq!(report.products_processed, 5);
}

/// 显式 start_page 优先于已保存的游标
#[tokio::test]
async fn test_explicit_start_page_wins() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let products: Vec<Product> = (1..=5)
        .map(|id| make_product(id, &format!("Product {}", id)))
        .collect();
    let catalog = Arc::new(FakeCatalog::new(products));
    let generator = Arc::new(FakeGenerator::new());

    let config = Config {
        start_page: Some(2),
        ..test_config(&dir, 2, true)
    };
    let app = make_app(config, catalog, generator).await;
    let report = app.run().await.expect("运行失败");

    let ids: Vec<u64> = report.results.iter().map(|r| r.product_id).collect();
    assert_eq!(ids, vec![3, 4]);
    assert_eq!(report.current_page, 3);
}

/// 不同模式、不同页大小的游标互不干扰
#[tokio::test]
async fn test_cursors_are_keyed_by_mode_and_page_size() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let products: Vec<Product> = (1..=6)
        .map(|id| make_product(id, &format!("Product {}", id)))
        .collect();
    let catalog = Arc::new(FakeCatalog::new(products));
    let generator = Arc::new(FakeGenerator::new());

    // 预览模式跑一页（页大小 2）
    let app = make_app(test_config(&dir, 2, true), catalog.clone(), generator.clone()).await;
    app.run().await.expect("运行失败");

    // 页大小 3 的预览序列仍从第 1 页开始
    let app = make_app(test_config(&dir, 3, true), catalog.clone(), generator.clone()).await;
    let report = app.run().await.expect("运行失败");
    let ids: Vec<u64> = report.results.iter().map(|r| r.product_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let tracker = RunTracker::load(dir.path().join("run_state.json"))
        .await
        .expect("加载游标失败");
    assert_eq!(tracker.get_or_init(Mode::DryRun, 2).await.current_page, 2);
    assert_eq!(tracker.get_or_init(Mode::DryRun, 3).await.current_page, 2);
    assert_eq!(tracker.get_or_init(Mode::Write, 2).await.current_page, 1);
}

// ========== 模式与副作用 ==========

/// 预览模式对目录是纯读取路径：即使强制更新也没有任何 update 调用
#[tokio::test]
async fn test_dry_run_never_calls_update() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let products = vec![
        make_product(1, "Product 1"),
        make_optimized_product(2, "Product 2"),
    ];
    let catalog = Arc::new(FakeCatalog::new(products));
    let generator = Arc::new(FakeGenerator::new());

    let config = Config {
        force_update: true,
        ..test_config(&dir, 10, true)
    };
    let app = make_app(config, catalog.clone(), generator).await;
    let report = app.run().await.expect("运行失败");

    assert_eq!(report.results.len(), 2);
    assert_eq!(catalog.update_calls.load(Ordering::SeqCst), 0);
    // 预览模式仍然报告将要发生的变化
    assert_eq!(report.results[0].new_product_name, "Premium Product 1");
}

/// 写入模式下全部生成成功的商品都会回写
#[tokio::test]
async fn test_write_mode_updates_catalog() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let products = vec![make_product(1, "Product 1"), make_product(2, "Product 2")];
    let catalog = Arc::new(FakeCatalog::new(products));
    let generator = Arc::new(FakeGenerator::new());

    let app = make_app(test_config(&dir, 10, false), catalog.clone(), generator).await;
    let report = app.run().await.expect("运行失败");

    assert_eq!(report.succeeded(), 2);
    let mut updated = catalog.updated_ids.lock().unwrap().clone();
    updated.sort();
    assert_eq!(updated, vec![1, 2]);
}

/// 写入失败只降级该商品：旧值保持，兄弟商品照常回写，游标照常推进
#[tokio::test]
async fn test_update_failure_is_isolated_and_page_advances() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let products = vec![
        make_product(41, "Product 41"),
        make_product(42, "Product 42"),
        make_product(43, "Product 43"),
    ];
    let mut catalog = FakeCatalog::new(products);
    catalog.fail_update_for = Some(42);
    let catalog = Arc::new(catalog);
    let generator = Arc::new(FakeGenerator::new());

    let app = make_app(test_config(&dir, 10, false), catalog.clone(), generator).await;
    let report = app.run().await.expect("运行失败");

    let failed = &report.results[1];
    assert_eq!(failed.product_id, 42);
    assert_eq!(failed.status, ItemStatus::Error);
    assert!(failed.status_detail.contains("商品更新失败"));
    // 旧值等于运行前的值
    assert_eq!(failed.product_name, "Product 42");
    assert_eq!(failed.old_meta_description, "");
    assert_eq!(failed.old_keywords, "");

    // 兄弟商品不受影响
    let mut updated = catalog.updated_ids.lock().unwrap().clone();
    updated.sort();
    assert_eq!(updated, vec![41, 43]);

    // 游标仍然推进
    assert_eq!(report.current_page, 2);
}

// ========== 错误隔离 ==========

/// 中间商品生成失败，前后商品仍达到终态，且结果保持页内顺序
#[tokio::test]
async fn test_generation_failure_does_not_block_siblings() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let products = vec![
        make_product(1, "Product 1"),
        make_product(2, "Product 2"),
        make_product(3, "Product 3"),
    ];
    let catalog = Arc::new(FakeCatalog::new(products));
    let generator = Arc::new(FakeGenerator::failing_for(2));

    let app = make_app(test_config(&dir, 10, true), catalog, generator).await;
    let report = app.run().await.expect("运行失败");

    // 每个拉取到的商品恰好一条结果，顺序与页内一致
    let ids: Vec<u64> = report.results.iter().map(|r| r.product_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    assert_eq!(report.results[0].status, ItemStatus::Success);
    assert_eq!(report.results[1].status, ItemStatus::Error);
    assert!(report.results[1].status_detail.contains("内容生成失败"));
    assert_eq!(report.results[2].status, ItemStatus::Success);
}

/// 页拉取失败属于运行级错误：没有输出，游标不推进
#[tokio::test]
async fn test_page_fetch_failure_aborts_without_advancing() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let mut catalog = FakeCatalog::new(vec![make_product(1, "Product 1")]);
    catalog.fail_list = true;
    let catalog = Arc::new(catalog);
    let generator = Arc::new(FakeGenerator::new());

    let config = test_config(&dir, 10, true);
    let state_file = config.state_file.clone();
    let app = make_app(config, catalog, generator).await;

    assert!(app.run().await.is_err());

    let tracker = RunTracker::load(&state_file).await.expect("加载游标失败");
    assert_eq!(tracker.get_or_init(Mode::DryRun, 10).await.current_page, 1);
}

// ========== 跳过判定 ==========

/// 已优化商品在未强制更新时被跳过：状态成功、新旧一致、不调用生成器
#[tokio::test]
async fn test_skip_already_optimized_product() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let catalog = Arc::new(FakeCatalog::new(vec![make_optimized_product(7, "Boots")]));
    let generator = Arc::new(FakeGenerator::new());

    let app = make_app(test_config(&dir, 10, true), catalog, generator.clone()).await;
    let report = app.run().await.expect("运行失败");

    let result = &report.results[0];
    assert_eq!(result.status, ItemStatus::Success);
    assert_eq!(result.status_detail, SKIP_DETAIL);
    assert_eq!(result.product_name, result.new_product_name);
    assert_eq!(result.old_keywords, result.keywords);
    assert_eq!(result.old_meta_description, result.meta_description);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

/// 强制更新会绕过跳过判定
#[tokio::test]
async fn test_force_update_bypasses_skip() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let catalog = Arc::new(FakeCatalog::new(vec![make_optimized_product(7, "Boots")]));
    let generator = Arc::new(FakeGenerator::new());

    let config = Config {
        force_update: true,
        ..test_config(&dir, 10, true)
    };
    let app = make_app(config, catalog, generator.clone()).await;
    let report = app.run().await.expect("运行失败");

    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(report.results[0].new_product_name, "Premium Boots");
}

// ========== 配置校验与降级 ==========

/// 页大小为 0 在任何处理发生之前被拒绝
#[tokio::test]
async fn test_zero_page_size_rejected_before_processing() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let catalog = Arc::new(FakeCatalog::new(Vec::new()));
    let generator = Arc::new(FakeGenerator::new());
    let config = test_config(&dir, 0, true);
    let tracker = RunTracker::load(&config.state_file).await.expect("加载游标失败");

    let result = App::with_components(config, catalog, generator, tracker);
    assert!(matches!(
        result.err(),
        Some(AppError::Config(ConfigError::InvalidPageSize { value: 0 }))
    ));
}

/// 游标保存失败降级为报告警告，本次结果照常返回
#[tokio::test]
async fn test_tracker_persist_failure_degrades_to_warning() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let catalog = Arc::new(FakeCatalog::new(vec![make_product(1, "Product 1")]));
    let generator = Arc::new(FakeGenerator::new());

    // 状态文件指向不存在的目录，保存必然失败
    let config = Config {
        state_file: dir
            .path()
            .join("missing_dir/run_state.json")
            .to_string_lossy()
            .to_string(),
        ..test_config(&dir, 10, true)
    };
    let app = make_app(config, catalog, generator).await;
    let report = app.run().await.expect("运行失败");

    assert_eq!(report.results.len(), 1);
    assert!(report.tracker_warning.is_some());
}

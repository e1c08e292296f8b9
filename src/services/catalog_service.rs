//! WooCommerce 商品目录服务 - 业务能力层
//!
//! 只负责商品的读取与更新能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `reqwest` 调用 WooCommerce REST v3 接口
//! - consumer key/secret 走 HTTP Basic 认证
//! - 客户端级超时，慢目录不会拖死整次运行

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult, CatalogError};
use crate::models::{Product, ProductUpdate};
use crate::services::CatalogApi;

/// 商品总数响应头
const TOTAL_HEADER: &str = "X-WP-Total";

/// WooCommerce 目录客户端
pub struct CatalogService {
    client: reqwest::Client,
    api_base: String,
    consumer_key: String,
    consumer_secret: String,
}

impl CatalogService {
    /// 创建新的目录客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| AppError::catalog_request_failed("client builder", e))?;

        Ok(Self {
            client,
            api_base: format!(
                "{}/wp-json/wc/v3",
                config.wp_base_url.trim_end_matches('/')
            ),
            consumer_key: config.wc_consumer_key.clone(),
            consumer_secret: config.wc_consumer_secret.clone(),
        })
    }
}

#[async_trait]
impl CatalogApi for CatalogService {
    async fn list_page(&self, page: u32, page_size: u32) -> AppResult<(Vec<Product>, u64)> {
        let endpoint = format!("{}/products", self.api_base);
        debug!("拉取商品列表: page={}, per_page={}", page, page_size);

        let response = self
            .client
            .get(&endpoint)
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .query(&[
                ("per_page", page_size.to_string()),
                ("page", page.to_string()),
                ("status", "publish".to_string()),
                ("orderby", "date".to_string()),
                ("order", "desc".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::catalog_request_failed(&endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Catalog(CatalogError::BadStatus {
                endpoint,
                status: status.as_u16(),
            }));
        }

        let total = response
            .headers()
            .get(TOTAL_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| {
                AppError::Catalog(CatalogError::MissingTotalHeader {
                    endpoint: endpoint.clone(),
                })
            })?;

        let products: Vec<Product> = response
            .json()
            .await
            .map_err(|e| AppError::Catalog(CatalogError::JsonParseFailed { source: Box::new(e) }))?;

        debug!("本页 {} 个商品 / 共 {} 个", products.len(), total);

        Ok((products, total))
    }

    async fn update(&self, product_id: u64, payload: &ProductUpdate) -> AppResult<()> {
        let endpoint = format!("{}/products/{}", self.api_base, product_id);
        debug!("更新商品: {}", endpoint);

        let response = self
            .client
            .put(&endpoint)
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::update_failed(product_id, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Catalog(CatalogError::UpdateRejected {
                product_id,
                status: status.as_u16(),
            }));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            wp_base_url: "https://shop.example.com/".to_string(),
            wc_consumer_key: "ck_test".to_string(),
            wc_consumer_secret: "cs_test".to_string(),
            llm_api_key: "test-key".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_api_base_strips_trailing_slash() {
        let service = CatalogService::new(&test_config()).expect("创建目录客户端失败");
        assert_eq!(service.api_base, "https://shop.example.com/wp-json/wc/v3");
    }

    /// 连通性测试（需要真实的商城凭据）
    ///
    /// 运行方式：
    /// ```bash
    /// cargo test test_list_first_page -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_list_first_page() {
        let config = Config::from_env();
        let service = CatalogService::new(&config).expect("创建目录客户端失败");

        let (products, total) = service.list_page(1, 5).await.expect("拉取商品失败");

        println!("共 {} 个商品，本页 {} 个", total, products.len());
        for product in &products {
            println!("  #{} {}", product.id, product.name);
        }
        assert!(products.len() <= 5);
    }
}

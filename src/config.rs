use crate::error::{AppResult, ConfigError};
use crate::models::Mode;
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    // --- 运行参数 ---
    /// 预览模式（不回写目录）
    pub dry_run: bool,
    /// 强制更新（忽略"已优化"判定）
    pub force_update: bool,
    /// 每页处理的商品数量
    pub page_size: u32,
    /// 显式起始页（不指定时从上次的游标恢复）
    pub start_page: Option<u32>,
    /// 页内并发处理的商品数量
    pub max_concurrent_products: usize,
    // --- WooCommerce API 配置 ---
    pub wp_base_url: String,
    pub wc_consumer_key: String,
    pub wc_consumer_secret: String,
    /// HTTP 请求超时（秒）
    pub http_timeout_secs: u64,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 单个商品内容生成的超时（秒）
    pub llm_timeout_secs: u64,
    // --- 本地文件 ---
    /// 分页游标状态文件
    pub state_file: String,
    /// 失败商品记录文件
    pub warn_file: String,
    /// 运行报告输出文件
    pub report_file: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dry_run: true,
            force_update: false,
            page_size: 10,
            start_page: None,
            max_concurrent_products: 4,
            wp_base_url: String::new(),
            wc_consumer_key: String::new(),
            wc_consumer_secret: String::new(),
            http_timeout_secs: 30,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-3.5-turbo".to_string(),
            llm_timeout_secs: 120,
            state_file: "run_state.json".to_string(),
            warn_file: "warn.txt".to_string(),
            report_file: "optimization_report.json".to_string(),
            output_log_file: "output.txt".to_string(),
            verbose_logging: false,
        }
    }
}

/// config.toml 的可选覆盖项（缺省字段保持原值）
#[derive(Debug, Default, Deserialize)]
struct FileOverrides {
    dry_run: Option<bool>,
    force_update: Option<bool>,
    page_size: Option<u32>,
    start_page: Option<u32>,
    max_concurrent_products: Option<usize>,
    wp_base_url: Option<String>,
    wc_consumer_key: Option<String>,
    wc_consumer_secret: Option<String>,
    http_timeout_secs: Option<u64>,
    llm_api_key: Option<String>,
    llm_api_base_url: Option<String>,
    llm_model_name: Option<String>,
    llm_timeout_secs: Option<u64>,
    state_file: Option<String>,
    warn_file: Option<String>,
    report_file: Option<String>,
    output_log_file: Option<String>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 加载完整配置
    ///
    /// 优先级：默认值 < config.toml < 环境变量
    pub async fn load() -> AppResult<Self> {
        let mut config = Self::default();
        config.apply_file(Path::new("config.toml")).await?;
        config.apply_env();
        Ok(config)
    }

    /// 仅从环境变量加载（在默认值之上覆盖）
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// 叠加 config.toml（文件不存在时静默跳过）
    async fn apply_file(&mut self, path: &Path) -> AppResult<()> {
        if !path.exists() {
            return Ok(());
        }
        let content = tokio::fs::read_to_string(path).await?;
        let overrides: FileOverrides = toml::from_str(&content)?;

        if let Some(v) = overrides.dry_run {
            self.dry_run = v;
        }
        if let Some(v) = overrides.force_update {
            self.force_update = v;
        }
        if let Some(v) = overrides.page_size {
            self.page_size = v;
        }
        if overrides.start_page.is_some() {
            self.start_page = overrides.start_page;
        }
        if let Some(v) = overrides.max_concurrent_products {
            self.max_concurrent_products = v;
        }
        if let Some(v) = overrides.wp_base_url {
            self.wp_base_url = v;
        }
        if let Some(v) = overrides.wc_consumer_key {
            self.wc_consumer_key = v;
        }
        if let Some(v) = overrides.wc_consumer_secret {
            self.wc_consumer_secret = v;
        }
        if let Some(v) = overrides.http_timeout_secs {
            self.http_timeout_secs = v;
        }
        if let Some(v) = overrides.llm_api_key {
            self.llm_api_key = v;
        }
        if let Some(v) = overrides.llm_api_base_url {
            self.llm_api_base_url = v;
        }
        if let Some(v) = overrides.llm_model_name {
            self.llm_model_name = v;
        }
        if let Some(v) = overrides.llm_timeout_secs {
            self.llm_timeout_secs = v;
        }
        if let Some(v) = overrides.state_file {
            self.state_file = v;
        }
        if let Some(v) = overrides.warn_file {
            self.warn_file = v;
        }
        if let Some(v) = overrides.report_file {
            self.report_file = v;
        }
        if let Some(v) = overrides.output_log_file {
            self.output_log_file = v;
        }
        if let Some(v) = overrides.verbose_logging {
            self.verbose_logging = v;
        }

        Ok(())
    }

    /// 叠加环境变量
    fn apply_env(&mut self) {
        self.dry_run = std::env::var("DRY_RUN").ok().and_then(|v| v.parse().ok()).unwrap_or(self.dry_run);
        self.force_update = std::env::var("FORCE_UPDATE").ok().and_then(|v| v.parse().ok()).unwrap_or(self.force_update);
        self.page_size = std::env::var("PAGE_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(self.page_size);
        self.start_page = std::env::var("START_PAGE").ok().and_then(|v| v.parse().ok()).or(self.start_page);
        self.max_concurrent_products = std::env::var("MAX_CONCURRENT_PRODUCTS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.max_concurrent_products);
        self.wp_base_url = std::env::var("WP_BASE_URL").unwrap_or_else(|_| self.wp_base_url.clone());
        self.wc_consumer_key = std::env::var("WC_CONSUMER_KEY").unwrap_or_else(|_| self.wc_consumer_key.clone());
        self.wc_consumer_secret = std::env::var("WC_CONSUMER_SECRET").unwrap_or_else(|_| self.wc_consumer_secret.clone());
        self.http_timeout_secs = std::env::var("HTTP_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.http_timeout_secs);
        self.llm_api_key = std::env::var("LLM_API_KEY").unwrap_or_else(|_| self.llm_api_key.clone());
        self.llm_api_base_url = std::env::var("LLM_API_BASE_URL").unwrap_or_else(|_| self.llm_api_base_url.clone());
        self.llm_model_name = std::env::var("LLM_MODEL_NAME").unwrap_or_else(|_| self.llm_model_name.clone());
        self.llm_timeout_secs = std::env::var("LLM_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.llm_timeout_secs);
        self.state_file = std::env::var("STATE_FILE").unwrap_or_else(|_| self.state_file.clone());
        self.warn_file = std::env::var("WARN_FILE").unwrap_or_else(|_| self.warn_file.clone());
        self.report_file = std::env::var("REPORT_FILE").unwrap_or_else(|_| self.report_file.clone());
        self.output_log_file = std::env::var("OUTPUT_LOG_FILE").unwrap_or_else(|_| self.output_log_file.clone());
        self.verbose_logging = std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging);
    }

    /// 当前运行模式
    pub fn mode(&self) -> Mode {
        if self.dry_run {
            Mode::DryRun
        } else {
            Mode::Write
        }
    }

    /// 校验运行参数，任何 I/O 之前调用
    pub fn validate(&self) -> AppResult<()> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize { value: 0 }.into());
        }
        if self.start_page == Some(0) {
            return Err(ConfigError::InvalidStartPage { value: 0 }.into());
        }
        if self.wp_base_url.trim().is_empty() {
            return Err(ConfigError::MissingCredential {
                var_name: "WP_BASE_URL".to_string(),
            }
            .into());
        }
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential {
                var_name: "LLM_API_KEY".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

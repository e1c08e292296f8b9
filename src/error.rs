use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 配置错误
    Config(ConfigError),
    /// 商品目录 API 错误
    Catalog(CatalogError),
    /// LLM 服务错误
    Llm(LlmError),
    /// 运行状态追踪错误
    Tracker(TrackerError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Catalog(e) => write!(f, "目录错误: {}", e),
            AppError::Llm(e) => write!(f, "LLM错误: {}", e),
            AppError::Tracker(e) => write!(f, "状态追踪错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(e) => Some(e),
            AppError::Catalog(e) => Some(e),
            AppError::Llm(e) => Some(e),
            AppError::Tracker(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 页大小非法（必须大于 0）
    InvalidPageSize {
        value: u32,
    },
    /// 起始页非法（必须大于等于 1）
    InvalidStartPage {
        value: u32,
    },
    /// 缺少必需的凭据
    MissingCredential {
        var_name: String,
    },
    /// 配置文件解析失败
    FileParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPageSize { value } => {
                write!(f, "页大小非法: {} (必须大于 0)", value)
            }
            ConfigError::InvalidStartPage { value } => {
                write!(f, "起始页非法: {} (必须大于等于 1)", value)
            }
            ConfigError::MissingCredential { var_name } => {
                write!(f, "缺少必需的凭据: {}", var_name)
            }
            ConfigError::FileParseFailed { path, source } => {
                write!(f, "配置文件解析失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 商品目录 API 错误
#[derive(Debug)]
pub enum CatalogError {
    /// 网络请求失败
    RequestFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回异常状态码
    BadStatus {
        endpoint: String,
        status: u16,
    },
    /// 响应缺少商品总数头（X-WP-Total）
    MissingTotalHeader {
        endpoint: String,
    },
    /// JSON 解析失败
    JsonParseFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 商品更新失败
    UpdateFailed {
        product_id: u64,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 商品更新被拒绝
    UpdateRejected {
        product_id: u64,
        status: u16,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::RequestFailed { endpoint, source } => {
                write!(f, "目录请求失败 ({}): {}", endpoint, source)
            }
            CatalogError::BadStatus { endpoint, status } => {
                write!(f, "目录接口返回异常状态 ({}): HTTP {}", endpoint, status)
            }
            CatalogError::MissingTotalHeader { endpoint } => {
                write!(f, "响应缺少 X-WP-Total 头: {}", endpoint)
            }
            CatalogError::JsonParseFailed { source } => {
                write!(f, "JSON解析失败: {}", source)
            }
            CatalogError::UpdateFailed { product_id, source } => {
                write!(f, "商品更新失败 (ID: {}): {}", product_id, source)
            }
            CatalogError::UpdateRejected { product_id, status } => {
                write!(f, "商品更新被拒绝 (ID: {}): HTTP {}", product_id, status)
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::RequestFailed { source, .. }
            | CatalogError::JsonParseFailed { source }
            | CatalogError::UpdateFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// LLM 服务错误
#[derive(Debug)]
pub enum LlmError {
    /// API 调用失败
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    EmptyContent {
        model: String,
    },
    /// 内容生成超时
    Timeout {
        model: String,
        secs: u64,
    },
    /// 响应解析失败
    ParseFailed {
        field: String,
        response: String,
    },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::ApiCallFailed { model, source } => {
                write!(f, "LLM API调用失败 (模型: {}): {}", model, source)
            }
            LlmError::EmptyContent { model } => {
                write!(f, "LLM返回内容为空 (模型: {})", model)
            }
            LlmError::Timeout { model, secs } => {
                write!(f, "LLM调用超时 (模型: {}, {}秒)", model, secs)
            }
            LlmError::ParseFailed { field, response } => {
                write!(f, "无法从LLM响应中解析 {} (响应: {})", field, response)
            }
        }
    }
}

impl std::error::Error for LlmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LlmError::ApiCallFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 运行状态追踪错误
#[derive(Debug)]
pub enum TrackerError {
    /// 状态文件加载失败
    LoadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 状态文件保存失败
    PersistFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::LoadFailed { path, source } => {
                write!(f, "状态文件加载失败 ({}): {}", path, source)
            }
            TrackerError::PersistFailed { path, source } => {
                write!(f, "状态文件保存失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for TrackerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackerError::LoadFailed { source, .. } | TrackerError::PersistFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Catalog(CatalogError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::FileParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Tracker(TrackerError::PersistFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建目录请求失败错误
    pub fn catalog_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Catalog(CatalogError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建商品更新失败错误
    pub fn update_failed(
        product_id: u64,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Catalog(CatalogError::UpdateFailed {
            product_id,
            source: Box::new(source),
        })
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建状态文件加载错误
    pub fn tracker_load_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Tracker(TrackerError::LoadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建状态文件保存错误
    pub fn tracker_persist_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Tracker(TrackerError::PersistFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

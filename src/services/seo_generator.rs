//! SEO 内容生成服务 - 业务能力层
//!
//! 只负责"内容生成"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）
//!
//! ## 生成策略
//! 一个商品拆成四个聚焦的提示词依次调用：标题+slug、关键词、元描述、正文。
//! 图片 alt/标题文本按图片位置确定性拼装，不走模型。
//! 对外（流程层）只呈现一次成功或失败，内部没有重试循环。

use async_trait::async_trait;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};
use crate::models::{ImageText, OptimizedContent, Product};
use crate::services::ContentGenerator;

/// URL slug 中剔除的英文停用词
static SLUG_STOP_WORDS: phf::Set<&'static str> = phf::phf_set! {
    "a", "an", "and", "as", "at", "by", "for", "from", "in", "of",
    "on", "or", "the", "to", "with",
};

/// slug 最大长度
const SLUG_MAX_LEN: usize = 60;

const TITLE_SYSTEM_PROMPT: &str = "You are a senior e-commerce marketing specialist with expertise in conversion optimization and SEO. Focus on creating titles and URLs that maximize both rankings and sales.";

const KEYWORD_SYSTEM_PROMPT: &str =
    "You are an SEO expert specializing in e-commerce keyword optimization.";

const META_SYSTEM_PROMPT: &str = "You are an e-commerce conversion specialist focusing on writing meta descriptions that maximize click-through rates and sales.";

const DESCRIPTION_SYSTEM_PROMPT: &str = "You are an expert e-commerce conversion copywriter specializing in product descriptions that drive sales while maintaining SEO best practices.";

/// SEO 内容生成服务
///
/// 职责：
/// - 调用 LLM API 生成优化内容
/// - 提供通用的 LLM 调用接口
/// - 只处理单个商品
/// - 不出现 Vec<Product>
/// - 不关心流程顺序
pub struct SeoGenerator {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl SeoGenerator {
    /// 创建新的内容生成服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// 这是最基础的 LLM 调用接口，其他所有生成功能都基于此函数。
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `max_tokens`: 响应 token 上限
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        max_tokens: u32,
    ) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        // 构建消息列表
        let mut messages = Vec::new();

        // 添加系统消息（如果提供）
        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        // 构建请求
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.7)
            .max_tokens(max_tokens)
            .build()
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                AppError::Llm(LlmError::EmptyContent {
                    model: self.model_name.clone(),
                })
            })?;

        Ok(content.trim().to_string())
    }

    /// 生成销售导向的标题与 slug
    ///
    /// 返回 (新标题, 新slug, 优化策略说明)
    async fn generate_title_and_slug(
        &self,
        current_title: &str,
        category: &str,
    ) -> AppResult<(String, String, Option<String>)> {
        let user_message = format!(
            r#"Current Title: {}
Category: {}

As a senior e-commerce SEO specialist, create:
1. A high-converting product title that highlights key benefits, uses power words, and stays under 60 characters
2. An SEO-optimized URL slug: concise, hyphen-separated, contains the primary keyword, excludes stop words, under 60 characters

Return in this format:
New Title: [optimized title]
Slug: [seo-friendly-slug]
Reason: [one-line optimization strategy]"#,
            current_title,
            if category.is_empty() { "N/A" } else { category },
        );

        let response = self
            .send_to_llm(&user_message, Some(TITLE_SYSTEM_PROMPT), 200)
            .await?;

        let (title, slug, reason) = parse_title_response(&response);

        // 标题缺失时保持原标题；slug 缺失或不可用时从标题推导
        let new_name = title.unwrap_or_else(|| current_title.to_string());
        let new_slug = slug
            .and_then(|s| sanitize_slug(&s))
            .unwrap_or_else(|| slugify(&new_name));

        if new_slug.is_empty() {
            return Err(AppError::Llm(LlmError::ParseFailed {
                field: "slug".to_string(),
                response,
            }));
        }

        Ok((new_name, new_slug, reason))
    }

    /// 生成优化的关键词列表（逗号分隔）
    async fn generate_keywords(
        &self,
        title: &str,
        category: &str,
        suggested_keywords: &[String],
    ) -> AppResult<String> {
        let suggestions = suggested_keywords
            .iter()
            .take(10)
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let user_message = format!(
            r#"Product: {}
Category: {}
Suggested Keywords: {}

Generate 5-7 highly relevant, SEO-optimized keywords for this product.
Include both short and long-tail keywords.
Format: comma-separated list"#,
            title,
            if category.is_empty() { "N/A" } else { category },
            suggestions,
        );

        let response = self
            .send_to_llm(&user_message, Some(KEYWORD_SYSTEM_PROMPT), 200)
            .await?;

        let keywords = clean_keyword_list(&response);
        if keywords.is_empty() {
            return Err(AppError::Llm(LlmError::ParseFailed {
                field: "keywords".to_string(),
                response,
            }));
        }

        Ok(keywords)
    }

    /// 生成转化导向的元描述
    async fn generate_meta_description(&self, title: &str, keywords: &str) -> AppResult<String> {
        let user_message = format!(
            r#"Product: {}
Primary Keywords: {}

As a conversion optimization expert, write a compelling meta description that:
1. Starts with a strong hook or value proposition
2. Includes specific benefits that drive sales
3. Has a clear call-to-action that motivates clicks
4. Incorporates the primary keyword naturally (150-160 chars)
5. Uses power words that increase CTR

Return only the meta description text."#,
            title, keywords,
        );

        let response = self
            .send_to_llm(&user_message, Some(META_SYSTEM_PROMPT), 200)
            .await?;

        let meta = clean_single_paragraph(&response);
        if meta.is_empty() {
            return Err(AppError::Llm(LlmError::ParseFailed {
                field: "meta_description".to_string(),
                response,
            }));
        }

        Ok(meta)
    }

    /// 生成销售导向的商品正文描述
    async fn generate_description(
        &self,
        title: &str,
        keywords: &str,
        category: &str,
    ) -> AppResult<String> {
        let user_message = format!(
            r#"Product: {}
Category: {}
Target Keywords: {}

As a conversion copywriting expert, create a high-converting product description that:
1. Opens with an attention-grabbing hook that addresses customer pain points
2. Uses the AIDA formula (Attention, Interest, Desire, Action)
3. Highlights unique selling propositions and competitive advantages
4. Uses bullet points for scannable key features and benefits
5. Ends with a strong call-to-action
6. Naturally weaves in the SEO keywords
7. Uses persuasive HTML formatting (<strong> for benefits, <ul> for features)

Focus on benefits over features. Length: 300-500 words of persuasive copy."#,
            title,
            if category.is_empty() { "N/A" } else { category },
            keywords,
        );

        self.send_to_llm(&user_message, Some(DESCRIPTION_SYSTEM_PROMPT), 1000)
            .await
    }
}

#[async_trait]
impl ContentGenerator for SeoGenerator {
    async fn optimize(
        &self,
        product: &Product,
        suggested_keywords: &[String],
    ) -> AppResult<OptimizedContent> {
        let category = product.category_names();

        let (new_name, new_slug, change_reason) = self
            .generate_title_and_slug(&product.name, &category)
            .await?;
        debug!("标题优化: {} -> {}", product.name, new_name);

        let keywords = self
            .generate_keywords(&new_name, &category, suggested_keywords)
            .await?;
        debug!("已生成关键词: {}", keywords);

        let meta_description = self.generate_meta_description(&new_name, &keywords).await?;

        let description = self
            .generate_description(&new_name, &keywords, &category)
            .await?;

        // 图片文本按位置确定性拼装
        let primary_keyword = keywords.split(',').next().unwrap_or("").trim().to_string();
        let image_texts = build_image_texts(&new_name, &primary_keyword, product.images.len());

        Ok(OptimizedContent {
            new_name,
            new_slug,
            change_reason,
            keywords,
            meta_description,
            description,
            image_texts,
        })
    }
}

// ========== 响应解析辅助函数 ==========

/// 解析标题响应
///
/// 期望格式（行首标签，大小写不敏感，容忍 markdown 修饰）：
/// ```text
/// New Title: ...
/// Slug: ...
/// Reason: ...
/// ```
fn parse_title_response(response: &str) -> (Option<String>, Option<String>, Option<String>) {
    let extract = |pattern: &str| -> Option<String> {
        Regex::new(pattern)
            .ok()
            .and_then(|re| re.captures(response))
            .map(|caps| clean_label_value(&caps[1]))
            .filter(|v| !v.is_empty())
    };

    let title = extract(r"(?im)^[\s*#>-]*(?:new\s+)?title\s*[:：]\s*(.+)$");
    let slug = extract(r"(?im)^[\s*#>-]*slug\s*[:：]\s*(.+)$");
    let reason = extract(r"(?im)^[\s*#>-]*reason\s*[:：]\s*(.+)$");

    (title, slug, reason)
}

/// 去除标签值两侧的 markdown 修饰与引号（反复剥离直到稳定）
fn clean_label_value(value: &str) -> String {
    let mut current = value.trim();
    loop {
        let next = current
            .trim_matches(|c: char| {
                c == '*' || c == '"' || c == '\'' || c == '[' || c == ']' || c == '`'
            })
            .trim();
        if next == current {
            break;
        }
        current = next;
    }
    current.to_string()
}

/// 从标题推导 slug：小写、剔除停用词、连字符拼接、限长
fn slugify(text: &str) -> String {
    let mut slug = String::new();
    for word in text.split_whitespace() {
        let cleaned: String = word
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if cleaned.is_empty() || SLUG_STOP_WORDS.contains(cleaned.as_str()) {
            continue;
        }
        if !slug.is_empty() {
            slug.push('-');
        }
        slug.push_str(&cleaned);
        if slug.len() >= SLUG_MAX_LEN {
            break;
        }
    }
    slug.truncate(SLUG_MAX_LEN);
    slug.trim_end_matches('-').to_string()
}

/// 清洗模型给出的 slug，不可用时返回 None
fn sanitize_slug(raw: &str) -> Option<String> {
    let mut slug = String::new();
    let mut last_dash = true;
    for c in raw.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if (c == '-' || c == '_' || c.is_whitespace()) && !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.truncate(SLUG_MAX_LEN);
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

/// 清洗关键词响应：去标签、去编号、统一为逗号分隔的一行
fn clean_keyword_list(response: &str) -> String {
    let numbering = Regex::new(r"^\s*\d+[.)]\s*").ok();

    let mut entries = Vec::new();
    for line in response.lines() {
        let mut line = line.trim();
        if line.is_empty() {
            continue;
        }
        // 去掉 "Keywords:" 之类的标签
        if let Some(rest) = line
            .strip_prefix("Keywords:")
            .or_else(|| line.strip_prefix("keywords:"))
        {
            line = rest.trim();
        }
        let line = match &numbering {
            Some(re) => re.replace(line, "").to_string(),
            None => line.to_string(),
        };
        for entry in line.split(',') {
            let entry = clean_label_value(entry);
            if !entry.is_empty() && !entries.contains(&entry) {
                entries.push(entry);
            }
        }
    }

    entries.join(", ")
}

/// 清洗单段文本响应：去标签与引号，折叠换行
fn clean_single_paragraph(response: &str) -> String {
    let mut text = response.trim();
    if let Some(rest) = text
        .strip_prefix("Meta Description:")
        .or_else(|| text.strip_prefix("Meta description:"))
    {
        text = rest.trim();
    }
    let joined = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    joined.trim_matches('"').trim().to_string()
}

/// 按图片位置拼装 alt 与标题文本
///
/// 第一张为主图，最后一张为细节图，中间按固定前缀轮换；
/// 完全确定性，便于单独测试
pub fn build_image_texts(
    title: &str,
    primary_keyword: &str,
    image_count: usize,
) -> BTreeMap<u32, ImageText> {
    const ANGLE_PREFIXES: &[&str] = &[
        "Alternative view of",
        "Close-up of",
        "Style view of",
        "Feature detail of",
        "Lifestyle shot of",
        "Angle view of",
    ];

    let mut texts = BTreeMap::new();
    for position in 1..=image_count {
        let prefix = if position == 1 {
            "Main view of"
        } else if position == image_count {
            "Detailed view of"
        } else {
            ANGLE_PREFIXES[position % ANGLE_PREFIXES.len()]
        };

        let alt = if primary_keyword.is_empty() {
            format!("{} {}", prefix, title)
        } else {
            format!("{} {} - {}", prefix, title, primary_keyword)
        };

        let image_title = if position == 1 {
            format!("{} - Main Product Image", title)
        } else {
            format!("{} - Gallery Image {}", title, position)
        };

        texts.insert(
            position as u32,
            ImageText {
                alt,
                title: image_title,
            },
        );
    }

    texts
}

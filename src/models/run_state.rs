use serde::{Deserialize, Serialize};
use std::fmt;

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// 预览：只计算并报告，不回写目录
    DryRun,
    /// 写入：生成成功后回写目录
    Write,
}

impl Mode {
    /// 状态键中使用的标识
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::DryRun => "dry_run",
            Mode::Write => "write",
        }
    }

    /// 日志中使用的中文名称
    pub fn label(self) -> &'static str {
        match self {
            Mode::DryRun => "预览",
            Mode::Write => "写入",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 分页运行状态
///
/// 按 (模式, 页大小) 维度各自独立；`current_page` 恒为下一个待处理页，
/// 绝不指向已提交的页
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub mode: Mode,
    pub page_size: u32,
    /// 下一个待处理的页码（从 1 开始）
    pub current_page: u32,
    pub total_pages: u32,
    pub total_products: u64,
    /// 累计已处理的商品数量
    pub products_processed: u64,
}

impl RunState {
    /// 新序列的初始状态（从第 1 页开始）
    pub fn new(mode: Mode, page_size: u32) -> Self {
        Self {
            mode,
            page_size,
            current_page: 1,
            total_pages: 0,
            total_products: 0,
            products_processed: 0,
        }
    }

    /// 状态表中的键
    pub fn key(mode: Mode, page_size: u32) -> String {
        format!("{}:{}", mode.as_str(), page_size)
    }

    /// 本序列是否已全部处理完毕
    pub fn is_finished(&self) -> bool {
        self.total_pages > 0 && self.current_page > self.total_pages
    }
}

/// 总页数 = ceil(商品总数 / 页大小)
pub fn total_pages(total_products: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    ((total_products + page_size as u64 - 1) / page_size as u64) as u32
}

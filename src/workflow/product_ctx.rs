//! 商品处理上下文
//!
//! 封装"我正在处理第几页的第几个商品"这一信息

use std::fmt::Display;

/// 商品处理上下文
///
/// 包含处理单个商品所需的所有上下文信息
#[derive(Debug, Clone)]
pub struct ProductCtx {
    /// 所在页码（从1开始）
    pub page: u32,

    /// 页内序号（从1开始，仅用于日志显示）
    pub position: usize,

    /// 本页商品总数
    pub total_in_page: usize,
}

impl ProductCtx {
    /// 创建新的商品上下文
    pub fn new(page: u32, position: usize, total_in_page: usize) -> Self {
        Self {
            page,
            position,
            total_in_page,
        }
    }
}

impl Display for ProductCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[第{}页 商品{}/{}]",
            self.page, self.position, self.total_in_page
        )
    }
}

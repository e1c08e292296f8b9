//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一次运行的调度与分页状态推进，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量优化处理器
//! - 管理应用生命周期（初始化、运行）
//! - 解析起始页（显式参数 > 已保存游标 > 第 1 页）
//! - 拉取一页商品并委托 page_processor 处理
//! - 推进并持久化分页游标
//! - 输出全局统计信息
//!
//! ### `page_processor` - 单页商品处理器
//! - 并发处理单页的所有商品（Semaphore 限流）
//! - 等全部商品达到终态后按原始顺序收集结果
//! - 单个商品失败绝不影响兄弟商品
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (一次运行 = 一页)
//!     ↓
//! page_processor (处理 Vec<Product>)
//!     ↓
//! workflow::ProductFlow (处理单个 Product)
//!     ↓
//! services (能力层：catalog / generator / tracker / warn)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管运行与游标，page_processor 管单页
//! 2. **页间串行**：游标提交之前绝不触碰下一页，恢复时不重不漏
//! 3. **向下依赖**：编排层 → workflow → services
//! 4. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod batch_processor;
pub mod page_processor;

// 重新导出主要类型
pub use batch_processor::App;
pub use page_processor::{process_page, PageStats};

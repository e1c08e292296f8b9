pub mod product_ctx;
pub mod product_flow;

pub use product_ctx::ProductCtx;
pub use product_flow::{is_already_optimized, ProductFlow};

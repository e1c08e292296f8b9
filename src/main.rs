use anyhow::Result;
use wp_seo_optimizer::utils::logging;
use wp_seo_optimizer::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置（默认值 < config.toml < 环境变量）
    let config = Config::load().await?;
    let report_file = config.report_file.clone();

    // 初始化并运行应用（一次运行处理一页商品）
    let report = App::initialize(config).await?.run().await?;

    // 持久化本次运行报告
    let json = serde_json::to_string_pretty(&report)?;
    tokio::fs::write(&report_file, json).await?;
    tracing::info!("📄 运行报告已保存至: {}", report_file);

    Ok(())
}

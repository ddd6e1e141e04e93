use anyhow::Result;
use parallel_bench::app::App;
use parallel_bench::{Config, RunPlan};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?.for_custom_run();

    // 固定的小规模运行：3 个品牌 × pro / ultra
    let app = App::initialize(config)?;
    app.run_brand_sweep(&RunPlan::custom()).await?;

    Ok(())
}

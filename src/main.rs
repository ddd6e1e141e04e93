use anyhow::Result;
use parallel_bench::app::App;
use parallel_bench::{Config, RunPlan};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // 加载配置（缺少 API key 时直接退出）
    let config = Config::from_env()?;

    let default_plan = RunPlan {
        output_dir: config.output_dir.clone(),
        ..RunPlan::default()
    };

    // 初始化并运行应用
    let app = App::initialize(config)?;
    let plan = app.load_plan(default_plan).await?;
    app.run_brand_sweep(&plan).await?;

    Ok(())
}

use anyhow::Result;
use parallel_bench::app::App;
use parallel_bench::{Config, RunPlan};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    let default_plan = RunPlan::comprehensive(config.comprehensive_output_dir.clone());

    let app = App::initialize(config)?;
    let plan = app.load_plan(default_plan).await?;
    app.run_comprehensive(&plan).await?;

    Ok(())
}

use anyhow::Result;
use ham_pool::app::App;
use ham_pool::config::Config;
use ham_pool::logger;

fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logger::init_with(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config)?.run()?;

    Ok(())
}

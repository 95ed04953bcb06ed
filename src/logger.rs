use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日志，默认级别 info，可通过 RUST_LOG 覆盖
pub fn init() {
    init_with(false);
}

/// 初始化日志；`verbose` 为 true 时默认级别为 debug
///
/// 重复调用会被忽略（测试中常见）。
pub fn init_with(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

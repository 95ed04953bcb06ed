/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 导入清单（TOML）
    pub pool_manifest: String,
    /// 保存 XML 题库的目录
    pub output_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pool_manifest: "pools.toml".to_string(),
            output_folder: "output_xml".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            pool_manifest: std::env::var("POOL_MANIFEST").unwrap_or(default.pool_manifest),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }
}

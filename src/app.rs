use crate::config::Config;
use crate::import::{import_from_text, IllustrationCache};
use crate::models::{load_manifest, Element, PoolManifest, PoolSource};
use crate::persistence;
use crate::utils::logging::{init_log_file, log_pool_summary, log_startup, print_final_stats};
use anyhow::{bail, Context, Result};
use chrono::Datelike;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    manifest: PoolManifest,
}

/// 导入统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法创建日志文件: {}", config.output_log_file))?;

        log_startup(&config.pool_manifest, &config.output_folder);

        let manifest = load_manifest(Path::new(&config.pool_manifest))?;
        fs::create_dir_all(&config.output_folder)
            .with_context(|| format!("无法创建输出目录: {}", config.output_folder))?;

        Ok(Self { config, manifest })
    }

    /// 运行应用主逻辑
    pub fn run(&self) -> Result<()> {
        if self.manifest.pools.is_empty() {
            warn!("⚠️ 清单中没有题库，程序结束");
            return Ok(());
        }

        let stats = self.import_all();
        print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );

        if stats.failed > 0 {
            bail!("{} 个题库导入失败", stats.failed);
        }
        Ok(())
    }

    /// 依次导入清单中的每个题库；单个失败不会中断其余题库
    pub fn import_all(&self) -> ImportStats {
        // 一次运行共享一个插图缓存
        let cache = IllustrationCache::new();
        let mut stats = ImportStats {
            total: self.manifest.pools.len(),
            ..Default::default()
        };

        for source in &self.manifest.pools {
            match self.import_pool(source, &cache) {
                Ok(path) => {
                    info!("[元素 {}] ✓ 已写入 {}", source.number, path.display());
                    stats.success += 1;
                }
                Err(e) => {
                    error!("[元素 {}] ❌ 导入失败: {:#}", source.number, e);
                    stats.failed += 1;
                }
            }
        }
        stats
    }

    fn import_pool(&self, source: &PoolSource, cache: &IllustrationCache) -> Result<PathBuf> {
        let element = import_from_text(
            source.number,
            &source.title,
            source.valid_from,
            source.valid_to,
            &source.source_dir,
            cache,
        )
        .with_context(|| format!("无法导入 {}", source.source_dir.display()))?;

        log_pool_summary(&element);

        let path = Path::new(&self.config.output_folder).join(output_file_name(&element));
        persistence::save_to_file(&element, &path)?;
        Ok(path)
    }
}

/// `Element<编号>-<生效年份>.xml`
pub fn output_file_name(element: &Element) -> String {
    format!(
        "Element{}-{}.xml",
        element.number(),
        element.valid_from().year()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn output_name_uses_number_and_start_year() {
        let element = Element::new(
            3,
            "General",
            NaiveDate::from_ymd_opt(2023, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2027, 6, 30).unwrap(),
        )
        .unwrap();
        assert_eq!(output_file_name(&element), "Element3-2023.xml");
    }
}

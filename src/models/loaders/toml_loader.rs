use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::parse_iso_date;

/// 导入清单中的一个题库来源
///
/// ```toml
/// [[pool]]
/// number = 2
/// title = "Technician Class Question Pool"
/// valid_from = "2022-07-01"
/// valid_to = "2026-06-30"
/// source_dir = "2 Technician [2022-2026]"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PoolSource {
    pub number: u32,
    pub title: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub valid_from: NaiveDate,
    #[serde(deserialize_with = "deserialize_date")]
    pub valid_to: NaiveDate,
    pub source_dir: PathBuf,
}

/// 导入清单
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoolManifest {
    #[serde(default, rename = "pool")]
    pub pools: Vec<PoolSource>,
}

// 日期既可以写成字符串也可以写成 TOML 原生日期
fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = toml::Value::deserialize(deserializer)?;
    let text = match raw {
        toml::Value::String(s) => s,
        toml::Value::Datetime(dt) => dt.to_string(),
        other => {
            return Err(serde::de::Error::custom(format!(
                "期望 yyyy-MM-dd 格式的日期, 实际为 {}",
                other
            )))
        }
    };
    parse_iso_date(text.trim()).ok_or_else(|| {
        serde::de::Error::custom(format!("期望 yyyy-MM-dd 格式的日期, 实际为 {}", text))
    })
}

/// 从 TOML 文件加载导入清单
///
/// 相对的 `source_dir` 以清单文件所在目录为基准。
pub fn load_manifest(manifest_path: &Path) -> Result<PoolManifest> {
    let content = fs::read_to_string(manifest_path)
        .with_context(|| format!("无法读取清单文件: {}", manifest_path.display()))?;

    let mut manifest: PoolManifest = toml::from_str(&content)
        .with_context(|| format!("无法解析清单文件: {}", manifest_path.display()))?;

    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    for pool in manifest.pools.iter_mut() {
        if pool.source_dir.is_relative() {
            pool.source_dir = base.join(&pool.source_dir);
        }
    }

    tracing::info!(
        "清单 {} 中共有 {} 个题库",
        manifest_path.display(),
        manifest.pools.len()
    );

    Ok(manifest)
}

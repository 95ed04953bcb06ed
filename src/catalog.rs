use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{FileError, PoolError, PoolResult};
use crate::models::Element;
use crate::persistence;

/// 已保存题库的目录
///
/// 元素按编号、再按生效日期排序。
#[derive(Debug, Default)]
pub struct ElementCatalog {
    elements: Vec<Element>,
}

impl ElementCatalog {
    pub fn new(mut elements: Vec<Element>) -> Self {
        elements.sort_by_key(|e| (e.number(), e.valid_from()));
        Self { elements }
    }

    /// 加载目录中所有 `*.xml` 题库文件
    ///
    /// 任何一个文件无法加载都会让整个目录加载失败。
    pub fn load_dir(dir: &Path) -> PoolResult<Self> {
        if !dir.is_dir() {
            return Err(FileError::DirectoryNotFound {
                path: dir.display().to_string(),
            }
            .into());
        }

        let entries =
            fs::read_dir(dir).map_err(|e| PoolError::file_read_failed(dir.display().to_string(), e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| PoolError::file_read_failed(dir.display().to_string(), e))?
                .path();
            let is_xml = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
            if is_xml && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            warn!("⚠️ 目录中没有题库文件: {}", dir.display());
        }

        let mut elements = Vec::with_capacity(paths.len());
        for path in &paths {
            elements.push(persistence::load_from_file(path)?);
        }
        info!("📚 从 {} 加载了 {} 个题库", dir.display(), elements.len());

        Ok(Self::new(elements))
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// 在指定时刻有效的题库
    pub fn valid_at(&self, moment: NaiveDateTime) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(move |e| e.is_valid_at(moment))
    }

    /// 当前有效的某个编号的题库；有多个时取生效日期最新的
    pub fn get(&self, number: u32) -> Option<&Element> {
        self.get_at(number, Local::now().naive_local())
    }

    pub fn get_at(&self, number: u32, moment: NaiveDateTime) -> Option<&Element> {
        self.valid_at(moment)
            .filter(|e| e.number() == number)
            .max_by_key(|e| e.valid_from())
    }
}

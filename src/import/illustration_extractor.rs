//! 插图提取
//!
//! 把源图片裁剪到内容区域，并把灰度线稿转成透明背景上的纯黑色插图。
//! 两次全图扫描都是 O(宽×高)，只在导入时运行，没有做优化。

use image::{ImageFormat, Rgba, RgbaImage};
use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

use crate::error::{FileError, FormatError, PoolError, PoolResult};
use crate::models::Illustration;

/// 亮度高于此值的像素视为背景
pub const BACKGROUND_BRIGHTNESS: f32 = 0.98;

/// 内容区域（包含边界）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }

    fn include(bounds: Option<Self>, x: u32, y: u32) -> Self {
        match bounds {
            None => Self {
                left: x,
                top: y,
                right: x,
                bottom: y,
            },
            Some(b) => Self {
                left: b.left.min(x),
                top: b.top.min(y),
                right: b.right.max(x),
                bottom: b.bottom.max(y),
            },
        }
    }
}

/// 感知亮度：HSL 模型中的 L，(max + min) / 2，忽略 alpha
pub fn brightness(pixel: &Rgba<u8>) -> f32 {
    let [r, g, b, _] = pixel.0;
    let max = r.max(g).max(b) as f32 / 255.0;
    let min = r.min(g).min(b) as f32 / 255.0;
    (max + min) / 2.0
}

/// 非背景像素对应的不透明度
pub fn alpha_for(brightness: f32) -> u8 {
    let alpha = 255.0 - (brightness * 255.0).floor();
    alpha.clamp(0.0, 255.0) as u8
}

fn is_background(pixel: &Rgba<u8>) -> bool {
    brightness(pixel) > BACKGROUND_BRIGHTNESS
}

/// 第一遍扫描：找出所有非背景像素的最小外接矩形；全是背景时返回 None
pub fn content_bounds(source: &RgbaImage) -> Option<BoundingBox> {
    let mut bounds = None;
    for (x, y, pixel) in source.enumerate_pixels() {
        if !is_background(pixel) {
            bounds = Some(BoundingBox::include(bounds, x, y));
        }
    }
    bounds
}

/// 第二遍扫描：在新画布上把内容重新绘制为带 alpha 的纯黑色
pub fn recolor(source: &RgbaImage, bounds: BoundingBox) -> RgbaImage {
    let mut target = RgbaImage::new(bounds.width(), bounds.height());
    for y in bounds.top..=bounds.bottom {
        for x in bounds.left..=bounds.right {
            let value = brightness(source.get_pixel(x, y));
            if value <= BACKGROUND_BRIGHTNESS {
                target.put_pixel(
                    x - bounds.left,
                    y - bounds.top,
                    Rgba([0, 0, 0, alpha_for(value)]),
                );
            }
        }
    }
    target
}

/// 裁剪并重新着色；全是背景时返回 None
pub fn trim_figure(source: &RgbaImage) -> Option<RgbaImage> {
    content_bounds(source).map(|bounds| recolor(source, bounds))
}

/// 在目录中查找 `<figure_name>.*`，必须恰好匹配一个文件
pub fn find_figure_file(dir: &Path, figure_name: &str, line: usize) -> PoolResult<PathBuf> {
    let prefix = format!("{}.", figure_name.to_lowercase());
    let entries = fs::read_dir(dir).map_err(|e| PoolError::file_read_failed(dir.display().to_string(), e))?;

    let mut matches = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PoolError::file_read_failed(dir.display().to_string(), e))?;
        let path = entry.path();
        let is_match = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.to_lowercase().starts_with(&prefix));
        if is_match && path.is_file() {
            matches.push(path);
        }
    }

    if matches.len() != 1 {
        return Err(FormatError::AmbiguousFigure {
            pattern: format!("{}.*", figure_name),
            line,
            count: matches.len(),
        }
        .into());
    }
    Ok(matches.remove(0))
}

fn encode_png(picture: &RgbaImage) -> PoolResult<Vec<u8>> {
    let mut bytes = Vec::new();
    picture
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| FormatError::FigureDecode {
            path: "<png>".to_string(),
            reason: e.to_string(),
        })?;
    Ok(bytes)
}

/// 解码、裁剪并编码一个插图文件
pub fn extract_from_file(path: &Path, figure_name: &str) -> PoolResult<Illustration> {
    let raw = fs::read(path).map_err(|e| PoolError::file_read_failed(path.display().to_string(), e))?;
    let decoded = image::load_from_memory(&raw).map_err(|e| FormatError::FigureDecode {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let source = decoded.to_rgba8();

    let trimmed = trim_figure(&source).ok_or_else(|| FormatError::BlankFigure {
        path: path.display().to_string(),
    })?;
    debug!(
        "插图 {}: {}x{} → {}x{}",
        figure_name,
        source.width(),
        source.height(),
        trimmed.width(),
        trimmed.height()
    );

    Ok(Illustration::new(figure_name, encode_png(&trimmed)?)?)
}

type CacheKey = (PathBuf, String);

/// 插图缓存
///
/// 由调用方创建并在一次导入运行中共享；同一 `(目录, 插图名)` 最多解码一次。
/// 查找和插入在同一个互斥区内完成。
#[derive(Debug, Default)]
pub struct IllustrationCache {
    entries: Mutex<HashMap<CacheKey, Arc<Illustration>>>,
}

impl IllustrationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 提取并裁剪插图，命中缓存时直接返回
    ///
    /// `line` 只用于错误诊断。
    pub fn extract_and_trim(
        &self,
        dir: &Path,
        figure_name: &str,
        line: usize,
    ) -> PoolResult<Arc<Illustration>> {
        if !dir.is_dir() {
            return Err(FileError::DirectoryNotFound {
                path: dir.display().to_string(),
            }
            .into());
        }

        let key = (dir.to_path_buf(), figure_name.to_string());
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = entries.get(&key) {
            return Ok(Arc::clone(hit));
        }

        let path = find_figure_file(dir, figure_name, line)?;
        info!("🖼️ 正在处理插图 {} ({})", figure_name, path.display());
        let illustration = Arc::new(extract_from_file(&path, figure_name)?);
        entries.insert(key, Arc::clone(&illustration));
        Ok(illustration)
    }
}

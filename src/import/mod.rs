//! 导入：文本题库解析 + 插图提取

pub mod illustration_extractor;
pub mod normalize;
pub mod text_parser;

pub use illustration_extractor::{IllustrationCache, BACKGROUND_BRIGHTNESS};
pub use text_parser::{import_from_text, parse_text, PoolParser};

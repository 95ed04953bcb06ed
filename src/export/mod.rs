//! 学习资料导出
pub mod html;

pub use html::{write_illustrations, write_study_sheet};

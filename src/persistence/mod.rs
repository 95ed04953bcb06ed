//! 题库持久化
pub mod xml_codec;

pub use xml_codec::{load, load_from_file, save, save_to_file};

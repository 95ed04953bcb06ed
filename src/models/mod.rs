//! 领域模型
//!
//! 实体树：Element → Subelement → Group → Question → Answer，
//! 插图由 Element 按名称统一持有，题目通过共享引用指向它。

pub mod answer;
pub mod element;
pub mod exam_item;
pub mod explanation;
pub mod group;
pub mod illustration;
pub mod loaders;
pub mod question;

pub use answer::Answer;
pub use element::Element;
pub use exam_item::ExamItem;
pub use explanation::Explanation;
pub use group::{Group, Subelement};
pub use illustration::{Illustration, Illustrations};
pub use loaders::{load_manifest, PoolManifest, PoolSource};
pub use question::{Question, ANSWER_COUNT};

use chrono::NaiveDate;

use crate::error::{ModelError, ModelResult};

/// 修剪代码并检查长度
pub(crate) fn checked_code(value: &str, field: &'static str, expected: usize) -> ModelResult<String> {
    let value = value.trim();
    if value.chars().count() != expected {
        return Err(ModelError::CodeLength {
            field,
            expected,
            value: value.to_string(),
        });
    }
    Ok(value.to_string())
}

/// 修剪文本并确认非空
pub(crate) fn checked_text(value: &str, field: &'static str) -> ModelResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ModelError::Empty { field });
    }
    Ok(value.to_string())
}

/// 严格解析 `yyyy-MM-dd`：正好四位年份，不带符号
pub(crate) fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

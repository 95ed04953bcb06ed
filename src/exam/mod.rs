//! 组卷与评分

pub mod assembler;
pub mod score;

pub use assembler::{shuffle, ExamKind};
pub use score::ExamScore;

use crate::error::{ModelError, ModelResult};

/// 答案
///
/// 构造后不可变，只归属于一道题目。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    text: String,
    is_correct: bool,
}

impl Answer {
    /// 创建答案，文本会被修剪且不能为空
    pub fn new(text: impl AsRef<str>, is_correct: bool) -> ModelResult<Self> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return Err(ModelError::Empty { field: "answer text" });
        }
        Ok(Self {
            text: text.to_string(),
            is_correct,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct
    }
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_text() {
        let answer = Answer::new("  42 volts ", true).unwrap();
        assert_eq!(answer.text(), "42 volts");
        assert!(answer.is_correct());
    }

    #[test]
    fn rejects_blank_text() {
        assert_eq!(
            Answer::new("   ", false),
            Err(ModelError::Empty { field: "answer text" })
        );
    }
}

use crate::error::{ModelError, ModelResult};

/// 题目解析，可附带一张插图（原始位图数据）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    text: String,
    illustration: Option<Vec<u8>>,
}

impl Explanation {
    pub fn new(text: impl AsRef<str>, illustration: Option<Vec<u8>>) -> ModelResult<Self> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return Err(ModelError::Empty {
                field: "explanation text",
            });
        }
        Ok(Self {
            text: text.to_string(),
            illustration,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 解析插图的位图字节
    pub fn illustration_bytes(&self) -> Option<&[u8]> {
        self.illustration.as_deref()
    }
}

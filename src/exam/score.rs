use crate::models::{Element, ExamItem};

/// 考试成绩
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExamScore {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub minimum_correct: usize,
}

impl ExamScore {
    pub fn from_items(items: &[ExamItem<'_>], minimum_correct: usize) -> Self {
        Self {
            total: items.len(),
            answered: items.iter().filter(|i| i.is_answered()).count(),
            correct: items.iter().filter(|i| i.is_correct()).count(),
            minimum_correct,
        }
    }

    pub fn passed(&self) -> bool {
        self.correct >= self.minimum_correct
    }
}

impl Element {
    /// 按正式考试的及格线评分
    pub fn score(&self, items: &[ExamItem<'_>]) -> ExamScore {
        ExamScore::from_items(items, self.default_minimum_correct())
    }
}

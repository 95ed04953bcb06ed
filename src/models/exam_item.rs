use super::{Answer, Group, Question, ANSWER_COUNT};
use crate::error::{ModelError, ModelResult};

/// 考试项：一道题目、其答案的（可能已打乱的）视图以及所属题组
///
/// 只在一次考试会话中存在，不会被持久化。
#[derive(Debug, Clone)]
pub struct ExamItem<'a> {
    question: &'a Question,
    answers: Vec<&'a Answer>,
    group: &'a Group,
    selected_answer_index: Option<usize>,
}

impl<'a> ExamItem<'a> {
    pub fn new(question: &'a Question, answers: Vec<&'a Answer>, group: &'a Group) -> Self {
        Self {
            question,
            answers,
            group,
            selected_answer_index: None,
        }
    }

    pub fn question(&self) -> &'a Question {
        self.question
    }

    /// 展示顺序的答案
    pub fn answers(&self) -> &[&'a Answer] {
        &self.answers
    }

    pub fn group(&self) -> &'a Group {
        self.group
    }

    pub fn selected_answer_index(&self) -> Option<usize> {
        self.selected_answer_index
    }

    /// 记录界面上选中的答案（展示顺序索引）
    pub fn select_answer(&mut self, index: usize) -> ModelResult<()> {
        if index >= self.answers.len() {
            return Err(ModelError::AnswerIndexOutOfRange {
                index,
                max_index: ANSWER_COUNT - 1,
            });
        }
        self.selected_answer_index = Some(index);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected_answer_index = None;
    }

    pub fn is_answered(&self) -> bool {
        self.selected_answer_index.is_some()
    }

    /// 正确答案在展示顺序中的位置
    pub fn correct_answer_index(&self) -> usize {
        self.answers
            .iter()
            .position(|a| a.is_correct())
            .unwrap_or_default()
    }

    pub fn is_correct(&self) -> bool {
        self.selected_answer_index
            .and_then(|i| self.answers.get(i))
            .is_some_and(|a| a.is_correct())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_tracks_correctness() {
        let mut group = Group::new("T1A", "Purpose").unwrap();
        let answers = (0..4)
            .map(|i| Answer::new(format!("a{}", i), i == 2).unwrap())
            .collect();
        group.push_question(Question::new("T1A01", "Q?", None, answers, None, None).unwrap());

        let question = &group.questions()[0];
        let shown: Vec<&Answer> = question.answers().iter().rev().collect();
        let mut item = ExamItem::new(question, shown, &group);

        assert!(!item.is_answered());
        assert_eq!(item.correct_answer_index(), 1);

        item.select_answer(0).unwrap();
        assert!(!item.is_correct());
        item.select_answer(1).unwrap();
        assert!(item.is_correct());

        assert_eq!(
            item.select_answer(4),
            Err(ModelError::AnswerIndexOutOfRange {
                index: 4,
                max_index: 3
            })
        );
        item.clear_selection();
        assert_eq!(item.selected_answer_index(), None);
    }
}

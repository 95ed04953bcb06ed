use std::sync::Arc;

use super::{checked_code, checked_text, Answer, Explanation, Illustration};
use crate::error::{ModelError, ModelResult};

/// 每道题固定的答案数量
pub const ANSWER_COUNT: usize = 4;

/// 题目
///
/// 构造时保证恰好四个答案且恰好一个正确，之后不再放宽。
#[derive(Debug, Clone)]
pub struct Question {
    code: String,
    text: String,
    illustration: Option<Arc<Illustration>>,
    answers: Vec<Answer>,
    fcc_reference: Option<String>,
    explanation: Option<Explanation>,
}

impl Question {
    pub fn new(
        code: impl AsRef<str>,
        text: impl AsRef<str>,
        illustration: Option<Arc<Illustration>>,
        answers: Vec<Answer>,
        fcc_reference: Option<String>,
        explanation: Option<Explanation>,
    ) -> ModelResult<Self> {
        let code = checked_code(code.as_ref(), "question code", 5)?;
        let text = checked_text(text.as_ref(), "question text")?;

        if answers.len() != ANSWER_COUNT {
            return Err(ModelError::AnswerCount {
                count: answers.len(),
            });
        }
        let correct = answers.iter().filter(|a| a.is_correct()).count();
        if correct != 1 {
            return Err(ModelError::CorrectAnswerCount { count: correct });
        }

        let fcc_reference = match fcc_reference {
            Some(reference) => Some(checked_text(&reference, "fcc reference")?),
            None => None,
        };

        Ok(Self {
            code,
            text,
            illustration,
            answers,
            fcc_reference,
            explanation,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn illustration(&self) -> Option<&Arc<Illustration>> {
        self.illustration.as_ref()
    }

    /// 题库中声明顺序的答案
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn correct_answer(&self) -> &Answer {
        // 构造时已保证恰好一个正确答案
        &self.answers[self.correct_index()]
    }

    pub fn correct_index(&self) -> usize {
        self.answers
            .iter()
            .position(Answer::is_correct)
            .unwrap_or_default()
    }

    pub fn fcc_reference(&self) -> Option<&str> {
        self.fcc_reference.as_deref()
    }

    pub fn explanation(&self) -> Option<&Explanation> {
        self.explanation.as_ref()
    }
}

impl PartialEq for Question {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(correct: &[bool]) -> Vec<Answer> {
        correct
            .iter()
            .enumerate()
            .map(|(i, c)| Answer::new(format!("ans{}", i), *c).unwrap())
            .collect()
    }

    #[test]
    fn builds_valid_question() {
        let q = Question::new(
            " T1A01 ",
            "Sample question text?",
            None,
            answers(&[false, true, false, false]),
            Some("97.3".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(q.code(), "T1A01");
        assert_eq!(q.correct_index(), 1);
        assert_eq!(q.correct_answer().text(), "ans1");
        assert_eq!(q.fcc_reference(), Some("97.3"));
    }

    #[test]
    fn requires_four_answers() {
        let err = Question::new("T1A01", "Q?", None, answers(&[true, false, false]), None, None)
            .unwrap_err();
        assert_eq!(err, ModelError::AnswerCount { count: 3 });
    }

    #[test]
    fn requires_exactly_one_correct() {
        let err = Question::new(
            "T1A01",
            "Q?",
            None,
            answers(&[true, true, false, false]),
            None,
            None,
        )
        .unwrap_err();
        assert_eq!(err, ModelError::CorrectAnswerCount { count: 2 });

        let err = Question::new(
            "T1A01",
            "Q?",
            None,
            answers(&[false, false, false, false]),
            None,
            None,
        )
        .unwrap_err();
        assert_eq!(err, ModelError::CorrectAnswerCount { count: 0 });
    }

    #[test]
    fn rejects_bad_code_and_empty_reference() {
        let err = Question::new("T1A1", "Q?", None, answers(&[true, false, false, false]), None, None)
            .unwrap_err();
        assert!(matches!(err, ModelError::CodeLength { expected: 5, .. }));

        let err = Question::new(
            "T1A01",
            "Q?",
            None,
            answers(&[true, false, false, false]),
            Some("  ".to_string()),
            None,
        )
        .unwrap_err();
        assert_eq!(err, ModelError::Empty { field: "fcc reference" });
    }
}

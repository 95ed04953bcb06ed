use super::{checked_code, checked_text, Question};
use crate::error::ModelResult;

/// 题组：最小的考纲单元，正式考试从每个题组抽一道题
#[derive(Debug, Clone)]
pub struct Group {
    code: String,
    title: String,
    questions: Vec<Question>,
}

impl Group {
    pub fn new(code: impl AsRef<str>, title: impl AsRef<str>) -> ModelResult<Self> {
        Ok(Self {
            code: checked_code(code.as_ref(), "group code", 3)?,
            title: checked_text(title.as_ref(), "group title")?,
            questions: Vec::new(),
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// 题库顺序的题目列表
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn push_question(&mut self, question: Question) {
        self.questions.push(question);
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

/// 子元素：考纲中的一个主题领域
#[derive(Debug, Clone)]
pub struct Subelement {
    code: String,
    title: String,
    groups: Vec<Group>,
}

impl Subelement {
    pub fn new(code: impl AsRef<str>, title: impl AsRef<str>) -> ModelResult<Self> {
        Ok(Self {
            code: checked_code(code.as_ref(), "subelement code", 2)?,
            title: checked_text(title.as_ref(), "subelement title")?,
            groups: Vec::new(),
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn push_group(&mut self, group: Group) {
        self.groups.push(group);
    }

    pub fn last_group_mut(&mut self) -> Option<&mut Group> {
        self.groups.last_mut()
    }

    /// 所有题组中的题目总数
    pub fn question_count(&self) -> usize {
        self.groups.iter().map(|g| g.questions().len()).sum()
    }
}

impl PartialEq for Subelement {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

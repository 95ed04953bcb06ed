use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use super::{checked_text, Group, Illustration, Illustrations, Question, Subelement};
use crate::error::{ModelError, ModelResult};

/// 元素编号的有效范围
pub const ELEMENT_NUMBERS: std::ops::RangeInclusive<u32> = 2..=4;

/// 及格线占题目数的比例
const PASSING_RATIO: f64 = 0.74;

/// 元素：一个执照等级的完整题库，在固定日期范围内有效
///
/// 根聚合，拥有其下所有子元素、题组、题目和插图。
#[derive(Debug, Clone)]
pub struct Element {
    number: u32,
    title: String,
    valid_from: NaiveDateTime,
    valid_to: NaiveDateTime,
    illustrations: Illustrations,
    subelements: Vec<Subelement>,
}

impl Element {
    /// 创建元素
    ///
    /// 只使用日期部分；`valid_to` 归一化到当天结束。
    pub fn new(
        number: u32,
        title: impl AsRef<str>,
        valid_from: NaiveDate,
        valid_to: NaiveDate,
    ) -> ModelResult<Self> {
        if !ELEMENT_NUMBERS.contains(&number) {
            return Err(ModelError::ElementNumber { number });
        }
        let title = checked_text(title.as_ref(), "element title")?;
        if valid_from > valid_to {
            return Err(ModelError::ValidityRange {
                from: valid_from.to_string(),
                to: valid_to.to_string(),
            });
        }

        // 当天最后一纳秒；直接加一天在最大日期上会溢出
        let end_of_day = TimeDelta::days(1) - TimeDelta::nanoseconds(1);
        let valid_to = valid_to
            .and_time(NaiveTime::MIN)
            .checked_add_signed(end_of_day)
            .ok_or_else(|| ModelError::ValidityRange {
                from: valid_from.to_string(),
                to: valid_to.to_string(),
            })?;

        Ok(Self {
            number,
            title,
            valid_from: valid_from.and_time(NaiveTime::MIN),
            valid_to,
            illustrations: Illustrations::new(),
            subelements: Vec::new(),
        })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn valid_from(&self) -> NaiveDateTime {
        self.valid_from
    }

    /// 有效期最后一天的结束时刻
    pub fn valid_to(&self) -> NaiveDateTime {
        self.valid_to
    }

    pub fn is_valid_at(&self, moment: NaiveDateTime) -> bool {
        moment >= self.valid_from && moment <= self.valid_to
    }

    /// 按本地时间判断当前是否有效
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Local::now().naive_local())
    }

    pub fn illustrations(&self) -> &Illustrations {
        &self.illustrations
    }

    /// 加入插图；同名插图只保留第一个
    pub fn add_illustration(&mut self, illustration: Arc<Illustration>) -> Arc<Illustration> {
        self.illustrations.insert(illustration)
    }

    pub fn illustration(&self, name: &str) -> Option<Arc<Illustration>> {
        self.illustrations.get(name)
    }

    pub fn subelements(&self) -> &[Subelement] {
        &self.subelements
    }

    pub fn subelement(&self, code: &str) -> Option<&Subelement> {
        self.subelements.iter().find(|s| s.code() == code)
    }

    pub fn push_subelement(&mut self, subelement: Subelement) {
        self.subelements.push(subelement);
    }

    pub fn last_subelement_mut(&mut self) -> Option<&mut Subelement> {
        self.subelements.last_mut()
    }

    /// 按题库顺序遍历所有题组
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.subelements.iter().flat_map(|s| s.groups().iter())
    }

    /// 按题库顺序遍历所有题目及其所属题组
    pub fn questions(&self) -> impl Iterator<Item = (&Group, &Question)> {
        self.groups()
            .flat_map(|g| g.questions().iter().map(move |q| (g, q)))
    }

    /// 题库大小
    pub fn pool_size(&self) -> usize {
        self.groups().map(|g| g.questions().len()).sum()
    }

    /// 正式考试的题目数量（每个题组一道）
    pub fn default_questions_count(&self) -> usize {
        self.subelements.iter().map(|s| s.groups().len()).sum()
    }

    /// 正式考试的及格所需正确数
    pub fn default_minimum_correct(&self) -> usize {
        (PASSING_RATIO * self.default_questions_count() as f64).round_ties_even() as usize
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Answer;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn question(code: &str) -> Question {
        let answers = (0..4)
            .map(|i| Answer::new(format!("a{}", i), i == 0).unwrap())
            .collect();
        Question::new(code, "Text?", None, answers, None, None).unwrap()
    }

    fn element_with_groups(groups: usize, per_group: usize) -> Element {
        let mut element = Element::new(2, "Technician", date(2022, 7, 1), date(2026, 6, 30)).unwrap();
        let mut sub = Subelement::new("T1", "Rules").unwrap();
        for g in 0..groups {
            let mut group = Group::new(format!("T1{}", (b'A' + g as u8) as char), "Group").unwrap();
            for q in 0..per_group {
                group.push_question(question(&format!("T1{}{:02}", (b'A' + g as u8) as char, q + 1)));
            }
            sub.push_group(group);
        }
        element.push_subelement(sub);
        element
    }

    #[test]
    fn rejects_invalid_construction() {
        assert_eq!(
            Element::new(5, "X", date(2022, 1, 1), date(2022, 1, 2)).unwrap_err(),
            ModelError::ElementNumber { number: 5 }
        );
        assert!(matches!(
            Element::new(3, "X", date(2022, 1, 2), date(2022, 1, 1)),
            Err(ModelError::ValidityRange { .. })
        ));
        assert!(matches!(
            Element::new(3, " ", date(2022, 1, 1), date(2022, 1, 1)),
            Err(ModelError::Empty { .. })
        ));
    }

    #[test]
    fn valid_to_is_end_of_day() {
        let element = Element::new(3, "General", date(2023, 7, 1), date(2023, 7, 1)).unwrap();
        let late = date(2023, 7, 1).and_hms_opt(23, 59, 59).unwrap();
        let next = date(2023, 7, 2).and_hms_opt(0, 0, 0).unwrap();
        let before = date(2023, 6, 30).and_hms_opt(23, 59, 59).unwrap();

        assert_eq!(element.valid_to().date(), date(2023, 7, 1));
        assert!(element.is_valid_at(late));
        assert!(!element.is_valid_at(next));
        assert!(!element.is_valid_at(before));
    }

    #[test]
    fn last_supported_date_does_not_overflow() {
        let element = Element::new(2, "Technician", date(2022, 7, 1), NaiveDate::MAX).unwrap();
        assert_eq!(element.valid_to().date(), NaiveDate::MAX);
        assert!(element.is_valid_at(NaiveDate::MAX.and_hms_opt(23, 59, 59).unwrap()));
    }

    #[test]
    fn derived_statistics() {
        let element = element_with_groups(35, 3);
        assert_eq!(element.pool_size(), 105);
        assert_eq!(element.default_questions_count(), 35);
        assert_eq!(element.default_minimum_correct(), 26);
        assert_eq!(element.subelements()[0].question_count(), 105);
    }
}

//! 试卷组装
//!
//! 三种模式都是元素的纯函数，不修改元素本身。

use rand::Rng;
use tracing::warn;

use crate::models::{Answer, Element, ExamItem, Group, Question};

/// 组卷模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExamKind {
    /// 模拟考试：每个题组随机抽一道题
    Practice,
    /// 全部题目，题目和答案顺序都打乱
    Randomize,
    /// 全部题目，保持题库顺序（复习模式）
    All,
}

/// 打乱顺序
///
/// 对每个位置 i 从整个区间 [0, n) 中抽取 j 并交换。不是 Fisher-Yates，
/// 排列分布有偏差。
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    let len = items.len();
    for i in 0..len {
        let j = rng.random_range(0..len);
        items.swap(i, j);
    }
}

fn shuffled_item<'a, R: Rng + ?Sized>(
    question: &'a Question,
    group: &'a Group,
    rng: &mut R,
) -> ExamItem<'a> {
    let mut answers: Vec<&Answer> = question.answers().iter().collect();
    shuffle(&mut answers, rng);
    ExamItem::new(question, answers, group)
}

impl Element {
    /// 模拟考试：按子元素 / 题组顺序，每个题组均匀随机抽取一道题并打乱答案
    pub fn exam_questions_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<ExamItem<'_>> {
        let mut items = Vec::with_capacity(self.default_questions_count());
        for group in self.groups() {
            let questions = group.questions();
            if questions.is_empty() {
                warn!("[元素 {}] 题组 {} 没有题目，跳过", self.number(), group.code());
                continue;
            }
            let question = &questions[rng.random_range(0..questions.len())];
            items.push(shuffled_item(question, group, rng));
        }
        items
    }

    pub fn exam_questions(&self) -> Vec<ExamItem<'_>> {
        self.exam_questions_with(&mut rand::rng())
    }

    /// 全部题目：每题答案打乱，再打乱题目顺序
    pub fn randomized_questions_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<ExamItem<'_>> {
        let mut items: Vec<ExamItem<'_>> = self
            .questions()
            .map(|(group, question)| shuffled_item(question, group, rng))
            .collect();
        shuffle(&mut items, rng);
        items
    }

    pub fn randomized_questions(&self) -> Vec<ExamItem<'_>> {
        self.randomized_questions_with(&mut rand::rng())
    }

    /// 全部题目，题目和答案都保持题库顺序
    pub fn all_questions(&self) -> Vec<ExamItem<'_>> {
        self.questions()
            .map(|(group, question)| ExamItem::new(question, question.answers().iter().collect(), group))
            .collect()
    }

    /// 按模式组卷
    pub fn assemble<R: Rng + ?Sized>(&self, kind: ExamKind, rng: &mut R) -> Vec<ExamItem<'_>> {
        match kind {
            ExamKind::Practice => self.exam_questions_with(rng),
            ExamKind::Randomize => self.randomized_questions_with(rng),
            ExamKind::All => self.all_questions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Subelement;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn pool() -> Element {
        let mut element = Element::new(
            3,
            "General",
            NaiveDate::from_ymd_opt(2023, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2027, 6, 30).unwrap(),
        )
        .unwrap();
        for sub in ["G1", "G2"] {
            let mut subelement = Subelement::new(sub, "Topic").unwrap();
            for g in ["A", "B", "C"] {
                let mut group = Group::new(format!("{}{}", sub, g), "Group").unwrap();
                for n in 1..=4 {
                    let answers = (0..4)
                        .map(|i| Answer::new(format!("{}{}{:02}-{}", sub, g, n, i), i == n % 4).unwrap())
                        .collect();
                    let code = format!("{}{}{:02}", sub, g, n);
                    group.push_question(Question::new(&code, "Text?", None, answers, None, None).unwrap());
                }
                subelement.push_group(group);
            }
            element.push_subelement(subelement);
        }
        element
    }

    #[test]
    fn shuffle_draws_from_full_range() {
        // 每个位置都与整个区间中的某一位置交换，所以结果总是原序列的排列
        let mut rng = StdRng::seed_from_u64(7);
        let mut items: Vec<u32> = (0..10).collect();
        shuffle(&mut items, &mut rng);
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..10).collect::<Vec<_>>());

        let mut empty: Vec<u32> = Vec::new();
        shuffle(&mut empty, &mut rng);
        assert!(empty.is_empty());
    }

    #[test]
    fn shuffle_is_reproducible_with_seed() {
        let mut a: Vec<u32> = (0..20).collect();
        let mut b = a.clone();
        shuffle(&mut a, &mut StdRng::seed_from_u64(99));
        shuffle(&mut b, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn practice_exam_has_one_item_per_group() {
        let element = pool();
        let mut rng = StdRng::seed_from_u64(1);
        let items = element.exam_questions_with(&mut rng);

        assert_eq!(items.len(), element.default_questions_count());
        let groups: Vec<&str> = items.iter().map(|i| i.group().code()).collect();
        assert_eq!(groups, vec!["G1A", "G1B", "G1C", "G2A", "G2B", "G2C"]);
        for item in &items {
            assert!(item
                .group()
                .questions()
                .iter()
                .any(|q| std::ptr::eq(q, item.question())));
            assert_eq!(item.answers().len(), 4);
            assert_eq!(item.answers().iter().filter(|a| a.is_correct()).count(), 1);
        }
    }

    #[test]
    fn randomized_covers_whole_pool() {
        let element = pool();
        let items = element.randomized_questions_with(&mut StdRng::seed_from_u64(5));
        assert_eq!(items.len(), element.pool_size());
        let codes: HashSet<&str> = items.iter().map(|i| i.question().code()).collect();
        assert_eq!(codes.len(), element.pool_size());
        for item in &items {
            let answers: HashSet<&str> = item.answers().iter().map(|a| a.text()).collect();
            let declared: HashSet<&str> = item.question().answers().iter().map(|a| a.text()).collect();
            assert_eq!(answers, declared);
        }
    }

    #[test]
    fn all_questions_is_ordered_and_idempotent() {
        let element = pool();
        let first = element.all_questions();
        let second = element.all_questions();

        fn order(items: &[ExamItem<'_>]) -> Vec<String> {
            items
                .iter()
                .map(|i| {
                    let answers: Vec<&str> = i.answers().iter().map(|a| a.text()).collect();
                    format!("{}:{}", i.question().code(), answers.join(","))
                })
                .collect()
        }
        assert_eq!(order(&first), order(&second));
        assert_eq!(first[0].question().code(), "G1A01");
        assert_eq!(first.last().unwrap().question().code(), "G2C04");
        for item in &first {
            for (shown, declared) in item.answers().iter().zip(item.question().answers()) {
                assert!(std::ptr::eq(*shown, declared));
            }
        }
    }

    #[test]
    fn assemble_dispatches_by_kind() {
        let element = pool();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(element.assemble(ExamKind::Practice, &mut rng).len(), 6);
        assert_eq!(element.assemble(ExamKind::Randomize, &mut rng).len(), 24);
        assert_eq!(element.assemble(ExamKind::All, &mut rng).len(), 24);
    }
}

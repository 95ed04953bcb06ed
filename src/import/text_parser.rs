//! 文本题库解析器
//!
//! 逐行状态机，从 PDF 转出的纯文本中恢复 子元素 → 题组 → 题目 → 答案 的结构。
//! 对空白和标点噪声宽容，对结构错误严格：任何无法识别的行都会立即失败。

use chrono::NaiveDate;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::illustration_extractor::IllustrationCache;
use super::normalize::normalize_line;
use crate::error::{FileError, FormatError, PoolError, PoolResult};
use crate::models::{Answer, Element, Group, Question, Subelement, ANSWER_COUNT};

/// 解析器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Default,
    Question,
    Answers,
}

/// 行处理后的走向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// 已读到题目头、尚未结束的题目
#[derive(Debug)]
struct PendingQuestion {
    code: String,
    correct_letter: char,
    fcc_reference: Option<String>,
    text: String,
    answers: Vec<Answer>,
    line: usize,
}

struct LinePatterns {
    subelement: Regex,
    group_with_dash: Regex,
    group: Regex,
    question: Regex,
    answer: Regex,
}

impl LinePatterns {
    fn new() -> PoolResult<Self> {
        Ok(Self {
            subelement: Regex::new(r"(?i)^SUBELEMENT (.{2})")?,
            group_with_dash: Regex::new(r"^([A-Z][0-9][A-Z]) - (.*)$")?,
            group: Regex::new(r"^([A-Z][0-9][A-Z]) (.*)$")?,
            question: Regex::new(r"^([A-Z][0-9][A-Z][0-9]{2}) \(([A-D])\)(.*)$")?,
            answer: Regex::new(r"^([A-D])\. (.*)$")?,
        })
    }
}

/// 文本题库解析器
pub struct PoolParser<'a> {
    element: Element,
    dir: &'a Path,
    cache: &'a IllustrationCache,
    source_name: String,
    patterns: LinePatterns,
    state: State,
    pending: Option<PendingQuestion>,
    in_body: bool,
    stopped: bool,
}

impl<'a> PoolParser<'a> {
    /// `dir` 是插图文件所在目录，`source_name` 只用于错误诊断
    pub fn new(
        element: Element,
        dir: &'a Path,
        cache: &'a IllustrationCache,
        source_name: impl Into<String>,
    ) -> PoolResult<Self> {
        Ok(Self {
            element,
            dir,
            cache,
            source_name: source_name.into(),
            patterns: LinePatterns::new()?,
            state: State::Default,
            pending: None,
            in_body: false,
            stopped: false,
        })
    }

    /// 处理一行原始文本，`line` 从 1 开始
    pub fn feed(&mut self, line: usize, raw: &str) -> PoolResult<Flow> {
        if self.stopped {
            return Ok(Flow::Stop);
        }

        let text = normalize_line(raw);
        if text.is_empty() {
            return Ok(Flow::Continue);
        }

        // 第一个子元素之前都是前言
        if !self.in_body {
            if text.starts_with("SUBELEMENT ") && text.ends_with(']') {
                self.in_body = true;
            } else {
                return Ok(Flow::Continue);
            }
        }

        let flow = match self.state {
            State::Default => self.on_default(line, &text)?,
            State::Question => self.on_question(line, &text)?,
            State::Answers => self.on_answers(line, &text)?,
        };
        if flow == Flow::Stop {
            self.stopped = true;
        }
        Ok(flow)
    }

    /// 结束解析并返回元素
    pub fn finish(self) -> PoolResult<Element> {
        if let Some(pending) = self.pending {
            return Err(FormatError::UnterminatedQuestion {
                code: pending.code,
                line: pending.line,
            }
            .into());
        }
        self.check_last_group()?;
        Ok(self.element)
    }

    /// 新的题组 / 子元素开始或文本结束时，上一个题组必须至少有一道题
    fn check_last_group(&self) -> PoolResult<()> {
        let last = self
            .element
            .subelements()
            .last()
            .and_then(|s| s.groups().last());
        match last {
            Some(group) if group.questions().is_empty() => Err(FormatError::EmptyGroup {
                code: group.code().to_string(),
            }
            .into()),
            _ => Ok(()),
        }
    }

    fn on_default(&mut self, line: usize, text: &str) -> PoolResult<Flow> {
        if let Some(caps) = self.patterns.subelement.captures(text) {
            self.check_last_group()?;
            let subelement = Subelement::new(&caps[1], extract_title(text))
                .map_err(|source| FormatError::InvalidEntry { line, source })?;
            debug!("[第 {} 行] 子元素 {} - {}", line, subelement.code(), subelement.title());
            self.element.push_subelement(subelement);
        } else if let Some(caps) = self
            .patterns
            .group_with_dash
            .captures(text)
            .or_else(|| self.patterns.group.captures(text))
        {
            self.check_last_group()?;
            let group = Group::new(caps[1].to_uppercase(), &caps[2])
                .map_err(|source| FormatError::InvalidEntry { line, source })?;
            let subelement = self.element.last_subelement_mut().ok_or_else(|| {
                FormatError::MissingSubelement {
                    line,
                    text: text.to_string(),
                }
            })?;
            subelement.push_group(group);
        } else if let Some(caps) = self.patterns.question.captures(text) {
            let fcc_reference = caps[3]
                .trim_matches(|c| c == ' ' || c == '[' || c == ']')
                .to_string();
            self.pending = Some(PendingQuestion {
                code: caps[1].to_string(),
                correct_letter: caps[2].chars().next().unwrap_or('A'),
                fcc_reference: (!fcc_reference.is_empty()).then_some(fcc_reference),
                text: String::new(),
                answers: Vec::with_capacity(ANSWER_COUNT),
                line,
            });
            self.state = State::Question;
        } else if is_terminator(text) {
            self.check_last_group()?;
            return Ok(Flow::Stop);
        } else if is_ignored(text) {
            // 已删除的题目、分隔线、注释
        } else {
            return Err(PoolError::unknown_line(line, text, &self.source_name));
        }
        Ok(Flow::Continue)
    }

    fn on_question(&mut self, line: usize, text: &str) -> PoolResult<Flow> {
        let Some(pending) = self.pending.as_mut() else {
            return Err(PoolError::unknown_line(line, text, &self.source_name));
        };
        if self.patterns.question.is_match(text) {
            return Err(FormatError::MissingQuestionBody {
                code: pending.code.clone(),
                line,
                text: text.to_string(),
            }
            .into());
        }
        pending.text = text.to_string();
        pending.answers.clear();
        self.state = State::Answers;
        Ok(Flow::Continue)
    }

    fn on_answers(&mut self, line: usize, text: &str) -> PoolResult<Flow> {
        if let Some(caps) = self.patterns.answer.captures(text) {
            let Some(pending) = self.pending.as_mut() else {
                return Err(PoolError::unknown_line(line, text, &self.source_name));
            };
            let letter = caps[1].chars().next().unwrap_or_default();
            let is_correct = letter.eq_ignore_ascii_case(&pending.correct_letter);
            let answer = Answer::new(&caps[2], is_correct)
                .map_err(|source| FormatError::InvalidEntry { line, source })?;
            pending.answers.push(answer);
            Ok(Flow::Continue)
        } else if text.starts_with('~') {
            self.close_question(line, text)?;
            self.state = State::Default;
            Ok(Flow::Continue)
        } else {
            Err(FormatError::UnknownAnswer {
                line,
                text: text.to_string(),
            }
            .into())
        }
    }

    fn close_question(&mut self, line: usize, text: &str) -> PoolResult<()> {
        let Some(subelement) = self.element.subelements().last() else {
            return Err(FormatError::MissingSubelement {
                line,
                text: text.to_string(),
            }
            .into());
        };
        if subelement.groups().is_empty() {
            return Err(FormatError::MissingGroup {
                line,
                text: text.to_string(),
            }
            .into());
        }

        let Some(pending) = self.pending.take() else {
            return Err(PoolError::unknown_line(line, text, &self.source_name));
        };
        if pending.answers.len() != ANSWER_COUNT {
            return Err(FormatError::WrongAnswerCount {
                code: pending.code,
                fcc_reference: pending.fcc_reference.unwrap_or_else(|| "none".to_string()),
                count: pending.answers.len(),
            }
            .into());
        }

        let illustration = match figure_reference(&pending.text) {
            Some(name) if name.starts_with(&pending.code[..1]) => {
                let shared = self.cache.extract_and_trim(self.dir, name, line)?;
                Some(self.element.add_illustration(shared))
            }
            _ => None,
        };

        let question = Question::new(
            &pending.code,
            &pending.text,
            illustration,
            pending.answers,
            pending.fcc_reference,
            None,
        )
        .map_err(|source| FormatError::InvalidEntry {
            line: pending.line,
            source,
        })?;

        if let Some(group) = self
            .element
            .last_subelement_mut()
            .and_then(Subelement::last_group_mut)
        {
            group.push_question(question);
        }
        Ok(())
    }
}

/// `SUBELEMENT T1 - Title - [97.1]` 中的标题：第一个连字符之后，去掉引用后缀
fn extract_title(line: &str) -> &str {
    let title = line.split_once('-').map_or(line, |(_, rest)| rest).trim();
    match title.find(" - [") {
        Some(index) => &title[..index],
        None => title,
    }
}

fn is_ignored(line: &str) -> bool {
    line.contains("DELETED")
        || line.contains("Question Removed")
        || line.starts_with('~')
        || line.starts_with("NOTE:")
}

fn is_terminator(line: &str) -> bool {
    let lower = line.to_lowercase();
    line.starts_with("END") || lower.starts_with("~~~end") || lower.starts_with("~~~~end")
}

const FIGURE_MARKER: &str = " figure ";

/// 题干中 " figure " 之后的插图名
///
/// 名称在空格、逗号、问号或句点处结束；句点用于 `See figure G7-1.` 这类句末引用。
fn figure_reference(text: &str) -> Option<&str> {
    let start = text.to_ascii_lowercase().find(FIGURE_MARKER)? + FIGURE_MARKER.len();
    let rest = &text[start..];
    let end = rest
        .find(|c: char| matches!(c, ' ' | ',' | '?' | '.'))
        .unwrap_or(rest.len());
    let name = &rest[..end];
    (!name.is_empty()).then_some(name)
}

/// 解析内存中的题库文本
pub fn parse_text(
    element: Element,
    content: &str,
    dir: &Path,
    cache: &IllustrationCache,
    source_name: &str,
) -> PoolResult<Element> {
    let mut parser = PoolParser::new(element, dir, cache, source_name)?;
    for (index, raw) in content.lines().enumerate() {
        if parser.feed(index + 1, raw)? == Flow::Stop {
            break;
        }
    }
    parser.finish()
}

/// 找到目录中唯一的 .txt 文件
pub fn find_text_file(dir: &Path) -> PoolResult<PathBuf> {
    if !dir.is_dir() {
        return Err(FileError::DirectoryNotFound {
            path: dir.display().to_string(),
        }
        .into());
    }
    let entries =
        fs::read_dir(dir).map_err(|e| PoolError::file_read_failed(dir.display().to_string(), e))?;

    let mut found = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| PoolError::file_read_failed(dir.display().to_string(), e))?
            .path();
        let is_text = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
        if is_text && path.is_file() {
            found.push(path);
        }
    }

    if found.len() != 1 {
        return Err(FormatError::AmbiguousTextSource {
            dir: dir.display().to_string(),
            count: found.len(),
        }
        .into());
    }
    Ok(found.remove(0))
}

/// 从目录导入题库：一个文本文件加上零或多个插图文件
pub fn import_from_text(
    number: u32,
    title: &str,
    valid_from: NaiveDate,
    valid_to: NaiveDate,
    dir: &Path,
    cache: &IllustrationCache,
) -> PoolResult<Element> {
    let element = Element::new(number, title, valid_from, valid_to)?;
    let text_path = find_text_file(dir)?;
    info!("[元素 {}] 📄 正在解析 {}", number, text_path.display());

    let raw = fs::read(&text_path)
        .map_err(|e| PoolError::file_read_failed(text_path.display().to_string(), e))?;
    let content = String::from_utf8_lossy(&raw);

    let element = parse_text(
        element,
        &content,
        dir,
        cache,
        &text_path.display().to_string(),
    )?;

    info!(
        "[元素 {}] ✓ 解析完成: {} 个子元素, {} 道题目, {} 张插图",
        number,
        element.subelements().len(),
        element.pool_size(),
        element.illustrations().len()
    );
    Ok(element)
}

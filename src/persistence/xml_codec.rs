//! 题库 XML 格式
//!
//! ```xml
//! <HamExam elementNumber="2" title="..." validFrom="2022-07-01" validTo="2026-06-30">
//!     <Illustrations>
//!         <Illustration name="T1" picture="(base64 png)"/>
//!     </Illustrations>
//!     <Subelement code="T1" title="...">
//!         <Group code="T1A" title="...">
//!             <Question code="T1A01" text="..." illustration="T1" fccReference="97.1">
//!                 <Answer text="..."/>
//!                 <Answer text="..." isCorrect="true"/>
//!                 <Answer text="..."/>
//!                 <Answer text="..."/>
//!                 <Explanation text="..." illustration="(base64)"/>
//!             </Question>
//!         </Group>
//!     </Subelement>
//! </HamExam>
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::NaiveDate;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{FormatError, PoolError, PoolResult};
use crate::models::{
    parse_iso_date, Answer, Element, Explanation, Group, Illustration, Question, Subelement,
};

const ROOT: &str = "HamExam";
const DATE_FORMAT: &str = "%Y-%m-%d";

// ========== 保存 ==========

/// 把元素写为 XML
pub fn save<W: Write>(element: &Element, output: W) -> PoolResult<()> {
    let mut writer = Writer::new_with_indent(output, b' ', 4);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let number = element.number().to_string();
    let valid_from = element.valid_from().date().format(DATE_FORMAT).to_string();
    let valid_to = element.valid_to().date().format(DATE_FORMAT).to_string();
    let mut root = BytesStart::new(ROOT);
    root.push_attribute(("elementNumber", number.as_str()));
    root.push_attribute(("title", element.title()));
    root.push_attribute(("validFrom", valid_from.as_str()));
    root.push_attribute(("validTo", valid_to.as_str()));
    writer.write_event(Event::Start(root))?;

    writer.write_event(Event::Start(BytesStart::new("Illustrations")))?;
    for illustration in element.illustrations().iter() {
        let picture = STANDARD.encode(illustration.picture_bytes());
        let mut tag = BytesStart::new("Illustration");
        tag.push_attribute(("name", illustration.name()));
        tag.push_attribute(("picture", picture.as_str()));
        writer.write_event(Event::Empty(tag))?;
    }
    writer.write_event(Event::End(BytesEnd::new("Illustrations")))?;

    for subelement in element.subelements() {
        let mut tag = BytesStart::new("Subelement");
        tag.push_attribute(("code", subelement.code()));
        tag.push_attribute(("title", subelement.title()));
        writer.write_event(Event::Start(tag))?;

        for group in subelement.groups() {
            let mut tag = BytesStart::new("Group");
            tag.push_attribute(("code", group.code()));
            tag.push_attribute(("title", group.title()));
            writer.write_event(Event::Start(tag))?;

            for question in group.questions() {
                write_question(&mut writer, question)?;
            }

            writer.write_event(Event::End(BytesEnd::new("Group")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("Subelement")))?;
    }

    writer.write_event(Event::End(BytesEnd::new(ROOT)))?;
    writer.into_inner().flush()?;
    Ok(())
}

fn write_question<W: Write>(writer: &mut Writer<W>, question: &Question) -> PoolResult<()> {
    let mut tag = BytesStart::new("Question");
    tag.push_attribute(("code", question.code()));
    tag.push_attribute(("text", question.text()));
    if let Some(illustration) = question.illustration() {
        tag.push_attribute(("illustration", illustration.name()));
    }
    if let Some(reference) = question.fcc_reference() {
        tag.push_attribute(("fccReference", reference));
    }
    writer.write_event(Event::Start(tag))?;

    for answer in question.answers() {
        let mut tag = BytesStart::new("Answer");
        tag.push_attribute(("text", answer.text()));
        if answer.is_correct() {
            tag.push_attribute(("isCorrect", "true"));
        }
        writer.write_event(Event::Empty(tag))?;
    }

    if let Some(explanation) = question.explanation() {
        let mut tag = BytesStart::new("Explanation");
        tag.push_attribute(("text", explanation.text()));
        let picture = explanation.illustration_bytes().map(|b| STANDARD.encode(b));
        if let Some(picture) = picture.as_deref() {
            tag.push_attribute(("illustration", picture));
        }
        writer.write_event(Event::Empty(tag))?;
    }

    writer.write_event(Event::End(BytesEnd::new("Question")))?;
    Ok(())
}

/// 写入文件
pub fn save_to_file(element: &Element, path: &Path) -> PoolResult<()> {
    let file = File::create(path)
        .map_err(|e| PoolError::file_write_failed(path.display().to_string(), e))?;
    save(element, BufWriter::new(file))?;
    info!("[元素 {}] 💾 已保存至 {}", element.number(), path.display());
    Ok(())
}

// ========== 加载 ==========

type Attributes = HashMap<String, String>;

fn read_attributes(tag: &BytesStart<'_>, decoder: Decoder) -> PoolResult<Attributes> {
    let mut map = HashMap::new();
    for attribute in tag.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.decode_and_unescape_value(decoder)?.into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

fn required<'m>(
    attributes: &'m Attributes,
    element: &'static str,
    attribute: &'static str,
) -> PoolResult<&'m str> {
    attributes
        .get(attribute)
        .map(String::as_str)
        .ok_or_else(|| PoolError::missing_attribute(element, attribute))
}

fn parse_date(attributes: &Attributes, attribute: &'static str) -> PoolResult<NaiveDate> {
    let value = required(attributes, ROOT, attribute)?;
    parse_iso_date(value).ok_or_else(|| PoolError::invalid_attribute(ROOT, attribute, value))
}

fn decode_base64(
    value: &str,
    element: &'static str,
    attribute: &'static str,
) -> PoolResult<Vec<u8>> {
    STANDARD
        .decode(value.trim())
        .map_err(|_| PoolError::invalid_attribute(element, attribute, value))
}

/// 正在读取、尚未遇到结束标签的题目
struct OpenQuestion {
    code: String,
    text: String,
    illustration: Option<Arc<Illustration>>,
    fcc_reference: Option<String>,
    answers: Vec<Answer>,
    explanation: Option<Explanation>,
}

/// 逐事件构建元素
#[derive(Default)]
struct Loader {
    element: Option<Element>,
    subelement: Option<Subelement>,
    group: Option<Group>,
    question: Option<OpenQuestion>,
    closed: bool,
}

impl Loader {
    fn element_mut(&mut self) -> PoolResult<&mut Element> {
        self.element
            .as_mut()
            .ok_or_else(|| PoolError::xml("无效的根元素"))
    }

    fn open(&mut self, name: &[u8], attributes: Attributes, is_empty: bool) -> PoolResult<()> {
        if self.element.is_none() && name != ROOT.as_bytes() {
            return Err(PoolError::xml(format!(
                "无效的根元素 <{}>",
                String::from_utf8_lossy(name)
            )));
        }

        match name {
            b"HamExam" => self.open_root(&attributes)?,
            b"Illustration" => {
                let name = required(&attributes, "Illustration", "name")?;
                let picture = decode_base64(
                    required(&attributes, "Illustration", "picture")?,
                    "Illustration",
                    "picture",
                )?;
                let illustration = Illustration::new(name, picture)?;
                self.element_mut()?.add_illustration(Arc::new(illustration));
            }
            b"Subelement" => {
                if self.subelement.is_some() {
                    return Err(PoolError::xml("<Subelement> 不能嵌套"));
                }
                self.subelement = Some(Subelement::new(
                    required(&attributes, "Subelement", "code")?,
                    required(&attributes, "Subelement", "title")?,
                )?);
            }
            b"Group" => {
                if self.subelement.is_none() || self.group.is_some() {
                    return Err(PoolError::xml("<Group> 必须直接位于 <Subelement> 内"));
                }
                self.group = Some(Group::new(
                    required(&attributes, "Group", "code")?,
                    required(&attributes, "Group", "title")?,
                )?);
            }
            b"Question" => self.open_question(&attributes)?,
            b"Answer" => {
                let question = self
                    .question
                    .as_mut()
                    .ok_or_else(|| PoolError::xml("<Answer> 必须位于 <Question> 内"))?;
                let is_correct = attributes
                    .get("isCorrect")
                    .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
                question.answers.push(Answer::new(
                    required(&attributes, "Answer", "text")?,
                    is_correct,
                )?);
            }
            b"Explanation" => {
                let illustration = attributes
                    .get("illustration")
                    .map(|v| decode_base64(v, "Explanation", "illustration"))
                    .transpose()?;
                let explanation =
                    Explanation::new(required(&attributes, "Explanation", "text")?, illustration)?;
                let question = self
                    .question
                    .as_mut()
                    .ok_or_else(|| PoolError::xml("<Explanation> 必须位于 <Question> 内"))?;
                question.explanation = Some(explanation);
            }
            _ => {}
        }

        // 自闭合标签没有单独的结束事件
        if is_empty {
            self.close(name)?;
        }
        Ok(())
    }

    fn open_root(&mut self, attributes: &Attributes) -> PoolResult<()> {
        if self.element.is_some() {
            return Err(PoolError::xml("<HamExam> 只能出现一次"));
        }
        let raw_number = required(attributes, ROOT, "elementNumber")?;
        let number: u32 = raw_number
            .trim()
            .parse()
            .map_err(|_| PoolError::invalid_attribute(ROOT, "elementNumber", raw_number))?;
        let title = required(attributes, ROOT, "title")?;
        let valid_from = parse_date(attributes, "validFrom")?;
        let valid_to = parse_date(attributes, "validTo")?;

        self.element = Some(Element::new(number, title, valid_from, valid_to)?);
        Ok(())
    }

    fn open_question(&mut self, attributes: &Attributes) -> PoolResult<()> {
        if self.group.is_none() || self.question.is_some() {
            return Err(PoolError::xml("<Question> 必须直接位于 <Group> 内"));
        }
        let illustration = match attributes.get("illustration") {
            Some(name) => Some(
                self.element_mut()?
                    .illustration(name)
                    .ok_or_else(|| PoolError::invalid_attribute("Question", "illustration", name))?,
            ),
            None => None,
        };
        self.question = Some(OpenQuestion {
            code: required(attributes, "Question", "code")?.to_string(),
            text: required(attributes, "Question", "text")?.to_string(),
            illustration,
            fcc_reference: attributes
                .get("fccReference")
                .filter(|v| !v.trim().is_empty())
                .cloned(),
            answers: Vec::new(),
            explanation: None,
        });
        Ok(())
    }

    fn close(&mut self, name: &[u8]) -> PoolResult<()> {
        match name {
            b"Question" => {
                if let Some(open) = self.question.take() {
                    // 与文本导入一样重新校验：恰好四个答案，恰好一个正确
                    let question = Question::new(
                        open.code,
                        open.text,
                        open.illustration,
                        open.answers,
                        open.fcc_reference,
                        open.explanation,
                    )?;
                    if let Some(group) = self.group.as_mut() {
                        group.push_question(question);
                    }
                }
            }
            b"Group" => {
                if let (Some(group), Some(subelement)) = (self.group.take(), self.subelement.as_mut()) {
                    // 题组至少要有一道题
                    if group.questions().is_empty() {
                        return Err(FormatError::EmptyGroup {
                            code: group.code().to_string(),
                        }
                        .into());
                    }
                    subelement.push_group(group);
                }
            }
            b"Subelement" => {
                if let Some(subelement) = self.subelement.take() {
                    self.element_mut()?.push_subelement(subelement);
                }
            }
            b"HamExam" => self.closed = true,
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> PoolResult<Element> {
        let element = self.element.ok_or_else(|| PoolError::xml("无效的根元素"))?;
        if !self.closed {
            return Err(PoolError::xml("<HamExam> 没有结束"));
        }
        Ok(element)
    }
}

/// 从 XML 读取元素
pub fn load<R: Read>(input: R) -> PoolResult<Element> {
    let mut reader = Reader::from_reader(BufReader::new(input));
    reader.config_mut().trim_text(true);

    let mut loader = Loader::default();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(tag) => {
                let attributes = read_attributes(&tag, reader.decoder())?;
                loader.open(tag.name().as_ref(), attributes, false)?;
            }
            Event::Empty(tag) => {
                let attributes = read_attributes(&tag, reader.decoder())?;
                loader.open(tag.name().as_ref(), attributes, true)?;
            }
            Event::End(tag) => loader.close(tag.name().as_ref())?,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let element = loader.finish()?;
    debug!(
        "[元素 {}] 已加载 {} 道题目, {} 张插图",
        element.number(),
        element.pool_size(),
        element.illustrations().len()
    );
    Ok(element)
}

/// 从文件读取
pub fn load_from_file(path: &Path) -> PoolResult<Element> {
    let file =
        File::open(path).map_err(|e| PoolError::file_read_failed(path.display().to_string(), e))?;
    load(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;

    fn sample() -> Element {
        let mut element = Element::new(
            4,
            "Extra Class <Question> Pool & \"Friends\"",
            NaiveDate::from_ymd_opt(2020, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
        .unwrap();
        let figure = element.add_illustration(Arc::new(
            Illustration::new("E5-1", vec![0x89, b'P', b'N', b'G', 0, 255]).unwrap(),
        ));

        let mut subelement = Subelement::new("E5", "Electrical principles").unwrap();
        let mut group = Group::new("E5A", "Resonance and Q").unwrap();

        let answers = |correct: usize| -> Vec<Answer> {
            (0..4)
                .map(|i| Answer::new(format!("Answer {} 'quoted'", i), i == correct).unwrap())
                .collect()
        };
        group.push_question(
            Question::new(
                "E5A01",
                "What is shown in figure E5-1?",
                Some(figure),
                answers(2),
                Some("97.301".to_string()),
                Some(Explanation::new("Because of resonance.", Some(vec![1, 2, 3])).unwrap()),
            )
            .unwrap(),
        );
        group.push_question(
            Question::new("E5A02", "Plain question?", None, answers(0), None, None).unwrap(),
        );
        subelement.push_group(group);
        element.push_subelement(subelement);
        element
    }

    fn roundtrip(element: &Element) -> Element {
        let mut bytes = Vec::new();
        save(element, &mut bytes).unwrap();
        load(bytes.as_slice()).unwrap()
    }

    #[test]
    fn save_then_load_reproduces_pool() {
        let original = sample();
        let loaded = roundtrip(&original);

        assert_eq!(loaded.number(), 4);
        assert_eq!(loaded.title(), original.title());
        assert_eq!(loaded.valid_from(), original.valid_from());
        assert_eq!(loaded.valid_to(), original.valid_to());

        assert_eq!(loaded.illustrations().len(), 1);
        let figure = loaded.illustration("e5-1").unwrap();
        assert_eq!(figure.picture_bytes(), &[0x89, b'P', b'N', b'G', 0, 255]);

        let groups: Vec<&Group> = loaded.groups().collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].questions().len(), 2);

        let before: Vec<&Question> = original.questions().map(|(_, q)| q).collect();
        let after: Vec<&Question> = loaded.questions().map(|(_, q)| q).collect();
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a.code(), b.code());
            assert_eq!(a.text(), b.text());
            assert_eq!(a.fcc_reference(), b.fcc_reference());
            assert_eq!(a.answers(), b.answers());
            assert_eq!(a.explanation(), b.explanation());
            assert_eq!(
                a.illustration().map(|i| i.name()),
                b.illustration().map(|i| i.name())
            );
        }
        // 题目引用的是元素中的同一张插图
        let first = after[0].illustration().unwrap();
        assert!(Arc::ptr_eq(first, &figure));
    }

    #[test]
    fn writes_documented_attributes() {
        let mut bytes = Vec::new();
        save(&sample(), &mut bytes).unwrap();
        let xml = String::from_utf8(bytes).unwrap();

        assert!(xml.contains(r#"elementNumber="4""#));
        assert!(xml.contains(r#"validFrom="2020-07-01""#));
        assert!(xml.contains(r#"validTo="2024-06-30""#));
        assert!(xml.contains(r#"<Question code="E5A01" text="What is shown in figure E5-1?" illustration="E5-1" fccReference="97.301">"#));
        assert!(xml.contains(r#"isCorrect="true""#));
        assert!(!xml.contains("isCorrect=\"false\""));
    }

    #[test]
    fn missing_root_is_rejected() {
        assert!(load("<Other/>".as_bytes()).is_err());
        assert!(load("".as_bytes()).is_err());
    }

    #[test]
    fn missing_or_bad_attributes_are_rejected() {
        let err = load(r#"<HamExam title="X" validFrom="2020-07-01" validTo="2024-06-30"/>"#.as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            PoolError::Format(FormatError::MissingAttribute {
                attribute: "elementNumber",
                ..
            })
        ));

        let err = load(r#"<HamExam elementNumber="4" title="X" validFrom="07/01/2020" validTo="2024-06-30"/>"#.as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            PoolError::Format(FormatError::InvalidAttribute {
                attribute: "validFrom",
                ..
            })
        ));

        let err = load(r#"<HamExam elementNumber="four" title="X" validFrom="2020-07-01" validTo="2024-06-30"/>"#.as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            PoolError::Format(FormatError::InvalidAttribute {
                attribute: "elementNumber",
                ..
            })
        ));
    }

    #[test]
    fn answer_invariants_are_revalidated() {
        let three_answers = r#"<HamExam elementNumber="2" title="T" validFrom="2022-07-01" validTo="2026-06-30">
  <Subelement code="T1" title="S">
    <Group code="T1A" title="G">
      <Question code="T1A01" text="Q?">
        <Answer text="a" isCorrect="true"/>
        <Answer text="b"/>
        <Answer text="c"/>
      </Question>
    </Group>
  </Subelement>
</HamExam>"#;
        assert!(matches!(
            load(three_answers.as_bytes()).unwrap_err(),
            PoolError::Model(ModelError::AnswerCount { count: 3 })
        ));

        let two_correct = three_answers.replace(
            r#"<Answer text="c"/>"#,
            r#"<Answer text="c" isCorrect="TRUE"/><Answer text="d"/>"#,
        );
        assert!(matches!(
            load(two_correct.as_bytes()).unwrap_err(),
            PoolError::Model(ModelError::CorrectAnswerCount { count: 2 })
        ));
    }

    #[test]
    fn out_of_range_dates_are_rejected() {
        for valid_to in ["+262142-12-31", "262142-12-31", "2026-6-30", "2026-06-31"] {
            let xml = format!(
                r#"<HamExam elementNumber="2" title="T" validFrom="2022-07-01" validTo="{}"></HamExam>"#,
                valid_to
            );
            assert!(
                matches!(
                    load(xml.as_bytes()).unwrap_err(),
                    PoolError::Format(FormatError::InvalidAttribute {
                        attribute: "validTo",
                        ..
                    })
                ),
                "{} 应被拒绝",
                valid_to
            );
        }
    }

    #[test]
    fn empty_group_is_rejected() {
        let xml = r#"<HamExam elementNumber="2" title="T" validFrom="2022-07-01" validTo="2026-06-30">
  <Subelement code="T1" title="S">
    <Group code="T1A" title="G">
      <Question code="T1A01" text="Q?">
        <Answer text="a" isCorrect="true"/><Answer text="b"/><Answer text="c"/><Answer text="d"/>
      </Question>
    </Group>
    <Group code="T1B" title="Empty"/>
  </Subelement>
</HamExam>"#;
        match load(xml.as_bytes()).unwrap_err() {
            PoolError::Format(FormatError::EmptyGroup { code }) => assert_eq!(code, "T1B"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_illustration_reference_is_rejected() {
        let xml = r#"<HamExam elementNumber="2" title="T" validFrom="2022-07-01" validTo="2026-06-30">
  <Subelement code="T1" title="S">
    <Group code="T1A" title="G">
      <Question code="T1A01" text="Q?" illustration="T9">
        <Answer text="a" isCorrect="true"/><Answer text="b"/><Answer text="c"/><Answer text="d"/>
      </Question>
    </Group>
  </Subelement>
</HamExam>"#;
        assert!(matches!(
            load(xml.as_bytes()).unwrap_err(),
            PoolError::Format(FormatError::InvalidAttribute {
                attribute: "illustration",
                ..
            })
        ));
    }
}

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{PoolError, PoolResult};
use crate::models::{Element, Question};

const LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn image_file_name(name: &str) -> String {
    format!("{}.png", name.to_lowercase())
}

/// 写出 HTML 学习资料：所有题目，正确答案以 `class="x"` 标记
pub fn write_study_sheet<W: Write>(element: &Element, mut out: W) -> PoolResult<()> {
    for subelement in element.subelements() {
        writeln!(
            out,
            "<h1 id=\"{}\">{}<br/>{}</h1>",
            subelement.code().to_lowercase(),
            escape(subelement.code()),
            escape(subelement.title())
        )?;
        writeln!(out)?;

        for group in subelement.groups() {
            writeln!(
                out,
                "<h2 id=\"{}\">{}<br/>{}</h2>",
                group.code().to_lowercase(),
                escape(group.code()),
                escape(group.title())
            )?;
            writeln!(out)?;

            for question in group.questions() {
                write_item(&mut out, question)?;
                writeln!(out)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn write_item<W: Write>(out: &mut W, question: &Question) -> PoolResult<()> {
    writeln!(out, "<div class=\"item\">")?;
    writeln!(
        out,
        "<h3 id=\"{}\">{}<br/>{}</h3>",
        question.code().to_lowercase(),
        escape(question.code()),
        escape(question.text())
    )?;

    if let Some(illustration) = question.illustration() {
        writeln!(
            out,
            "<img src=\"../images/{}\" alt=\"{}\" />",
            image_file_name(illustration.name()),
            escape(illustration.name())
        )?;
    }

    for (letter, answer) in LETTERS.iter().zip(question.answers()) {
        let class = if answer.is_correct() { "x" } else { "o" };
        writeln!(
            out,
            "<p class=\"{}\"><span>{}: </span>{}</p>",
            class,
            letter,
            escape(answer.text())
        )?;
    }

    if let Some(reference) = question.fcc_reference() {
        writeln!(out, "<p class=\"note\">FCC Part {}</p>", escape(reference))?;
    }
    writeln!(out, "</div>")?;
    Ok(())
}

/// 把每张插图写成 `<小写名称>.png`，返回写出的文件路径
pub fn write_illustrations(element: &Element, dir: &Path) -> PoolResult<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| PoolError::file_write_failed(dir.display().to_string(), e))?;

    let mut written = Vec::with_capacity(element.illustrations().len());
    for illustration in element.illustrations().iter() {
        let path = dir.join(image_file_name(illustration.name()));
        fs::write(&path, illustration.picture_bytes())
            .map_err(|e| PoolError::file_write_failed(path.display().to_string(), e))?;
        written.push(path);
    }
    info!("[元素 {}] 🖼️ 导出 {} 张插图", element.number(), written.len());
    Ok(written)
}

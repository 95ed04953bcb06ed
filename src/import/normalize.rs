//! 行文本归一化
//!
//! 源文件是从 PDF 手工转出的文本，含有各种形近字符。

use phf::phf_map;

/// 形近字符替换表
static SUBSTITUTIONS: phf::Map<char, char> = phf_map! {
    '\u{00A0}' => ' ',  // 不换行空格
    '\t' => ' ',
    '\u{2010}' => '-',
    '\u{2011}' => '-',
    '\u{2012}' => '-',
    '\u{2013}' => '-',  // en dash
    '\u{2014}' => '-',  // em dash
    '\u{2015}' => '-',
    '\u{2018}' => '\'',
    '\u{2019}' => '\'',
    '\u{201C}' => '"',
    '\u{201D}' => '"',
    '\u{F0B4}' => 'x',  // Symbol 字体的乘号，转码后落在私有区
};

/// 替换形近字符并修剪首尾空白
pub fn normalize_line(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| SUBSTITUTIONS.get(&c).copied().unwrap_or(c))
        .collect();
    replaced.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_look_alikes() {
        assert_eq!(
            normalize_line("\u{00A0}T1A \u{2013} \u{201C}Rules\u{201D}\tit\u{2019}s 2\u{F0B4}3 "),
            "T1A - \"Rules\" it's 2x3"
        );
    }

    #[test]
    fn blank_lines_collapse_to_empty() {
        assert_eq!(normalize_line(" \t\u{00A0} "), "");
    }
}

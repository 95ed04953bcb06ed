use thiserror::Error;

/// 题库处理错误类型
#[derive(Debug, Error)]
pub enum PoolError {
    /// 实体构造错误（字段非法，实体不会被创建）
    #[error("构造错误: {0}")]
    Model(#[from] ModelError),
    /// 格式错误（解析器 / 编解码器无法恢复结构）
    #[error("格式错误: {0}")]
    Format(#[from] FormatError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 实体构造错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// 字段为空
    #[error("{field} 不能为空")]
    Empty { field: &'static str },
    /// 代码长度不符
    #[error("{field} 必须正好 {expected} 个字符: '{value}'")]
    CodeLength {
        field: &'static str,
        expected: usize,
        value: String,
    },
    /// 答案数量不是 4
    #[error("必须正好有四个答案 (实际 {count})")]
    AnswerCount { count: usize },
    /// 正确答案数量不是 1
    #[error("必须正好有一个正确答案 (实际 {count})")]
    CorrectAnswerCount { count: usize },
    /// 元素编号超出 [2, 4]
    #[error("元素编号必须在 2 到 4 之间: {number}")]
    ElementNumber { number: u32 },
    /// 有效期起止颠倒
    #[error("考试至少要有效一天: {from} > {to}")]
    ValidityRange { from: String, to: String },
    /// 选中答案索引越界
    #[error("答案索引 {index} 超出范围 [0, {max_index}]")]
    AnswerIndexOutOfRange { index: usize, max_index: usize },
}

/// 格式错误
#[derive(Debug, Error)]
pub enum FormatError {
    /// 目录中 .txt 文件不是恰好一个
    #[error("无法确定使用哪个文本文件 (共 {count} 个): {dir}")]
    AmbiguousTextSource { dir: String, count: usize },
    /// 无法识别的行
    #[error("未知行格式 \"{text}\" (第 {line} 行, 文件 {path})")]
    UnknownLine {
        line: usize,
        text: String,
        path: String,
    },
    /// 题目头之后紧跟另一个题目头
    #[error("题目 {code} 缺少题干和答案 \"{text}\" (第 {line} 行)")]
    MissingQuestionBody {
        code: String,
        line: usize,
        text: String,
    },
    /// 文件在题目结束标记之前结束
    #[error("题目 {code} 没有结束标记 (从第 {line} 行开始)")]
    UnterminatedQuestion { code: String, line: usize },
    /// 无法识别的答案行
    #[error("未知答案格式 \"{text}\" (第 {line} 行)")]
    UnknownAnswer { line: usize, text: String },
    /// 题组之前没有出现子元素
    #[error("找不到题组所属的子元素 \"{text}\" (第 {line} 行)")]
    MissingSubelement { line: usize, text: String },
    /// 题目之前没有出现题组
    #[error("找不到题目所属的题组 \"{text}\" (第 {line} 行)")]
    MissingGroup { line: usize, text: String },
    /// 题组中没有任何题目
    #[error("题组 {code} 没有题目")]
    EmptyGroup { code: String },
    /// 答案数量错误
    #[error("答案数量错误 ({count}), 题目 {code} (FCC: {fcc_reference})")]
    WrongAnswerCount {
        code: String,
        fcc_reference: String,
        count: usize,
    },
    /// 题目内容在指定行处违反约束
    #[error("第 {line} 行的题目无效: {source}")]
    InvalidEntry {
        line: usize,
        #[source]
        source: ModelError,
    },
    /// 插图文件不是恰好一个
    #[error("无法确定使用哪个图片文件 (搜索 {pattern}, 第 {line} 行, 匹配 {count} 个)")]
    AmbiguousFigure {
        pattern: String,
        line: usize,
        count: usize,
    },
    /// 插图解码失败
    #[error("无法解码图片 {path}: {reason}")]
    FigureDecode { path: String, reason: String },
    /// 插图全为背景
    #[error("图片没有任何内容: {path}")]
    BlankFigure { path: String },
    /// 行模式无法编译
    #[error("行模式错误: {0}")]
    Pattern(String),
    /// XML 结构或语法错误
    #[error("XML错误: {0}")]
    Xml(String),
    /// 缺少必需属性
    #[error("<{element}> 缺少属性 {attribute}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    /// 属性值无法解析
    #[error("<{element}> 属性 {attribute} 的值无效: '{value}'")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
    /// 读取失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 流读写失败（没有具体路径）
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

// ========== 从常见错误类型转换 ==========

impl From<std::io::Error> for PoolError {
    fn from(err: std::io::Error) -> Self {
        PoolError::File(FileError::Io(err))
    }
}

impl From<regex::Error> for PoolError {
    fn from(err: regex::Error) -> Self {
        PoolError::Format(FormatError::Pattern(err.to_string()))
    }
}

impl From<quick_xml::Error> for PoolError {
    fn from(err: quick_xml::Error) -> Self {
        PoolError::Format(FormatError::Xml(err.to_string()))
    }
}

impl From<quick_xml::events::attributes::AttrError> for PoolError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        PoolError::Format(FormatError::Xml(err.to_string()))
    }
}

// ========== 便捷构造函数 ==========

impl PoolError {
    /// 创建未知行格式错误
    pub fn unknown_line(line: usize, text: impl Into<String>, path: impl Into<String>) -> Self {
        PoolError::Format(FormatError::UnknownLine {
            line,
            text: text.into(),
            path: path.into(),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        PoolError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        PoolError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建 XML 错误
    pub fn xml(message: impl Into<String>) -> Self {
        PoolError::Format(FormatError::Xml(message.into()))
    }

    /// 创建缺少属性错误
    pub fn missing_attribute(element: &'static str, attribute: &'static str) -> Self {
        PoolError::Format(FormatError::MissingAttribute { element, attribute })
    }

    /// 创建属性值无效错误
    pub fn invalid_attribute(
        element: &'static str,
        attribute: &'static str,
        value: impl Into<String>,
    ) -> Self {
        PoolError::Format(FormatError::InvalidAttribute {
            element,
            attribute,
            value: value.into(),
        })
    }

    /// 是否为格式类错误（资源错误同样视为格式错误）
    pub fn is_format(&self) -> bool {
        matches!(self, PoolError::Format(_) | PoolError::File(_))
    }
}

// ========== Result 类型别名 ==========

/// 模型构造结果类型
pub type ModelResult<T> = Result<T, ModelError>;

/// 题库处理结果类型
pub type PoolResult<T> = Result<T, PoolError>;

//! # Ham Pool
//!
//! 业余无线电执照考试题库：导入、保存与组卷
//!
//! ## 架构设计
//!
//! ### ① 领域模型（Models）
//! - `models/` - Element → Subelement → Group → Question → Answer 实体树，构造时校验
//! - `models/loaders` - TOML 导入清单
//!
//! ### ② 导入（Import）
//! - `import/text_parser` - 逐行状态机，把官方文本题库解析为实体树
//! - `import/illustration_extractor` - 裁剪插图并转为透明背景，一次运行共享缓存
//!
//! ### ③ 持久化（Persistence）
//! - `persistence/xml_codec` - XML 保存与加载，插图以 base64 内嵌
//! - `catalog` - 目录中所有已保存题库
//!
//! ### ④ 组卷（Exam）
//! - `exam/assembler` - 练习 / 随机 / 全部三种组卷方式
//! - `exam/score` - 评分与及格判断
//!
//! ### ⑤ 应用（App）
//! - `app` - 按清单批量导入并写出 XML
//! - `export` - HTML 学习资料
//!
//! ## 模块结构

pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod exam;
pub mod export;
pub mod import;
pub mod logger;
pub mod models;
pub mod persistence;
pub mod utils;

// 重新导出常用类型
pub use app::App;
pub use catalog::ElementCatalog;
pub use config::Config;
pub use error::{FileError, FormatError, ModelError, PoolError, PoolResult};
pub use exam::{ExamKind, ExamScore};
pub use import::{import_from_text, IllustrationCache};
pub use models::{Answer, Element, ExamItem, Explanation, Group, Illustration, Question, Subelement};

use std::sync::Arc;

use crate::error::{ModelError, ModelResult};

/// 插图
///
/// 名称是唯一键（不区分大小写），相等性只比较名称。
#[derive(Debug, Clone)]
pub struct Illustration {
    name: String,
    picture: Vec<u8>,
}

impl Illustration {
    pub fn new(name: impl AsRef<str>, picture: Vec<u8>) -> ModelResult<Self> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(ModelError::Empty {
                field: "illustration name",
            });
        }
        Ok(Self {
            name: name.to_string(),
            picture,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 已经裁剪和重新着色的 PNG 数据
    pub fn picture_bytes(&self) -> &[u8] {
        &self.picture
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

impl PartialEq for Illustration {
    fn eq(&self, other: &Self) -> bool {
        self.has_name(&other.name)
    }
}

impl Eq for Illustration {}

/// 元素级插图集合，按插入顺序保存，每个名称最多一项
#[derive(Debug, Clone, Default)]
pub struct Illustrations {
    items: Vec<Arc<Illustration>>,
}

impl Illustrations {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加插图；同名插图已存在时返回已有的共享引用
    pub fn add(&mut self, illustration: Illustration) -> Arc<Illustration> {
        self.insert(Arc::new(illustration))
    }

    /// 添加共享插图；同名插图已存在时返回已有的共享引用
    pub fn insert(&mut self, illustration: Arc<Illustration>) -> Arc<Illustration> {
        if let Some(existing) = self.get(illustration.name()) {
            return existing;
        }
        self.items.push(Arc::clone(&illustration));
        illustration
    }

    pub fn get(&self, name: &str) -> Option<Arc<Illustration>> {
        self.items.iter().find(|i| i.has_name(name)).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|i| i.has_name(name))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Illustration>> {
        self.items.iter()
    }
}

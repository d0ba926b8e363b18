use thiserror::Error;

/// 内容聚合层的错误类型
///
/// 空结果不是错误：过滤条件没有命中时各查询返回空序列。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("未找到{kind}：{key}")]
    NotFound { kind: &'static str, key: String },

    #[error("分类父级存在循环引用：{}", .chain.join(" → "))]
    Cycle { chain: Vec<String> },

    #[error("输入无效：{0}")]
    InvalidInput(String),
}

impl ContentError {
    pub fn category_not_found(link: &str) -> Self {
        Self::NotFound {
            kind: "分类",
            key: link.to_string(),
        }
    }

    pub fn post_not_found(slug: &str) -> Self {
        Self::NotFound {
            kind: "文章",
            key: slug.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ContentError>;

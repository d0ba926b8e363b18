//! 博客内容聚合层
//!
//! 从扁平的分类与文章记录构建分类树、系列导航、标签集合以及首页等派生视图。
//! 所有查询都是对只读输入的纯函数，同样的输入总得到同样的输出。

pub mod check;
pub mod config;
pub mod content;
pub mod error;
pub mod source;

pub use content::category::{CategoryNode, CategoryPath, CategoryTree, build_tree};
pub use content::series::{AdjacentPosts, SeriesView};
pub use content::tag::Tag;
pub use content::{CategoryRecord, ContentSet, PostRecord};
pub use error::{ContentError, Result};

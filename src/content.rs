pub mod category;
pub mod cms;
pub mod excerpt;
pub mod frontmatter;
pub mod query;
pub mod series;
pub mod tag;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 内容源提供的扁平分类记录，父子关系只通过 `parent_link` 表达
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRecord {
    pub name: String,
    pub link: String,
    #[serde(default, alias = "parent")]
    pub parent_link: Option<String>,
}

impl CategoryRecord {
    pub fn new(name: &str, link: &str, parent_link: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            link: link.to_string(),
            parent_link: parent_link.map(str::to_string),
        }
    }
}

/// 内容源提供的文章记录，本模块只读不改
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostRecord {
    pub slug: String,
    #[serde(default)]
    pub title: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub series_slug: Option<String>,
    #[serde(default)]
    pub series_index: Option<u32>,
    #[serde(default)]
    pub sticky: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, skip_serializing)]
    pub body: String,
}

impl PostRecord {
    /// 最小可用文章，其余字段取默认值
    pub fn new(slug: &str, date: DateTime<Utc>) -> Self {
        Self {
            slug: slug.to_string(),
            title: slug.to_string(),
            date,
            categories: Vec::new(),
            tags: Vec::new(),
            series_slug: None,
            series_index: None,
            sticky: false,
            featured: false,
            draft: false,
            description: None,
            summary: None,
            body: String::new(),
        }
    }

    pub fn in_series(&self, series_slug: &str) -> bool {
        self.series_slug.as_deref() == Some(series_slug)
    }
}

/// 一次加载得到的全部原始内容
#[derive(Debug, Default, Clone)]
pub struct ContentSet {
    pub categories: Vec<CategoryRecord>,
    pub posts: Vec<PostRecord>,
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::PostRecord;
    use chrono::{DateTime, TimeZone, Utc};

    pub fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    pub fn post(slug: &str, d: u32) -> PostRecord {
        PostRecord::new(slug, day(d))
    }

    pub fn series_post(slug: &str, series: &str, index: Option<u32>, d: u32) -> PostRecord {
        let mut p = post(slug, d);
        p.series_slug = Some(series.to_string());
        p.series_index = index;
        p
    }

    pub fn slugs<'a>(posts: impl IntoIterator<Item = &'a PostRecord>) -> Vec<&'a str> {
        posts.into_iter().map(|p| p.slug.as_str()).collect()
    }
}

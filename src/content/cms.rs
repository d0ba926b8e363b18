//! WordPress REST 文章到站内文章卡片的映射
//!
//! 尽力而为：可选字段缺失时使用固定兜底值，从不因此报错。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::excerpt;
use crate::content::frontmatter;
use crate::error::{ContentError, Result};

const DESCRIPTION_LIMIT: usize = 150;
const CHARS_PER_MINUTE: usize = 400;
const FALLBACK_TITLE: &str = "无标题";
const FALLBACK_DESCRIPTION: &str = "暂无描述";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WpMedia {
    #[serde(default)]
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WpTerm {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WpEmbedded {
    #[serde(default, rename = "wp:featuredmedia")]
    pub featured_media: Option<Vec<WpMedia>>,
    /// 通常第 0 组是分类，第 1 组是标签
    #[serde(default, rename = "wp:term")]
    pub terms: Option<Vec<Vec<WpTerm>>>,
}

/// 带 `_embed` 参数请求得到的文章
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WpPost {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub title: Option<Rendered>,
    #[serde(default)]
    pub content: Option<Rendered>,
    #[serde(default)]
    pub excerpt: Option<Rendered>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "_embedded")]
    pub embedded: Option<WpEmbedded>,
}

impl WpPost {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ContentError::InvalidInput(format!("WordPress 文章 JSON 无效：{e}")))
    }

    fn id_string(&self) -> Result<String> {
        match &self.id {
            Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
            Some(serde_json::Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            _ => Err(ContentError::InvalidInput("WordPress 文章缺少 id".into())),
        }
    }

    fn featured_image(&self) -> Option<String> {
        self.embedded
            .as_ref()?
            .featured_media
            .as_ref()?
            .first()?
            .source_url
            .clone()
            .filter(|url| !url.is_empty())
    }

    fn term_names(&self, group: usize) -> Vec<String> {
        let Some(terms) = self.embedded.as_ref().and_then(|e| e.terms.as_ref()) else {
            return Vec::new();
        };
        terms
            .get(group)
            .map(|list| list.iter().filter_map(|t| t.name.clone()).collect())
            .unwrap_or_default()
    }
}

/// 非空的 rendered 文本
fn rendered(field: &Option<Rendered>) -> Option<&str> {
    field
        .as_ref()
        .and_then(|r| r.rendered.as_deref())
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostCard {
    pub slug: String,
    pub link: String,
    pub title: String,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub draft: bool,
    pub word_count: usize,
    pub reading_time: String,
}

pub fn transform_wp_post(post: &WpPost) -> Result<PostCard> {
    let id = post.id_string()?;

    let plain_text = excerpt::strip_tags(rendered(&post.content).unwrap_or_default());
    let word_count = plain_text.trim().chars().count();
    let reading_time = format!("{} 分钟", word_count.div_ceil(CHARS_PER_MINUTE));

    let description = rendered(&post.excerpt)
        .map(|raw| {
            let plain = excerpt::collapse_whitespace(&excerpt::strip_tags(raw));
            excerpt::truncate_chars(plain.trim(), DESCRIPTION_LIMIT)
        })
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string());

    let date = post.date.as_deref().and_then(|raw| match frontmatter::parse_date(raw) {
        Ok(dt) => Some(dt),
        Err(e) => {
            tracing::warn!("WordPress 文章 {id} 日期无法解析：{e}");
            None
        }
    });

    Ok(PostCard {
        slug: id.clone(),
        link: id,
        title: rendered(&post.title).unwrap_or(FALLBACK_TITLE).to_string(),
        description,
        date,
        cover: post.featured_image(),
        categories: post.term_names(0),
        tags: post.term_names(1),
        // WordPress API 默认只返回已发布的文章
        draft: false,
        word_count,
        reading_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const FULL: &str = r#"{
        "id": 42,
        "date": "2024-03-01T08:30:00",
        "title": {"rendered": "Hello &amp; World"},
        "content": {"rendered": "<p>abcdef</p>\n"},
        "excerpt": {"rendered": "<p>Short\n\n  summary</p>"},
        "_embedded": {
            "wp:featuredmedia": [{"source_url": "https://img.example/cover.png"}],
            "wp:term": [[{"name": "Tech"}, {"name": "Web"}], [{"name": "rust"}]]
        }
    }"#;

    #[test]
    fn maps_full_record() {
        let card = transform_wp_post(&WpPost::from_json(FULL).unwrap()).unwrap();
        assert_eq!(card.slug, "42");
        assert_eq!(card.link, "42");
        assert_eq!(card.title, "Hello &amp; World");
        assert_eq!(card.description, "Short summary");
        assert_eq!(card.date, Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap()));
        assert_eq!(card.cover.as_deref(), Some("https://img.example/cover.png"));
        assert_eq!(card.categories, vec!["Tech", "Web"]);
        assert_eq!(card.tags, vec!["rust"]);
        assert!(!card.draft);
        assert_eq!(card.word_count, 6);
        assert_eq!(card.reading_time, "1 分钟");
    }

    #[test]
    fn missing_optional_fields_fall_back() {
        let card = transform_wp_post(&WpPost::from_json(r#"{"id": "7"}"#).unwrap()).unwrap();
        assert_eq!(card.title, FALLBACK_TITLE);
        assert_eq!(card.description, FALLBACK_DESCRIPTION);
        assert!(card.date.is_none());
        assert!(card.cover.is_none());
        assert!(card.categories.is_empty() && card.tags.is_empty());
        assert_eq!(card.word_count, 0);
        assert_eq!(card.reading_time, "0 分钟");
    }

    #[test]
    fn description_is_truncated() {
        let post = WpPost {
            id: Some(serde_json::json!(1)),
            excerpt: Some(Rendered {
                rendered: Some(format!("<p>{}</p>", "字".repeat(200))),
            }),
            date: Some("not a date".into()),
            ..Default::default()
        };
        let card = transform_wp_post(&post).unwrap();
        assert_eq!(card.description.chars().count(), 150);
        assert!(card.date.is_none());
    }

    #[test]
    fn reading_time_rounds_up() {
        let post = WpPost {
            id: Some(serde_json::json!(1)),
            content: Some(Rendered {
                rendered: Some("x".repeat(401)),
            }),
            ..Default::default()
        };
        assert_eq!(transform_wp_post(&post).unwrap().reading_time, "2 分钟");
    }

    #[test]
    fn missing_id_is_invalid() {
        let err = transform_wp_post(&WpPost::default()).unwrap_err();
        assert!(matches!(err, ContentError::InvalidInput(_)));
        assert!(WpPost::from_json("[1, 2]").is_err());
    }
}

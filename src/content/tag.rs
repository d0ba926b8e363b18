use std::collections::HashSet;

use serde::Serialize;

use crate::content::PostRecord;

pub const DEFAULT_TAG_URL: &str = "/tags/{slug}/";

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
pub struct Tag {
    pub raw: String,
    pub slug: String,
    pub display_name: String,
}

/// 去除首尾空白，内部空白压缩为单个空格
fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 标签 slug：小写，空白段以 `-` 连接
pub fn tag_to_slug(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

pub fn normalize_tag(raw: &str) -> Tag {
    Tag {
        raw: raw.to_string(),
        slug: tag_to_slug(raw),
        display_name: collapse_whitespace(raw),
    }
}

/// 按路由模板生成标签页路径，模板中的 `{slug}` 被替换
pub fn build_tag_path(template: &str, raw: &str) -> String {
    template.replace("{slug}", &tag_to_slug(raw))
}

/// 全站标签，按 slug 去重，先出现的写法胜出；空标签被忽略
pub fn all_tags(posts: &[PostRecord]) -> Vec<Tag> {
    let mut seen = HashSet::new();
    posts
        .iter()
        .flat_map(|post| post.tags.iter())
        .map(|raw| normalize_tag(raw))
        .filter(|tag| !tag.slug.is_empty() && seen.insert(tag.slug.clone()))
        .collect()
}

/// 含有同一标签（按 slug 比较）的文章
pub fn posts_by_tag<'a>(posts: &'a [PostRecord], raw: &str) -> Vec<&'a PostRecord> {
    let slug = tag_to_slug(raw);
    if slug.is_empty() {
        return Vec::new();
    }
    posts
        .iter()
        .filter(|post| post.tags.iter().any(|t| tag_to_slug(t) == slug))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::test_support::{post, slugs};

    fn tagged(slug: &str, tags: &[&str]) -> PostRecord {
        let mut p = post(slug, 1);
        p.tags = tags.iter().map(|t| t.to_string()).collect();
        p
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        let a = normalize_tag("Go ");
        let b = normalize_tag("go");
        assert_eq!(a.slug, b.slug);
        assert_eq!(a.display_name, "Go");
        assert_eq!(normalize_tag("  Rust   Lang ").display_name, "Rust Lang");
        assert_eq!(normalize_tag("  Rust   Lang ").slug, "rust-lang");
        assert_eq!(normalize_tag("Go "), normalize_tag("Go "));
    }

    #[test]
    fn first_seen_display_wins() {
        let posts = vec![tagged("a", &["Go"]), tagged("b", &["go", "Rust"])];
        let tags = all_tags(&posts);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].display_name, "Go");
        assert_eq!(tags[1].slug, "rust");
    }

    #[test]
    fn blank_tags_are_skipped() {
        let posts = vec![tagged("a", &["   ", ""])];
        assert!(all_tags(&posts).is_empty());
        assert!(posts_by_tag(&posts, " ").is_empty());
    }

    #[test]
    fn tag_path_uses_template() {
        assert_eq!(build_tag_path(DEFAULT_TAG_URL, "Web Dev"), "/tags/web-dev/");
        assert_eq!(build_tag_path("/t/{slug}", "GO"), "/t/go");
    }

    #[test]
    fn posts_by_tag_ignores_spelling() {
        let posts = vec![tagged("a", &["Go"]), tagged("b", &["Rust"]), tagged("c", &[" go"])];
        assert_eq!(slugs(posts_by_tag(&posts, "GO")), vec!["a", "c"]);
    }
}

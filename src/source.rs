use crate::config::SiteConfig;
use crate::content::frontmatter;
use crate::content::{CategoryRecord, ContentSet, PostRecord};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

pub const CATEGORIES_FILE: &str = "categories.toml";

#[derive(Debug, Default, Deserialize)]
struct CategoriesFile {
    #[serde(default)]
    category: Vec<CategoryRecord>,
}

/// 加载内容目录下的分类与文章
pub fn load_content(project_root: &Path, config: &SiteConfig) -> Result<ContentSet> {
    let content_dir = config.content_dir(project_root);
    let categories = load_categories(&content_dir)?;
    let posts = load_posts(&content_dir, config.content.include_drafts)?;
    tracing::debug!("加载完成：{} 个分类，{} 篇文章", categories.len(), posts.len());
    Ok(ContentSet { categories, posts })
}

/// 读取 categories.toml，文件不存在时返回空列表
pub fn load_categories(content_dir: &Path) -> Result<Vec<CategoryRecord>> {
    let path = content_dir.join(CATEGORIES_FILE);
    if !path.exists() {
        tracing::warn!("分类文件不存在：{}", path.display());
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("读取 {} 失败", path.display()))?;
    let file: CategoriesFile =
        toml::from_str(&raw).with_context(|| format!("解析 {} 失败", path.display()))?;
    Ok(file.category)
}

/// 加载 posts/ 下的所有 Markdown 文章，按文件名顺序
pub fn load_posts(content_dir: &Path, include_drafts: bool) -> Result<Vec<PostRecord>> {
    let posts_dir = content_dir.join("posts");
    if !posts_dir.exists() {
        tracing::warn!("文章目录不存在：{}", posts_dir.display());
        return Ok(Vec::new());
    }

    let mut entries: Vec<_> = std::fs::read_dir(&posts_dir)?
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext == "md" || ext == "markdown")
        })
        .collect();
    entries.sort_by_key(|e| e.file_name());

    let mut posts = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = entry.path();
        let filename = entry.file_name().to_string_lossy().into_owned();
        match frontmatter::parse_file(&path).and_then(|parsed| frontmatter::into_post(parsed, &filename)) {
            Ok(post) => {
                if post.draft && !include_drafts {
                    tracing::debug!("跳过草稿：{}", post.slug);
                    continue;
                }
                posts.push(post);
            }
            Err(e) => {
                tracing::error!("加载文章失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_project(root: &Path) {
        let content = root.join("content");
        fs::create_dir_all(content.join("posts")).unwrap();
        fs::write(
            content.join(CATEGORIES_FILE),
            r#"
            [[category]]
            name = "Tech"
            link = "tech"

            [[category]]
            name = "Web"
            link = "web"
            parent = "tech"
            "#,
        )
        .unwrap();
        fs::write(
            content.join("posts/2024-01-02-second.md"),
            "---\ntitle: Second\ndate: 2024-01-02\ncategories: [web]\n---\nbody",
        )
        .unwrap();
        fs::write(
            content.join("posts/2024-01-01-first.md"),
            "---\ntitle: First\ndate: 2024-01-01\n---\nbody",
        )
        .unwrap();
        fs::write(
            content.join("posts/draft.md"),
            "---\ntitle: Draft\ndate: 2024-01-03\ndraft: true\n---\nbody",
        )
        .unwrap();
        fs::write(content.join("posts/broken.md"), "---\ntitle: No date\n---\nbody").unwrap();
        fs::write(content.join("posts/notes.txt"), "ignored").unwrap();
    }

    #[test]
    fn loads_categories_and_posts() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path());
        let set = load_content(dir.path(), &SiteConfig::default()).unwrap();

        assert_eq!(set.categories.len(), 2);
        assert_eq!(set.categories[1].parent_link.as_deref(), Some("tech"));
        let slugs: Vec<_> = set.posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["first", "second"]);
        assert_eq!(set.posts[1].categories, vec!["web"]);
    }

    #[test]
    fn drafts_are_kept_on_request() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path());
        let posts = load_posts(&dir.path().join("content"), true).unwrap();
        assert!(posts.iter().any(|p| p.slug == "draft" && p.draft));
    }

    #[test]
    fn empty_project_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let set = load_content(dir.path(), &SiteConfig::default()).unwrap();
        assert!(set.categories.is_empty() && set.posts.is_empty());
    }
}

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "postshelf.toml";

#[derive(Debug, Default, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub home: HomeConfig,
    #[serde(default)]
    pub routes: RouteConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub categories: CategoryConfig,
    #[serde(default)]
    pub series: Vec<SeriesConfig>,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_content_dir")]
    pub dir: String,
    #[serde(default)]
    pub include_drafts: bool,
}

#[derive(Debug, Deserialize)]
pub struct HomeConfig {
    #[serde(default = "default_highlight_limit")]
    pub highlight_limit: usize,
    #[serde(default = "default_random_count")]
    pub random_count: usize,
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: usize,
}

#[derive(Debug, Deserialize)]
pub struct RouteConfig {
    #[serde(default = "default_post_url")]
    pub post_url: String,
    #[serde(default = "default_tag_url")]
    pub tag_url: String,
    #[serde(default = "default_category_url")]
    pub category_url: String,
}

#[derive(Debug, Deserialize)]
pub struct SummaryConfig {
    #[serde(default = "default_summary_length")]
    pub length: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryConfig {
    /// 导航中突出显示的分类 link
    #[serde(default)]
    pub featured: Vec<String>,
}

/// 系列的展示信息
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct SeriesConfig {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl SiteConfig {
    /// 读取项目根目录下的配置文件，不存在时使用默认配置
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(CONFIG_FILE);
        if !config_path.exists() {
            tracing::debug!("{} 不存在，使用默认配置", config_path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("读取 {CONFIG_FILE} 失败：{}", e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("解析 {CONFIG_FILE} 失败：{}", e))
    }

    pub fn content_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.content.dir)
    }
}

// 默认值函数
fn default_content_dir() -> String { "content".into() }
fn default_highlight_limit() -> usize { 3 }
fn default_random_count() -> usize { 5 }
fn default_posts_per_page() -> usize { 10 }
fn default_post_url() -> String { "/posts/{slug}/".into() }
fn default_tag_url() -> String { crate::content::tag::DEFAULT_TAG_URL.into() }
fn default_category_url() -> String { "/categories/{link}/".into() }
fn default_summary_length() -> usize { 150 }
fn default_log_level() -> String { "info".into() }

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: default_content_dir(),
            include_drafts: false,
        }
    }
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            highlight_limit: default_highlight_limit(),
            random_count: default_random_count(),
            posts_per_page: default_posts_per_page(),
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            post_url: default_post_url(),
            tag_url: default_tag_url(),
            category_url: default_category_url(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            length: default_summary_length(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = SiteConfig::parse("").unwrap();
        assert_eq!(config.content.dir, "content");
        assert_eq!(config.home.highlight_limit, 3);
        assert_eq!(config.routes.tag_url, "/tags/{slug}/");
        assert_eq!(config.summary.length, 150);
        assert!(config.series.is_empty());
    }

    #[test]
    fn sections_are_read() {
        let config = SiteConfig::parse(
            r#"
            [home]
            highlight_limit = 5

            [categories]
            featured = ["tech"]

            [[series]]
            slug = "weekly"
            name = "周刊"
            "#,
        )
        .unwrap();
        assert_eq!(config.home.highlight_limit, 5);
        assert_eq!(config.home.random_count, 5);
        assert_eq!(config.categories.featured, vec!["tech"]);
        assert_eq!(config.series[0].name, "周刊");
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::load(dir.path()).unwrap();
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn broken_toml_is_an_error() {
        assert!(SiteConfig::parse("[home\n").is_err());
    }
}

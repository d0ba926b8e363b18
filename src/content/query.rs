//! 文章查询：过滤、排序与派生视图
//!
//! 所有函数都是对完整文章序列的纯函数，返回新的引用序列，不改动输入。
//! 过滤无结果时返回空序列而非错误。

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::content::PostRecord;
use crate::content::category::CategoryTree;
use crate::content::excerpt;
use crate::error::ContentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Date,
    SeriesIndex,
}

impl FromStr for SortBy {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(Self::Date),
            "seriesIndex" | "series_index" => Ok(Self::SeriesIndex),
            other => Err(ContentError::InvalidInput(format!("未知排序字段：{other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ContentError::InvalidInput(format!("未知排序方向：{other}"))),
        }
    }
}

/// 默认按日期降序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortOptions {
    pub by: SortBy,
    pub order: SortOrder,
}

impl SortOptions {
    pub fn new(by: SortBy, order: SortOrder) -> Self {
        Self { by, order }
    }
}

/// 分类列表条目，`count` 含后代分类下的文章
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryListEntry {
    pub name: String,
    pub link: String,
    pub depth: usize,
    pub count: usize,
}

/// 按分类筛选；`include_descendants` 时，文章分类的祖先链命中目标也算匹配。
/// 祖先链因循环或缺失而无法解析的分类只做精确匹配。
pub fn posts_by_category<'a>(
    posts: &'a [PostRecord],
    tree: &CategoryTree,
    category_link: &str,
    include_descendants: bool,
) -> Vec<&'a PostRecord> {
    posts
        .iter()
        .filter(|post| {
            post.categories.iter().any(|c| {
                c == category_link
                    || (include_descendants
                        && tree
                            .get_ancestor_links(c)
                            .is_ok_and(|ancestors| ancestors.contains(&category_link)))
            })
        })
        .collect()
}

/// 稳定全序排序，主键相同时按 slug 升序。
/// 按系列序号排序时，没有序号的文章总在最后。
/// 接受任意文章引用序列，可直接接在过滤结果之后。
pub fn sorted_posts<'a>(
    posts: impl IntoIterator<Item = &'a PostRecord>,
    options: SortOptions,
) -> Vec<&'a PostRecord> {
    let mut out: Vec<&PostRecord> = posts.into_iter().collect();
    out.sort_by(|a, b| compare_primary(a, b, options).then_with(|| a.slug.cmp(&b.slug)));
    out
}

fn compare_primary(a: &PostRecord, b: &PostRecord, options: SortOptions) -> Ordering {
    let directed = |ord: Ordering| match options.order {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    };
    match options.by {
        SortBy::Date => directed(a.date.cmp(&b.date)),
        SortBy::SeriesIndex => match (a.series_index, b.series_index) {
            (Some(x), Some(y)) => directed(x.cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

/// 日期降序，同日按 slug 升序
fn newest_first(a: &PostRecord, b: &PostRecord) -> Ordering {
    b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug))
}

/// 置顶在前，组内按日期降序
fn sort_sticky_then_date(posts: &mut [&PostRecord]) {
    posts.sort_by(|a, b| {
        b.sticky
            .cmp(&a.sticky)
            .then_with(|| newest_first(a, b))
    });
}

pub fn non_featured_posts<'a>(posts: impl IntoIterator<Item = &'a PostRecord>) -> Vec<&'a PostRecord> {
    let mut out: Vec<&PostRecord> = posts.into_iter().filter(|p| !p.featured).collect();
    out.sort_by(|a, b| newest_first(a, b));
    out
}

pub fn posts_by_sticky<'a>(posts: impl IntoIterator<Item = &'a PostRecord>) -> Vec<&'a PostRecord> {
    let mut out: Vec<&PostRecord> = posts.into_iter().collect();
    sort_sticky_then_date(&mut out);
    out
}

pub fn non_featured_posts_by_sticky<'a>(
    posts: impl IntoIterator<Item = &'a PostRecord>,
) -> Vec<&'a PostRecord> {
    let mut out: Vec<&PostRecord> = posts.into_iter().filter(|p| !p.featured).collect();
    sort_sticky_then_date(&mut out);
    out
}

pub fn post_count(posts: &[PostRecord], predicate: impl Fn(&PostRecord) -> bool) -> usize {
    posts.iter().filter(|p| predicate(p)).count()
}

/// 随机抽取至多 `n` 篇互不相同的文章；给定 `seed` 时结果可复现
pub fn random_posts(posts: &[PostRecord], n: usize, seed: Option<u64>) -> Vec<&PostRecord> {
    match seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            posts.choose_multiple(&mut rng, n).collect()
        }
        None => posts.choose_multiple(&mut rand::thread_rng(), n).collect(),
    }
}

/// 首页重点文章：置顶 → 精选 → 其余，同档按日期降序，取前 `limit` 篇
pub fn home_highlighted_posts(posts: &[PostRecord], limit: usize) -> Vec<&PostRecord> {
    let mut out: Vec<&PostRecord> = posts.iter().collect();
    out.sort_by(|a, b| {
        highlight_rank(a)
            .cmp(&highlight_rank(b))
            .then_with(|| newest_first(a, b))
    });
    out.truncate(limit);
    out
}

fn highlight_rank(post: &PostRecord) -> u8 {
    if post.sticky {
        0
    } else if post.featured {
        1
    } else {
        2
    }
}

/// 首页列表：除去重点区已展示的文章，置顶在前按日期降序
pub fn home_page_posts(posts: &[PostRecord], highlight_limit: usize) -> Vec<&PostRecord> {
    let highlighted: HashSet<&str> = home_highlighted_posts(posts, highlight_limit)
        .into_iter()
        .map(|p| p.slug.as_str())
        .collect();
    let mut out: Vec<&PostRecord> = posts
        .iter()
        .filter(|p| !highlighted.contains(p.slug.as_str()))
        .collect();
    sort_sticky_then_date(&mut out);
    out
}

/// 文章最后一个（最具体的）分类
pub fn post_last_category(post: &PostRecord) -> Option<&str> {
    post.categories.last().map(String::as_str)
}

pub fn post_summary(post: &PostRecord, max_chars: usize) -> String {
    excerpt::summarize_markdown(&post.body, max_chars)
}

/// 优先使用 front matter 中的描述，否则从正文提取
pub fn post_description(post: &PostRecord, max_chars: usize) -> String {
    match post.description.as_deref().map(str::trim) {
        Some(desc) if !desc.is_empty() => desc.to_string(),
        _ => post_summary(post, max_chars),
    }
}

/// 卡片描述：手写摘要 → 描述 → 正文摘录，空白值视为缺失
pub fn post_description_with_summary(post: &PostRecord, max_chars: usize) -> String {
    match post.summary.as_deref().map(str::trim) {
        Some(summary) if !summary.is_empty() => summary.to_string(),
        _ => post_description(post, max_chars),
    }
}

/// 深度优先展开的分类列表及文章数
pub fn category_list(tree: &CategoryTree, posts: &[PostRecord]) -> Vec<CategoryListEntry> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for post in posts {
        let links: HashSet<&str> = post
            .categories
            .iter()
            .filter_map(|c| tree.get_ancestor_links(c).ok())
            .flatten()
            .collect();
        for link in links {
            *counts.entry(link).or_default() += 1;
        }
    }

    tree.walk()
        .map(|(depth, node)| CategoryListEntry {
            name: node.name.clone(),
            link: node.link.clone(),
            depth,
            count: counts.get(node.link.as_str()).copied().unwrap_or(0),
        })
        .collect()
}

/// 配置中精选分类的显示名，未知 link 被跳过
pub fn featured_category_names<'a>(tree: &'a CategoryTree, featured: &[String]) -> Vec<&'a str> {
    featured
        .iter()
        .filter_map(|link| {
            let name = tree.name_by_link(link);
            if name.is_none() {
                tracing::warn!("精选分类不存在：{link}");
            }
            name
        })
        .collect()
}

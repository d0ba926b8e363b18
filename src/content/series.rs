use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::SeriesConfig;
use crate::content::PostRecord;
use crate::error::{ContentError, Result};

/// 某个系列按阅读顺序排列的文章
#[derive(Debug, Clone, Serialize)]
pub struct SeriesView<'a> {
    pub series_slug: String,
    pub posts: Vec<&'a PostRecord>,
}

impl<'a> SeriesView<'a> {
    pub fn build(posts: &'a [PostRecord], series_slug: &str) -> Self {
        Self {
            series_slug: series_slug.to_string(),
            posts: series_posts(posts, series_slug),
        }
    }

    pub fn position(&self, slug: &str) -> Option<usize> {
        self.posts.iter().position(|p| p.slug == slug)
    }
}

/// 相邻文章，边界处为 `None`
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AdjacentPosts<'a> {
    pub previous: Option<&'a PostRecord>,
    pub next: Option<&'a PostRecord>,
}

/// 阅读顺序：序号升序；无序号的排在最后，彼此按日期升序
fn reading_order(a: &PostRecord, b: &PostRecord) -> Ordering {
    match (a.series_index, b.series_index) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.date.cmp(&b.date))
    .then_with(|| a.slug.cmp(&b.slug))
}

pub fn series_posts<'a>(posts: &'a [PostRecord], series_slug: &str) -> Vec<&'a PostRecord> {
    let mut out: Vec<&PostRecord> = posts.iter().filter(|p| p.in_series(series_slug)).collect();
    out.sort_by(|a, b| reading_order(a, b));
    out
}

/// 系列列表视图：最新的在前
pub fn posts_by_series_slug<'a>(posts: &'a [PostRecord], series_slug: &str) -> Vec<&'a PostRecord> {
    let mut out: Vec<&PostRecord> = posts.iter().filter(|p| p.in_series(series_slug)).collect();
    out.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
    out
}

pub fn adjacent_series_posts<'a>(
    posts: &'a [PostRecord],
    current_slug: &str,
) -> Result<AdjacentPosts<'a>> {
    let current = posts
        .iter()
        .find(|p| p.slug == current_slug)
        .ok_or_else(|| ContentError::post_not_found(current_slug))?;

    let Some(series_slug) = current.series_slug.as_deref() else {
        return Ok(AdjacentPosts::default());
    };

    let view = SeriesView::build(posts, series_slug);
    let Some(idx) = view.position(current_slug) else {
        return Ok(AdjacentPosts::default());
    };

    Ok(AdjacentPosts {
        previous: idx.checked_sub(1).map(|i| view.posts[i]),
        next: view.posts.get(idx + 1).copied(),
    })
}

/// 非草稿文章中出现过的系列
pub fn enabled_series(posts: &[PostRecord]) -> BTreeSet<&str> {
    posts
        .iter()
        .filter(|p| !p.draft)
        .filter_map(|p| p.series_slug.as_deref())
        .collect()
}

/// 配置中的系列元信息
pub fn series_by_slug<'a>(series: &'a [SeriesConfig], slug: &str) -> Option<&'a SeriesConfig> {
    series.iter().find(|s| s.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::test_support::{post, series_post, slugs};

    fn abc() -> Vec<PostRecord> {
        vec![
            series_post("c", "s", Some(3), 1),
            series_post("a", "s", Some(1), 3),
            series_post("b", "s", Some(2), 2),
        ]
    }

    #[test]
    fn neighbours_in_reading_order() {
        let posts = abc();
        let adj = adjacent_series_posts(&posts, "b").unwrap();
        assert_eq!(adj.previous.unwrap().slug, "a");
        assert_eq!(adj.next.unwrap().slug, "c");

        let first = adjacent_series_posts(&posts, "a").unwrap();
        assert!(first.previous.is_none());
        assert_eq!(first.next.unwrap().slug, "b");

        let last = adjacent_series_posts(&posts, "c").unwrap();
        assert!(last.next.is_none());
    }

    #[test]
    fn adjacency_is_symmetric() {
        let mut posts = abc();
        posts.push(series_post("d", "s", None, 9));
        posts.push(series_post("e", "s", None, 4));
        let order = series_posts(&posts, "s");
        assert_eq!(slugs(order.iter().copied()), vec!["a", "b", "c", "e", "d"]);

        for p in &order {
            let adj = adjacent_series_posts(&posts, &p.slug).unwrap();
            if let Some(prev) = adj.previous {
                let back = adjacent_series_posts(&posts, &prev.slug).unwrap();
                assert_eq!(back.next.unwrap().slug, p.slug);
            }
            if let Some(next) = adj.next {
                let back = adjacent_series_posts(&posts, &next.slug).unwrap();
                assert_eq!(back.previous.unwrap().slug, p.slug);
            }
        }
    }

    #[test]
    fn post_outside_series_has_no_neighbours() {
        let mut posts = abc();
        posts.push(post("solo", 1));
        let adj = adjacent_series_posts(&posts, "solo").unwrap();
        assert!(adj.previous.is_none() && adj.next.is_none());
    }

    #[test]
    fn unknown_slug_is_not_found() {
        let err = adjacent_series_posts(&abc(), "ghost").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn listing_view_is_newest_first() {
        let posts = abc();
        assert_eq!(slugs(posts_by_series_slug(&posts, "s")), vec!["a", "b", "c"]);
        assert!(series_posts(&posts, "other").is_empty());
    }

    #[test]
    fn enabled_series_skips_drafts() {
        let mut draft = series_post("x", "hidden", Some(1), 1);
        draft.draft = true;
        let posts = vec![
            series_post("a", "weekly", Some(1), 1),
            series_post("b", "weekly", Some(2), 2),
            series_post("c", "rust", None, 3),
            draft,
            post("d", 4),
        ];
        let enabled: Vec<_> = enabled_series(&posts).into_iter().collect();
        assert_eq!(enabled, vec!["rust", "weekly"]);
    }

    #[test]
    fn series_metadata_lookup() {
        let series = vec![SeriesConfig {
            slug: "weekly".into(),
            name: "周刊".into(),
            description: String::new(),
            cover: None,
        }];
        assert_eq!(series_by_slug(&series, "weekly").unwrap().name, "周刊");
        assert!(series_by_slug(&series, "monthly").is_none());
    }
}

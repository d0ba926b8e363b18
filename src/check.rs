use std::collections::{HashMap, HashSet};

use crate::content::ContentSet;
use crate::content::category::CategoryTree;
use crate::error::ContentError;

pub struct CheckResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl CheckResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// 检查内容一致性，依次验证分类、文章和系列
pub fn run(content: &ContentSet) -> CheckResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let tree = CategoryTree::build(&content.categories);
    check_categories(content, &tree, &mut errors, &mut warnings);
    check_posts(content, &tree, &mut errors, &mut warnings);
    check_series(content, &mut warnings);

    CheckResult { errors, warnings }
}

fn check_categories(
    content: &ContentSet,
    tree: &CategoryTree,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let mut seen = HashSet::new();
    for record in &content.categories {
        if !seen.insert(record.link.as_str()) {
            errors.push(format!("分类 link 重复：{}", record.link));
        }
    }

    let links: HashSet<&str> = content.categories.iter().map(|c| c.link.as_str()).collect();
    for record in &content.categories {
        if let Some(parent) = record.parent_link.as_deref().filter(|p| !p.is_empty())
            && !links.contains(parent)
        {
            warnings.push(format!("分类 {} 的父级 {parent} 不存在", record.link));
        }
    }

    // 同一个循环只报告一次，以循环成员集合去重
    let mut reported: HashSet<Vec<String>> = HashSet::new();
    for link in tree.detached() {
        let Err(ContentError::Cycle { chain }) = tree.get_path(link) else {
            continue;
        };
        let Some(repeated) = chain.last() else {
            continue;
        };
        let start = chain.iter().position(|l| l == repeated).unwrap_or(0);
        let mut members = chain[start..chain.len() - 1].to_vec();
        members.sort();
        if reported.insert(members) {
            errors.push(ContentError::Cycle { chain }.to_string());
        }
    }
}

fn check_posts(
    content: &ContentSet,
    tree: &CategoryTree,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let mut seen = HashSet::new();
    for post in &content.posts {
        if !seen.insert(post.slug.as_str()) {
            errors.push(format!("文章 slug 重复：{}", post.slug));
        }
        for category in &post.categories {
            match tree.get_by_link(category) {
                Ok(_) => {}
                // 循环本身已在分类检查中报告
                Err(ContentError::Cycle { .. }) => warnings.push(format!(
                    "文章 {} 的分类 {category} 处于循环引用中",
                    post.slug
                )),
                Err(_) => warnings.push(format!("文章 {} 引用了未知分类 {category}", post.slug)),
            }
        }
    }
}

fn check_series(content: &ContentSet, warnings: &mut Vec<String>) {
    let mut indices: HashMap<(&str, u32), Vec<&str>> = HashMap::new();
    for post in &content.posts {
        let Some(series) = post.series_slug.as_deref() else {
            continue;
        };
        match post.series_index {
            Some(index) => indices.entry((series, index)).or_default().push(&post.slug),
            None => warnings.push(format!("系列 {series} 中的文章 {} 缺少 series_index", post.slug)),
        }
    }

    let mut duplicated: Vec<_> = indices.into_iter().filter(|(_, slugs)| slugs.len() > 1).collect();
    duplicated.sort();
    for ((series, index), slugs) in duplicated {
        warnings.push(format!(
            "系列 {series} 的序号 {index} 重复：{}",
            slugs.join(", ")
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::test_support::{post, series_post};
    use crate::content::CategoryRecord;

    #[test]
    fn clean_content_passes() {
        let mut p = post("a", 1);
        p.categories = vec!["tech".into()];
        let set = ContentSet {
            categories: vec![CategoryRecord::new("Tech", "tech", None)],
            posts: vec![p],
        };
        let result = run(&set);
        assert!(result.is_ok());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn reports_problems() {
        let mut stray = post("stray", 1);
        stray.categories = vec!["ghost".into()];
        let set = ContentSet {
            categories: vec![
                CategoryRecord::new("A", "a", Some("b")),
                CategoryRecord::new("B", "b", Some("a")),
                CategoryRecord::new("C", "c", Some("missing")),
                CategoryRecord::new("C2", "c", None),
            ],
            posts: vec![
                stray,
                post("dup", 2),
                post("dup", 3),
                series_post("s1", "weekly", Some(1), 1),
                series_post("s2", "weekly", Some(1), 2),
                series_post("s3", "weekly", None, 3),
            ],
        };
        let result = run(&set);
        assert!(!result.is_ok());
        assert!(result.errors.iter().any(|e| e.contains("分类 link 重复：c")));
        assert!(result.errors.iter().any(|e| e.contains("文章 slug 重复：dup")));
        assert!(result.errors.iter().any(|e| e.contains("循环")));
        assert!(result.warnings.iter().any(|w| w.contains("父级 missing 不存在")));
        assert!(result.warnings.iter().any(|w| w.contains("未知分类 ghost")));
        assert!(result.warnings.iter().any(|w| w.contains("缺少 series_index")));
        assert!(result.warnings.iter().any(|w| w.contains("序号 1 重复：s1, s2")));
    }

    #[test]
    fn cyclic_category_is_not_reported_as_unknown() {
        let mut p = post("p", 1);
        p.categories = vec!["a".into()];
        let set = ContentSet {
            categories: vec![
                CategoryRecord::new("A", "a", Some("b")),
                CategoryRecord::new("B", "b", Some("a")),
            ],
            posts: vec![p],
        };
        let result = run(&set);
        assert!(result.errors.iter().any(|e| e.contains("循环")));
        assert!(!result.warnings.iter().any(|w| w.contains("未知分类")));
        assert!(result.warnings.iter().any(|w| w.contains("分类 a 处于循环引用中")));
    }
}

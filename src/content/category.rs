use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::content::CategoryRecord;
use crate::error::{ContentError, Result};

/// 分类树节点，构建后不可变
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryNode {
    pub name: String,
    pub link: String,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// 深度优先展开子树，附带相对深度（自身为 0）
    pub fn flatten(&self) -> Vec<(usize, &CategoryNode)> {
        let mut out = Vec::new();
        self.flatten_into(0, &mut out);
        out
    }

    fn flatten_into<'a>(&'a self, depth: usize, out: &mut Vec<(usize, &'a CategoryNode)>) {
        out.push((depth, self));
        for child in &self.children {
            child.flatten_into(depth + 1, out);
        }
    }
}

/// 从根到目标节点的路径（面包屑）
pub type CategoryPath<'a> = Vec<&'a CategoryNode>;

/// 由扁平分类记录构建的森林
///
/// 父级关系只保存在以 link 为键的索引里，节点本身不持有回指指针。
/// 因父级循环而无法挂入森林的记录仍记录在 `parents` 中，查询时惰性报告循环。
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    roots: Vec<CategoryNode>,
    /// link → 从根开始逐层的子节点下标
    positions: HashMap<String, Vec<usize>>,
    /// link → 已解析的父级 link
    parents: HashMap<String, String>,
    /// 因循环未挂入森林的 link，保持输入顺序
    detached: Vec<String>,
}

impl CategoryTree {
    /// 宽松构建：悬空父级视为根，重复 link 保留首条，循环不在此处报错
    pub fn build(records: &[CategoryRecord]) -> Self {
        // 第一遍：link → 记录下标
        let mut by_link: HashMap<&str, usize> = HashMap::with_capacity(records.len());
        let mut kept = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if by_link.contains_key(record.link.as_str()) {
                tracing::warn!("分类 link 重复，忽略后出现的记录：{}", record.link);
                continue;
            }
            by_link.insert(record.link.as_str(), idx);
            kept.push(idx);
        }

        // 第二遍：挂到父级下或作为根，子节点保持输入顺序
        let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut root_ids = Vec::new();
        let mut parents = HashMap::new();
        for &idx in &kept {
            let record = &records[idx];
            let parent = record.parent_link.as_deref().filter(|p| !p.is_empty());
            match parent.map(|p| (p, by_link.get(p))) {
                Some((parent, Some(&parent_idx))) => {
                    children.entry(parent_idx).or_default().push(idx);
                    parents.insert(record.link.clone(), parent.to_string());
                }
                Some((parent, None)) => {
                    tracing::warn!(
                        "分类 {} 的父级 {} 不存在，按根分类处理",
                        record.link,
                        parent
                    );
                    root_ids.push(idx);
                }
                None => root_ids.push(idx),
            }
        }

        let mut positions = HashMap::with_capacity(kept.len());
        let roots = root_ids
            .iter()
            .enumerate()
            .map(|(pos, &idx)| build_node(records, &children, idx, vec![pos], &mut positions))
            .collect();

        let detached: Vec<String> = kept
            .iter()
            .map(|&idx| &records[idx].link)
            .filter(|link| !positions.contains_key(link.as_str()))
            .cloned()
            .collect();
        if !detached.is_empty() {
            tracing::warn!("{} 个分类因父级循环未能挂入分类树", detached.len());
        }

        tracing::debug!("分类树构建完成：{} 个分类", positions.len());
        Self {
            roots,
            positions,
            parents,
            detached,
        }
    }

    /// 确认所有记录都挂入了森林，否则返回首个循环
    pub fn validate(&self) -> Result<()> {
        match self.detached.first() {
            Some(link) => Err(self.cycle_error(link)),
            None => Ok(()),
        }
    }

    pub fn roots(&self) -> &[CategoryNode] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<CategoryNode> {
        self.roots
    }

    /// 已挂入森林的分类数量
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, link: &str) -> bool {
        self.positions.contains_key(link)
    }

    /// 因循环未挂入森林的 link
    pub fn detached(&self) -> &[String] {
        &self.detached
    }

    pub fn get_by_link(&self, link: &str) -> Result<&CategoryNode> {
        match self.positions.get(link) {
            Some(position) => Ok(self.node_at(position)),
            None if self.parents.contains_key(link) => Err(self.cycle_error(link)),
            None => Err(ContentError::category_not_found(link)),
        }
    }

    /// 根在前，最后一个元素即 `link` 对应节点
    pub fn get_path(&self, link: &str) -> Result<CategoryPath<'_>> {
        let mut chain = self.chain_to_root(link)?;
        chain.reverse();
        chain
            .into_iter()
            .map(|l| self.get_by_link(l))
            .collect()
    }

    pub fn get_ancestor_links(&self, link: &str) -> Result<Vec<&str>> {
        Ok(self
            .get_path(link)?
            .into_iter()
            .map(|node| node.link.as_str())
            .collect())
    }

    /// 父级节点；根分类返回 `None`
    pub fn parent_of(&self, link: &str) -> Result<Option<&CategoryNode>> {
        let path = self.get_path(link)?;
        Ok(path.len().checked_sub(2).map(|i| path[i]))
    }

    pub fn name_by_link(&self, link: &str) -> Option<&str> {
        self.get_by_link(link).ok().map(|node| node.name.as_str())
    }

    /// 深度优先顺序的全部 link
    pub fn links(&self) -> Vec<&str> {
        self.walk().map(|(_, node)| node.link.as_str()).collect()
    }

    /// 深度优先遍历整棵森林，附带深度
    pub fn walk(&self) -> impl Iterator<Item = (usize, &CategoryNode)> {
        self.roots.iter().flat_map(CategoryNode::flatten)
    }

    /// 沿父级索引向上走到根，途中访问集合用于发现循环
    fn chain_to_root<'a>(&'a self, link: &'a str) -> Result<Vec<&'a str>> {
        if !self.positions.contains_key(link) && !self.parents.contains_key(link) {
            return Err(ContentError::category_not_found(link));
        }

        let mut chain = vec![link];
        let mut seen = HashSet::from([link]);
        let mut current = link;
        while let Some(parent) = self.parents.get(current) {
            let parent = parent.as_str();
            chain.push(parent);
            if !seen.insert(parent) {
                return Err(ContentError::Cycle {
                    chain: chain.into_iter().map(str::to_string).collect(),
                });
            }
            current = parent;
        }
        Ok(chain)
    }

    fn cycle_error(&self, link: &str) -> ContentError {
        match self.chain_to_root(link) {
            Err(e) => e,
            Ok(_) => ContentError::Cycle {
                chain: vec![link.to_string()],
            },
        }
    }

    fn node_at(&self, position: &[usize]) -> &CategoryNode {
        let mut node = &self.roots[position[0]];
        for &i in &position[1..] {
            node = &node.children[i];
        }
        node
    }
}

fn build_node(
    records: &[CategoryRecord],
    children: &HashMap<usize, Vec<usize>>,
    idx: usize,
    position: Vec<usize>,
    positions: &mut HashMap<String, Vec<usize>>,
) -> CategoryNode {
    let record = &records[idx];
    let kids = children
        .get(&idx)
        .map(|ids| {
            ids.iter()
                .enumerate()
                .map(|(n, &child)| {
                    let mut child_pos = position.clone();
                    child_pos.push(n);
                    build_node(records, children, child, child_pos, positions)
                })
                .collect()
        })
        .unwrap_or_default();
    positions.insert(record.link.clone(), position);
    CategoryNode {
        name: record.name.clone(),
        link: record.link.clone(),
        children: kids,
    }
}

/// 严格构建：存在父级循环时返回 `ContentError::Cycle`
pub fn build_tree(records: &[CategoryRecord]) -> Result<CategoryTree> {
    let tree = CategoryTree::build(records);
    tree.validate()?;
    Ok(tree)
}

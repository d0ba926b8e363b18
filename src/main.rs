use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use postshelf::content::query::{self, SortOptions};
use postshelf::content::{cms, series, tag};
use postshelf::{CategoryTree, ContentSet, PostRecord, check, config, source};

#[derive(Parser)]
#[command(name = "postshelf", about = "博客内容聚合工具", version = long_version())]
struct Cli {
    /// 项目根目录（默认当前目录）
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 检查内容一致性
    Check,

    /// 输出分类树
    Tree,

    /// 输出分类的面包屑路径
    Path { link: String },

    /// 输出带文章数的分类列表
    Categories,

    /// 按条件列出文章
    Posts {
        /// 分类 link
        #[arg(long)]
        category: Option<String>,

        /// 同时匹配后代分类
        #[arg(long)]
        descendants: bool,

        /// 排序字段：date 或 seriesIndex
        #[arg(long, default_value = "date")]
        sort: String,

        /// 排序方向：asc 或 desc
        #[arg(long, default_value = "desc")]
        order: String,
    },

    /// 输出系列的阅读顺序
    Series { slug: String },

    /// 输出文章在系列中的上一篇与下一篇
    Adjacent { slug: String },

    /// 输出首页重点区与列表
    Home,

    /// 输出全部标签
    Tags,

    /// 随机抽取文章
    Random {
        /// 抽取数量（默认取配置）
        #[arg(short)]
        n: Option<usize>,

        /// 随机种子，指定后结果可复现
        #[arg(long)]
        seed: Option<u64>,
    },

    /// 将 WordPress REST 文章 JSON 转换为文章卡片
    Wp { file: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let root = cli.root.canonicalize().unwrap_or_else(|_| cli.root.clone());

    // 配置中的日志级别作为默认值，RUST_LOG 优先
    let site_config = config::SiteConfig::load(&root);
    let default_level = site_config
        .as_ref()
        .map(|c| c.log.level.clone())
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let site_config = site_config?;

    // wp 子命令不需要读取内容目录
    let content = if matches!(cli.command, Commands::Wp { .. }) {
        ContentSet::default()
    } else {
        source::load_content(&root, &site_config)?
    };
    run(cli.command, &site_config, &content)
}

fn run(command: Commands, site_config: &config::SiteConfig, content: &ContentSet) -> anyhow::Result<()> {
    let posts = content.posts.as_slice();

    match command {
        Commands::Check => {
            let result = check::run(content);

            for w in &result.warnings {
                tracing::warn!("{w}");
            }
            for e in &result.errors {
                tracing::error!("{e}");
            }

            if result.is_ok() {
                tracing::info!("检查通过（{} 个警告）", result.warnings.len());
            } else {
                anyhow::bail!(
                    "检查未通过：{} 个错误，{} 个警告",
                    result.errors.len(),
                    result.warnings.len()
                );
            }
        }
        Commands::Tree => {
            let tree = CategoryTree::build(&content.categories);
            if !tree.detached().is_empty() {
                tracing::warn!("以下分类因循环引用未输出：{}", tree.detached().join(", "));
            }
            print_json(&tree.roots())?;
        }
        Commands::Path { link } => {
            let tree = CategoryTree::build(&content.categories);
            let crumbs: Vec<_> = tree
                .get_path(&link)?
                .into_iter()
                .map(|node| Breadcrumb {
                    name: &node.name,
                    link: &node.link,
                    url: site_config.routes.category_url.replace("{link}", &node.link),
                })
                .collect();
            print_json(&crumbs)?;
        }
        Commands::Categories => {
            let tree = CategoryTree::build(&content.categories);
            print_json(&serde_json::json!({
                "featured": query::featured_category_names(&tree, &site_config.categories.featured),
                "categories": query::category_list(&tree, posts),
            }))?;
        }
        Commands::Posts {
            category,
            descendants,
            sort,
            order,
        } => {
            let options = SortOptions::new(sort.parse()?, order.parse()?);
            let tree = CategoryTree::build(&content.categories);
            let filtered = match category {
                Some(link) => query::posts_by_category(posts, &tree, &link, descendants),
                None => posts.iter().collect(),
            };
            let cards: Vec<_> = query::sorted_posts(filtered, options)
                .into_iter()
                .map(|p| card(p, site_config))
                .collect();
            print_json(&cards)?;
        }
        Commands::Series { slug } => {
            let view = series::SeriesView::build(posts, &slug);
            if view.posts.is_empty() {
                tracing::warn!("系列 {slug} 没有文章");
            }
            print_json(&serde_json::json!({
                "meta": series::series_by_slug(&site_config.series, &slug),
                "series": view,
            }))?;
        }
        Commands::Adjacent { slug } => {
            print_json(&series::adjacent_series_posts(posts, &slug)?)?;
        }
        Commands::Home => {
            let limit = site_config.home.highlight_limit;
            let highlighted: Vec<_> = query::home_highlighted_posts(posts, limit)
                .into_iter()
                .map(|p| card(p, site_config))
                .collect();
            let list: Vec<_> = query::home_page_posts(posts, limit)
                .into_iter()
                .take(site_config.home.posts_per_page)
                .map(|p| card(p, site_config))
                .collect();
            print_json(&serde_json::json!({
                "highlighted": highlighted,
                "posts": list,
                "series": series::enabled_series(posts),
            }))?;
        }
        Commands::Tags => {
            let tags: Vec<_> = tag::all_tags(posts)
                .into_iter()
                .map(|t| {
                    serde_json::json!({
                        "path": tag::build_tag_path(&site_config.routes.tag_url, &t.raw),
                        "count": tag::posts_by_tag(posts, &t.raw).len(),
                        "tag": t,
                    })
                })
                .collect();
            print_json(&tags)?;
        }
        Commands::Random { n, seed } => {
            let n = n.unwrap_or(site_config.home.random_count);
            let picked: Vec<_> = query::random_posts(posts, n, seed)
                .into_iter()
                .map(|p| card(p, site_config))
                .collect();
            print_json(&picked)?;
        }
        Commands::Wp { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("读取 {} 失败", file.display()))?;
            let post = cms::WpPost::from_json(&raw)?;
            print_json(&cms::transform_wp_post(&post)?)?;
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct Breadcrumb<'a> {
    name: &'a str,
    link: &'a str,
    url: String,
}

/// 列表输出用的文章摘要
#[derive(Serialize)]
struct Card<'a> {
    slug: &'a str,
    title: &'a str,
    url: String,
    date: String,
    category: Option<&'a str>,
    description: String,
    sticky: bool,
    featured: bool,
}

fn card<'a>(post: &'a PostRecord, site_config: &config::SiteConfig) -> Card<'a> {
    Card {
        slug: &post.slug,
        title: &post.title,
        url: site_config.routes.post_url.replace("{slug}", &post.slug),
        date: post.date.to_rfc3339(),
        category: query::post_last_category(post),
        description: query::post_description_with_summary(post, site_config.summary.length),
        sticky: post.sticky,
        featured: post.featured,
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

const fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\ncommit:  ",
        env!("POSTSHELF_GIT_COMMIT"),
        "\nbuild:   ",
        env!("POSTSHELF_BUILD_DATE"),
        "\ntarget:  ",
        env!("POSTSHELF_BUILD_TARGET"),
    )
}

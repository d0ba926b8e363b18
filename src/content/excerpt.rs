use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// Markdown 正文渲染为 HTML 后提取纯文本摘要
pub fn summarize_markdown(source: &str, max_chars: usize) -> String {
    use pulldown_cmark::{Options, Parser, html};

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut html_output = String::new();
    html::push_html(&mut html_output, Parser::new_ext(source, options));
    extract_excerpt(&html_output, max_chars)
}

/// 从 HTML 内容中提取纯文本摘要
pub fn extract_excerpt(html: &str, max_chars: usize) -> String {
    let plain = strip_html_tags(html);
    let plain = plain.trim();

    let chars: Vec<char> = plain.chars().collect();
    if chars.len() <= max_chars {
        return plain.to_string();
    }

    let mut end = max_chars;
    // 尝试在句号、问号、感叹号处截断
    for i in (max_chars.saturating_sub(30)..max_chars).rev() {
        if matches!(chars[i], '。' | '？' | '！' | '.' | '?' | '!') {
            end = i + 1;
            break;
        }
    }

    let mut excerpt: String = chars[..end].iter().collect();
    excerpt.push('…');
    excerpt
}

/// 去除 HTML 标签并解码常见实体，压缩连续空白
pub fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut in_entity = false;
    let mut entity = String::new();

    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            '&' if !in_tag => {
                in_entity = true;
                entity.clear();
                entity.push(ch);
            }
            ';' if in_entity => {
                in_entity = false;
                entity.push(ch);
                match entity.as_str() {
                    "&amp;" => result.push('&'),
                    "&lt;" => result.push('<'),
                    "&gt;" => result.push('>'),
                    "&quot;" => result.push('"'),
                    "&#39;" | "&apos;" => result.push('\''),
                    "&nbsp;" => result.push(' '),
                    _ => result.push_str(&entity),
                }
            }
            _ if in_entity => entity.push(ch),
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    if in_entity {
        result.push_str(&entity);
    }

    collapse_whitespace(&result)
}

/// 仅移除 `<...>` 标签，不解码实体、不改动空白
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

/// 连续空白压缩为单个空格
pub fn collapse_whitespace(text: &str) -> String {
    let mut compressed = String::with_capacity(text.len());
    let mut last_was_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                compressed.push(' ');
                last_was_space = true;
            }
        } else {
            compressed.push(ch);
            last_was_space = false;
        }
    }
    compressed
}

/// 按字符（而非字节）截断
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

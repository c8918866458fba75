//! HTML and media stripping for sort fields.

use std::sync::LazyLock;

use quick_xml::escape::resolve_html5_entity;
use regex_lite::Regex;

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)<style.*?>.*?</style>").unwrap());
static SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)<script.*?>.*?</script>").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<.*?>").unwrap());
static ENTITY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#?\w+;").unwrap());
static IMG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img[^>]+src=["']?([^"'>]+)["']?[^>]*>"#).unwrap()
});

/// Remove markup, keeping the file names of embedded images.
///
/// `<img src="cat.jpg">` becomes ` cat.jpg `, every other tag is dropped and
/// entities are decoded.
pub fn strip_html_media(text: &str) -> String {
    let text = IMG.replace_all(text, " ${1} ");
    strip_html(&text)
}

/// Remove comments, `<style>`/`<script>` blocks and tags, then decode entities.
pub fn strip_html(text: &str) -> String {
    let text = COMMENT.replace_all(text, "");
    let text = STYLE.replace_all(&text, "");
    let text = SCRIPT.replace_all(&text, "");
    let text = TAG.replace_all(&text, "");
    decode_entities(&text)
}

fn decode_entities(text: &str) -> String {
    let text = text.replace("&nbsp;", " ");
    ENTITY
        .replace_all(&text, |caps: &regex_lite::Captures<'_>| {
            let entity = &caps[0];
            decode_entity(entity).unwrap_or_else(|| entity.to_string())
        })
        .into_owned()
}

fn decode_entity(entity: &str) -> Option<String> {
    let body = entity.strip_prefix('&')?.strip_suffix(';')?;
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    resolve_html5_entity(body).map(str::to_string)
}

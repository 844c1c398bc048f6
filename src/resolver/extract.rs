// SPDX-License-Identifier: EUPL-1.2

//! Markup extraction shared by the storefront pipelines.
//!
//! Each field is looked up through an ordered slice of [`Rule`]s. The first
//! rule that yields a usable value wins; a rule that does not match is not an
//! error, the chain simply moves on.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use url::Url;

/// One step of an extraction chain.
pub enum Rule {
    /// First capture group of a pattern.
    Capture(&'static str, Regex),
    /// `content` of the first `<meta>` tag whose `attr` equals `value`.
    Meta {
        attr: &'static str,
        value: &'static str,
    },
    /// First capture group of a pattern, tried against every inline
    /// `<script>` body in document order.
    InlineScripts(&'static str, Regex),
    /// First URL of a `srcset` captured by the pattern.
    Srcset(&'static str, Regex),
    /// `src` of the first `<img>` whose `attr` value matches `pattern`,
    /// wherever the two attributes sit in the tag.
    Img {
        attr: &'static str,
        pattern: Regex,
    },
}

impl Rule {
    /// Build a capture rule. Rule tables are static, so a bad pattern is a
    /// programming error.
    pub fn capture(label: &'static str, pattern: &str) -> Self {
        Rule::Capture(label, compile(pattern))
    }

    pub fn meta(attr: &'static str, value: &'static str) -> Self {
        Rule::Meta { attr, value }
    }

    pub fn inline_scripts(label: &'static str, pattern: &str) -> Self {
        Rule::InlineScripts(label, compile(pattern))
    }

    pub fn srcset(label: &'static str, pattern: &str) -> Self {
        Rule::Srcset(label, compile(pattern))
    }

    pub fn img(attr: &'static str, pattern: &str) -> Self {
        Rule::Img {
            attr,
            pattern: compile(pattern),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Rule::Capture(label, _) | Rule::InlineScripts(label, _) | Rule::Srcset(label, _) => {
                *label
            }
            Rule::Meta { value, .. } => *value,
            Rule::Img { attr, .. } => *attr,
        }
    }

    fn find<'h>(&self, html: &'h str) -> Option<&'h str> {
        match self {
            Rule::Capture(_, re) => first_group(re, html),
            Rule::Meta { attr, value } => meta_content(html, attr, value),
            Rule::InlineScripts(_, re) => SCRIPT_BODY
                .captures_iter(html)
                .filter_map(|caps| caps.get(1))
                .find_map(|body| first_group(re, body.as_str())),
            Rule::Srcset(_, re) => first_group(re, html).and_then(first_srcset_url),
            Rule::Img { attr, pattern } => tag_attribute(&IMG_TAG, html, "src", |name, val| {
                name.eq_ignore_ascii_case(attr) && pattern.is_match(val)
            }),
        }
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("invalid extraction pattern")
}

fn first_group<'h>(re: &Regex, haystack: &'h str) -> Option<&'h str> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Run `rules` in order and return the first match that `accept` keeps.
pub fn first_match(
    rules: &[Rule],
    html: &str,
    accept: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    rules.iter().find_map(|rule| {
        let value = accept(rule.find(html)?)?;
        tracing::debug!(rule = rule.label(), value = %value, "extraction rule matched");
        Some(value)
    })
}

// ── Markup helpers ────────────────────────────────────────────────────────────

static TAG: Lazy<Regex> = Lazy::new(|| compile(r"<[^>]*>"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| compile(r"\s+"));
static META_TAG: Lazy<Regex> = Lazy::new(|| compile(r"(?is)<meta\b[^>]*>"));
static IMG_TAG: Lazy<Regex> = Lazy::new(|| compile(r"(?is)<img\b[^>]*>"));
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    compile(r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
});
static SCRIPT_BODY: Lazy<Regex> = Lazy::new(|| compile(r"(?is)<script\b[^>]*>(.*?)</script>"));
static LD_JSON: Lazy<Regex> = Lazy::new(|| {
    compile(r#"(?is)<script\b[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
});

fn meta_content<'h>(html: &'h str, attr: &str, value: &str) -> Option<&'h str> {
    tag_attribute(&META_TAG, html, "content", |name, val| {
        name.eq_ignore_ascii_case(attr) && val.eq_ignore_ascii_case(value)
    })
}

/// Value of `wanted` on the first tag matched by `tags` that carries an
/// attribute accepted by `selects`. Attribute order does not matter.
fn tag_attribute<'h>(
    tags: &Regex,
    html: &'h str,
    wanted: &str,
    selects: impl Fn(&str, &str) -> bool,
) -> Option<&'h str> {
    tags.find_iter(html).find_map(|tag| {
        let mut selected = false;
        let mut found = None;
        for (name, val) in attributes(tag.as_str()) {
            if selects(name, val) {
                selected = true;
            } else if name.eq_ignore_ascii_case(wanted) {
                found = Some(val);
            }
        }
        if selected {
            found
        } else {
            None
        }
    })
}

fn attributes(tag: &str) -> impl Iterator<Item = (&str, &str)> {
    ATTRIBUTE.captures_iter(tag).filter_map(|caps| {
        let name = caps.get(1)?.as_str();
        let val = caps.get(2).or_else(|| caps.get(3))?.as_str();
        Some((name, val))
    })
}

/// Decode the handful of entities storefront titles actually use.
pub fn decode_entities(s: &str) -> String {
    // `&amp;` last so `&amp;lt;` stays `&lt;`.
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

pub fn strip_tags(s: &str) -> String {
    TAG.replace_all(s, "").into_owned()
}

/// Turn raw heading/meta text into a display name.
///
/// Strips tags, decodes entities, collapses whitespace and bidi marks, then
/// removes a trailing storefront suffix matched by `suffix`. Empty results
/// are rejected so the next rule gets a chance.
pub fn clean_title(raw: &str, suffix: &Regex) -> Option<String> {
    let text = decode_entities(&strip_tags(raw));
    let text = text.replace(['\u{200e}', '\u{200f}'], "");
    let text = WHITESPACE.replace_all(text.trim(), " ");
    let text = suffix.replace(&text, "");
    let text = text.trim();

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// First candidate URL of a `srcset` value.
pub fn first_srcset_url(srcset: &str) -> Option<&str> {
    srcset.split(',').next()?.split_whitespace().next()
}

/// Make an image reference absolute. `//host/x` gets `https:`, `/x` is
/// resolved against the listing's origin.
pub fn normalize_image_url(raw: &str, listing_url: &str) -> Option<String> {
    let raw = decode_entities(raw.trim());
    if raw.is_empty() {
        return None;
    }

    if raw.starts_with("//") {
        return Some(format!("https:{raw}"));
    }

    if raw.starts_with('/') {
        let base = Url::parse(listing_url).ok()?;
        return base.join(&raw).ok().map(String::from);
    }

    Some(raw)
}

// ── JSON-LD ───────────────────────────────────────────────────────────────────

/// Bodies of every `application/ld+json` script, in document order.
pub fn ld_json_blocks(html: &str) -> impl Iterator<Item = &str> {
    LD_JSON
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse attempt that never fails loudly.
pub fn parse_json(raw: &str) -> Option<Value> {
    match serde_json::from_str(raw.trim()) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "skipping unparseable JSON");
            None
        }
    }
}

/// Name and image advertised by a JSON-LD document.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LdListing {
    pub name: Option<String>,
    pub image: Option<String>,
}

impl LdListing {
    pub fn from_value(value: &Value) -> Self {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        let image = value.get("image").and_then(|image| match image {
            Value::Array(items) => items.first().and_then(image_ref),
            other => image_ref(other),
        });

        Self { name, image }
    }
}

fn image_ref(value: &Value) -> Option<String> {
    let url = match value {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => obj.get("url").and_then(Value::as_str)?,
        _ => return None,
    };
    let url = url.trim();
    (!url.is_empty()).then(|| url.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn app_store_suffix() -> Regex {
        Regex::new(r"(?i)\s*[-–—]\s*app\s*store\s*$").unwrap()
    }

    #[test]
    fn entities_decode() {
        assert_eq!(
            decode_entities("Tom &amp; Jerry&nbsp;&quot;Run&quot; &#39;24 &apos;x&apos; &lt;b&gt;"),
            "Tom & Jerry \"Run\" '24 'x' <b>"
        );
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn title_suffix_variants_are_stripped() {
        let suffix = app_store_suffix();
        for raw in [
            "Cool Game - App Store",
            "Cool Game – App Store",
            "Cool Game — app store",
            "Cool Game -APP STORE",
        ] {
            assert_eq!(clean_title(raw, &suffix).as_deref(), Some("Cool Game"), "{raw}");
        }
    }

    #[test]
    fn title_cleaning_strips_markup() {
        let suffix = app_store_suffix();
        let raw = "\n  \u{200e}Tom &amp; Jerry <span class=\"badge\">4+</span>\n";
        assert_eq!(clean_title(raw, &suffix).as_deref(), Some("Tom & Jerry 4+"));
        assert_eq!(clean_title("<span> </span>", &suffix), None);
        assert_eq!(clean_title(" - App Store", &suffix), None);
    }

    #[test]
    fn srcset_first_entry() {
        assert_eq!(
            first_srcset_url("https://a/1.png 1x, https://a/2.png 2x"),
            Some("https://a/1.png")
        );
        assert_eq!(first_srcset_url("  /img.webp 320w"), Some("/img.webp"));
        assert_eq!(first_srcset_url(""), None);
    }

    #[test]
    fn image_urls_are_made_absolute() {
        let listing = "https://apps.apple.com/us/app/x/id1";
        assert_eq!(
            normalize_image_url("//cdn.example/i.png", listing).as_deref(),
            Some("https://cdn.example/i.png")
        );
        assert_eq!(
            normalize_image_url("/assets/i.png", listing).as_deref(),
            Some("https://apps.apple.com/assets/i.png")
        );
        assert_eq!(
            normalize_image_url("https://x/i.png?a=1&amp;b=2", listing).as_deref(),
            Some("https://x/i.png?a=1&b=2")
        );
        assert_eq!(normalize_image_url("  ", listing), None);
    }

    #[test]
    fn meta_lookup_ignores_attribute_order() {
        let html = r#"<meta content="https://a/og.png" property="og:image">
                      <meta name="og:image" content="https://a/name.png" />"#;
        let rules = [Rule::meta("property", "og:image")];
        assert_eq!(
            first_match(&rules, html, |s| Some(s.to_string())).as_deref(),
            Some("https://a/og.png")
        );
        let rules = [Rule::meta("name", "og:image")];
        assert_eq!(
            first_match(&rules, html, |s| Some(s.to_string())).as_deref(),
            Some("https://a/name.png")
        );
    }

    #[test]
    fn img_lookup_ignores_attribute_order() {
        let html = r#"<img src="https://a/plain.png">
                      <img src="https://a/first.png" class="hero app-icon">
                      <img class="app-icon" src="https://a/second.png">"#;
        let rules = [Rule::img("class", r"app-icon")];
        assert_eq!(
            first_match(&rules, html, |s| Some(s.to_string())).as_deref(),
            Some("https://a/first.png")
        );
        let rules = [Rule::img("alt", r"(?i)icon")];
        assert_eq!(first_match(&rules, html, |s| Some(s.to_string())), None);
    }

    #[test]
    fn chain_moves_past_rejected_values() {
        let html = r#"<h1 class="a"> </h1><h1 class="b">Real</h1>"#;
        let rules = [
            Rule::capture("a", r#"(?is)<h1 class="a">(.*?)</h1>"#),
            Rule::capture("missing", r#"(?is)<h2>(.*?)</h2>"#),
            Rule::capture("b", r#"(?is)<h1 class="b">(.*?)</h1>"#),
        ];
        let found = first_match(&rules, html, |s| clean_title(s, &app_store_suffix()));
        assert_eq!(found.as_deref(), Some("Real"));
    }

    #[test]
    fn ld_json_blocks_and_fields() {
        let html = r#"
            <script type="application/ld+json">{ not json</script>
            <script type='application/ld+json'>{"name":"Game","image":["https://a/1.png","https://a/2.png"]}</script>
        "#;
        let blocks: Vec<_> = ld_json_blocks(html).collect();
        assert_eq!(blocks.len(), 2);
        assert!(parse_json(blocks[0]).is_none());

        let listing = LdListing::from_value(&parse_json(blocks[1]).unwrap());
        assert_eq!(listing.name.as_deref(), Some("Game"));
        assert_eq!(listing.image.as_deref(), Some("https://a/1.png"));

        let listing = LdListing::from_value(&serde_json::json!({"image": {"url": "https://a/o.png"}}));
        assert_eq!(listing.name, None);
        assert_eq!(listing.image.as_deref(), Some("https://a/o.png"));
    }
}

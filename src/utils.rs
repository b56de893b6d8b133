use chrono::{Local, TimeZone};
use pulldown_cmark::{html::push_html, Options, Parser};
use sha2::{Digest, Sha256};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d, %H:%M:%S";

pub fn convert_markdown_to_html(markdown_content: &str) -> String {
    add_code_block_containers(render_markdown(markdown_content))
}

/// Same as [`convert_markdown_to_html`] but with raw HTML and unsafe
/// attributes stripped, for documents handed to the PDF renderer.
pub fn convert_markdown_to_safe_html(markdown_content: &str) -> String {
    let cleaned = markdown_sanitizer()
        .clean(&render_markdown(markdown_content))
        .to_string();
    add_code_block_containers(cleaned)
}

/// ammonia's defaults plus what the "extra" set emits: task-list
/// checkboxes, footnote and heading anchors, and code/footnote classes.
fn markdown_sanitizer() -> ammonia::Builder<'static> {
    let mut builder = ammonia::Builder::default();
    builder
        .add_tags(["input"])
        .add_tag_attributes("input", ["type", "checked", "disabled"])
        .add_tag_attributes("code", ["class"])
        .add_tag_attributes("div", ["class"])
        .add_tag_attributes("sup", ["class"])
        .add_generic_attributes(["id"]);
    builder
}

fn render_markdown(markdown_content: &str) -> String {
    let markdown_options = set_markdown_parser_options();
    let parser = Parser::new_ext(markdown_content, markdown_options);
    let mut html_output = String::new();
    push_html(&mut html_output, parser);
    html_output
}

/// The "extra" set: tables, footnotes, strikethrough, task lists and
/// `{#id .class}` heading attributes.
fn set_markdown_parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

fn add_code_block_containers(html: String) -> String {
    html.replace("<pre>", "<div class=\"highlight\"><pre>")
        .replace("</pre>", "</pre></div>")
}

pub fn gravatar_url(email: &str) -> String {
    let address = email.trim().to_lowercase();
    let digest = Sha256::digest(address.as_bytes());
    format!("https://www.gravatar.com/avatar/{}?d=mp", hex::encode(digest))
}

/// Renders seconds since the epoch in local time. Anything that is not a
/// usable non-zero number yields an empty string instead of an error.
pub fn format_timestamp(value: &serde_json::Value) -> String {
    let Some(seconds) = value.as_f64() else {
        return String::new();
    };
    if seconds == 0.0 || !seconds.is_finite() {
        return String::new();
    }

    let whole = seconds.floor();
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return String::new();
    }
    let nanos = ((seconds - whole) * 1e9) as u32;

    match Local.timestamp_opt(whole as i64, nanos.min(999_999_999)).single() {
        Some(date_time) => date_time.format(TIMESTAMP_FORMAT).to_string(),
        None => String::new(),
    }
}

pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_markdown_bold() {
        let html = convert_markdown_to_html("**bold**");
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_markdown_extra_features() {
        let html = convert_markdown_to_html("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_code_blocks_get_container() {
        let html = convert_markdown_to_html("```\nlet x = 1;\n```\n");
        assert!(html.starts_with("<div class=\"highlight\"><pre>"));
        assert!(html.contains("</pre></div>"));
    }

    #[test]
    fn test_safe_html_strips_scripts() {
        let html = convert_markdown_to_safe_html("hi <script>alert(1)</script>\n\n```\ncode\n```\n");
        assert!(!html.contains("<script>"));
        assert!(html.contains("<div class=\"highlight\"><pre>"));
    }

    #[test]
    fn test_safe_html_keeps_extra_markup() {
        let html = convert_markdown_to_safe_html(
            "# Plan {#plan}\n\n- [x] done\n- [ ] todo\n\nSee note[^n].\n\n[^n]: The note.\n",
        );
        assert!(html.contains("id=\"plan\""));
        assert_eq!(html.matches("type=\"checkbox\"").count(), 2);
        assert_eq!(html.matches("checked").count(), 1);
        assert!(html.contains("href=\"#n\""));
        assert!(html.contains("id=\"n\""));
        assert!(html.contains("class=\"footnote-definition\""));
    }

    #[test]
    fn test_safe_html_drops_event_handlers() {
        let html = convert_markdown_to_safe_html("<div onclick=\"steal()\" id=\"x\">hi</div>\n");
        assert!(!html.contains("onclick"));
        assert!(html.contains("id=\"x\""));
    }

    #[test]
    fn test_gravatar_url_normalises_email() {
        let url = gravatar_url("  Someone@Example.com ");
        assert_eq!(url, gravatar_url("someone@example.com"));
        assert!(url.starts_with("https://www.gravatar.com/avatar/"));
        assert!(url.ends_with("?d=mp"));

        let hash = &url["https://www.gravatar.com/avatar/".len()..url.len() - "?d=mp".len()];
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_format_timestamp() {
        let formatted = format_timestamp(&json!(1_700_000_000));
        assert_eq!(formatted.len(), "2023-11-14, 22:13:20".len());
        assert_eq!(&formatted[10..12], ", ");

        assert_eq!(format_timestamp(&json!(1_700_000_000.5)), formatted);
    }

    #[test]
    fn test_format_timestamp_lenient() {
        assert_eq!(format_timestamp(&json!(0)), "");
        assert_eq!(format_timestamp(&json!("yesterday")), "");
        assert_eq!(format_timestamp(&json!(null)), "");
        assert_eq!(format_timestamp(&json!(1e300)), "");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("user"), "User");
        assert_eq!(title_case("tool_call"), "Tool_Call");
        assert_eq!(title_case("ASSISTANT"), "Assistant");
    }
}

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::models::{ChatMessage, Role};
use crate::utils::{convert_markdown_to_safe_html, format_timestamp};

pub fn create_message_fragment(message: &ChatMessage) -> Markup {
    let date = message
        .timestamp
        .as_ref()
        .map(format_timestamp)
        .unwrap_or_default();

    let model = match message.role {
        Role::Assistant => message.model.as_deref().unwrap_or(""),
        _ => "",
    };

    let content = convert_markdown_to_safe_html(&message.content);

    html! {
        div class="message" {
            div class="mb-2 mt-4" {
                div class="d-flex justify-content-between align-items-center" {
                    div {
                        h2 class="mb-0" {
                            strong { (message.role.label()) }
                            " "
                            small class="text-muted" { (model) }
                            div {
                                small class="heading-date" { (date) }
                            }
                        }
                    }
                }
            }
            div class="markdown-section" {
                (PreEscaped(content))
            }
        }
    }
}

pub fn create_chat_document(title: &str, messages: &[ChatMessage], stylesheet: &str) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(stylesheet)) }
            }
            body {
                div class="container" {
                    div class="text-center" {
                        h1 { (title) }
                    }
                    div {
                        div {
                            @for message in messages {
                                (create_message_fragment(message))
                            }
                        }
                    }
                }
            }
        }
    }
}

use crate::ai::ChatTier;
use crate::app::Command;
use crate::features::chat::ChatCommand;
use crate::markdown::markdown_to_html;
use crate::types::{ChatMessage, Role};
use crate::ui::Dispatcher;
use dioxus::events::Key;
use dioxus::prelude::*;
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:zero]:[minute padding:zero] [period case:upper]");

fn format_message_timestamp(timestamp: Option<OffsetDateTime>) -> Option<String> {
    let mut datetime = timestamp?;
    if let Ok(offset) = UtcOffset::current_local_offset() {
        datetime = datetime.to_offset(offset);
    }
    datetime.format(MESSAGE_TIME_FORMAT).ok()
}

fn role_class(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "assistant",
    }
}

/// A model message with no text yet, shown as a thinking indicator.
fn is_pending(message: &ChatMessage, sending: bool, is_last: bool) -> bool {
    sending && is_last && message.role == Role::Model && message.text.is_empty()
}

#[component]
pub fn ChatView(tier: ChatTier) -> Element {
    let dispatch = use_context::<Dispatcher>();
    let chat = dispatch.state().read().chat(tier).clone();
    let send = move |command: ChatCommand| dispatch.send(Command::Chat(tier, command));

    let (title_key, placeholder_key) = match tier {
        ChatTier::Complex => ("chat.complexChatTitle", "chat.promptPlaceholder"),
        ChatTier::Fast => ("chat.fastChatTitle", "chat.fastPromptPlaceholder"),
    };
    let thinking = dispatch.t("chat.processing");
    let count = chat.transcript.len();
    // Replies that are not streamed have no placeholder to fill.
    let waiting_whole_reply = chat.sending && !tier.streams();

    rsx! {
        section { class: "panel chat",
            div { class: "hstack chat-header",
                h2 { class: "panel-title", {dispatch.t(title_key)} }
                div { class: "hstack",
                    button {
                        class: "btn btn-ghost",
                        onclick: move |_| send(ChatCommand::ToggleLibrary),
                        {dispatch.t("chat.libraryButton")}
                    }
                    button {
                        class: "btn btn-ghost",
                        disabled: chat.sending || chat.transcript.is_empty(),
                        onclick: move |_| send(ChatCommand::Clear),
                        {dispatch.t("chat.clearButton")}
                    }
                }
            }
            if chat.library_open {
                PromptLibrary { tier, prompts: chat.prompt_library() }
            }
            div { class: "chat-list",
                for (i, message) in chat.transcript.iter().enumerate() {
                    MessageRow {
                        key: "{i}",
                        message: message.clone(),
                        pending: is_pending(message, chat.sending, i + 1 == count),
                        thinking: thinking.clone(),
                    }
                }
                if waiting_whole_reply {
                    div { class: "message-row assistant",
                        div { class: "avatar assistant", "G" }
                        div { class: "shimmer-line", span { class: "shimmer-text", "{thinking}" } }
                    }
                }
            }
            form {
                class: "composer",
                onsubmit: move |ev| {
                    ev.prevent_default();
                    send(ChatCommand::Send);
                },
                div { class: "hstack composer-inner",
                    textarea {
                        rows: "1",
                        placeholder: dispatch.t(placeholder_key),
                        value: "{chat.input}",
                        disabled: chat.sending,
                        oninput: move |ev| send(ChatCommand::SetInput(ev.value())),
                        onkeydown: move |ev| {
                            if ev.key() == Key::Enter && !ev.modifiers().shift() {
                                ev.prevent_default();
                                send(ChatCommand::Send);
                            }
                        },
                    }
                    button {
                        class: "btn btn-primary",
                        r#type: "submit",
                        disabled: chat.sending || chat.input.trim().is_empty(),
                        {dispatch.t("chat.sendButton")}
                    }
                }
            }
        }
    }
}

#[component]
fn MessageRow(message: ChatMessage, pending: bool, thinking: String) -> Element {
    let class = role_class(message.role);
    let timestamp = format_message_timestamp(message.created_at);
    let bubble_class = if message.failed {
        "bubble assistant failed"
    } else {
        match message.role {
            Role::User => "bubble user",
            Role::Model => "bubble assistant",
        }
    };
    let html = (message.role == Role::Model && !message.failed && !pending)
        .then(|| markdown_to_html(&message.text));

    rsx! {
        div { class: format_args!("message-row {class}"),
            if message.role == Role::Model {
                div { class: "avatar assistant", "G" }
            }
            div { class: "message-stack",
                if pending {
                    div { class: "shimmer-line", span { class: "shimmer-text", "{thinking}" } }
                } else {
                    div { class: bubble_class,
                        if let Some(html) = html {
                            div { class: "md", dangerous_inner_html: "{html}" }
                        } else {
                            "{message.text}"
                        }
                    }
                }
                if let Some(ts) = timestamp {
                    div { class: format_args!("message-meta {class}"),
                        span { class: "message-timestamp", "{ts}" }
                    }
                }
            }
        }
    }
}

#[component]
fn PromptLibrary(tier: ChatTier, prompts: Vec<String>) -> Element {
    let dispatch = use_context::<Dispatcher>();
    let close_label = dispatch.t("chat.closeLibrary");
    let copy_label = dispatch.t("chat.copyPrompt");
    let use_label = dispatch.t("chat.usePrompt");

    rsx! {
        aside { class: "prompt-library",
            div { class: "hstack",
                h3 { {dispatch.t("chat.libraryTitle")} }
                button {
                    class: "btn btn-ghost",
                    aria_label: "{close_label}",
                    onclick: move |_| dispatch.send(Command::Chat(tier, ChatCommand::ToggleLibrary)),
                    "×"
                }
            }
            if prompts.is_empty() {
                p { class: "placeholder", {dispatch.t("chat.emptyLibrary")} }
                p { class: "panel-description", {dispatch.t("chat.emptyLibraryDesc")} }
            } else {
                ul {
                    for prompt in prompts {
                        PromptEntry {
                            tier,
                            prompt,
                            copy_label: copy_label.clone(),
                            use_label: use_label.clone(),
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn PromptEntry(tier: ChatTier, prompt: String, copy_label: String, use_label: String) -> Element {
    let dispatch = use_context::<Dispatcher>();
    let to_copy = prompt.clone();
    let to_use = prompt.clone();
    rsx! {
        li { class: "prompt-entry",
            p { "{prompt}" }
            div { class: "hstack",
                button {
                    class: "action-btn",
                    title: "{copy_label}",
                    onclick: move |_| dispatch.send(Command::Chat(tier, ChatCommand::CopyPrompt(to_copy.clone()))),
                    "{copy_label}"
                }
                button {
                    class: "action-btn",
                    onclick: move |_| dispatch.send(Command::Chat(tier, ChatCommand::UsePrompt(to_use.clone()))),
                    "{use_label}"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_timestamp_renders_nothing() {
        assert!(format_message_timestamp(None).is_none());
        let stamp = format_message_timestamp(Some(OffsetDateTime::UNIX_EPOCH)).unwrap();
        assert!(stamp.ends_with("AM") || stamp.ends_with("PM"));
    }

    #[test]
    fn only_trailing_empty_model_message_is_pending() {
        let placeholder = ChatMessage::model("");
        assert!(is_pending(&placeholder, true, true));
        assert!(!is_pending(&placeholder, false, true));
        assert!(!is_pending(&placeholder, true, false));
        assert!(!is_pending(&ChatMessage::user(""), true, true));
    }
}

use dioxus::prelude::*;

#[component]
pub fn ErrorBanner(message: Option<String>) -> Element {
    rsx! {
        if let Some(message) = message {
            p { class: "error-banner", role: "alert", "{message}" }
        }
    }
}

#[component]
pub fn Spinner(label: String) -> Element {
    rsx! {
        div { class: "spinner-row",
            span { class: "spinner", aria_hidden: "true" }
            span { class: "shimmer-text", "{label}" }
        }
    }
}

/// Screen title plus a one-line description.
#[component]
pub fn PanelHeading(title: String, description: String) -> Element {
    rsx! {
        h2 { class: "panel-title", "{title}" }
        p { class: "panel-description", "{description}" }
    }
}

/// Path field with a button that hands the entered path to `on_load`.
#[component]
pub fn FilePicker(placeholder: String, button_label: String, disabled: bool, on_load: EventHandler<String>) -> Element {
    let mut path = use_signal(String::new);
    rsx! {
        div { class: "hstack file-picker",
            input {
                r#type: "text",
                placeholder: "{placeholder}",
                value: "{path}",
                disabled,
                oninput: move |ev| path.set(ev.value()),
            }
            button {
                class: "btn",
                disabled: disabled || path().trim().is_empty(),
                onclick: move |_| on_load.call(path().trim().to_string()),
                "{button_label}"
            }
        }
    }
}

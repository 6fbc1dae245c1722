use crate::app::Command;
use crate::features::animate::AnimateCommand;
use crate::types::AspectRatio;
use crate::ui::Dispatcher;
use crate::views::shared::{ErrorBanner, FilePicker, PanelHeading, Spinner};
use dioxus::prelude::*;
use std::path::PathBuf;

#[component]
pub fn AnimateView() -> Element {
    let dispatch = use_context::<Dispatcher>();
    let key_selected = dispatch.state().read().animate.key_selected;
    rsx! {
        section { class: "panel animate",
            PanelHeading {
                title: dispatch.t("animate.title"),
                description: dispatch.t("animate.description"),
            }
            if key_selected {
                AnimateForm {}
            } else {
                KeyGate {}
            }
        }
    }
}

/// Shown until a credential for video requests has been confirmed.
#[component]
fn KeyGate() -> Element {
    let dispatch = use_context::<Dispatcher>();
    let animate = dispatch.state().read().animate.clone();
    let send = move |command: AnimateCommand| dispatch.send(Command::Animate(command));
    rsx! {
        div { class: "key-gate vstack",
            h3 { {dispatch.t("animate.keyRequiredTitle")} }
            p { class: "panel-description", {dispatch.t("animate.keyRequiredDescription")} }
            input {
                r#type: "password",
                placeholder: dispatch.t("animate.keyPlaceholder"),
                value: "{animate.key_input}",
                oninput: move |ev| send(AnimateCommand::SetKeyInput(ev.value())),
            }
            button {
                class: "btn btn-primary",
                onclick: move |_| send(AnimateCommand::SelectKey),
                {dispatch.t("animate.selectKeyButton")}
            }
            ErrorBanner { message: animate.error.clone() }
        }
    }
}

#[component]
fn AnimateForm() -> Element {
    let dispatch = use_context::<Dispatcher>();
    let animate = dispatch.state().read().animate.clone();
    let send = move |command: AnimateCommand| dispatch.send(Command::Animate(command));
    let generate_label = if animate.loading {
        dispatch.t("animate.generatingButton")
    } else {
        dispatch.t("animate.generateButton")
    };
    let loading_message = dispatch.t(animate.loading_message_key());
    let saved_to = animate.video.as_ref().map(|path| {
        let path = path.display().to_string();
        (path.clone(), dispatch.t_with("animate.savedTo", &[("path", &path)]))
    });

    rsx! {
        div { class: "split",
            div { class: "canvas",
                if let Some(preview) = animate.preview.clone() {
                    img { class: "canvas-image", src: "{preview}" }
                } else {
                    p { class: "placeholder", {dispatch.t("animate.uploadPlaceholder")} }
                }
                FilePicker {
                    placeholder: dispatch.t("imageEditing.filePathPlaceholder"),
                    button_label: dispatch.t("imageEditing.loadFileButton"),
                    disabled: animate.loading,
                    on_load: move |path: String| send(AnimateCommand::LoadFile(PathBuf::from(path))),
                }
            }
            div { class: "canvas",
                if animate.loading {
                    Spinner { label: loading_message }
                } else if let Some((path, caption)) = saved_to {
                    video { class: "canvas-video", src: "{path}", controls: true, autoplay: true, r#loop: true }
                    p { class: "notice", "{caption}" }
                }
            }
        }
        div { class: "vstack",
            textarea {
                rows: "2",
                placeholder: dispatch.t("animate.promptPlaceholder"),
                value: "{animate.prompt}",
                disabled: animate.loading,
                oninput: move |ev| send(AnimateCommand::SetPrompt(ev.value())),
            }
            fieldset { class: "hstack aspect-ratio",
                legend { {dispatch.t("animate.aspectRatio")} }
                for ratio in AspectRatio::ALL {
                    AspectOption { ratio, checked: ratio == animate.aspect_ratio, disabled: animate.loading }
                }
            }
            button {
                class: "btn btn-primary",
                disabled: animate.loading || animate.image.is_none(),
                onclick: move |_| send(AnimateCommand::Generate),
                "{generate_label}"
            }
            ErrorBanner { message: animate.error.clone() }
        }
    }
}

#[component]
fn AspectOption(ratio: AspectRatio, checked: bool, disabled: bool) -> Element {
    let dispatch = use_context::<Dispatcher>();
    let hint = match ratio {
        AspectRatio::Landscape => dispatch.t("animate.landscape"),
        AspectRatio::Portrait => dispatch.t("animate.portrait"),
    };
    rsx! {
        label { class: "radio",
            input {
                r#type: "radio",
                name: "aspect-ratio",
                checked,
                disabled,
                onchange: move |_| dispatch.send(Command::Animate(AnimateCommand::SetAspectRatio(ratio))),
            }
            "{ratio.as_str()} {hint}"
        }
    }
}

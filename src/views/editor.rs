use crate::app::Command;
use crate::features::editor::EditorCommand;
use crate::ui::Dispatcher;
use crate::views::shared::{ErrorBanner, FilePicker, PanelHeading, Spinner};
use dioxus::prelude::*;
use std::path::PathBuf;

#[component]
pub fn EditorView() -> Element {
    let dispatch = use_context::<Dispatcher>();
    let editor = dispatch.state().read().editor.clone();
    let send = move |command: EditorCommand| dispatch.send(Command::Editor(command));
    let apply_label = if editor.loading {
        dispatch.t("imageEditing.applyingButton")
    } else {
        dispatch.t("imageEditing.applyButton")
    };
    let can_apply = !editor.loading && editor.image.is_some() && !editor.prompt.trim().is_empty();

    rsx! {
        section { class: "panel editor",
            PanelHeading {
                title: dispatch.t("imageEditing.title"),
                description: dispatch.t("imageEditing.description"),
            }
            div { class: "split",
                div { class: "canvas",
                    if let Some(preview) = editor.preview.clone() {
                        img { class: "canvas-image", src: "{preview}" }
                    } else {
                        p { class: "placeholder", {dispatch.t("imageEditing.uploadPlaceholder")} }
                    }
                    FilePicker {
                        placeholder: dispatch.t("imageEditing.filePathPlaceholder"),
                        button_label: dispatch.t("imageEditing.loadFileButton"),
                        disabled: editor.loading,
                        on_load: move |path: String| send(EditorCommand::LoadFile(PathBuf::from(path))),
                    }
                }
                div { class: "canvas",
                    if editor.loading {
                        Spinner { label: dispatch.t("imageEditing.inProgress") }
                    } else if let Some(result) = editor.result.clone() {
                        img { class: "canvas-image", src: "{result}" }
                    } else {
                        p { class: "placeholder", {dispatch.t("imageEditing.resultPlaceholder")} }
                    }
                }
            }
            div { class: "vstack",
                textarea {
                    rows: "3",
                    placeholder: dispatch.t("imageEditing.promptPlaceholder"),
                    value: "{editor.prompt}",
                    disabled: editor.loading,
                    oninput: move |ev| send(EditorCommand::SetPrompt(ev.value())),
                }
                button {
                    class: "btn btn-primary",
                    disabled: !can_apply,
                    onclick: move |_| send(EditorCommand::Apply),
                    "{apply_label}"
                }
                ErrorBanner { message: editor.error.clone() }
            }
        }
    }
}

use crate::app::Command;
use crate::features::studio::StudioCommand;
use crate::types::DataUri;
use crate::ui::Dispatcher;
use crate::views::shared::{ErrorBanner, PanelHeading, Spinner};
use dioxus::prelude::*;
use std::path::PathBuf;

fn default_download_path(file_name: &str) -> String {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(file_name)
        .display()
        .to_string()
}

#[component]
pub fn StudioView() -> Element {
    let dispatch = use_context::<Dispatcher>();
    let studio = dispatch.state().read().studio.clone();
    let send = move |command: StudioCommand| dispatch.send(Command::Studio(command));
    let busy = studio.busy();
    let generate_label = if studio.loading {
        dispatch.t("imageGeneration.generatingButton")
    } else {
        dispatch.t("imageGeneration.generateButton")
    };

    rsx! {
        section { class: "panel studio",
            PanelHeading {
                title: dispatch.t("imageGeneration.title"),
                description: dispatch.t("imageGeneration.description"),
            }
            div { class: "vstack",
                textarea {
                    rows: "3",
                    placeholder: dispatch.t("imageGeneration.promptPlaceholder"),
                    value: "{studio.prompt}",
                    disabled: busy,
                    oninput: move |ev| send(StudioCommand::SetPrompt(ev.value())),
                }
                button {
                    class: "btn btn-primary",
                    disabled: busy || studio.prompt.trim().is_empty(),
                    onclick: move |_| send(StudioCommand::Generate),
                    "{generate_label}"
                }
                ErrorBanner { message: studio.error.clone() }
            }

            div { class: "canvas",
                if studio.loading {
                    Spinner { label: dispatch.t("imageGeneration.loading") }
                } else if let Some(image) = studio.image.clone() {
                    img { class: "canvas-image", src: "{image}", alt: "{studio.prompt}" }
                    ImageActions { image: image.clone(), removing: studio.removing_background }
                } else {
                    p { class: "placeholder", {dispatch.t("imageGeneration.placeholder")} }
                }
            }

            ErrorBanner { message: studio.background_error.clone() }
            if let Some(cutout) = studio.background_removed.clone() {
                div { class: "canvas checkerboard",
                    img { class: "canvas-image", src: "{cutout}" }
                    DownloadRow { image: cutout.clone(), file_name: "dreamcanvas-cutout.png" }
                    button {
                        class: "btn btn-ghost",
                        onclick: move |_| send(StudioCommand::DeleteBackgroundRemoved),
                        {dispatch.t("imageGeneration.deleteButton")}
                    }
                }
            }
            if let Some(notice) = studio.notice.clone() {
                p { class: "notice", "{notice}" }
            }

            HistoryStrip { entries: studio.history.entries().to_vec(), current: studio.image.clone() }
        }
    }
}

#[component]
fn ImageActions(image: DataUri, removing: bool) -> Element {
    let dispatch = use_context::<Dispatcher>();
    let send = move |command: StudioCommand| dispatch.send(Command::Studio(command));
    let remove_label = if removing {
        dispatch.t("imageGeneration.processingButton")
    } else {
        dispatch.t("imageGeneration.removeBgButton")
    };
    rsx! {
        div { class: "hstack image-actions",
            DownloadRow { image, file_name: "dreamcanvas-image.jpg" }
            button {
                class: "btn",
                disabled: removing,
                onclick: move |_| send(StudioCommand::RemoveBackground),
                "{remove_label}"
            }
            button {
                class: "btn btn-ghost",
                disabled: removing,
                onclick: move |_| send(StudioCommand::DeleteCurrent),
                {dispatch.t("imageGeneration.deleteButton")}
            }
        }
    }
}

#[component]
fn DownloadRow(image: DataUri, file_name: &'static str) -> Element {
    let dispatch = use_context::<Dispatcher>();
    let mut path = use_signal(|| default_download_path(file_name));
    rsx! {
        div { class: "hstack download-row",
            input {
                r#type: "text",
                placeholder: dispatch.t("imageGeneration.savePathPlaceholder"),
                value: "{path}",
                oninput: move |ev| path.set(ev.value()),
            }
            button {
                class: "btn",
                disabled: path().trim().is_empty(),
                onclick: move |_| {
                    dispatch.send(Command::Studio(StudioCommand::Download {
                        image: image.clone(),
                        path: PathBuf::from(path().trim()),
                    }));
                },
                {dispatch.t("imageGeneration.downloadButton")}
            }
        }
    }
}

#[component]
fn HistoryStrip(entries: Vec<DataUri>, current: Option<DataUri>) -> Element {
    let dispatch = use_context::<Dispatcher>();
    let send = move |command: StudioCommand| dispatch.send(Command::Studio(command));
    let delete_label = dispatch.t("imageGeneration.deleteFromHistory");

    rsx! {
        div { class: "history",
            div { class: "hstack history-header",
                h3 { {dispatch.t("imageGeneration.historyTitle")} }
                if !entries.is_empty() {
                    button {
                        class: "btn btn-ghost",
                        onclick: move |_| send(StudioCommand::ClearHistory),
                        {dispatch.t("imageGeneration.clearHistory")}
                    }
                }
            }
            if entries.is_empty() {
                p { class: "placeholder", {dispatch.t("imageGeneration.emptyHistory")} }
            } else {
                div { class: "history-grid",
                    for entry in entries {
                        HistoryThumb {
                            key: "{entry}",
                            selected: current.as_ref() == Some(&entry),
                            image: entry.clone(),
                            delete_label: delete_label.clone(),
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn HistoryThumb(image: DataUri, selected: bool, delete_label: String) -> Element {
    let dispatch = use_context::<Dispatcher>();
    let class = if selected { "thumb selected" } else { "thumb" };
    let src = image.to_string();
    let pick = image.clone();
    rsx! {
        div { class: class,
            img {
                src: "{src}",
                onclick: move |_| dispatch.send(Command::Studio(StudioCommand::SelectFromHistory(pick.clone()))),
            }
            button {
                class: "thumb-delete",
                title: "{delete_label}",
                aria_label: "{delete_label}",
                onclick: move |_| dispatch.send(Command::Studio(StudioCommand::DeleteFromHistory(image.clone()))),
                "×"
            }
        }
    }
}

use crate::ai::{ChatTier, Orchestrator};
use crate::app::{AppState, Command, FeatureTab, Runtime, View};
use crate::config::Settings;
use crate::i18n::{Language, Param, t, t_with};
use crate::storage::{FileStore, Persistence};
use crate::views::{
    AdminView, AnimateView, ChatView, EditorView, LoginView, PricingView, StudioView,
};
use dioxus::prelude::*;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

const STYLES: Asset = asset!("/assets/dreamcanvas.css");

/// Applies commands to the shared state and runs the effects they produce.
#[derive(Clone, Copy)]
pub struct Dispatcher {
    state: Signal<AppState>,
    runtime: Signal<Runtime>,
    outbox: Signal<UnboundedSender<Command>>,
}

impl Dispatcher {
    pub fn state(&self) -> Signal<AppState> {
        self.state
    }

    pub fn language(&self) -> Language {
        self.state.read().language
    }

    pub fn t(&self, key: &str) -> String {
        t(self.language(), key)
    }

    pub fn t_with(&self, key: &str, params: &[Param<'_>]) -> String {
        t_with(self.language(), key, params)
    }

    pub fn send(&self, command: Command) {
        let mut state = self.state;
        let effects = state.write().update(command);
        if effects.is_empty() {
            return;
        }
        let runtime = self.runtime.peek().clone();
        let outbox = self.outbox.peek().clone();
        for effect in effects {
            let runtime = runtime.clone();
            let outbox = outbox.clone();
            // Effects outlive the component that triggered them.
            spawn_forever(async move {
                runtime.execute(effect, outbox).await;
            });
        }
    }
}

fn build_dispatcher() -> Dispatcher {
    let settings = Settings::from_env().unwrap_or_else(|err| {
        tracing::error!(%err, "invalid configuration, using defaults");
        Settings::default()
    });
    tracing::info!(data_dir = %settings.data_dir.display(), "starting DreamCanvas");

    let persistence = Persistence::new(Arc::new(FileStore::new(settings.storage_dir())));
    let state = AppState::load(&persistence, settings.api_key.is_some());
    let runtime = Runtime::new(
        Orchestrator::from_settings(&settings),
        persistence,
        settings.video_dir(),
    );

    let (outbox, mut inbox) = unbounded_channel::<Command>();
    let dispatcher = Dispatcher {
        state: Signal::new(state),
        runtime: Signal::new(runtime),
        outbox: Signal::new(outbox),
    };

    spawn(async move {
        while let Some(command) = inbox.recv().await {
            dispatcher.send(command);
        }
    });
    dispatcher
}

#[component]
pub fn App() -> Element {
    let dispatcher = use_hook(build_dispatcher);
    use_context_provider(|| dispatcher);

    let session = dispatcher.state().read().session;
    let footer_text = dispatcher.t("app.footer");

    rsx! {
        document::Link { rel: "stylesheet", href: STYLES }
        if !session.authenticated {
            LoginView {}
        } else {
            AppHeader {}
            if session.view == View::Admin {
                AdminView {}
            } else {
                TabNavigation {}
                TabPanels { active_tab: session.active_tab }
            }
            footer { class: "footer", "{footer_text}" }
        }
    }
}

#[component]
fn AppHeader() -> Element {
    let dispatch = use_context::<Dispatcher>();
    let state = dispatch.state();
    let view = state.read().session.view;
    let language = state.read().language;
    let title = dispatch.t("app.title");
    let logout = dispatch.t("app.logout");
    let toggle_label = match view {
        View::Client => dispatch.t("app.adminPanel"),
        View::Admin => dispatch.t("app.backToApp"),
    };

    rsx! {
        div { class: "header",
            div { class: "header-content",
                h1 { class: "wordmark", "{title}" }
                div { class: "header-actions",
                    select {
                        class: "language-select",
                        aria_label: dispatch.t("app.language"),
                        value: language.code(),
                        onchange: move |ev| {
                            if let Some(language) = Language::from_code(&ev.value()) {
                                dispatch.send(Command::SetLanguage(language));
                            }
                        },
                        for lang in Language::ALL {
                            option { value: lang.code(), selected: lang == language, "{lang.label()}" }
                        }
                    }
                    button {
                        class: "btn btn-ghost",
                        onclick: move |_| dispatch.send(Command::ToggleView),
                        "{toggle_label}"
                    }
                    button {
                        class: "btn btn-ghost",
                        onclick: move |_| dispatch.send(Command::Logout),
                        "{logout}"
                    }
                }
            }
        }
    }
}

#[component]
fn TabPanels(active_tab: FeatureTab) -> Element {
    rsx! {
        div { class: "tab-panels",
            TabPanel { active_tab, tab: FeatureTab::Generate, children: rsx!( StudioView {} ) }
            TabPanel { active_tab, tab: FeatureTab::Edit, children: rsx!( EditorView {} ) }
            TabPanel { active_tab, tab: FeatureTab::Animate, children: rsx!( AnimateView {} ) }
            TabPanel {
                active_tab,
                tab: FeatureTab::Chat,
                children: rsx!( ChatView { tier: ChatTier::Complex } ),
            }
            TabPanel {
                active_tab,
                tab: FeatureTab::FastChat,
                children: rsx!( ChatView { tier: ChatTier::Fast } ),
            }
            TabPanel { active_tab, tab: FeatureTab::Pricing, children: rsx!( PricingView {} ) }
        }
    }
}

#[component]
fn TabPanel(active_tab: FeatureTab, tab: FeatureTab, children: Element) -> Element {
    let is_active = active_tab == tab;
    let class_suffix = if is_active { "active" } else { "" };
    rsx! {
        div {
            class: format_args!("tab-panel {}", class_suffix),
            aria_hidden: (!is_active).to_string(),
            {children}
        }
    }
}

#[component]
fn TabNavigation() -> Element {
    rsx! {
        nav { class: "tabs",
            for tab in FeatureTab::ALL {
                TabButton { tab }
            }
        }
    }
}

#[component]
fn TabButton(tab: FeatureTab) -> Element {
    let dispatch = use_context::<Dispatcher>();
    let active = dispatch.state().read().session.active_tab == tab;
    let class = if active { "tab active" } else { "tab" };
    let label = dispatch.t(tab.label_key());
    rsx! {
        button {
            class: class,
            onclick: move |_| dispatch.send(Command::SwitchTab(tab)),
            "{label}"
        }
    }
}

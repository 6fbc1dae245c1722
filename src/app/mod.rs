//! Top-level application state and the single function that changes it.
//!
//! Every user action and every finished background job arrives as a
//! [`Command`]. [`AppState::update`] applies it and returns the [`Effect`]s to
//! run; the [`Runtime`] runs them and feeds the resulting commands back in.

mod effect;
mod runtime;

pub use effect::{Effect, ImageTarget, Snapshot};
pub use runtime::Runtime;

use crate::ai::ChatTier;
use crate::features::admin::{AdminCommand, AdminState};
use crate::features::animate::{AnimateCommand, AnimateState};
use crate::features::chat::{ChatCommand, ChatState};
use crate::features::editor::{EditorCommand, EditorState};
use crate::features::login::{LoginCommand, LoginOutcome, LoginState};
use crate::features::pricing::{PricingCommand, PricingState};
use crate::features::studio::{StudioCommand, StudioState};
use crate::i18n::Language;
use crate::storage::{Persistence, StorageKey};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FeatureTab {
    #[default]
    Generate,
    Edit,
    Animate,
    Chat,
    FastChat,
    Pricing,
}

impl FeatureTab {
    pub const ALL: [FeatureTab; 6] = [
        FeatureTab::Generate,
        FeatureTab::Edit,
        FeatureTab::Animate,
        FeatureTab::Chat,
        FeatureTab::FastChat,
        FeatureTab::Pricing,
    ];

    pub fn label_key(self) -> &'static str {
        match self {
            FeatureTab::Generate => "tabs.generate",
            FeatureTab::Edit => "tabs.edit",
            FeatureTab::Animate => "tabs.animate",
            FeatureTab::Chat => "tabs.chat",
            FeatureTab::FastChat => "tabs.fastChat",
            FeatureTab::Pricing => "tabs.pricing",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Client,
    Admin,
}

/// Who is looking at what. Lives only as long as the process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub authenticated: bool,
    pub active_tab: FeatureTab,
    pub view: View,
}

#[derive(Clone, Debug)]
pub enum Command {
    Login(LoginCommand),
    Logout,
    SwitchTab(FeatureTab),
    ToggleView,
    SetLanguage(Language),
    Studio(StudioCommand),
    Editor(EditorCommand),
    Chat(ChatTier, ChatCommand),
    Animate(AnimateCommand),
    Pricing(PricingCommand),
    Admin(AdminCommand),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
    pub session: Session,
    pub language: Language,
    pub login: LoginState,
    pub studio: StudioState,
    pub editor: EditorState,
    pub complex_chat: ChatState,
    pub fast_chat: ChatState,
    pub animate: AnimateState,
    pub pricing: PricingState,
    pub admin: AdminState,
}

impl AppState {
    /// Restores everything that is persisted and starts signed out.
    pub fn load(persistence: &Persistence, key_selected: bool) -> Self {
        Self {
            session: Session::default(),
            language: persistence.load_language(),
            login: LoginState::default(),
            studio: StudioState::new(persistence.load(StorageKey::ImageHistory)),
            editor: EditorState::default(),
            complex_chat: ChatState::new(
                ChatTier::Complex,
                persistence.load(StorageKey::ComplexChat),
            ),
            fast_chat: ChatState::new(ChatTier::Fast, persistence.load(StorageKey::FastChat)),
            animate: AnimateState::new(key_selected),
            pricing: PricingState::default(),
            admin: AdminState::new(persistence.load_admin_users()),
        }
    }

    pub fn chat(&self, tier: ChatTier) -> &ChatState {
        match tier {
            ChatTier::Complex => &self.complex_chat,
            ChatTier::Fast => &self.fast_chat,
        }
    }

    pub fn chat_mut(&mut self, tier: ChatTier) -> &mut ChatState {
        match tier {
            ChatTier::Complex => &mut self.complex_chat,
            ChatTier::Fast => &mut self.fast_chat,
        }
    }

    pub fn update(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::Login(command) => {
                if self.login.handle(command) == LoginOutcome::Authenticated {
                    self.session.authenticated = true;
                }
                vec![]
            }
            Command::Logout => {
                self.session.authenticated = false;
                vec![]
            }
            Command::SwitchTab(tab) => {
                self.session.active_tab = tab;
                vec![]
            }
            Command::ToggleView => {
                self.session.view = match self.session.view {
                    View::Client => View::Admin,
                    View::Admin => View::Client,
                };
                vec![]
            }
            Command::SetLanguage(language) => {
                if self.language == language {
                    return vec![];
                }
                self.language = language;
                vec![Effect::Save(Snapshot::Language(language))]
            }
            Command::Studio(command) => self.studio.handle(command),
            Command::Editor(command) => self.editor.handle(command),
            Command::Chat(tier, command) => self.chat_mut(tier).handle(command),
            Command::Animate(command) => self.animate.handle(command),
            Command::Pricing(command) => self.pricing.handle(command),
            Command::Admin(command) => self.admin.handle(command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::load(&Persistence::in_memory(), false)
    }

    #[test]
    fn starts_signed_out_on_first_tab() {
        let app = state();
        assert_eq!(app.session, Session::default());
        assert!(!app.session.authenticated);
        assert_eq!(app.session.active_tab, FeatureTab::Generate);
        assert_eq!(app.admin.users.len(), 6);
    }

    #[test]
    fn logout_only_flips_authentication() {
        let mut app = state();
        app.update(Command::Login(LoginCommand::Google));
        app.update(Command::SwitchTab(FeatureTab::Pricing));
        app.update(Command::ToggleView);
        app.update(Command::Logout);
        assert!(!app.session.authenticated);
        assert_eq!(app.session.active_tab, FeatureTab::Pricing);
        assert_eq!(app.session.view, View::Admin);
    }

    #[test]
    fn language_change_is_persisted_once() {
        let mut app = state();
        let effects = app.update(Command::SetLanguage(Language::Pt));
        assert!(matches!(
            effects.as_slice(),
            [Effect::Save(Snapshot::Language(Language::Pt))]
        ));
        assert!(app.update(Command::SetLanguage(Language::Pt)).is_empty());
    }

    #[test]
    fn chat_commands_reach_the_right_tier() {
        let mut app = state();
        app.update(Command::Chat(ChatTier::Fast, ChatCommand::SetInput("hi".into())));
        assert_eq!(app.fast_chat.input, "hi");
        assert!(app.complex_chat.input.is_empty());
    }
}

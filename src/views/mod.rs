pub mod admin;
pub mod animate;
pub mod chat;
pub mod editor;
pub mod login;
pub mod pricing;
pub mod shared;
pub mod studio;

pub use admin::AdminView;
pub use animate::AnimateView;
pub use chat::ChatView;
pub use editor::EditorView;
pub use login::LoginView;
pub use pricing::PricingView;
pub use studio::StudioView;

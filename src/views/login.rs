use crate::app::Command;
use crate::features::FormError;
use crate::features::login::{LoginCommand, LoginView as Screen};
use crate::ui::Dispatcher;
use crate::views::shared::ErrorBanner;
use dioxus::prelude::*;

fn form_error_text(dispatch: &Dispatcher, error: Option<FormError>) -> Option<String> {
    let error = error?;
    Some(match error.translation_key() {
        Some(key) => dispatch.t(key),
        None => error.to_string(),
    })
}

#[component]
pub fn LoginView() -> Element {
    let dispatch = use_context::<Dispatcher>();
    let screen = dispatch.state().read().login.view;
    rsx! {
        div { class: "login-page",
            div { class: "login-card",
                match screen {
                    Screen::SignIn => rsx! { SignInForm {} },
                    Screen::SignUp => rsx! { SignUpForm {} },
                }
            }
        }
    }
}

#[component]
fn SignInForm() -> Element {
    let dispatch = use_context::<Dispatcher>();
    let login = dispatch.state().read().login.clone();
    let error = form_error_text(&dispatch, login.login_error);
    let send = move |command: LoginCommand| dispatch.send(Command::Login(command));

    rsx! {
        h1 { class: "wordmark", {dispatch.t("login.welcome")} }
        p { class: "panel-description", {dispatch.t("login.signInContinue")} }
        div { class: "vstack",
            button { class: "btn btn-primary", onclick: move |_| send(LoginCommand::Google),
                {dispatch.t("login.googleSignIn")}
            }
            button { class: "btn", onclick: move |_| send(LoginCommand::ShowSignUp),
                {dispatch.t("login.emailSignUp")}
            }
        }
        div { class: "divider", span { {dispatch.t("login.adminPrompt")} } }
        form {
            class: "vstack",
            onsubmit: move |ev| {
                ev.prevent_default();
                send(LoginCommand::SubmitAdmin);
            },
            label { {dispatch.t("login.adminUsernameLabel")}
                input {
                    r#type: "text",
                    value: "{login.username}",
                    oninput: move |ev| send(LoginCommand::SetUsername(ev.value())),
                }
            }
            label { {dispatch.t("login.adminPasswordLabel")}
                input {
                    r#type: "password",
                    value: "{login.password}",
                    oninput: move |ev| send(LoginCommand::SetPassword(ev.value())),
                }
            }
            ErrorBanner { message: error }
            button { class: "btn btn-primary", r#type: "submit", {dispatch.t("login.loginButton")} }
        }
    }
}

#[component]
fn SignUpForm() -> Element {
    let dispatch = use_context::<Dispatcher>();
    let login = dispatch.state().read().login.clone();
    let error = form_error_text(&dispatch, login.signup_error);
    let send = move |command: LoginCommand| dispatch.send(Command::Login(command));

    rsx! {
        h1 { class: "wordmark", {dispatch.t("login.signupTitle")} }
        p { class: "panel-description", {dispatch.t("login.signupSubtitle")} }
        form {
            class: "vstack",
            onsubmit: move |ev| {
                ev.prevent_default();
                send(LoginCommand::SubmitSignup);
            },
            label { {dispatch.t("login.emailLabel")}
                input {
                    r#type: "email",
                    value: "{login.signup_email}",
                    oninput: move |ev| send(LoginCommand::SetSignupEmail(ev.value())),
                }
            }
            label { {dispatch.t("login.passwordLabel")}
                input {
                    r#type: "password",
                    value: "{login.signup_password}",
                    oninput: move |ev| send(LoginCommand::SetSignupPassword(ev.value())),
                }
            }
            ErrorBanner { message: error }
            button { class: "btn btn-primary", r#type: "submit", {dispatch.t("login.signupButton")} }
        }
        button { class: "btn btn-ghost", onclick: move |_| send(LoginCommand::ShowSignIn),
            {dispatch.t("login.backToLogin")}
        }
    }
}

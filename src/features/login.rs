use super::FormError;

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "password";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoginView {
    #[default]
    SignIn,
    SignUp,
}

#[derive(Clone, Debug)]
pub enum LoginCommand {
    ShowSignUp,
    ShowSignIn,
    SetUsername(String),
    SetPassword(String),
    SubmitAdmin,
    Google,
    SetSignupEmail(String),
    SetSignupPassword(String),
    SubmitSignup,
}

/// Result of a login form interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    Pending,
    Authenticated,
}

/// Simulated sign-in. Nothing here talks to an identity provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginState {
    pub view: LoginView,
    pub username: String,
    pub password: String,
    pub login_error: Option<FormError>,
    pub signup_email: String,
    pub signup_password: String,
    pub signup_error: Option<FormError>,
}

impl Default for LoginState {
    fn default() -> Self {
        Self {
            view: LoginView::SignIn,
            username: ADMIN_USERNAME.to_string(),
            password: ADMIN_PASSWORD.to_string(),
            login_error: None,
            signup_email: String::new(),
            signup_password: String::new(),
            signup_error: None,
        }
    }
}

impl LoginState {
    pub fn handle(&mut self, command: LoginCommand) -> LoginOutcome {
        match command {
            LoginCommand::ShowSignUp => self.view = LoginView::SignUp,
            LoginCommand::ShowSignIn => self.view = LoginView::SignIn,
            LoginCommand::SetUsername(value) => self.username = value,
            LoginCommand::SetPassword(value) => self.password = value,
            LoginCommand::SetSignupEmail(value) => self.signup_email = value,
            LoginCommand::SetSignupPassword(value) => self.signup_password = value,
            LoginCommand::SubmitAdmin => {
                if self.username == ADMIN_USERNAME && self.password == ADMIN_PASSWORD {
                    self.login_error = None;
                    tracing::info!("admin signed in");
                    return LoginOutcome::Authenticated;
                }
                tracing::warn!(username = %self.username, "rejected admin sign-in");
                self.login_error = Some(FormError::InvalidCredentials);
            }
            LoginCommand::Google => {
                tracing::info!("simulating Google sign-in");
                return LoginOutcome::Authenticated;
            }
            LoginCommand::SubmitSignup => {
                if self.signup_email.is_empty() || self.signup_password.is_empty() {
                    self.signup_error = Some(FormError::MissingFields);
                    return LoginOutcome::Pending;
                }
                tracing::info!(email = %self.signup_email, "simulating sign-up");
                self.signup_error = None;
                return LoginOutcome::Authenticated;
            }
        }
        LoginOutcome::Pending
    }
}

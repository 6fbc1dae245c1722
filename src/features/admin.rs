use super::FormError;
use crate::app::{Effect, Snapshot};
use crate::types::{AdminUser, UserPlan, UserStatus};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdminStats {
    pub total_users: usize,
    pub active_subscriptions: usize,
    pub total_images: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddMode {
    User,
    Reseller,
}

/// Form contents for a new account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserDraft {
    pub mode: AddMode,
    pub name: String,
    pub email: String,
    pub plan: UserPlan,
}

impl UserDraft {
    fn new(mode: AddMode) -> Self {
        let plan = match mode {
            AddMode::User => UserPlan::Free,
            AddMode::Reseller => UserPlan::Reseller,
        };
        Self {
            mode,
            name: String::new(),
            email: String::new(),
            plan,
        }
    }
}

#[derive(Clone, Debug)]
pub enum AdminCommand {
    ToggleStatus(u64),
    OpenEdit(u64),
    EditName(String),
    EditEmail(String),
    EditPlan(UserPlan),
    SaveEdit,
    CloseEdit,
    RequestDelete(u64),
    ConfirmDelete,
    CancelDelete,
    OpenAdd(AddMode),
    DraftName(String),
    DraftEmail(String),
    DraftPlan(UserPlan),
    SaveAdd,
    CloseAdd,
}

/// Subscriber management. Every change to `users` is mirrored to storage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdminState {
    pub users: Vec<AdminUser>,
    /// Working copy shown in the edit modal.
    pub editing: Option<AdminUser>,
    pub confirming_delete: Option<AdminUser>,
    pub adding: Option<UserDraft>,
    pub form_error: Option<FormError>,
}

impl AdminState {
    pub fn new(users: Vec<AdminUser>) -> Self {
        Self {
            users,
            ..Self::default()
        }
    }

    pub fn stats(&self) -> AdminStats {
        AdminStats {
            total_users: self.users.len(),
            active_subscriptions: self
                .users
                .iter()
                .filter(|user| user.status == UserStatus::Active)
                .count(),
            total_images: self.users.iter().map(|user| user.images_generated).sum(),
        }
    }

    fn user(&self, id: u64) -> Option<&AdminUser> {
        self.users.iter().find(|user| user.id == id)
    }

    fn next_id(&self) -> u64 {
        self.users.iter().map(|user| user.id).max().unwrap_or(0) + 1
    }

    fn save(&self) -> Effect {
        Effect::Save(Snapshot::AdminUsers(self.users.clone()))
    }

    pub fn handle(&mut self, command: AdminCommand) -> Vec<Effect> {
        match command {
            AdminCommand::ToggleStatus(id) => {
                let Some(user) = self.users.iter_mut().find(|user| user.id == id) else {
                    return vec![];
                };
                user.status = user.status.toggled();
                vec![self.save()]
            }
            AdminCommand::OpenEdit(id) => {
                self.editing = self.user(id).cloned();
                vec![]
            }
            AdminCommand::EditName(name) => {
                if let Some(editing) = self.editing.as_mut() {
                    editing.name = name;
                }
                vec![]
            }
            AdminCommand::EditEmail(email) => {
                if let Some(editing) = self.editing.as_mut() {
                    editing.email = email;
                }
                vec![]
            }
            AdminCommand::EditPlan(plan) => {
                // Resellers keep their plan, and nobody is promoted to one here.
                if let Some(editing) = self.editing.as_mut()
                    && editing.plan != UserPlan::Reseller
                    && plan != UserPlan::Reseller
                {
                    editing.plan = plan;
                }
                vec![]
            }
            AdminCommand::SaveEdit => {
                let Some(edited) = self.editing.take() else {
                    return vec![];
                };
                match self.users.iter_mut().find(|user| user.id == edited.id) {
                    Some(user) => {
                        *user = edited;
                        vec![self.save()]
                    }
                    None => vec![],
                }
            }
            AdminCommand::CloseEdit => {
                self.editing = None;
                vec![]
            }
            AdminCommand::RequestDelete(id) => {
                self.confirming_delete = self.user(id).cloned();
                vec![]
            }
            AdminCommand::ConfirmDelete => {
                let Some(target) = self.confirming_delete.take() else {
                    return vec![];
                };
                self.users.retain(|user| user.id != target.id);
                tracing::info!(id = target.id, "user deleted");
                vec![self.save()]
            }
            AdminCommand::CancelDelete => {
                self.confirming_delete = None;
                vec![]
            }
            AdminCommand::OpenAdd(mode) => {
                self.adding = Some(UserDraft::new(mode));
                self.form_error = None;
                vec![]
            }
            AdminCommand::DraftName(name) => {
                if let Some(draft) = self.adding.as_mut() {
                    draft.name = name;
                }
                vec![]
            }
            AdminCommand::DraftEmail(email) => {
                if let Some(draft) = self.adding.as_mut() {
                    draft.email = email;
                }
                vec![]
            }
            AdminCommand::DraftPlan(plan) => {
                if let Some(draft) = self.adding.as_mut()
                    && draft.mode == AddMode::User
                    && plan != UserPlan::Reseller
                {
                    draft.plan = plan;
                }
                vec![]
            }
            AdminCommand::SaveAdd => {
                let Some(draft) = self.adding.as_ref() else {
                    return vec![];
                };
                if draft.name.trim().is_empty() || draft.email.trim().is_empty() {
                    self.form_error = Some(FormError::NameAndEmailRequired);
                    return vec![];
                }
                let user = AdminUser {
                    id: self.next_id(),
                    name: draft.name.trim().to_string(),
                    email: draft.email.trim().to_string(),
                    status: UserStatus::Active,
                    images_generated: 0,
                    plan: draft.plan,
                };
                tracing::info!(id = user.id, plan = user.plan.as_str(), "user added");
                self.users.push(user);
                self.adding = None;
                self.form_error = None;
                vec![self.save()]
            }
            AdminCommand::CloseAdd => {
                self.adding = None;
                self.form_error = None;
                vec![]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::seed_users;

    #[test]
    fn stats_over_seed_data() {
        let admin = AdminState::new(seed_users());
        assert_eq!(
            admin.stats(),
            AdminStats {
                total_users: 6,
                active_subscriptions: 5,
                total_images: 85 + 23 + 150 + 450 + 98 + 5,
            }
        );
    }

    #[test]
    fn toggle_flips_status_and_saves() {
        let mut admin = AdminState::new(seed_users());
        let effects = admin.handle(AdminCommand::ToggleStatus(3));
        assert_eq!(effects.len(), 1);
        assert_eq!(admin.users[2].status, UserStatus::Active);
        assert!(admin.handle(AdminCommand::ToggleStatus(99)).is_empty());
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut admin = AdminState::new(seed_users());
        admin.handle(AdminCommand::RequestDelete(1));
        assert_eq!(admin.users.len(), 6);
        admin.handle(AdminCommand::CancelDelete);
        assert!(admin.handle(AdminCommand::ConfirmDelete).is_empty());

        admin.handle(AdminCommand::RequestDelete(1));
        admin.handle(AdminCommand::ConfirmDelete);
        assert!(admin.users.iter().all(|u| u.id != 1));
    }

    #[test]
    fn edit_replaces_user_by_id() {
        let mut admin = AdminState::new(seed_users());
        admin.handle(AdminCommand::OpenEdit(2));
        admin.handle(AdminCommand::EditName("Robert Williams".into()));
        admin.handle(AdminCommand::EditPlan(UserPlan::Reseller));
        admin.handle(AdminCommand::EditPlan(UserPlan::Ultimate));
        admin.handle(AdminCommand::SaveEdit);
        let bob = admin.users.iter().find(|u| u.id == 2).unwrap();
        assert_eq!(bob.name, "Robert Williams");
        assert_eq!(bob.plan, UserPlan::Ultimate);
        assert!(admin.editing.is_none());
    }

    #[test]
    fn add_requires_name_and_email_and_assigns_fresh_id() {
        let mut admin = AdminState::new(seed_users());
        admin.handle(AdminCommand::OpenAdd(AddMode::Reseller));
        admin.handle(AdminCommand::DraftName("Zed".into()));
        assert!(admin.handle(AdminCommand::SaveAdd).is_empty());
        assert_eq!(admin.form_error, Some(FormError::NameAndEmailRequired));

        admin.handle(AdminCommand::DraftEmail("zed@example.com".into()));
        admin.handle(AdminCommand::DraftPlan(UserPlan::Pro));
        admin.handle(AdminCommand::SaveAdd);
        let zed = admin.users.last().unwrap();
        assert_eq!(zed.id, 8);
        assert_eq!(zed.plan, UserPlan::Reseller);
        assert_eq!(zed.images_generated, 0);
        assert!(admin.adding.is_none());
    }
}

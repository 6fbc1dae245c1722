use crate::app::Command;
use crate::features::admin::{AddMode, AdminCommand, UserDraft};
use crate::types::{AdminUser, UserPlan, UserStatus};
use crate::ui::Dispatcher;
use crate::views::shared::ErrorBanner;
use dioxus::prelude::*;

fn plan_class(plan: UserPlan) -> &'static str {
    match plan {
        UserPlan::Free => "plan-gray",
        UserPlan::Starter => "plan-green",
        UserPlan::Pro => "plan-blue",
        UserPlan::Ultimate => "plan-purple",
        UserPlan::Reseller => "plan-amber",
    }
}

#[component]
pub fn AdminView() -> Element {
    let dispatch = use_context::<Dispatcher>();
    let admin = dispatch.state().read().admin.clone();
    let stats = admin.stats();
    let send = move |command: AdminCommand| dispatch.send(Command::Admin(command));

    rsx! {
        section { class: "panel admin",
            div { class: "stat-grid",
                StatCard { label: dispatch.t("admin.stats.totalUsers"), value: stats.total_users.to_string() }
                StatCard {
                    label: dispatch.t("admin.stats.activeSubscriptions"),
                    value: stats.active_subscriptions.to_string(),
                }
                StatCard { label: dispatch.t("admin.stats.totalImages"), value: stats.total_images.to_string() }
            }
            div { class: "hstack admin-header",
                div {
                    h2 { class: "panel-title", {dispatch.t("admin.users.title")} }
                    p { class: "panel-description", {dispatch.t("admin.users.description")} }
                }
                div { class: "hstack",
                    button { class: "btn", onclick: move |_| send(AdminCommand::OpenAdd(AddMode::Reseller)),
                        {dispatch.t("admin.users.addResellerButton")}
                    }
                    button { class: "btn btn-primary", onclick: move |_| send(AdminCommand::OpenAdd(AddMode::User)),
                        {dispatch.t("admin.users.addUserButton")}
                    }
                }
            }
            if admin.users.is_empty() {
                p { class: "placeholder", {dispatch.t("admin.users.empty")} }
            } else {
                table { class: "user-table",
                    thead {
                        tr {
                            th { {dispatch.t("admin.users.headerUser")} }
                            th { {dispatch.t("admin.users.headerPlan")} }
                            th { {dispatch.t("admin.users.headerImages")} }
                            th { {dispatch.t("admin.users.headerStatus")} }
                            th { {dispatch.t("admin.users.headerActions")} }
                        }
                    }
                    tbody {
                        for user in admin.users.iter().cloned() {
                            UserRow { key: "{user.id}", user: user.clone() }
                        }
                    }
                }
            }
            if let Some(user) = admin.editing.clone() {
                EditUserModal { user }
            }
            if let Some(draft) = admin.adding.clone() {
                AddUserModal { draft, has_error: admin.form_error.is_some() }
            }
            if let Some(user) = admin.confirming_delete.clone() {
                ConfirmDeleteModal { user }
            }
        }
    }
}

#[component]
fn StatCard(label: String, value: String) -> Element {
    rsx! {
        div { class: "stat-card",
            p { class: "stat-label", "{label}" }
            p { class: "stat-value", "{value}" }
        }
    }
}

#[component]
fn UserRow(user: AdminUser) -> Element {
    let dispatch = use_context::<Dispatcher>();
    let send = move |command: AdminCommand| dispatch.send(Command::Admin(command));
    let id = user.id;
    let (status_label, status_class, toggle_label) = match user.status {
        UserStatus::Active => (
            dispatch.t("admin.users.statusActive"),
            "status active",
            dispatch.t("admin.users.blockButton"),
        ),
        UserStatus::Blocked => (
            dispatch.t("admin.users.statusBlocked"),
            "status blocked",
            dispatch.t("admin.users.activateButton"),
        ),
    };

    rsx! {
        tr {
            td {
                p { class: "user-name", "{user.name}" }
                p { class: "user-email", "{user.email}" }
            }
            td { span { class: format_args!("pill {}", plan_class(user.plan)), "{user.plan.as_str()}" } }
            td { "{user.images_generated}" }
            td { span { class: status_class, "{status_label}" } }
            td { class: "hstack row-actions",
                button { class: "action-btn", onclick: move |_| send(AdminCommand::OpenEdit(id)),
                    {dispatch.t("admin.users.editButton")}
                }
                button { class: "action-btn", onclick: move |_| send(AdminCommand::ToggleStatus(id)), "{toggle_label}" }
                button { class: "action-btn danger", onclick: move |_| send(AdminCommand::RequestDelete(id)),
                    {dispatch.t("admin.users.deleteButton")}
                }
            }
        }
    }
}

/// Plan dropdown. A reseller's plan is shown but cannot be changed.
#[component]
fn PlanSelect(plan: UserPlan, on_change: EventHandler<UserPlan>) -> Element {
    let dispatch = use_context::<Dispatcher>();
    let locked = plan == UserPlan::Reseller;
    rsx! {
        label { {dispatch.t("admin.editModal.planLabel")}
            select {
                value: plan.as_str(),
                disabled: locked,
                onchange: move |ev| {
                    if let Some(plan) = UserPlan::parse(&ev.value()) {
                        on_change.call(plan);
                    }
                },
                if locked {
                    option { value: plan.as_str(), selected: true, "{plan.as_str()}" }
                } else {
                    for choice in UserPlan::SELECTABLE {
                        option { value: choice.as_str(), selected: choice == plan, "{choice.as_str()}" }
                    }
                }
            }
        }
    }
}

#[component]
fn EditUserModal(user: AdminUser) -> Element {
    let dispatch = use_context::<Dispatcher>();
    let send = move |command: AdminCommand| dispatch.send(Command::Admin(command));
    let description = dispatch.t_with("admin.editModal.description", &[("userName", &user.name)]);

    rsx! {
        div { class: "modal-backdrop", onclick: move |_| send(AdminCommand::CloseEdit),
            form {
                class: "modal vstack",
                onclick: move |ev| ev.stop_propagation(),
                onsubmit: move |ev| {
                    ev.prevent_default();
                    send(AdminCommand::SaveEdit);
                },
                h3 { {dispatch.t("admin.editModal.title")} }
                p { class: "panel-description", "{description}" }
                label { {dispatch.t("admin.editModal.nameLabel")}
                    input {
                        r#type: "text",
                        value: "{user.name}",
                        oninput: move |ev| send(AdminCommand::EditName(ev.value())),
                    }
                }
                label { {dispatch.t("admin.editModal.emailLabel")}
                    input {
                        r#type: "email",
                        value: "{user.email}",
                        oninput: move |ev| send(AdminCommand::EditEmail(ev.value())),
                    }
                }
                PlanSelect { plan: user.plan, on_change: move |plan| send(AdminCommand::EditPlan(plan)) }
                div { class: "hstack modal-actions",
                    button { class: "btn btn-ghost", r#type: "button", onclick: move |_| send(AdminCommand::CloseEdit),
                        {dispatch.t("admin.editModal.cancelButton")}
                    }
                    button { class: "btn btn-primary", r#type: "submit", {dispatch.t("admin.editModal.saveButton")} }
                }
            }
        }
    }
}

#[component]
fn AddUserModal(draft: UserDraft, has_error: bool) -> Element {
    let dispatch = use_context::<Dispatcher>();
    let send = move |command: AdminCommand| dispatch.send(Command::Admin(command));
    let (title_key, description_key) = match draft.mode {
        AddMode::User => ("admin.addUserModal.userTitle", "admin.addUserModal.userDescription"),
        AddMode::Reseller => (
            "admin.addUserModal.resellerTitle",
            "admin.addUserModal.resellerDescription",
        ),
    };
    let error = has_error.then(|| dispatch.t("admin.addUserModal.requiredError"));

    rsx! {
        div { class: "modal-backdrop", onclick: move |_| send(AdminCommand::CloseAdd),
            form {
                class: "modal vstack",
                onclick: move |ev| ev.stop_propagation(),
                onsubmit: move |ev| {
                    ev.prevent_default();
                    send(AdminCommand::SaveAdd);
                },
                h3 { {dispatch.t(title_key)} }
                p { class: "panel-description", {dispatch.t(description_key)} }
                label { {dispatch.t("admin.editModal.nameLabel")}
                    input {
                        r#type: "text",
                        value: "{draft.name}",
                        oninput: move |ev| send(AdminCommand::DraftName(ev.value())),
                    }
                }
                label { {dispatch.t("admin.editModal.emailLabel")}
                    input {
                        r#type: "email",
                        value: "{draft.email}",
                        oninput: move |ev| send(AdminCommand::DraftEmail(ev.value())),
                    }
                }
                PlanSelect { plan: draft.plan, on_change: move |plan| send(AdminCommand::DraftPlan(plan)) }
                ErrorBanner { message: error }
                div { class: "hstack modal-actions",
                    button { class: "btn btn-ghost", r#type: "button", onclick: move |_| send(AdminCommand::CloseAdd),
                        {dispatch.t("admin.editModal.cancelButton")}
                    }
                    button { class: "btn btn-primary", r#type: "submit", {dispatch.t("admin.addUserModal.saveButton")} }
                }
            }
        }
    }
}

#[component]
fn ConfirmDeleteModal(user: AdminUser) -> Element {
    let dispatch = use_context::<Dispatcher>();
    let send = move |command: AdminCommand| dispatch.send(Command::Admin(command));
    let message = dispatch.t_with("admin.confirmModal.message", &[("userName", &user.name)]);
    rsx! {
        div { class: "modal-backdrop", onclick: move |_| send(AdminCommand::CancelDelete),
            div { class: "modal vstack", onclick: move |ev| ev.stop_propagation(),
                h3 { {dispatch.t("admin.confirmModal.title")} }
                p { "{message}" }
                div { class: "hstack modal-actions",
                    button { class: "btn btn-ghost", onclick: move |_| send(AdminCommand::CancelDelete),
                        {dispatch.t("admin.confirmModal.cancelButton")}
                    }
                    button { class: "btn btn-danger", onclick: move |_| send(AdminCommand::ConfirmDelete),
                        {dispatch.t("admin.confirmModal.confirmButton")}
                    }
                }
            }
        }
    }
}

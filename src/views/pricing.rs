use crate::app::Command;
use crate::features::pricing::{
    Checkout, CheckoutStage, PIX_CODE, PLANS, PaymentMethod, Plan, PlanColor, PricingCommand,
};
use crate::ui::Dispatcher;
use crate::views::shared::Spinner;
use dioxus::prelude::*;

fn color_class(color: PlanColor) -> &'static str {
    match color {
        PlanColor::Gray => "plan-gray",
        PlanColor::Green => "plan-green",
        PlanColor::Blue => "plan-blue",
        PlanColor::Purple => "plan-purple",
    }
}

fn feature_class(included: bool) -> &'static str {
    if included { "included" } else { "excluded" }
}

#[component]
pub fn PricingView() -> Element {
    let dispatch = use_context::<Dispatcher>();
    let pricing = dispatch.state().read().pricing.clone();

    rsx! {
        section { class: "panel pricing",
            h2 { class: "panel-title centered", {dispatch.t("pricing.title")} }
            p { class: "panel-description centered", {dispatch.t("pricing.subtitle")} }
            div { class: "plan-grid",
                for plan in PLANS.iter() {
                    PlanCard { plan, current: pricing.is_current(plan) }
                }
            }
            if let Some(checkout) = pricing.checkout.clone() {
                CheckoutModal { checkout }
            }
        }
    }
}

#[component]
fn PlanCard(plan: &'static Plan, current: bool) -> Element {
    let dispatch = use_context::<Dispatcher>();
    let highlight = if plan.highlight { "highlight" } else { "" };
    let button_label = if current {
        dispatch.t("pricing.currentPlan")
    } else {
        dispatch.t("pricing.choosePlan")
    };
    rsx! {
        div { class: format_args!("plan-card {} {highlight}", color_class(plan.color)),
            if plan.highlight {
                span { class: "badge", {dispatch.t("pricing.mostPopular")} }
            }
            h3 { "{plan.name}" }
            p { class: "panel-description", "{plan.description}" }
            p { class: "price",
                span { class: "amount", "{plan.price}" }
                span { class: "period", {dispatch.t("pricing.perMonth")} }
            }
            ul { class: "features",
                for feature in plan.features.iter() {
                    li { class: feature_class(feature.included),
                        span { class: "mark", if feature.included { "✓" } else { "✗" } }
                        "{feature.text}"
                    }
                }
            }
            button {
                class: "btn btn-primary",
                disabled: current,
                onclick: move |_| dispatch.send(Command::Pricing(PricingCommand::Choose(plan.name.to_string()))),
                "{button_label}"
            }
        }
    }
}

#[component]
fn CheckoutModal(checkout: Checkout) -> Element {
    let dispatch = use_context::<Dispatcher>();
    let send = move |command: PricingCommand| dispatch.send(Command::Pricing(command));
    let plan = checkout.plan;

    let body = match checkout.stage {
        CheckoutStage::Success => rsx! {
            div { class: "vstack centered success",
                span { class: "success-mark", "✓" }
                h3 { {dispatch.t("pricing.successTitle")} }
                p { {dispatch.t_with("pricing.successMessage", &[("plan", plan.name)])} }
            }
        },
        stage => {
            let processing = stage == CheckoutStage::Processing;
            let pay_label = if processing {
                dispatch.t("pricing.processing")
            } else {
                dispatch.t_with("pricing.pay", &[("price", plan.price)])
            };
            rsx! {
                h3 { {dispatch.t("pricing.checkoutTitle")} }
                p { class: "panel-description",
                    {dispatch.t_with("pricing.checkoutSubtitle", &[("plan", plan.name)])}
                }
                div { class: "hstack method-tabs",
                    MethodTab { method: PaymentMethod::Card, active: checkout.method, disabled: processing }
                    MethodTab { method: PaymentMethod::Pix, active: checkout.method, disabled: processing }
                }
                match checkout.method {
                    PaymentMethod::Card => rsx! {
                        div { class: "vstack card-form",
                            label { {dispatch.t("pricing.cardNumber")}
                                input { r#type: "text", placeholder: "0000 0000 0000 0000", disabled: processing }
                            }
                            div { class: "hstack",
                                label { {dispatch.t("pricing.expiry")}
                                    input { r#type: "text", placeholder: "MM/YY", disabled: processing }
                                }
                                label { {dispatch.t("pricing.cvc")}
                                    input { r#type: "text", placeholder: "123", disabled: processing }
                                }
                            }
                        }
                    },
                    PaymentMethod::Pix => rsx! {
                        div { class: "vstack pix",
                            div { class: "qr-placeholder", aria_hidden: "true" }
                            p { {dispatch.t("pricing.pixInstructions")} }
                            div { class: "hstack",
                                code { "{PIX_CODE}" }
                                button { class: "btn", onclick: move |_| send(PricingCommand::CopyPixCode),
                                    {dispatch.t("pricing.copy")}
                                }
                            }
                        }
                    },
                }
                if processing {
                    Spinner { label: pay_label }
                } else {
                    button { class: "btn btn-primary", onclick: move |_| send(PricingCommand::Pay), "{pay_label}" }
                }
            }
        }
    };

    rsx! {
        div { class: "modal-backdrop", onclick: move |_| send(PricingCommand::Close),
            div { class: "modal", onclick: move |ev| ev.stop_propagation(),
                if checkout.stage != CheckoutStage::Success {
                    button { class: "modal-close", onclick: move |_| send(PricingCommand::Close), "×" }
                }
                {body}
            }
        }
    }
}

#[component]
fn MethodTab(method: PaymentMethod, active: PaymentMethod, disabled: bool) -> Element {
    let dispatch = use_context::<Dispatcher>();
    let label = match method {
        PaymentMethod::Card => dispatch.t("pricing.card"),
        PaymentMethod::Pix => dispatch.t("pricing.pix"),
    };
    let class = if method == active { "tab active" } else { "tab" };
    rsx! {
        button {
            class: class,
            disabled,
            onclick: move |_| dispatch.send(Command::Pricing(PricingCommand::SetMethod(method))),
            "{label}"
        }
    }
}

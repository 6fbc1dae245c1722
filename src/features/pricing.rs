use crate::app::{Command, Effect};
use std::time::Duration;

pub const PROCESSING_DELAY: Duration = Duration::from_millis(1500);
pub const SUCCESS_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_PLAN: &str = "Pro";
pub const PIX_CODE: &str = "000201265802BR5913...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanColor {
    Gray,
    Green,
    Blue,
    Purple,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanFeature {
    pub text: &'static str,
    pub included: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Plan {
    pub name: &'static str,
    pub price: &'static str,
    pub color: PlanColor,
    pub description: &'static str,
    pub highlight: bool,
    pub features: &'static [PlanFeature],
}

const fn yes(text: &'static str) -> PlanFeature {
    PlanFeature {
        text,
        included: true,
    }
}

const fn no(text: &'static str) -> PlanFeature {
    PlanFeature {
        text,
        included: false,
    }
}

pub static PLANS: [Plan; 4] = [
    Plan {
        name: "Free",
        price: "R$0",
        color: PlanColor::Gray,
        description: "For trying out DreamCanvas.",
        highlight: false,
        features: &[
            yes("15 images/month"),
            yes("Standard resolution"),
            yes("Limited styles"),
            yes("Includes light watermark"),
            no("Background removal"),
            no("4K upscale"),
            no("API Access"),
        ],
    },
    Plan {
        name: "Starter",
        price: "R$29",
        color: PlanColor::Green,
        description: "For hobbyists and personal projects.",
        highlight: false,
        features: &[
            yes("200 images/month"),
            yes("HD resolution"),
            yes("All styles unlocked"),
            yes("No watermark"),
            yes("Background removal (30/month)"),
            yes("2K upscale"),
            yes("Basic support"),
            no("API Access"),
        ],
    },
    Plan {
        name: "Pro",
        price: "R$59",
        color: PlanColor::Blue,
        description: "For professionals and frequent creators.",
        highlight: true,
        features: &[
            yes("1000 images/month"),
            yes("4K resolution"),
            yes("Unlimited 4K upscale"),
            yes("Unlimited background removal"),
            yes("Priority generation queue"),
            yes("Exclusive advanced styles"),
            yes("AI for variations & improvements"),
            no("API Access"),
        ],
    },
    Plan {
        name: "Ultimate",
        price: "R$99",
        color: PlanColor::Purple,
        description: "For power users and businesses.",
        highlight: false,
        features: &[
            yes("Unlimited images"),
            yes("Unlimited 4K resolution"),
            yes("AI logo creation"),
            yes("Advanced editor"),
            yes("Early access to new features"),
            yes("API Access"),
            yes("Instant generation (no queue)"),
        ],
    },
];

pub fn find_plan(name: &str) -> Option<&'static Plan> {
    PLANS.iter().find(|plan| plan.name == name)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaymentMethod {
    #[default]
    Card,
    Pix,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckoutStage {
    Form,
    Processing,
    Success,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checkout {
    pub plan: &'static Plan,
    pub method: PaymentMethod,
    pub stage: CheckoutStage,
    id: u64,
}

#[derive(Clone, Debug)]
pub enum PricingCommand {
    Choose(String),
    SetMethod(PaymentMethod),
    Pay,
    /// Timer for checkout number `id`.
    ProcessingDone(u64),
    SuccessShown(u64),
    Close,
    CopyPixCode,
}

/// Plan picker with a simulated checkout. No money moves anywhere.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricingState {
    pub selected_plan: String,
    pub checkout: Option<Checkout>,
    next_checkout: u64,
}

impl Default for PricingState {
    fn default() -> Self {
        Self {
            selected_plan: DEFAULT_PLAN.to_string(),
            checkout: None,
            next_checkout: 0,
        }
    }
}

impl PricingState {
    pub fn is_current(&self, plan: &Plan) -> bool {
        self.selected_plan == plan.name
    }

    fn active_checkout(&mut self, id: u64, stage: CheckoutStage) -> Option<&mut Checkout> {
        self.checkout
            .as_mut()
            .filter(|checkout| checkout.id == id && checkout.stage == stage)
    }

    pub fn handle(&mut self, command: PricingCommand) -> Vec<Effect> {
        match command {
            PricingCommand::Choose(name) => {
                let Some(plan) = find_plan(&name) else {
                    tracing::warn!(plan = %name, "unknown plan chosen");
                    return vec![];
                };
                if self.is_current(plan) || self.checkout.is_some() {
                    return vec![];
                }
                self.next_checkout += 1;
                self.checkout = Some(Checkout {
                    plan,
                    method: PaymentMethod::default(),
                    stage: CheckoutStage::Form,
                    id: self.next_checkout,
                });
                vec![]
            }
            PricingCommand::SetMethod(method) => {
                if let Some(checkout) = self.checkout.as_mut()
                    && checkout.stage == CheckoutStage::Form
                {
                    checkout.method = method;
                }
                vec![]
            }
            PricingCommand::Pay => match self.checkout.as_mut() {
                Some(checkout) if checkout.stage == CheckoutStage::Form => {
                    checkout.stage = CheckoutStage::Processing;
                    tracing::info!(plan = checkout.plan.name, method = ?checkout.method, "simulating payment");
                    vec![Effect::schedule(
                        PROCESSING_DELAY,
                        Command::Pricing(PricingCommand::ProcessingDone(checkout.id)),
                    )]
                }
                _ => vec![],
            },
            PricingCommand::ProcessingDone(id) => {
                let Some(checkout) = self.active_checkout(id, CheckoutStage::Processing) else {
                    return vec![];
                };
                checkout.stage = CheckoutStage::Success;
                vec![Effect::schedule(
                    SUCCESS_DELAY,
                    Command::Pricing(PricingCommand::SuccessShown(id)),
                )]
            }
            PricingCommand::SuccessShown(id) => {
                let Some(checkout) = self.active_checkout(id, CheckoutStage::Success) else {
                    return vec![];
                };
                let plan = checkout.plan.name;
                self.selected_plan = plan.to_string();
                self.checkout = None;
                tracing::info!(plan, "plan activated");
                vec![]
            }
            PricingCommand::Close => {
                if self
                    .checkout
                    .as_ref()
                    .is_some_and(|checkout| checkout.stage != CheckoutStage::Success)
                {
                    self.checkout = None;
                }
                vec![]
            }
            PricingCommand::CopyPixCode => vec![Effect::CopyToClipboard(PIX_CODE.to_string())],
        }
    }
}

//! Per-domain agent configuration.

use support_router_core::types::Intent;

/// Everything that distinguishes one domain agent from another.
#[derive(Debug, Clone)]
pub struct DomainProfile {
    /// Domain served.
    pub intent: Intent,
    /// Routing name, equal to the intent label.
    pub name: String,
    /// Name used in prompts and answers.
    pub display_name: String,
    /// One-line description for introspection.
    pub description: String,
    /// Domain instructions placed in the system prompt.
    pub instructions: String,
}

impl DomainProfile {
    /// Create a profile for an intent. `name` is derived from the intent.
    pub fn new(
        intent: Intent,
        display_name: impl Into<String>,
        description: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            intent,
            name: intent.as_str().to_string(),
            display_name: display_name.into(),
            description: description.into(),
            instructions: instructions.into(),
        }
    }

    pub fn hr() -> Self {
        Self::new(
            Intent::Hr,
            "HR Assistant",
            "Benefits, leave, payroll policy, onboarding and workplace policies",
            "You answer human-resources questions for employees: health insurance and other \
             benefits, vacation and leave, payroll schedules, onboarding, performance reviews \
             and workplace conduct policies.",
        )
    }

    pub fn it() -> Self {
        Self::new(
            Intent::It,
            "IT Support",
            "Accounts, passwords, devices, network access and software",
            "You answer IT support questions: password resets, account lockouts, VPN and \
             network access, laptops and peripherals, email, and software installation. \
             Give concrete step-by-step instructions.",
        )
    }

    pub fn finance() -> Self {
        Self::new(
            Intent::Finance,
            "Finance Desk",
            "Refunds, invoices, expenses, reimbursements and billing",
            "You answer finance questions: refunds and their timelines, invoices, billing \
             disputes, expense reports, reimbursements and payment methods.",
        )
    }

    pub fn legal() -> Self {
        Self::new(
            Intent::Legal,
            "Legal & Compliance",
            "Privacy, terms of service, contracts and regulatory compliance",
            "You answer legal and compliance questions: the privacy policy and data \
             handling, terms of service, contracts, intellectual property and regulatory \
             obligations. Do not give personal legal advice.",
        )
    }

    /// The four built-in profiles, in routing order.
    pub fn all() -> Vec<Self> {
        vec![Self::hr(), Self::it(), Self::finance(), Self::legal()]
    }

    /// Built-in profile for an intent, if it has an agent.
    pub fn for_intent(intent: Intent) -> Option<Self> {
        match intent {
            Intent::Hr => Some(Self::hr()),
            Intent::It => Some(Self::it()),
            Intent::Finance => Some(Self::finance()),
            Intent::Legal => Some(Self::legal()),
            Intent::General => None,
        }
    }
}

//! Wizard steps.

use serde::{Deserialize, Serialize};

/// One page of the checkout wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Shipping,
    Billing,
    Payment,
    Review,
}

impl CheckoutStep {
    /// 1-based position shown in the progress bar.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Shipping => 1,
            Self::Billing => 2,
            Self::Payment => 3,
            Self::Review => 4,
        }
    }

    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Shipping => Some(Self::Billing),
            Self::Billing => Some(Self::Payment),
            Self::Payment => Some(Self::Review),
            Self::Review => None,
        }
    }

    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Shipping => None,
            Self::Billing => Some(Self::Shipping),
            Self::Payment => Some(Self::Billing),
            Self::Review => Some(Self::Payment),
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Shipping => "Shipping",
            Self::Billing => "Billing",
            Self::Payment => "Payment",
            Self::Review => "Review",
        }
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

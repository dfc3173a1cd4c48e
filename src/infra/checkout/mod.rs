//! The checkout backends a purchase can be handed off to. Exactly one
//! backend receives the prepared steps; which one is the host's choice, made
//! per purchase.

pub mod direct;
pub mod hosted;
pub mod widget;

/// A checkout backend chosen by the host for a single purchase.
pub enum Checkout {
    /// An inline swap widget that funds and executes the purchase in-page.
    Widget(Box<dyn widget::SwapWidget>),
    /// A provider-hosted payment modal.
    Hosted(Box<dyn hosted::PaymentModal>),
    /// Direct submission through the buyer's wallet.
    Direct(Box<dyn direct::TransactionSender>),
}

impl Checkout {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Widget(_) => "widget",
            Self::Hosted(_) => "hosted",
            Self::Direct(_) => "direct",
        }
    }
}

impl std::fmt::Debug for Checkout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Widget(#[from] widget::Error),
    #[error(transparent)]
    Hosted(#[from] hosted::Error),
    #[error(transparent)]
    Direct(#[from] direct::Error),
}

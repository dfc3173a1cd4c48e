pub mod domain;
pub mod infra;
pub mod util;

#[cfg(test)]
mod tests;

pub use crate::{
    domain::{
        flow::{
            BuyFlow,
            Error,
            FundsStatus,
            Handlers,
            Listener,
            ModalPhase,
            Quote,
            Snapshot,
            Success,
        },
        price::{FeeBreakdown, FeeConfig, FeeKind, FormatOptions, Price},
        purchase::PurchaseRequest,
        step::{StepKind, TransactionStep},
    },
    infra::checkout::Checkout,
};

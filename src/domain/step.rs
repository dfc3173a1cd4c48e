//! The on-chain actions required to complete a purchase.

use {
    crate::{domain::eth, util},
    std::fmt::{self, Debug, Formatter},
};

/// One atomic on-chain action of a purchase. A purchase is a list of steps in
/// strict order: a token approval, when required, always precedes the
/// buy/mint step.
///
/// Steps are immutable once built for a given quantity and price; a quantity
/// change invalidates the whole list and requires rebuilding.
#[derive(Clone)]
pub struct TransactionStep {
    pub kind: StepKind,
    /// The contract that gets called on-chain.
    pub to: eth::ContractAddress,
    /// The associated calldata for the on-chain call.
    pub calldata: Vec<u8>,
    /// The native value sent along with the call.
    pub value: eth::Ether,
    /// For approval steps, the ERC-20 spender recovered from the calldata.
    /// Some checkout backends need it for pre-approval UX.
    pub spender: Option<eth::ContractAddress>,
    /// The account the step executes on behalf of, when it differs from the
    /// transaction sender.
    pub on_behalf_of: Option<eth::Address>,
}

impl Debug for TransactionStep {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("TransactionStep")
            .field("kind", &self.kind)
            .field("to", &self.to)
            .field("calldata", &util::fmt::Hex(&self.calldata))
            .field("value", &self.value)
            .field("spender", &self.spender)
            .finish()
    }
}

impl TransactionStep {
    pub fn is_buy(&self) -> bool {
        matches!(self.kind, StepKind::Buy | StepKind::Mint)
    }
}

/// The kind of an atomic purchase step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StepKind {
    /// An ERC-20 `approve` granting the sales or marketplace contract the
    /// allowance it needs.
    TokenApproval,
    /// The buy call of a secondary-market order.
    Buy,
    /// The mint call of a primary sale.
    Mint,
    /// An off-chain signature request.
    Signature,
}

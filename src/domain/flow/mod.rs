//! The buy modal flow.
//!
//! [`BuyFlow`] is an explicit state container: one instance per modal, all
//! mutable state behind a single lock, no globals. Opening a purchase,
//! picking a quantity and handing off to a checkout backend are methods on
//! the container, and everything observable is read through [`BuyFlow::snapshot`].
//!
//! Concurrency model: every open session carries an epoch. [`BuyFlow::show`]
//! and [`BuyFlow::close`] bump it, and any async work started under an older
//! epoch discards its results instead of writing them back. A checkout that
//! resolves after the modal was closed therefore changes nothing.

pub mod steps;

use {
    crate::{
        domain::{
            eth,
            price::{self, FeeBreakdown, FeeConfig, Price},
            purchase::{CollectionInfo, PurchaseRequest, TokenStandard},
            step::TransactionStep,
        },
        infra::{
            self,
            abi,
            blockchain::ContractReader,
            checkout::{self, Checkout, direct, hosted, widget},
            loaders::{self, DataLoaders},
            marketplace,
            metrics,
        },
        util,
    },
    std::sync::{Arc, Mutex},
};

/// The lifecycle phase of a hosted UI surface. Both the payment modal and
/// the checkout surface move `Idle -> Opening -> Open` and only ever reach
/// `Opening` once per attempt; a failed handoff falls back to `Idle`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ModalPhase {
    Idle,
    Opening,
    Open,
}

/// Completion callbacks supplied by the host when the modal opens. These are
/// notification hooks only; all error data lives in [`Error`] values, never
/// inside the callbacks.
#[derive(Clone)]
pub struct Handlers {
    pub on_success: Arc<dyn Fn(Success) + Send + Sync>,
    pub on_error: Arc<dyn Fn(&Error) + Send + Sync>,
}

/// A completed purchase.
#[derive(Clone, Debug)]
pub struct Success {
    /// The buy transaction hash, when the backend surfaces one. Hosted
    /// providers that settle off-chain first may not.
    pub tx_hash: Option<eth::TxHash>,
}

/// An observable snapshot of the modal state.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub is_open: bool,
    pub quantity: Option<u64>,
    pub payment_phase: ModalPhase,
    pub checkout_phase: ModalPhase,
}

/// The priced breakdown of the current purchase, for display.
#[derive(Clone, Debug)]
pub struct Quote {
    pub quantity: u64,
    pub currency: loaders::Currency,
    pub subtotal: Price,
    pub fees: Vec<FeeBreakdown>,
    pub total: Price,
}

/// The buyer's funds position for the current purchase. Insufficient funds
/// is validation data for the UI, not an error.
#[derive(Clone, Debug)]
pub struct FundsStatus {
    pub sufficient: bool,
    pub balance: eth::U256,
    pub required: eth::U256,
    pub currency: loaders::Currency,
}

struct State {
    epoch: u64,
    is_open: bool,
    request: Option<PurchaseRequest>,
    buyer: Option<eth::Address>,
    quantity: Option<u64>,
    payment_phase: ModalPhase,
    checkout_phase: ModalPhase,
    handlers: Option<Handlers>,
    steps: Option<Vec<TransactionStep>>,
}

impl State {
    fn reset(&mut self) {
        self.is_open = false;
        self.request = None;
        self.buyer = None;
        self.quantity = None;
        self.payment_phase = ModalPhase::Idle;
        self.checkout_phase = ModalPhase::Idle;
        self.handlers = None;
        self.steps = None;
    }
}

/// A state-change listener registered with [`BuyFlow::subscribe`].
pub type Listener = Arc<dyn Fn(&Snapshot) + Send + Sync>;

/// The buy modal state machine.
pub struct BuyFlow {
    state: Mutex<State>,
    listeners: Mutex<Vec<Listener>>,
    chain: eth::ChainId,
    fees: Vec<FeeConfig>,
    marketplace: marketplace::Client,
    resolver: abi::Resolver,
    reader: Arc<dyn ContractReader>,
    loaders: Arc<dyn DataLoaders>,
}

impl BuyFlow {
    pub fn new(
        config: &infra::config::Config,
        loaders: Arc<dyn DataLoaders>,
        reader: Arc<dyn ContractReader>,
    ) -> Self {
        Self {
            state: Mutex::new(State {
                epoch: 0,
                is_open: false,
                request: None,
                buyer: None,
                quantity: None,
                payment_phase: ModalPhase::Idle,
                checkout_phase: ModalPhase::Idle,
                handlers: None,
                steps: None,
            }),
            listeners: Mutex::new(Vec::new()),
            chain: config.chain_id,
            fees: config.fees.clone(),
            marketplace: marketplace::Client::new(config.marketplace.clone()),
            resolver: abi::Resolver::new(Arc::clone(&reader)),
            reader,
            loaders,
        }
    }

    /// Opens the modal for a purchase. An already open modal is closed first;
    /// async work belonging to the previous session is orphaned by the epoch
    /// bump and discards itself.
    pub fn show(
        &self,
        request: PurchaseRequest,
        buyer: eth::Address,
        handlers: Handlers,
    ) -> Result<(), Error> {
        if request.chain() != self.chain {
            return Err(Error::ChainMismatch {
                expected: self.chain,
                got: request.chain(),
            });
        }

        {
            let mut state = self.state.lock().unwrap();
            state.epoch += 1;
            state.reset();
            state.is_open = true;
            state.quantity = initial_quantity(&request);
            state.buyer = Some(buyer);
            state.request = Some(request);
            state.handlers = Some(handlers);
            tracing::info!(epoch = state.epoch, "buy modal opened");
        }
        metrics::flow_opened();
        self.notify();
        Ok(())
    }

    /// Closes the modal and resets all state. In-flight async work observes
    /// the epoch bump and discards its results.
    pub fn close(&self) {
        {
            let mut state = self.state.lock().unwrap();
            state.epoch += 1;
            state.reset();
            tracing::debug!(epoch = state.epoch, "buy modal closed");
        }
        self.notify();
    }

    /// Sets the purchase quantity. Any previously built steps are for the old
    /// quantity and get invalidated.
    pub fn set_quantity(&self, quantity: u64) -> Result<(), Error> {
        if quantity == 0 {
            return Err(Error::InvalidQuantity);
        }
        {
            let mut state = self.state.lock().unwrap();
            if !state.is_open {
                return Err(Error::NotOpen);
            }
            state.quantity = Some(quantity);
            state.steps = None;
        }
        self.notify();
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.lock().unwrap();
        Snapshot {
            is_open: state.is_open,
            quantity: state.quantity,
            payment_phase: state.payment_phase,
            checkout_phase: state.checkout_phase,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().unwrap().is_open
    }

    pub fn payment_phase(&self) -> ModalPhase {
        self.state.lock().unwrap().payment_phase
    }

    pub fn checkout_phase(&self) -> ModalPhase {
        self.state.lock().unwrap().checkout_phase
    }

    /// The steps prepared by the last checkout attempt, if any.
    pub fn steps(&self) -> Option<Vec<TransactionStep>> {
        self.state.lock().unwrap().steps.clone()
    }

    /// Prices the current purchase for display.
    pub async fn quote(&self) -> Result<Quote, Error> {
        let (request, quantity) = self.session()?;
        let pricing = self.load_pricing(&request, quantity).await?;
        Ok(Quote {
            quantity: pricing.quantity,
            currency: pricing.currency,
            subtotal: pricing.subtotal,
            fees: pricing.fees,
            total: pricing.total,
        })
    }

    /// Checks whether the buyer can cover the fee-inclusive total.
    pub async fn check_funds(&self) -> Result<FundsStatus, Error> {
        let (request, quantity) = self.session()?;
        let buyer = self
            .state
            .lock()
            .unwrap()
            .buyer
            .ok_or(Error::NotOpen)?;
        let pricing = self.load_pricing(&request, quantity).await?;
        let balance = self
            .loaders
            .balance(request.chain(), buyer, pricing.currency.address)
            .await?;
        let required = pricing.total.to_u256()?;
        Ok(FundsStatus {
            sufficient: balance.raw >= required,
            balance: balance.raw,
            required,
            currency: pricing.currency,
        })
    }

    /// Prepares the purchase and hands it off to the chosen checkout backend.
    ///
    /// The phase slot owned by the backend moves to `Opening` synchronously,
    /// and a handoff requires both surfaces to be idle, so concurrent calls
    /// cannot both proceed and one purchase is never held by two backends:
    /// the loser observes a busy surface and returns without doing anything.
    /// On any
    /// failure before the handoff completes the slot falls back to `Idle`
    /// and the error handler fires; the modal itself stays open.
    pub async fn start_checkout(&self, backend: &Checkout) -> Result<(), Error> {
        let slot = match backend {
            Checkout::Hosted(_) => Slot::Payment,
            Checkout::Widget(_) | Checkout::Direct(_) => Slot::Checkout,
        };

        let (epoch, request, buyer, quantity) = {
            let mut state = self.state.lock().unwrap();
            if !state.is_open {
                return Err(Error::NotOpen);
            }
            // The surfaces are mutually exclusive per purchase: a handoff is
            // only allowed while neither surface is opening or open.
            if state.payment_phase != ModalPhase::Idle || state.checkout_phase != ModalPhase::Idle {
                tracing::debug!(backend = backend.name(), "checkout already in progress");
                return Ok(());
            }
            *slot.get_mut(&mut state) = ModalPhase::Opening;
            (
                state.epoch,
                state.request.clone().ok_or(Error::NotOpen)?,
                state.buyer.ok_or(Error::NotOpen)?,
                state.quantity,
            )
        };
        self.notify();

        match self
            .checkout(epoch, slot, backend, &request, buyer, quantity)
            .await
        {
            Ok(()) => Ok(()),
            Err(err) => {
                metrics::build_error(err.format_variant());
                let handlers = self.if_current(epoch, |state| {
                    *slot.get_mut(state) = ModalPhase::Idle;
                    state.handlers.clone()
                });
                self.notify();
                if let Some(Some(handlers)) = handlers {
                    (handlers.on_error)(&err);
                }
                Err(err)
            }
        }
    }

    /// Signals that an externally driven backend (widget or hosted provider)
    /// completed the purchase. Both surfaces return to `Idle`; the modal
    /// stays open so the host can show a confirmation.
    ///
    /// The signal only lands while a surface is actually open. A provider
    /// from a previous session completing late finds both surfaces idle and
    /// changes nothing.
    pub fn complete_success(&self, tx_hash: Option<eth::TxHash>) {
        let Some(handlers) = self.take_open_handoff() else {
            return;
        };
        self.notify();
        if let Some(handlers) = handlers {
            (handlers.on_success)(Success { tx_hash });
        }
    }

    /// Signals that an externally driven backend failed after the handoff.
    /// Like [`BuyFlow::complete_success`], stale signals are discarded.
    pub fn complete_error(&self, error: Error) {
        let Some(handlers) = self.take_open_handoff() else {
            return;
        };
        self.notify();
        if let Some(handlers) = handlers {
            (handlers.on_error)(&error);
        }
    }

    /// Resets both surfaces if one of them is `Open` and returns the session
    /// handlers; `None` means there is no live handoff to complete.
    fn take_open_handoff(&self) -> Option<Option<Handlers>> {
        let mut state = self.state.lock().unwrap();
        if state.payment_phase != ModalPhase::Open && state.checkout_phase != ModalPhase::Open {
            tracing::debug!("ignoring completion signal with no open surface");
            return None;
        }
        state.payment_phase = ModalPhase::Idle;
        state.checkout_phase = ModalPhase::Idle;
        Some(state.handlers.clone())
    }

    async fn checkout(
        &self,
        epoch: u64,
        slot: Slot,
        backend: &Checkout,
        request: &PurchaseRequest,
        buyer: eth::Address,
        quantity: Option<u64>,
    ) -> Result<(), Error> {
        let pricing = self.load_pricing(request, quantity).await?;
        let steps = self.build_steps(request, buyer, &pricing).await?;

        // The session may have ended while loading; if so, drop everything.
        if self
            .if_current(epoch, |state| state.steps = Some(steps.clone()))
            .is_none()
        {
            tracing::debug!("discarding steps prepared for a closed session");
            return Ok(());
        }

        let buy = steps
            .iter()
            .find(|step| step.is_buy())
            .ok_or(Error::Steps(steps::Error::MissingBuyStep))?;

        match backend {
            Checkout::Widget(widget) => {
                widget
                    .open(widget::Params {
                        to_chain: request.chain(),
                        to_address: buy.to,
                        to_token: pricing.currency.address,
                        to_calldata: buy.calldata.clone(),
                        to_amount: pricing.total.to_u256()?,
                    })
                    .await
                    .map_err(checkout::Error::from)?;
                self.open_slot(epoch, slot, backend);
            }
            Checkout::Hosted(hosted) => {
                hosted
                    .open(hosted::Params {
                        chain: request.chain(),
                        collectibles: collectible_items(request, &pricing)?,
                        currency: pricing.currency.address,
                        price: pricing.total.to_u256()?,
                        target_contract: buy.to,
                        tx_data: buy.calldata.clone(),
                        recipient: buyer,
                    })
                    .await
                    .map_err(checkout::Error::from)?;
                self.open_slot(epoch, slot, backend);
            }
            Checkout::Direct(sender) => {
                self.open_slot(epoch, slot, backend);
                let mut buy_hash = None;
                for step in &steps {
                    let hash = sender
                        .send(direct::Transaction {
                            chain: request.chain(),
                            to: step.to,
                            data: step.calldata.clone(),
                            value: step.value,
                        })
                        .await
                        .map_err(checkout::Error::from)?;
                    let mined = sender
                        .wait_for_receipt(request.chain(), hash)
                        .await
                        .map_err(checkout::Error::from)?;
                    if !mined {
                        return Err(Error::Checkout(checkout::Error::Direct(
                            direct::Error::Reverted(hash),
                        )));
                    }
                    if step.is_buy() {
                        buy_hash = Some(hash);
                    }
                }
                let handlers = self.if_current(epoch, |state| {
                    *slot.get_mut(state) = ModalPhase::Idle;
                    state.handlers.clone()
                });
                self.notify();
                if let Some(Some(handlers)) = handlers {
                    (handlers.on_success)(Success { tx_hash: buy_hash });
                }
            }
        }
        Ok(())
    }

    /// Moves the backend's phase slot to `Open`, unless the session ended
    /// while the backend was accepting the handoff.
    fn open_slot(&self, epoch: u64, slot: Slot, backend: &Checkout) {
        let current = self
            .if_current(epoch, |state| *slot.get_mut(state) = ModalPhase::Open)
            .is_some();
        if current {
            metrics::handoff(backend.name());
            tracing::info!(backend = backend.name(), "checkout handed off");
            self.notify();
        }
    }

    /// Registers a listener that fires after every observable state change.
    /// Listeners live for the lifetime of the flow and survive `close`.
    pub fn subscribe(&self, listener: Listener) {
        self.listeners.lock().unwrap().push(listener);
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        let listeners = self.listeners.lock().unwrap().clone();
        for listener in &listeners {
            listener(&snapshot);
        }
    }

    /// Runs `f` against the state only if the session that started the async
    /// work is still the current one.
    fn if_current<R>(&self, epoch: u64, f: impl FnOnce(&mut State) -> R) -> Option<R> {
        let mut state = self.state.lock().unwrap();
        (state.epoch == epoch).then(|| f(&mut state))
    }

    fn session(&self) -> Result<(PurchaseRequest, Option<u64>), Error> {
        let state = self.state.lock().unwrap();
        if !state.is_open {
            return Err(Error::NotOpen);
        }
        Ok((state.request.clone().ok_or(Error::NotOpen)?, state.quantity))
    }

    async fn load_pricing(
        &self,
        request: &PurchaseRequest,
        quantity: Option<u64>,
    ) -> Result<Pricing, Error> {
        let (collection, currency, unit) = match request {
            PurchaseRequest::Market(market) => {
                let collection_address = eth::ContractAddress(market.collection);
                let (collection, order) = futures::try_join!(
                    self.loaders.collection(market.chain, collection_address),
                    self.loaders.order(
                        market.chain,
                        collection_address,
                        market.order_id.clone(),
                        market.marketplace,
                    ),
                )?;
                let currency = self.loaders.currency(market.chain, order.currency).await?;
                let unit = Price::from_raw(
                    util::conv::u256_to_bigint(&order.price_amount),
                    currency.decimals,
                );
                (collection, currency, unit)
            }
            PurchaseRequest::Shop(shop) => {
                let (collection, currency) = futures::try_join!(
                    self.loaders
                        .collection(shop.chain, eth::ContractAddress(shop.collection)),
                    self.loaders
                        .currency(shop.chain, eth::TokenAddress(shop.price.currency)),
                )?;
                let unit = Price::from_string(&shop.price.amount, currency.decimals)?;
                (collection, currency, unit)
            }
        };

        let quantity = resolve_quantity(collection.token_standard, quantity)?;
        let subtotal = unit.times(quantity)?;
        let (fees_total, fees) = subtotal.sum_fees(&self.fees)?;
        let total = subtotal.grand_total(&fees_total);
        Ok(Pricing {
            collection,
            currency,
            quantity,
            unit,
            subtotal,
            fees,
            total,
        })
    }

    async fn build_steps(
        &self,
        request: &PurchaseRequest,
        buyer: eth::Address,
        pricing: &Pricing,
    ) -> Result<Vec<TransactionStep>, Error> {
        let steps = match request {
            PurchaseRequest::Market(market) => {
                // The marketplace collects fees on top of the order; the
                // amounts come from the same breakdown the UI shows.
                let fee_amounts = pricing
                    .fees
                    .iter()
                    .map(|fee| fee.amount.to_integer_amount().to_string())
                    .collect();
                steps::market(
                    &self.marketplace,
                    market,
                    buyer,
                    pricing.quantity,
                    fee_amounts,
                )
                .await?
            }
            PurchaseRequest::Shop(shop) => {
                steps::shop(
                    self.reader.as_ref(),
                    &self.resolver,
                    shop,
                    &pricing.collection,
                    buyer,
                    pricing.quantity,
                    &pricing.currency,
                    &pricing.total,
                )
                .await?
            }
        };
        Ok(steps)
    }
}

/// Pricing context shared by quoting, funds checks and step building.
struct Pricing {
    collection: CollectionInfo,
    currency: loaders::Currency,
    quantity: u64,
    unit: Price,
    subtotal: Price,
    fees: Vec<FeeBreakdown>,
    total: Price,
}

/// Which phase slot a backend owns.
#[derive(Clone, Copy)]
enum Slot {
    Payment,
    Checkout,
}

impl Slot {
    fn get_mut(self, state: &mut State) -> &mut ModalPhase {
        match self {
            Self::Payment => &mut state.payment_phase,
            Self::Checkout => &mut state.checkout_phase,
        }
    }
}

fn initial_quantity(request: &PurchaseRequest) -> Option<u64> {
    match request {
        PurchaseRequest::Market(market) => market.quantity,
        PurchaseRequest::Shop(shop) => shop.items.first().and_then(|item| item.quantity),
    }
}

/// Resolves the effective purchase quantity. ERC-721 collections lock the
/// quantity to 1 regardless of input; ERC-1155 collections require one.
fn resolve_quantity(standard: TokenStandard, requested: Option<u64>) -> Result<u64, Error> {
    match standard {
        TokenStandard::Erc721 => Ok(1),
        TokenStandard::Erc1155 => requested.ok_or(Error::QuantityRequired),
    }
}

fn collectible_items(
    request: &PurchaseRequest,
    pricing: &Pricing,
) -> Result<Vec<hosted::CollectibleItem>, Error> {
    let unit = pricing.unit_raw()?;
    match request {
        PurchaseRequest::Market(market) => Ok(vec![hosted::CollectibleItem {
            token_id: market.collectible_id,
            quantity: pricing.quantity,
            price: unit,
        }]),
        PurchaseRequest::Shop(shop) => Ok(shop
            .items
            .iter()
            .map(|item| hosted::CollectibleItem {
                token_id: item.token_id.unwrap_or_default(),
                quantity: item.quantity.unwrap_or(pricing.quantity),
                price: unit,
            })
            .collect()),
    }
}

impl Pricing {
    fn unit_raw(&self) -> Result<eth::U256, Error> {
        Ok(self.unit.to_u256()?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("the buy modal is not open")]
    NotOpen,
    #[error("request is for chain {got:?} but the flow is configured for {expected:?}")]
    ChainMismatch {
        expected: eth::ChainId,
        got: eth::ChainId,
    },
    #[error("a quantity is required for this purchase")]
    QuantityRequired,
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error(transparent)]
    Price(#[from] price::Error),
    #[error("failed to load purchase data: {0}")]
    Loading(#[from] loaders::Error),
    #[error(transparent)]
    Steps(#[from] steps::Error),
    #[error(transparent)]
    Checkout(#[from] checkout::Error),
}

impl Error {
    /// Stable variant names for metrics labels.
    pub fn format_variant(&self) -> &'static str {
        match self {
            Self::NotOpen => "NotOpen",
            Self::ChainMismatch { .. } => "ChainMismatch",
            Self::QuantityRequired => "QuantityRequired",
            Self::InvalidQuantity => "InvalidQuantity",
            Self::Price(_) => "Price",
            Self::Loading(_) => "Loading",
            Self::Steps(_) => "Steps",
            Self::Checkout(_) => "Checkout",
        }
    }
}

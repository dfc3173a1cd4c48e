//! Tests of market purchases, which delegate step generation to the
//! marketplace API.

use {
    crate::{
        domain::{
            eth,
            flow::{self, ModalPhase, steps},
            price::{FeeConfig, FeeKind},
            purchase::{self, PurchaseRequest, TokenStandard},
            step::StepKind,
        },
        infra::{
            blockchain::MockContractReader,
            checkout::{Checkout, direct::MockTransactionSender, widget::MockSwapWidget},
            loaders::{self, MockDataLoaders},
        },
        tests::{self, mock},
    },
    serde_json::json,
};

/// Loaders for an ERC-1155 collection listing a 1 USDC order.
fn loaders() -> MockDataLoaders {
    let mut loaders = MockDataLoaders::new();
    loaders
        .expect_collection()
        .returning(|_, _| Ok(tests::collection(TokenStandard::Erc1155)));
    loaders.expect_order().returning(|_, _, order_id, kind| {
        Ok(loaders::Order {
            id: order_id,
            marketplace: kind,
            token_id: eth::U256::from(7),
            price_amount: eth::U256::from(1_000_000u64),
            currency: tests::currency_address(),
            quantity_available: 10,
        })
    });
    loaders.expect_currency().returning(|_, address| {
        Ok(loaders::Currency {
            address,
            symbol: "USDC".to_string(),
            decimals: 6,
            native: false,
        })
    });
    loaders
}

fn request() -> PurchaseRequest {
    PurchaseRequest::Market(purchase::MarketPurchase {
        chain: tests::CHAIN,
        collection: tests::collection_address().0,
        order_id: purchase::OrderId("order-1".to_string()),
        marketplace: purchase::MarketplaceKind::SequenceMarketplaceV2,
        collectible_id: eth::U256::from(7),
        quantity: Some(2),
    })
}

fn platform_fee() -> FeeConfig {
    FeeConfig {
        kind: FeeKind::Platform,
        percentage: "2.5".parse().unwrap(),
        label: Some("service".to_string()),
    }
}

/// Two units at 1 USDC with a 2.5% platform fee: the fee amount rides along
/// as an additional fee and the widget receives the fee-inclusive total.
#[tokio::test]
async fn widget_handoff_includes_fees() {
    let api = mock::http::setup(vec![mock::http::Expectation {
        path: mock::http::Path::exact("generateBuyTransaction"),
        req: mock::http::RequestBody::Exact(json!({
            "collectionAddress": "0x1111111111111111111111111111111111111111",
            "buyer": "0x2222222222222222222222222222222222222222",
            "marketplace": "sequence_marketplace_v2",
            "orders": [{
                "orderId": "order-1",
                "quantity": "2",
                "tokenId": "7",
            }],
            "additionalFees": ["50000"],
        })),
        res: json!({
            "steps": [
                {
                    "id": "tokenApproval",
                    "to": "0x3333333333333333333333333333333333333333",
                    "data": "0x00",
                    "value": "0",
                },
                {
                    "id": "buy",
                    "to": "0x5555555555555555555555555555555555555555",
                    "data": "0xdeadbeef",
                },
            ],
        }),
    }])
    .await;

    let flow = tests::flow(
        api.url(),
        vec![platform_fee()],
        loaders(),
        MockContractReader::new(),
    );
    let (recorder, handlers) = tests::Recorder::new();
    flow.show(request(), tests::buyer(), handlers).unwrap();

    let mut widget = MockSwapWidget::new();
    widget
        .expect_open()
        .withf(|params| {
            params.to_chain == tests::CHAIN
                && params.to_address.0 == eth::Address::repeat_byte(0x55)
                && params.to_token == tests::currency_address()
                && params.to_calldata == [0xde, 0xad, 0xbe, 0xef]
                && params.to_amount == eth::U256::from(2_050_000u64)
        })
        .returning(|_| Ok(()));

    flow.start_checkout(&Checkout::Widget(Box::new(widget)))
        .await
        .unwrap();

    assert_eq!(flow.checkout_phase(), ModalPhase::Open);
    assert_eq!(flow.payment_phase(), ModalPhase::Idle);
    let steps = flow.steps().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].kind, StepKind::TokenApproval);
    assert_eq!(steps[1].kind, StepKind::Buy);
    assert!(recorder.errors().is_empty());
}

/// The API is free to return steps in any order, but approvals always end up
/// before the buy step.
#[tokio::test]
async fn approval_precedes_buy() {
    let api = mock::http::setup(vec![mock::http::Expectation {
        path: mock::http::Path::Any,
        req: mock::http::RequestBody::Any,
        res: json!({
            "steps": [
                {
                    "id": "buy",
                    "to": "0x5555555555555555555555555555555555555555",
                    "data": "0xdeadbeef",
                },
                {
                    "id": "tokenApproval",
                    "to": "0x3333333333333333333333333333333333333333",
                    "data": "0x00",
                },
            ],
        }),
    }])
    .await;

    let flow = tests::flow(api.url(), vec![], loaders(), MockContractReader::new());
    let (_, handlers) = tests::Recorder::new();
    flow.show(request(), tests::buyer(), handlers).unwrap();

    let mut widget = MockSwapWidget::new();
    widget.expect_open().returning(|_| Ok(()));
    flow.start_checkout(&Checkout::Widget(Box::new(widget)))
        .await
        .unwrap();

    let kinds = flow
        .steps()
        .unwrap()
        .iter()
        .map(|step| step.kind)
        .collect::<Vec<_>>();
    assert_eq!(kinds, [StepKind::TokenApproval, StepKind::Buy]);
}

/// A response without a buy step is unusable: the checkout fails, the
/// surface returns to idle, and the modal stays open.
#[tokio::test]
async fn missing_buy_step_fails_checkout() {
    let api = mock::http::setup(vec![mock::http::Expectation {
        path: mock::http::Path::Any,
        req: mock::http::RequestBody::Any,
        res: json!({
            "steps": [
                {
                    "id": "tokenApproval",
                    "to": "0x3333333333333333333333333333333333333333",
                    "data": "0x00",
                },
            ],
        }),
    }])
    .await;

    let flow = tests::flow(api.url(), vec![], loaders(), MockContractReader::new());
    let (recorder, handlers) = tests::Recorder::new();
    flow.show(request(), tests::buyer(), handlers).unwrap();

    let widget = MockSwapWidget::new();
    let result = flow.start_checkout(&Checkout::Widget(Box::new(widget))).await;

    assert!(matches!(
        result,
        Err(flow::Error::Steps(steps::Error::MissingBuyStep))
    ));
    assert_eq!(flow.checkout_phase(), ModalPhase::Idle);
    assert!(flow.is_open());
    assert_eq!(recorder.errors().len(), 1);
}

/// The direct backend submits every step through the wallet and reports the
/// buy transaction hash on completion.
#[tokio::test]
async fn direct_send_completes_with_tx_hash() {
    let api = mock::http::setup(vec![mock::http::Expectation {
        path: mock::http::Path::Any,
        req: mock::http::RequestBody::Any,
        res: json!({
            "steps": [
                {
                    "id": "buy",
                    "to": "0x5555555555555555555555555555555555555555",
                    "data": "0xdeadbeef",
                    "value": "2000000",
                },
            ],
        }),
    }])
    .await;

    let flow = tests::flow(api.url(), vec![], loaders(), MockContractReader::new());
    let (recorder, handlers) = tests::Recorder::new();
    flow.show(request(), tests::buyer(), handlers).unwrap();

    let hash = eth::TxHash(eth::B256::repeat_byte(0xab));
    let mut sender = MockTransactionSender::new();
    sender
        .expect_send()
        .times(1)
        .withf(|tx| tx.value.0 == eth::U256::from(2_000_000u64))
        .returning(move |_| Ok(hash));
    sender
        .expect_wait_for_receipt()
        .times(1)
        .returning(|_, _| Ok(true));

    flow.start_checkout(&Checkout::Direct(Box::new(sender)))
        .await
        .unwrap();

    let successes = recorder.successes();
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].tx_hash, Some(hash));
    assert_eq!(flow.checkout_phase(), ModalPhase::Idle);
}

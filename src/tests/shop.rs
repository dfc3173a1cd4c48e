//! Tests of primary sales, which build mint calldata locally against the
//! detected sales contract version.

use {
    crate::{
        domain::{
            eth,
            flow::{self, ModalPhase, steps},
            purchase::{self, PurchaseRequest, TokenStandard},
            step::StepKind,
        },
        infra::{
            abi,
            blockchain::{self, MockContractReader},
            checkout::{Checkout, widget::MockSwapWidget},
            contracts::{IERC20, IERC721SaleV1, IERC1155SaleV0, IERC1155SaleV1},
            loaders::{self, MockDataLoaders},
        },
        tests,
    },
    alloy::sol_types::{SolCall, SolValue},
};

fn loaders(standard: TokenStandard, currency: loaders::Currency) -> MockDataLoaders {
    let mut loaders = MockDataLoaders::new();
    loaders
        .expect_collection()
        .returning(move |_, _| Ok(tests::collection(standard)));
    loaders
        .expect_currency()
        .returning(move |_, _| Ok(currency.clone()));
    loaders
}

fn usdc() -> loaders::Currency {
    loaders::Currency {
        address: tests::currency_address(),
        symbol: "USDC".to_string(),
        decimals: 6,
        native: false,
    }
}

fn native() -> loaders::Currency {
    loaders::Currency {
        address: eth::TokenAddress::native(),
        symbol: "POL".to_string(),
        decimals: 18,
        native: true,
    }
}

fn request(amount: &str, currency: eth::TokenAddress) -> PurchaseRequest {
    PurchaseRequest::Shop(purchase::ShopPurchase {
        chain: tests::CHAIN,
        collection: tests::collection_address().0,
        sales_contract: tests::sales_contract().0,
        items: vec![purchase::ShopItem {
            token_id: Some(eth::U256::from(7)),
            quantity: Some(2),
        }],
        price: purchase::ShopPrice {
            amount: amount.to_string(),
            currency: currency.0,
        },
    })
}

fn accepting_widget() -> Checkout {
    let mut widget = MockSwapWidget::new();
    widget.expect_open().returning(|_| Ok(()));
    Checkout::Widget(Box::new(widget))
}

/// The V1 sale details answer for an ERC-1155 contract.
fn v1_sale_details() -> Vec<u8> {
    (
        eth::U256::ZERO,
        eth::U256::ZERO,
        0u64,
        0u64,
        eth::B256::ZERO,
    )
        .abi_encode()
}

/// The V0 sale details answer for an ERC-1155 contract.
fn v0_sale_details() -> Vec<u8> {
    (eth::U256::ZERO, eth::U256::ZERO, 0u64, 0u64).abi_encode()
}

/// An ERC-1155 sale on a V1 contract, paid in an ERC-20 with no allowance:
/// the approval covers the exact total and precedes the mint.
#[tokio::test]
async fn v1_mint_with_approval() {
    let mut reader = MockContractReader::new();
    reader
        .expect_call()
        .withf(|_, _, calldata| {
            calldata.starts_with(&IERC1155SaleV1::tokenSaleDetailsCall::SELECTOR)
        })
        .returning(|_, _, _| Ok(v1_sale_details()));
    reader
        .expect_call()
        .withf(|_, _, calldata| calldata.starts_with(&IERC20::allowanceCall::SELECTOR))
        .returning(|_, _, _| Ok(eth::U256::ZERO.abi_encode()));

    let flow = tests::flow(
        tests::unused_endpoint(),
        vec![],
        loaders(TokenStandard::Erc1155, usdc()),
        reader,
    );
    let (_, handlers) = tests::Recorder::new();
    flow.show(request("0.5", tests::currency_address()), tests::buyer(), handlers)
        .unwrap();

    flow.start_checkout(&accepting_widget()).await.unwrap();

    let steps = flow.steps().unwrap();
    assert_eq!(steps.len(), 2);

    let approval = &steps[0];
    assert_eq!(approval.kind, StepKind::TokenApproval);
    assert_eq!(approval.to.0, tests::currency_address().0);
    assert_eq!(approval.spender, Some(tests::sales_contract()));
    let call = IERC20::approveCall::abi_decode(&approval.calldata).unwrap();
    assert_eq!(call.spender, tests::sales_contract().0);
    assert_eq!(call.amount, eth::U256::from(1_000_000u64));

    let mint = &steps[1];
    assert_eq!(mint.kind, StepKind::Mint);
    assert_eq!(mint.to, tests::sales_contract());
    assert_eq!(mint.value.0, eth::U256::ZERO);
    let call = IERC1155SaleV1::mintCall::abi_decode(&mint.calldata).unwrap();
    assert_eq!(call.to, tests::buyer());
    assert_eq!(call.tokenIds, [eth::U256::from(7)]);
    assert_eq!(call.amounts, [eth::U256::from(2)]);
    assert_eq!(call.expectedPaymentToken, tests::currency_address().0);
    assert_eq!(call.maxTotal, eth::U256::from(1_000_000u64));
}

/// When the V1 probe reverts the contract is re-probed with the V0 shape and
/// the mint uses the V0 argument order.
#[tokio::test]
async fn falls_back_to_v0() {
    let mut reader = MockContractReader::new();
    reader
        .expect_call()
        .withf(|_, _, calldata| {
            calldata.starts_with(&IERC1155SaleV1::tokenSaleDetailsCall::SELECTOR)
        })
        .returning(|_, _, _| Err(blockchain::Error::Reverted("no such method".to_string())));
    reader
        .expect_call()
        .withf(|_, _, calldata| {
            calldata.starts_with(&IERC1155SaleV0::globalSaleDetailsCall::SELECTOR)
        })
        .returning(|_, _, _| Ok(v0_sale_details()));
    reader
        .expect_call()
        .withf(|_, _, calldata| calldata.starts_with(&IERC20::allowanceCall::SELECTOR))
        .returning(|_, _, _| Ok(eth::U256::MAX.abi_encode()));

    let flow = tests::flow(
        tests::unused_endpoint(),
        vec![],
        loaders(TokenStandard::Erc1155, usdc()),
        reader,
    );
    let (_, handlers) = tests::Recorder::new();
    flow.show(request("0.5", tests::currency_address()), tests::buyer(), handlers)
        .unwrap();

    flow.start_checkout(&accepting_widget()).await.unwrap();

    // Allowance already covers the total, so the mint is the only step.
    let steps = flow.steps().unwrap();
    assert_eq!(steps.len(), 1);
    let call = IERC1155SaleV0::mintCall::abi_decode(&steps[0].calldata).unwrap();
    assert_eq!(call.expectedPaymentToken, tests::currency_address().0);
    assert_eq!(call.maxTotal, eth::U256::from(1_000_000u64));
}

/// When both probes fail the error carries both underlying failures.
#[tokio::test]
async fn unresolved_version_reports_both_probes() {
    let mut reader = MockContractReader::new();
    reader
        .expect_call()
        .returning(|_, _, _| Err(blockchain::Error::Reverted("nope".to_string())));

    let flow = tests::flow(
        tests::unused_endpoint(),
        vec![],
        loaders(TokenStandard::Erc1155, usdc()),
        reader,
    );
    let (recorder, handlers) = tests::Recorder::new();
    flow.show(request("0.5", tests::currency_address()), tests::buyer(), handlers)
        .unwrap();

    let result = flow.start_checkout(&accepting_widget()).await;
    match result {
        Err(flow::Error::Steps(steps::Error::Version(abi::Error::Unresolved {
            v1, v0, ..
        }))) => {
            assert!(matches!(*v1, abi::ProbeError::Read(_)));
            assert!(matches!(*v0, abi::ProbeError::Read(_)));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(flow.checkout_phase(), ModalPhase::Idle);
    assert_eq!(recorder.errors().len(), 1);
}

/// Paying in the native token: no allowance check, no approval step, and the
/// total rides along as the transaction value.
#[tokio::test]
async fn native_payment_skips_approval() {
    let mut reader = MockContractReader::new();
    reader
        .expect_call()
        .withf(|_, _, calldata| {
            calldata.starts_with(&IERC1155SaleV1::tokenSaleDetailsCall::SELECTOR)
        })
        .returning(|_, _, _| Ok(v1_sale_details()));

    let flow = tests::flow(
        tests::unused_endpoint(),
        vec![],
        loaders(TokenStandard::Erc1155, native()),
        reader,
    );
    let (_, handlers) = tests::Recorder::new();
    flow.show(
        request("0.1", eth::TokenAddress::native()),
        tests::buyer(),
        handlers,
    )
    .unwrap();

    flow.start_checkout(&accepting_widget()).await.unwrap();

    let steps = flow.steps().unwrap();
    assert_eq!(steps.len(), 1);
    let mint = &steps[0];
    let total = eth::U256::from(200_000_000_000_000_000u64);
    assert_eq!(mint.value.0, total);
    let call = IERC1155SaleV1::mintCall::abi_decode(&mint.calldata).unwrap();
    assert_eq!(call.expectedPaymentToken, eth::Address::ZERO);
    assert_eq!(call.maxTotal, total);
}

/// ERC-721 sales ignore any requested quantity and always mint one unit.
#[tokio::test]
async fn erc721_locks_quantity_to_one() {
    let mut reader = MockContractReader::new();
    reader
        .expect_call()
        .withf(|_, _, calldata| calldata.starts_with(&IERC721SaleV1::saleDetailsCall::SELECTOR))
        .returning(|_, _, _| {
            Ok((
                eth::U256::ZERO,
                eth::U256::ZERO,
                eth::Address::ZERO,
                0u64,
                0u64,
                eth::B256::ZERO,
            )
                .abi_encode())
        });
    reader
        .expect_call()
        .withf(|_, _, calldata| calldata.starts_with(&IERC20::allowanceCall::SELECTOR))
        .returning(|_, _, _| Ok(eth::U256::MAX.abi_encode()));

    let flow = tests::flow(
        tests::unused_endpoint(),
        vec![],
        loaders(TokenStandard::Erc721, usdc()),
        reader,
    );
    let (_, handlers) = tests::Recorder::new();
    flow.show(request("0.5", tests::currency_address()), tests::buyer(), handlers)
        .unwrap();

    flow.start_checkout(&accepting_widget()).await.unwrap();

    let steps = flow.steps().unwrap();
    assert_eq!(steps.len(), 1);
    let call = IERC721SaleV1::mintCall::abi_decode(&steps[0].calldata).unwrap();
    assert_eq!(call.amount, eth::U256::from(1));
    assert_eq!(call.maxTotal, eth::U256::from(500_000u64));
}

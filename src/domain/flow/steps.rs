//! Builds the ordered transaction step list for a purchase.
//!
//! Market purchases delegate step generation to the marketplace API and then
//! normalize its response; primary sales build the mint calldata locally
//! against the detected sales contract version. Either way the result obeys
//! the same ordering rule: a token approval, when present, strictly precedes
//! the buy or mint step.

use {
    crate::{
        domain::{
            eth,
            price::Price,
            purchase::{self, CollectionInfo, TokenStandard},
            step::{StepKind, TransactionStep},
        },
        infra::{
            abi::{self, SalesContractVersion},
            blockchain::{self, ContractReader},
            contracts,
            loaders,
            marketplace::{self, dto},
        },
    },
    alloy::sol_types::SolCall,
};

/// Builds the step list for buying a listed marketplace order. The
/// marketplace API decides whether an approval is needed; this function only
/// normalizes and orders its output.
pub async fn market(
    client: &marketplace::Client,
    request: &purchase::MarketPurchase,
    buyer: eth::Address,
    quantity: u64,
    fee_amounts: Vec<String>,
) -> Result<Vec<TransactionStep>, Error> {
    let response = client
        .generate_buy_transaction(&dto::GenerateBuyTransaction {
            collection_address: request.collection,
            buyer,
            marketplace: request.marketplace.into(),
            orders: vec![dto::Order {
                order_id: request.order_id.0.clone(),
                quantity: eth::U256::from(quantity),
                token_id: request.collectible_id,
            }],
            additional_fees: fee_amounts,
        })
        .await?;

    let mut approvals = Vec::new();
    let mut rest = Vec::new();
    for step in response.steps {
        let kind = match step.id {
            dto::StepId::Buy => StepKind::Buy,
            dto::StepId::TokenApproval => StepKind::TokenApproval,
            dto::StepId::Signature => StepKind::Signature,
            dto::StepId::Unknown => {
                tracing::warn!(?step, "ignoring unrecognized marketplace step");
                continue;
            }
        };
        let spender = match kind {
            StepKind::TokenApproval => contracts::IERC20::approveCall::abi_decode(&step.data)
                .ok()
                .map(|call| eth::ContractAddress(call.spender)),
            _ => None,
        };
        let step = TransactionStep {
            kind,
            to: eth::ContractAddress(step.to),
            calldata: step.data,
            value: eth::Ether(step.value),
            spender,
            on_behalf_of: None,
        };
        match kind {
            StepKind::TokenApproval => approvals.push(step),
            _ => rest.push(step),
        }
    }

    if !rest.iter().any(TransactionStep::is_buy) {
        return Err(Error::MissingBuyStep);
    }

    // Approvals always execute first, whatever order the API returned.
    approvals.extend(rest);
    Ok(approvals)
}

/// Builds the step list for minting from a primary sales contract. The mint
/// calldata shape depends on both the token standard and the detected
/// contract version; `total` is the fee-inclusive grand total and is passed
/// to the contract unchanged as the payment cap.
#[allow(clippy::too_many_arguments)]
pub async fn shop(
    reader: &dyn ContractReader,
    resolver: &abi::Resolver,
    request: &purchase::ShopPurchase,
    collection: &CollectionInfo,
    buyer: eth::Address,
    quantity: u64,
    currency: &loaders::Currency,
    total: &Price,
) -> Result<Vec<TransactionStep>, Error> {
    let sales_contract = eth::ContractAddress(request.sales_contract);
    let version = resolver
        .resolve(request.chain, sales_contract, collection.token_standard)
        .await?;
    let max_total = total.to_u256()?;

    let mut steps = Vec::new();
    if !currency.address.is_native() {
        let allowance = blockchain::allowance(
            reader,
            request.chain,
            currency.address,
            buyer,
            sales_contract,
        )
        .await?;
        if allowance < max_total {
            steps.push(TransactionStep {
                kind: StepKind::TokenApproval,
                to: eth::ContractAddress(currency.address.0),
                calldata: contracts::IERC20::approveCall {
                    spender: sales_contract.0,
                    amount: max_total,
                }
                .abi_encode(),
                value: eth::Ether(eth::U256::ZERO),
                spender: Some(sales_contract),
                on_behalf_of: None,
            });
        }
    }

    let calldata = mint_calldata(
        request,
        collection.token_standard,
        version,
        buyer,
        quantity,
        currency.address,
        max_total,
    )?;
    steps.push(TransactionStep {
        kind: StepKind::Mint,
        to: sales_contract,
        calldata,
        value: if currency.address.is_native() {
            eth::Ether(max_total)
        } else {
            eth::Ether(eth::U256::ZERO)
        },
        spender: None,
        on_behalf_of: None,
    });
    Ok(steps)
}

fn mint_calldata(
    request: &purchase::ShopPurchase,
    standard: TokenStandard,
    version: SalesContractVersion,
    buyer: eth::Address,
    quantity: u64,
    currency: eth::TokenAddress,
    max_total: eth::U256,
) -> Result<Vec<u8>, Error> {
    use {SalesContractVersion::*, TokenStandard::*};

    let calldata = match (standard, version) {
        (Erc1155, V1) => {
            let (token_ids, amounts) = item_lists(request, quantity)?;
            contracts::IERC1155SaleV1::mintCall {
                to: buyer,
                tokenIds: token_ids,
                amounts,
                data: Default::default(),
                expectedPaymentToken: currency.0,
                maxTotal: max_total,
                proof: vec![],
            }
            .abi_encode()
        }
        (Erc1155, V0) => {
            let (token_ids, amounts) = item_lists(request, quantity)?;
            contracts::IERC1155SaleV0::mintCall {
                to: buyer,
                tokenIds: token_ids,
                amounts,
                expectedPaymentToken: currency.0,
                maxTotal: max_total,
                data: Default::default(),
            }
            .abi_encode()
        }
        (Erc721, V1) => contracts::IERC721SaleV1::mintCall {
            to: buyer,
            amount: eth::U256::from(quantity),
            expectedPaymentToken: currency.0,
            maxTotal: max_total,
            proof: vec![],
        }
        .abi_encode(),
        (Erc721, V0) => contracts::IERC721SaleV0::mintCall {
            to: buyer,
            amount: eth::U256::from(quantity),
            expectedPaymentToken: currency.0,
            maxTotal: max_total,
            proof: vec![],
        }
        .abi_encode(),
    };
    Ok(calldata)
}

/// Expands the requested sale items into parallel token id and amount lists.
/// Items without an explicit quantity inherit the flow-level quantity.
fn item_lists(
    request: &purchase::ShopPurchase,
    quantity: u64,
) -> Result<(Vec<eth::U256>, Vec<eth::U256>), Error> {
    request
        .items
        .iter()
        .map(|item| {
            let token_id = item.token_id.ok_or(Error::MissingTokenId)?;
            let amount = eth::U256::from(item.quantity.unwrap_or(quantity));
            Ok((token_id, amount))
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The marketplace API responded without a buy step. The response is
    /// unusable; there is nothing to execute.
    #[error("marketplace returned no buy step")]
    MissingBuyStep,
    #[error("ERC-1155 sale item without a token id")]
    MissingTokenId,
    #[error(transparent)]
    Marketplace(#[from] marketplace::Error),
    #[error(transparent)]
    Version(#[from] abi::Error),
    #[error(transparent)]
    Blockchain(#[from] blockchain::Error),
    #[error(transparent)]
    Price(#[from] crate::domain::price::Error),
}

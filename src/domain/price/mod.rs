//! Decimal-safe price arithmetic for the buy flow.
//!
//! All monetary values are `(raw integer, decimals)` pairs so that item
//! totals, fees and grand totals are computed with arbitrary-precision
//! integers. Native fixed-width multiplication is never used for amounts,
//! which is the overflow-safety guarantee this module exists to provide.

use {
    crate::util::conv,
    alloy::primitives::U256,
    bigdecimal::BigDecimal,
    num::{BigInt, Zero, bigint::Sign},
    std::fmt::{self, Debug, Formatter},
};

/// An exact fixed-point decimal amount of some currency.
///
/// The represented value is `value / 10^decimals`. Instances are immutable;
/// every operation returns a new `Price`. Negative values represent
/// discounts.
#[derive(Clone, Eq, PartialEq)]
pub struct Price {
    value: BigInt,
    decimals: u8,
}

impl Debug for Price {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Price")
            .field("value", &self.value.to_string())
            .field("decimals", &self.decimals)
            .finish()
    }
}

impl Price {
    pub fn from_raw(value: BigInt, decimals: u8) -> Self {
        Self { value, decimals }
    }

    pub fn zero(decimals: u8) -> Self {
        Self {
            value: BigInt::zero(),
            decimals,
        }
    }

    /// Parses a decimal string into a `Price` at the given precision.
    ///
    /// Inputs with more significant fractional digits than `decimals` are
    /// rejected instead of silently truncated.
    pub fn from_string(value: &str, decimals: u8) -> Result<Self, Error> {
        let invalid = || Error::InvalidFormat(value.to_string());

        let input = value.trim();
        let (negative, digits) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((int, frac)) => (int, frac),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let frac_part = frac_part.trim_end_matches('0');
        if frac_part.len() > decimals as usize {
            return Err(invalid());
        }

        let int = if int_part.is_empty() {
            BigInt::zero()
        } else {
            int_part.parse::<BigInt>().map_err(|_| invalid())?
        };
        let frac = if frac_part.is_empty() {
            BigInt::zero()
        } else {
            let scale = conv::pow10((decimals as usize - frac_part.len()) as u32);
            frac_part.parse::<BigInt>().map_err(|_| invalid())? * scale
        };

        let mut value = int * conv::pow10(decimals as u32) + frac;
        if negative {
            value = -value;
        }
        Ok(Self { value, decimals })
    }

    /// Multiplies this unit price by a quantity. The multiplication happens
    /// on `BigInt`, so it cannot overflow for any quantity.
    pub fn times(&self, quantity: u64) -> Result<Self, Error> {
        if quantity == 0 {
            return Err(Error::Calculation {
                operands: format!("{self:?} * {quantity}"),
                reason: "quantity must be positive".to_string(),
            });
        }
        Ok(Self {
            value: &self.value * BigInt::from(quantity),
            decimals: self.decimals,
        })
    }

    /// Computes `self * (percentage / 100)` at the same precision as `self`,
    /// truncating toward zero. A negative percentage yields a negative price
    /// (a discount). Percentages with an exponent outside the `u32` range
    /// are rejected rather than scaled by an astronomical power of ten.
    pub fn fee(&self, percentage: &BigDecimal) -> Result<Self, Error> {
        let (int, exp) = percentage.as_bigint_and_exponent();
        let scale: u32 = exp.unsigned_abs().try_into().map_err(|_| Error::Calculation {
            operands: format!("{self:?} * {int}e{}%", -exp),
            reason: "percentage exponent out of range".to_string(),
        })?;

        let mut numer = &self.value * int;
        let mut denom = BigInt::from(100);
        if exp >= 0 {
            denom *= conv::pow10(scale);
        } else {
            numer *= conv::pow10(scale);
        }

        Ok(Self {
            value: numer / denom,
            decimals: self.decimals,
        })
    }

    /// Applies each fee independently against `self` (never against a
    /// running total) and sums the results. Returns the aggregate and a
    /// per-fee breakdown in input order.
    pub fn sum_fees(&self, fees: &[FeeConfig]) -> Result<(Self, Vec<FeeBreakdown>), Error> {
        let breakdown = fees
            .iter()
            .map(|fee| {
                Ok(FeeBreakdown {
                    kind: fee.kind,
                    label: fee.label.clone(),
                    amount: self.fee(&fee.percentage)?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        let total = breakdown
            .iter()
            .fold(Self::zero(self.decimals), |acc, fee| acc.add(&fee.amount));
        Ok((total, breakdown))
    }

    /// Computes `self + total_fees`, normalizing both operands to the larger
    /// scale so that no digits are lost.
    pub fn grand_total(&self, total_fees: &Self) -> Self {
        self.add(total_fees)
    }

    fn add(&self, other: &Self) -> Self {
        let decimals = self.decimals.max(other.decimals);
        let value = self.rescaled_value(decimals) + other.rescaled_value(decimals);
        Self { value, decimals }
    }

    fn rescaled_value(&self, decimals: u8) -> BigInt {
        &self.value * conv::pow10((decimals - self.decimals) as u32)
    }

    /// Extracts the raw integer amount for contract-call encoding.
    pub fn to_integer_amount(&self) -> BigInt {
        self.value.clone()
    }

    /// Converts the raw amount to a `U256` for contract-call encoding. Fails
    /// for negative amounts.
    pub fn to_u256(&self) -> Result<U256, Error> {
        conv::bigint_to_u256(&self.value).ok_or_else(|| Error::Calculation {
            operands: format!("{self:?}"),
            reason: "amount is negative or exceeds 256 bits".to_string(),
        })
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.value.sign() == Sign::Minus
    }

    /// Renders the price for display. Rounds half-up to `max_decimals`
    /// without altering the underlying raw value. A nonzero price that
    /// rounds to zero renders the zero-padded form (`0.000000`) rather than
    /// a bare `0`, so dust amounts are never displayed as nothing.
    pub fn format(&self, opts: &FormatOptions) -> String {
        let shown = opts.max_decimals.min(self.decimals) as u32;
        let drop = self.decimals as u32 - shown;

        let magnitude = BigInt::from(self.value.magnitude().clone());
        let divisor = conv::pow10(drop);
        let rounded = (&magnitude + &divisor / BigInt::from(2)) / &divisor;

        let unit = conv::pow10(shown);
        let int_part = &rounded / &unit;
        let frac_part = &rounded % &unit;

        let mut rendered = if opts.compact {
            compact_integer(&int_part)
        } else {
            None
        }
        .unwrap_or_else(|| {
            let mut out = int_part.to_string();
            if shown > 0 {
                let mut frac = format!("{:0>width$}", frac_part.to_string(), width = shown as usize);
                if !opts.trailing_zeros {
                    frac.truncate(frac.trim_end_matches('0').len());
                }
                if !frac.is_empty() {
                    out = format!("{out}.{frac}");
                }
            }
            out
        });

        if rendered == "0" && !self.value.is_zero() {
            let places = shown.max(1) as usize;
            rendered = format!("0.{}", "0".repeat(places));
        }
        if self.is_negative() {
            rendered = format!("-{rendered}");
        }
        match &opts.symbol {
            Some(symbol) => format!("{rendered} {symbol}"),
            None => rendered,
        }
    }
}

/// Computes `unit_price * quantity` at the given precision.
///
/// All validation happens before any arithmetic: a zero quantity or an
/// unparseable unit price fails without ever computing a partial result.
pub fn item_total(unit_price: &str, quantity: u64, decimals: u8) -> Result<Price, Error> {
    if quantity == 0 {
        return Err(Error::Calculation {
            operands: format!("{unit_price:?} * {quantity}"),
            reason: "quantity must be positive".to_string(),
        });
    }
    let unit = Price::from_string(unit_price, decimals).map_err(|err| Error::Calculation {
        operands: format!("{unit_price:?} * {quantity}"),
        reason: err.to_string(),
    })?;
    unit.times(quantity)
}

/// Renders integer parts of 1000 and above as `1.23K` / `1.23M` / `1.23B`.
fn compact_integer(int: &BigInt) -> Option<String> {
    let suffix = [("B", 9u32), ("M", 6), ("K", 3)]
        .into_iter()
        .find(|(_, exp)| int >= &conv::pow10(*exp))?;

    // Two decimal places of the scaled value, trimmed.
    let scaled = int * BigInt::from(100) / conv::pow10(suffix.1);
    let whole = &scaled / BigInt::from(100);
    let frac = (&scaled % BigInt::from(100)).to_string();
    let frac = format!("{frac:0>2}");
    let frac = frac.trim_end_matches('0');
    Some(if frac.is_empty() {
        format!("{whole}{}", suffix.0)
    } else {
        format!("{whole}.{frac}{}", suffix.0)
    })
}

/// Display options for [`Price::format`].
#[derive(Clone, Debug)]
pub struct FormatOptions {
    pub symbol: Option<String>,
    pub compact: bool,
    pub max_decimals: u8,
    pub trailing_zeros: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            symbol: None,
            compact: false,
            max_decimals: 6,
            trailing_zeros: false,
        }
    }
}

/// The category of a fee applied on top of an item subtotal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FeeKind {
    Platform,
    Royalty,
    Gas,
    Custom,
}

/// A percentage fee applied against a purchase subtotal. Fees are applied
/// independently and summed, never compounded. A negative percentage is a
/// discount.
#[derive(Clone, Debug)]
pub struct FeeConfig {
    pub kind: FeeKind,
    pub percentage: BigDecimal,
    pub label: Option<String>,
}

/// The computed amount for a single [`FeeConfig`].
#[derive(Clone, Debug)]
pub struct FeeBreakdown {
    pub kind: FeeKind,
    pub label: Option<String>,
    pub amount: Price,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input string is not a valid decimal numeral at the requested
    /// precision.
    #[error("invalid price format {0:?}")]
    InvalidFormat(String),
    /// An arithmetic precondition was violated. Carries the offending
    /// operands for debuggability.
    #[error("price calculation failed ({operands}): {reason}")]
    Calculation { operands: String, reason: String },
}

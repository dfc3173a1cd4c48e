//! Conversion utilities between the arbitrary-precision number types used for
//! price arithmetic and the fixed-width integers used on the wire.

use {
    alloy::primitives::U256,
    num::{BigInt, BigUint, bigint::Sign},
};

/// Converts a `BigUint` into a `U256`. Returns `None` if the value does not
/// fit into 256 bits.
pub fn biguint_to_u256(i: &BigUint) -> Option<U256> {
    let bytes = i.to_bytes_be();
    if bytes.len() > 32 {
        return None;
    }
    Some(U256::from_be_slice(&bytes))
}

pub fn u256_to_biguint(i: &U256) -> BigUint {
    BigUint::from_bytes_be(&i.to_be_bytes::<32>())
}

pub fn u256_to_bigint(i: &U256) -> BigInt {
    BigInt::from(u256_to_biguint(i))
}

/// Converts a `BigInt` into a `U256`. Returns `None` for negative values and
/// values that do not fit into 256 bits.
pub fn bigint_to_u256(i: &BigInt) -> Option<U256> {
    if i.sign() == Sign::Minus {
        return None;
    }
    biguint_to_u256(i.magnitude())
}

/// Returns `10^exp` as a `BigInt`.
pub fn pow10(exp: u32) -> BigInt {
    BigInt::from(10_u8).pow(exp)
}

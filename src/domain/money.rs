//! Price and amount representation.

use rust_decimal::Decimal;

/// Quote-currency price.
pub type Price = Decimal;

/// Base-currency amount.
pub type Amount = Decimal;

/// Levels with less resting amount than this are treated as empty by displays.
pub const DUST_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

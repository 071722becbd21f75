//! Typed records for the banking platform REST API.
//!
//! Records decode from server JSON through a forward-compatible codec:
//!
//! - every field is a tri-state [`Field`] (absent, null, present),
//! - members the schema does not know are kept in the record's `extras` and
//!   written back on encode,
//! - enum-valued strings are open: unknown values decode into `Other(raw)`,
//! - discriminated envelopes such as
//!   [`TransactionSource`](transaction::TransactionSource) try every payload
//!   key and expose the selected one through a borrowed sum type.
//!
//! List endpoints answer with a [`ListEnvelope`] and take [`ListParams`]
//! serialized through [`Query`].
#[macro_use]
mod macros;

pub mod codec;
mod envelope;
mod field;
mod query;

pub mod card_dispute;
pub mod check_transfer;
pub mod transaction;

pub use codec::{
    DecodeError, Extras, Record, Wire, decode, decode_str, encode, from_value, to_value,
};
pub use envelope::ListEnvelope;
pub use field::Field;
pub use query::{ListParams, Query, Resource, TimeRange};

#[doc(hidden)]
pub mod __private {
    pub use serde;
    pub use serde_json::Value;
}

open_enum! {
    /// ISO 4217 code of the currency an amount is expressed in.
    ///
    /// Amounts are always integers in the currency's minor unit (cents for
    /// USD, yen for JPY).
    pub enum Currency {
        Cad => "CAD",
        Chf => "CHF",
        Eur => "EUR",
        Gbp => "GBP",
        Jpy => "JPY",
        Usd => "USD",
    }
}

impl Currency {
    /// Number of fraction digits of the minor unit, when known.
    #[must_use]
    pub fn minor_units(&self) -> Option<u8> {
        match self {
            Self::Jpy => Some(0),
            Self::Cad | Self::Chf | Self::Eur | Self::Gbp | Self::Usd => Some(2),
            Self::Other(_) => None,
        }
    }
}

//! Declarative macros that stamp out records, open enums and tagged unions.
//!
//! Resource types are data: the macros keep every one of them on the same
//! decode/encode contract instead of hand-writing it per struct.

/// Declares a record: every field is a [`Field`](crate::Field) and unknown
/// members are kept in `extras`.
///
/// The wire name of a field is its Rust name unless renamed with
/// `field as "wire"`.
///
/// ```rust
/// use api_types::{Field, record};
///
/// record! {
///     /// Balance of an account.
///     pub struct Balance {
///         amount: i64,
///         kind as "type": String,
///     }
/// }
///
/// let balance: Balance = api_types::decode_str(r#"{"amount": 0, "note": "x"}"#).unwrap();
/// assert_eq!(balance.amount, Field::Present(0));
/// assert!(balance.kind.is_absent());
/// assert!(balance.extras.contains_key("note"));
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident $(as $wire:literal)? : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $crate::Field<$ty>,
            )*
            /// Members this schema does not know about, re-emitted on encode.
            pub extras: $crate::Extras,
        }

        impl $crate::Record for $name {
            fn decode_object(
                mut object: $crate::Extras,
                path: &str,
            ) -> ::core::result::Result<Self, $crate::DecodeError> {
                $(
                    let $field = $crate::codec::take_field::<$ty>(
                        &mut object,
                        $crate::__wire_name!($field $(, $wire)?),
                        path,
                    )?;
                )*
                ::core::result::Result::Ok(Self {
                    $($field,)*
                    extras: object,
                })
            }

            fn encode_object(&self) -> $crate::Extras {
                let mut object = $crate::Extras::new();
                $(
                    $crate::codec::put_field(
                        &mut object,
                        $crate::__wire_name!($field $(, $wire)?),
                        &self.$field,
                    );
                )*
                for (key, value) in &self.extras {
                    object.insert(key.clone(), value.clone());
                }
                object
            }
        }

        impl $crate::Wire for $name {
            const EXPECTED: &'static str = "object";

            fn decode_value(
                value: $crate::__private::Value,
                path: &str,
            ) -> ::core::result::Result<Self, $crate::DecodeError> {
                match value {
                    $crate::__private::Value::Object(object) => {
                        <Self as $crate::Record>::decode_object(object, path)
                    }
                    other => ::core::result::Result::Err($crate::DecodeError::type_mismatch(
                        path,
                        <Self as $crate::Wire>::EXPECTED,
                        &other,
                    )),
                }
            }

            fn encode_value(&self) -> $crate::__private::Value {
                $crate::__private::Value::Object(<Self as $crate::Record>::encode_object(self))
            }
        }

        $crate::__serde_via_wire!($name);
    };
}

/// Declares a string enum that accepts values it does not know.
///
/// Unknown strings decode into `Other(raw)` and encode back verbatim.
///
/// ```rust
/// use api_types::open_enum;
///
/// open_enum! {
///     pub enum Status {
///         Pending => "pending",
///         Won => "won",
///     }
/// }
///
/// assert_eq!(Status::from("won"), Status::Won);
/// let future = Status::from("escalated");
/// assert!(!future.is_known());
/// assert_eq!(future.as_str(), "escalated");
/// ```
#[macro_export]
macro_rules! open_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $wire:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
            /// A value this client does not know yet, kept verbatim.
            Other(::std::string::String),
        }

        impl $name {
            /// The wire string of this value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)*
                    Self::Other(raw) => raw.as_str(),
                }
            }

            /// `false` for values introduced by a newer API version.
            #[must_use]
            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Other(_))
            }
        }

        impl ::core::convert::From<&str> for $name {
            fn from(raw: &str) -> Self {
                match raw {
                    $($wire => Self::$variant,)*
                    other => Self::Other(other.to_string()),
                }
            }
        }

        impl ::core::convert::From<::std::string::String> for $name {
            fn from(raw: ::std::string::String) -> Self {
                match raw.as_str() {
                    $($wire => Self::$variant,)*
                    _ => Self::Other(raw),
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::Wire for $name {
            const EXPECTED: &'static str = "string";

            fn decode_value(
                value: $crate::__private::Value,
                path: &str,
            ) -> ::core::result::Result<Self, $crate::DecodeError> {
                <::std::string::String as $crate::Wire>::decode_value(value, path).map(Self::from)
            }

            fn encode_value(&self) -> $crate::__private::Value {
                $crate::__private::Value::String(self.as_str().to_string())
            }
        }

        $crate::__serde_via_wire!($name);
    };
}

/// Declares a discriminated envelope: a category string plus one optional
/// sub-object per category.
///
/// Generates
/// - the category [`open_enum!`](crate::open_enum),
/// - the [`record!`](crate::record) with the discriminant and one field per
///   payload (each decoded independently of the discriminant),
/// - one accessor per payload,
/// - a borrowed sum type whose `Unknown` case keeps the raw category and the
///   raw payload found under that category's name in `extras`.
#[macro_export]
macro_rules! tagged_union {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident;
        $(#[$category_meta:meta])*
        $category_vis:vis enum $category:ident;
        $(#[$variant_enum_meta:meta])*
        $variant_enum_vis:vis enum $variant_enum:ident;
        discriminant: $discriminant:ident;
        variants {
            $(
                $(#[$variant_meta:meta])*
                $wire:literal => $variant:ident($field:ident: $payload:ty)
            ),* $(,)?
        }
    ) => {
        $crate::open_enum! {
            $(#[$category_meta])*
            $category_vis enum $category {
                $(
                    $(#[$variant_meta])*
                    $variant => $wire,
                )*
            }
        }

        $crate::record! {
            $(#[$meta])*
            $vis struct $name {
                $discriminant: $category,
                $($field: $payload,)*
            }
        }

        $(#[$variant_enum_meta])*
        #[derive(Clone, Copy, Debug, PartialEq)]
        $variant_enum_vis enum $variant_enum<'a> {
            $(
                $(#[$variant_meta])*
                $variant(&'a $payload),
            )*
            /// The category is unknown to this client, missing, or its payload
            /// was not sent.
            Unknown {
                category: ::core::option::Option<&'a str>,
                payload: ::core::option::Option<&'a $crate::__private::Value>,
            },
        }

        impl $name {
            $(
                #[doc = concat!("The `", $wire, "` payload, if the server sent one.")]
                pub fn $field(&self) -> ::core::option::Option<&$payload> {
                    self.$field.as_ref()
                }
            )*

            /// The raw discriminant, including values this client does not know.
            pub fn discriminant(&self) -> ::core::option::Option<&str> {
                self.$discriminant.as_ref().map(|category| category.as_str())
            }

            /// The payload selected by the discriminant.
            pub fn variant(&self) -> $variant_enum<'_> {
                match self.$discriminant.as_ref() {
                    $(
                        ::core::option::Option::Some($category::$variant) => {
                            if let ::core::option::Option::Some(payload) = self.$field.as_ref() {
                                return $variant_enum::$variant(payload);
                            }
                        }
                    )*
                    _ => {}
                }
                let category = self.discriminant();
                $variant_enum::Unknown {
                    category,
                    payload: category.and_then(|category| self.extras.get(category)),
                }
            }

            /// `true` when at most one payload is present and it is the one
            /// the discriminant names.
            pub fn is_consistent(&self) -> bool {
                let populated = 0_usize $(+ usize::from(self.$field.is_present()))*;
                match self.variant() {
                    $variant_enum::Unknown { .. } => populated == 0,
                    _ => populated == 1,
                }
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __wire_name {
    ($field:ident) => {
        stringify!($field)
    };
    ($field:ident, $wire:literal) => {
        $wire
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __serde_via_wire {
    ($name:ident) => {
        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                $crate::__private::serde::Serialize::serialize(
                    &<Self as $crate::Wire>::encode_value(self),
                    serializer,
                )
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                let value = <$crate::__private::Value as $crate::__private::serde::Deserialize<
                    'de,
                >>::deserialize(deserializer)?;
                <Self as $crate::Wire>::decode_value(value, "")
                    .map_err(<D::Error as $crate::__private::serde::de::Error>::custom)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{Field, from_value, to_value};

    crate::open_enum! {
        enum Colour {
            Red => "red",
            Green => "green",
        }
    }

    crate::record! {
        struct Card {
            id: String,
            last4: String,
        }
    }

    crate::record! {
        struct Wallet {
            name: String,
        }
    }

    crate::tagged_union! {
        struct Instrument;
        enum InstrumentKind;
        enum InstrumentVariant;
        discriminant: kind;
        variants {
            "card" => Card(card: Card),
            "wallet" => Wallet(wallet: Wallet),
        }
    }

    #[test]
    fn open_enum_round_trips_unknown_values() {
        let colour: Colour = serde_json::from_value(json!("ultraviolet")).unwrap();
        assert_eq!(colour, Colour::Other("ultraviolet".to_string()));
        assert_eq!(colour.to_string(), "ultraviolet");
        assert_eq!(serde_json::to_value(&colour).unwrap(), json!("ultraviolet"));
    }

    #[test]
    fn open_enum_from_string_matches_known_values() {
        assert_eq!(Colour::from(String::from("green")), Colour::Green);
        assert!(Colour::Red.is_known());
    }

    #[test]
    fn open_enum_rejects_non_strings() {
        let err = serde_json::from_value::<Colour>(json!(7)).unwrap_err();
        assert!(err.to_string().contains("expected string, got integer"));
    }

    #[test]
    fn record_serde_impls_use_the_codec() {
        let card: Card = serde_json::from_value(json!({"id": "c_1", "brand": "visa"})).unwrap();
        assert_eq!(card.id, Field::Present("c_1".to_string()));
        assert!(card.last4.is_absent());
        assert_eq!(
            serde_json::to_value(&card).unwrap(),
            json!({"id": "c_1", "brand": "visa"})
        );
    }

    #[test]
    fn union_selects_payload_by_discriminant() {
        let instrument: Instrument = from_value(json!({
            "kind": "wallet",
            "card": null,
            "wallet": {"name": "travel"},
        }))
        .unwrap();

        assert!(instrument.card().is_none());
        assert!(instrument.card.is_null());
        assert_eq!(
            instrument.wallet().and_then(|w| w.name.as_ref()).map(String::as_str),
            Some("travel")
        );
        assert!(matches!(instrument.variant(), InstrumentVariant::Wallet(_)));
        assert!(instrument.is_consistent());
    }

    #[test]
    fn union_keeps_unknown_category_payload() {
        let raw = json!({"kind": "crypto", "crypto": {"chain": "none"}});
        let instrument: Instrument = from_value(raw.clone()).unwrap();

        assert_eq!(instrument.kind, Field::Present(InstrumentKind::Other("crypto".to_string())));
        assert_eq!(
            instrument.variant(),
            InstrumentVariant::Unknown {
                category: Some("crypto"),
                payload: Some(&json!({"chain": "none"})),
            }
        );
        assert!(instrument.is_consistent());
        assert_eq!(to_value(&instrument), raw);
    }

    #[test]
    fn union_with_mismatched_payload_is_inconsistent() {
        let instrument: Instrument = from_value(json!({
            "kind": "card",
            "wallet": {"name": "travel"},
        }))
        .unwrap();

        assert_eq!(
            instrument.variant(),
            InstrumentVariant::Unknown {
                category: Some("card"),
                payload: None,
            }
        );
        assert!(!instrument.is_consistent());
    }
}

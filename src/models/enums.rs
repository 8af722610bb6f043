//! Shared domain enums stored as text columns

use serde::{Deserialize, Serialize};
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef},
    Decode, Encode, Postgres,
};
use utoipa::ToSchema;

/// Declares a text-backed enum with its string form, parsing and SQLx conversions.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
                let s = <&str as Decode<Postgres>>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

text_enum! {
    /// Kind of brewing equipment
    EquipmentType {
        Brewer => "brewer",
        Grinder => "grinder",
        EspressoMachine => "espresso_machine",
        Kettle => "kettle",
        Scale => "scale",
        Other => "other",
    }
}

text_enum! {
    /// What raised an alert
    AlertType {
        LowStock => "low_stock",
        Maintenance => "maintenance",
        Reorder => "reorder",
        Custom => "custom",
    }
}

text_enum! {
    AlertPriority {
        Low => "low",
        Normal => "normal",
        High => "high",
    }
}

text_enum! {
    /// Table an alert points back to (lookup only, never cascades)
    EntityType {
        Equipment => "equipment",
        Bean => "bean",
    }
}

text_enum! {
    BeanStatus {
        Active => "active",
        Finished => "finished",
        Archived => "archived",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_roundtrip_matches_serde() {
        assert_eq!(AlertType::LowStock.as_str(), "low_stock");
        assert_eq!("espresso_machine".parse::<EquipmentType>(), Ok(EquipmentType::EspressoMachine));
        assert_eq!(
            serde_json::to_value(EquipmentType::EspressoMachine).unwrap(),
            serde_json::json!("espresso_machine")
        );
        assert!("urgent".parse::<AlertPriority>().is_err());
    }
}

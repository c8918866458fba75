//! Record types for the five tables of a collection.

/// Implements `TryFrom<i64>` / `From<Enum> for i64` for a fieldless enum
/// stored as an integer column.
macro_rules! int_enum {
    ($name:ident, $column:literal, { $($variant:ident = $value:literal),+ $(,)? }) => {
        impl $name {
            /// The stored integer value.
            pub fn as_i64(self) -> i64 {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl TryFrom<i64> for $name {
            type Error = $crate::error::Error;

            fn try_from(value: i64) -> ::std::result::Result<Self, Self::Error> {
                match value {
                    $($value => Ok($name::$variant),)+
                    other => Err($crate::error::Error::decode(
                        $column,
                        format!("unknown value {other}"),
                    )),
                }
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> i64 {
                value.as_i64()
            }
        }
    };
}

pub(crate) use int_enum;

mod card;
mod collection;
mod grave;
mod note;
mod revlog;

pub use card::{Card, CardQueue, CardType};
pub use collection::{
    COLLECTION_ID, CardTemplate, Collection, Deck, DeckConfig, NoteType, NoteTypeField,
    SCHEMA_VERSION,
};
pub use grave::{Grave, GraveKind};
pub use note::Note;
pub use revlog::{MAX_REVIEW_TIME_MS, ReviewKind, ReviewLogEntry};

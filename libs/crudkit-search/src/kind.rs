//! Logical field types known to the search translator.

use std::fmt;

/// Declared type of a scalar field, used to coerce raw search values.
///
/// `Enum` carries the symbolic names of the enumeration; the column stores
/// the name itself.
///
/// ```
/// use crudkit_search::FieldKind;
///
/// const STATUS: FieldKind = FieldKind::Enum(&["Active", "Locked"]);
/// assert_eq!(STATUS.to_string(), "Enum");
/// assert!(!STATUS.is_ordered());
/// assert!(FieldKind::Date.is_ordered());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    I32,
    I64,
    F32,
    F64,
    Bool,
    Date,
    DateTime,
    Time,
    Uuid,
    Decimal,
    Enum(&'static [&'static str]),
}

impl FieldKind {
    /// Whether GT/LT/GTE/LTE make sense for this kind.
    #[must_use]
    pub fn is_ordered(self) -> bool {
        !matches!(self, FieldKind::Enum(_))
    }

    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(self, FieldKind::String)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::String => write!(f, "String"),
            FieldKind::I32 => write!(f, "I32"),
            FieldKind::I64 => write!(f, "I64"),
            FieldKind::F32 => write!(f, "F32"),
            FieldKind::F64 => write!(f, "F64"),
            FieldKind::Bool => write!(f, "Bool"),
            FieldKind::Date => write!(f, "Date"),
            FieldKind::DateTime => write!(f, "DateTime"),
            FieldKind::Time => write!(f, "Time"),
            FieldKind::Uuid => write!(f, "Uuid"),
            FieldKind::Decimal => write!(f, "Decimal"),
            FieldKind::Enum(_) => write!(f, "Enum"),
        }
    }
}

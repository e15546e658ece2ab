//! Normalized column type descriptors.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Dialect-neutral base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseType {
    /// 16-bit integer.
    SmallInt,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInt,
    /// 32-bit floating point.
    Real,
    /// 64-bit floating point.
    Double,
    /// Exact numeric with optional precision and scale.
    Decimal,
    /// Boolean.
    Boolean,
    /// Fixed-length character string.
    Char,
    /// Variable-length character string.
    Varchar,
    /// Unbounded character string.
    Text,
    /// Binary string.
    Bytes,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time without time zone.
    Timestamp,
    /// Date and time with time zone.
    TimestampTz,
    /// JSON document stored as text.
    Json,
    /// JSON document stored in a binary representation.
    Jsonb,
    /// UUID.
    Uuid,
}

/// Broad compatibility family of a base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    /// Integer types.
    Integer,
    /// Floating point types.
    Float,
    /// Exact numeric.
    Decimal,
    /// Boolean.
    Boolean,
    /// Character strings.
    String,
    /// Binary strings.
    Bytes,
    /// Dates, times and timestamps.
    Temporal,
    /// JSON documents.
    Json,
    /// UUID.
    Uuid,
}

impl BaseType {
    /// Lowercase canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SmallInt => "smallint",
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::Real => "real",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Char => "char",
            Self::Varchar => "varchar",
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestamptz",
            Self::Json => "json",
            Self::Jsonb => "jsonb",
            Self::Uuid => "uuid",
        }
    }

    /// Compatibility family.
    pub fn family(&self) -> TypeFamily {
        match self {
            Self::SmallInt | Self::Integer | Self::BigInt => TypeFamily::Integer,
            Self::Real | Self::Double => TypeFamily::Float,
            Self::Decimal => TypeFamily::Decimal,
            Self::Boolean => TypeFamily::Boolean,
            Self::Char | Self::Varchar | Self::Text => TypeFamily::String,
            Self::Bytes => TypeFamily::Bytes,
            Self::Date | Self::Time | Self::Timestamp | Self::TimestampTz => TypeFamily::Temporal,
            Self::Json | Self::Jsonb => TypeFamily::Json,
            Self::Uuid => TypeFamily::Uuid,
        }
    }

    /// Does this type take a length argument?
    pub fn has_length(&self) -> bool {
        matches!(self, Self::Char | Self::Varchar | Self::Bytes)
    }

    /// Is this a character string type?
    pub fn is_string(&self) -> bool {
        self.family() == TypeFamily::String
    }

    /// Width rank within the integer and float families.
    fn width(&self) -> u8 {
        match self {
            Self::SmallInt => 1,
            Self::Integer => 2,
            Self::BigInt => 3,
            Self::Real => 1,
            Self::Double => 2,
            _ => 0,
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Length argument of a string or binary type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Length {
    /// A fixed maximum length.
    Fixed(u32),
    /// The dialect's maximum (`MAX`).
    Max,
}

impl PartialOrd for Length {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Length {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Fixed(a), Self::Fixed(b)) => a.cmp(b),
            (Self::Fixed(_), Self::Max) => Ordering::Less,
            (Self::Max, Self::Fixed(_)) => Ordering::Greater,
            (Self::Max, Self::Max) => Ordering::Equal,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{}", n),
            Self::Max => f.write_str("max"),
        }
    }
}

/// How a column type change relates the old type to the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeChange {
    /// Same type.
    Identical,
    /// Every old value is representable in the new type.
    Widening,
    /// Same family, but some old values may not fit.
    Narrowing,
    /// Different families.
    Incompatible,
}

/// Normalized type descriptor: base type plus size, precision and scale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnType {
    /// Base type.
    pub base: BaseType,
    /// Length for `char`, `varchar` and `bytes`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<Length>,
    /// Precision for `decimal`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    /// Scale for `decimal`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    /// Array of the described element type.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub array: bool,
}

impl ColumnType {
    /// A scalar type with no arguments.
    pub fn new(base: BaseType) -> Self {
        Self {
            base,
            length: None,
            precision: None,
            scale: None,
            array: false,
        }
    }

    /// `varchar(n)`.
    pub fn varchar(length: u32) -> Self {
        Self::new(BaseType::Varchar).with_length(Length::Fixed(length))
    }

    /// `decimal(p, s)`.
    pub fn decimal(precision: u32, scale: u32) -> Self {
        Self::new(BaseType::Decimal).with_precision(precision, Some(scale))
    }

    /// Set the length.
    pub fn with_length(mut self, length: Length) -> Self {
        self.length = Some(length);
        self
    }

    /// Set precision and scale.
    pub fn with_precision(mut self, precision: u32, scale: Option<u32>) -> Self {
        self.precision = Some(precision);
        self.scale = scale;
        self
    }

    /// Turn this type into an array of itself.
    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    /// The element type of an array, or the type itself.
    pub fn element(&self) -> ColumnType {
        Self {
            array: false,
            ..self.clone()
        }
    }

    /// Is this an unbounded character string?
    pub fn is_unbounded_string(&self) -> bool {
        !self.array && self.base.is_string() && self.char_capacity().is_none()
    }

    /// Maximum number of characters (or bytes) this type holds; `None` means unbounded.
    fn char_capacity(&self) -> Option<u32> {
        match (self.base, self.length) {
            (BaseType::Text, _) => None,
            (_, Some(Length::Max)) | (_, None) => None,
            (_, Some(Length::Fixed(n))) => Some(n),
        }
    }

    /// Classify a change from `self` to `to`.
    pub fn classify_change(&self, to: &ColumnType) -> TypeChange {
        if self == to {
            return TypeChange::Identical;
        }
        if self.array != to.array {
            return TypeChange::Incompatible;
        }

        let (from_family, to_family) = (self.base.family(), to.base.family());
        match (from_family, to_family) {
            (TypeFamily::Integer, TypeFamily::Integer) | (TypeFamily::Float, TypeFamily::Float) => {
                order(self.base.width().cmp(&to.base.width()))
            }
            (TypeFamily::Integer, TypeFamily::Decimal) if to.precision.is_none() => {
                TypeChange::Widening
            }
            (TypeFamily::Decimal, TypeFamily::Decimal) if to.precision.is_none() => {
                TypeChange::Widening
            }
            (TypeFamily::Decimal, TypeFamily::Decimal) => {
                let precision = cmp_bound(self.precision, to.precision);
                let scale = self.scale.unwrap_or(0).cmp(&to.scale.unwrap_or(0));
                let integer_digits = cmp_bound(
                    self.precision.map(|p| p.saturating_sub(self.scale.unwrap_or(0))),
                    to.precision.map(|p| p.saturating_sub(to.scale.unwrap_or(0))),
                );
                if precision != Ordering::Greater
                    && scale != Ordering::Greater
                    && integer_digits != Ordering::Greater
                {
                    TypeChange::Widening
                } else {
                    TypeChange::Narrowing
                }
            }
            (TypeFamily::String, TypeFamily::String) | (TypeFamily::Bytes, TypeFamily::Bytes) => {
                if self.base == BaseType::Char && to.base == BaseType::Char {
                    return order(cmp_bound(self.char_capacity(), to.char_capacity()));
                }
                match cmp_bound(self.char_capacity(), to.char_capacity()) {
                    Ordering::Greater => TypeChange::Narrowing,
                    _ => TypeChange::Widening,
                }
            }
            (TypeFamily::Temporal, TypeFamily::Temporal) => match (self.base, to.base) {
                (BaseType::Date, BaseType::Timestamp | BaseType::TimestampTz)
                | (BaseType::Timestamp, BaseType::TimestampTz) => TypeChange::Widening,
                (BaseType::Timestamp | BaseType::TimestampTz, _) => TypeChange::Narrowing,
                _ => TypeChange::Incompatible,
            },
            (TypeFamily::Json, TypeFamily::Json) => TypeChange::Widening,
            _ => TypeChange::Incompatible,
        }
    }
}

/// Compare optional bounds where `None` means unbounded.
fn cmp_bound(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn order(ordering: Ordering) -> TypeChange {
    match ordering {
        Ordering::Less => TypeChange::Widening,
        Ordering::Equal => TypeChange::Identical,
        Ordering::Greater => TypeChange::Narrowing,
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        if let Some(length) = self.length {
            write!(f, "({})", length)?;
        }
        match (self.precision, self.scale) {
            (Some(p), Some(s)) => write!(f, "({},{})", p, s)?,
            (Some(p), None) => write!(f, "({})", p)?,
            _ => {}
        }
        if self.array {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

// Field values as seen by rule predicates

use std::fmt;

/// A borrowed view of a single field's value.
///
/// Record accessors convert their field into one of these shapes; rule
/// predicates never see the concrete Rust type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// String data
    Str(&'a str),
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    Uint(u64),
    /// Floating point number
    Float(f64),
    /// Boolean flag
    Bool(bool),
    /// Sequence or map, represented by its length
    Collection(usize),
    /// Absent optional value
    Nil,
}

/// Broad shape of a value, used to pick a rule's message variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    String,
    Number,
    Items,
    Other,
}

impl ValueShape {
    /// Catalog key suffix for this shape
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueShape::String => "string",
            ValueShape::Number => "number",
            ValueShape::Items => "items",
            ValueShape::Other => "other",
        }
    }
}

impl<'a> FieldValue<'a> {
    /// Whether the value is its type's zero value.
    pub fn is_zero(&self) -> bool {
        match *self {
            FieldValue::Str(s) => s.is_empty(),
            FieldValue::Int(n) => n == 0,
            FieldValue::Uint(n) => n == 0,
            FieldValue::Float(n) => n == 0.0,
            FieldValue::Bool(b) => !b,
            FieldValue::Collection(len) => len == 0,
            FieldValue::Nil => true,
        }
    }

    pub fn shape(&self) -> ValueShape {
        match self {
            FieldValue::Str(_) => ValueShape::String,
            FieldValue::Int(_) | FieldValue::Uint(_) | FieldValue::Float(_) => ValueShape::Number,
            FieldValue::Collection(_) => ValueShape::Items,
            FieldValue::Bool(_) | FieldValue::Nil => ValueShape::Other,
        }
    }

    /// String contents, if this is a string value.
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The magnitude length-style rules compare against.
    ///
    /// Strings measure their character count, collections their length,
    /// numbers their own value. Booleans and nil have no magnitude.
    pub fn magnitude(&self) -> Option<f64> {
        match *self {
            FieldValue::Str(s) => Some(s.chars().count() as f64),
            FieldValue::Int(n) => Some(n as f64),
            FieldValue::Uint(n) => Some(n as f64),
            FieldValue::Float(n) => Some(n),
            FieldValue::Collection(len) => Some(len as f64),
            FieldValue::Bool(_) | FieldValue::Nil => None,
        }
    }

    /// [`magnitude`](Self::magnitude) without the float conversion.
    ///
    /// `None` for floats and for values with no magnitude.
    pub fn exact_magnitude(&self) -> Option<i128> {
        match *self {
            FieldValue::Str(s) => Some(s.chars().count() as i128),
            FieldValue::Int(n) => Some(n as i128),
            FieldValue::Uint(n) => Some(n as i128),
            FieldValue::Collection(len) => Some(len as i128),
            FieldValue::Float(_) | FieldValue::Bool(_) | FieldValue::Nil => None,
        }
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => write!(f, "{}", s),
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Uint(n) => write!(f, "{}", n),
            FieldValue::Float(n) => write!(f, "{}", n),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Collection(len) => write!(f, "[{} items]", len),
            FieldValue::Nil => write!(f, "nil"),
        }
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(s: &'a str) -> Self {
        FieldValue::Str(s)
    }
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(s: &'a String) -> Self {
        FieldValue::Str(s.as_str())
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty: $($t:ty),*) => {
        $(
            impl From<$t> for FieldValue<'_> {
                fn from(n: $t) -> Self {
                    FieldValue::$variant(n as $target)
                }
            }

            impl From<&$t> for FieldValue<'_> {
                fn from(n: &$t) -> Self {
                    FieldValue::$variant(*n as $target)
                }
            }

            impl From<&Option<$t>> for FieldValue<'_> {
                fn from(n: &Option<$t>) -> Self {
                    match n {
                        Some(n) => FieldValue::$variant(*n as $target),
                        None => FieldValue::Nil,
                    }
                }
            }
        )*
    };
}

impl_from_int!(Int, i64: i8, i16, i32, i64, isize);
impl_from_int!(Uint, u64: u8, u16, u32, u64, usize);
impl_from_int!(Float, f64: f32, f64);

impl From<bool> for FieldValue<'_> {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<&bool> for FieldValue<'_> {
    fn from(b: &bool) -> Self {
        FieldValue::Bool(*b)
    }
}

impl<'a, T> From<&'a Vec<T>> for FieldValue<'a> {
    fn from(items: &'a Vec<T>) -> Self {
        FieldValue::Collection(items.len())
    }
}

impl<'a, T> From<&'a [T]> for FieldValue<'a> {
    fn from(items: &'a [T]) -> Self {
        FieldValue::Collection(items.len())
    }
}

impl<'a> From<&'a Option<String>> for FieldValue<'a> {
    fn from(value: &'a Option<String>) -> Self {
        value.as_deref().map_or(FieldValue::Nil, FieldValue::Str)
    }
}

impl<'a> From<&'a Option<&'a str>> for FieldValue<'a> {
    fn from(value: &'a Option<&'a str>) -> Self {
        value.map_or(FieldValue::Nil, FieldValue::Str)
    }
}

impl From<&Option<bool>> for FieldValue<'_> {
    fn from(value: &Option<bool>) -> Self {
        value.map_or(FieldValue::Nil, FieldValue::Bool)
    }
}

impl<'a, T> From<&'a Option<Vec<T>>> for FieldValue<'a> {
    fn from(value: &'a Option<Vec<T>>) -> Self {
        value
            .as_ref()
            .map_or(FieldValue::Nil, |items| FieldValue::Collection(items.len()))
    }
}

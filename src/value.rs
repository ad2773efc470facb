//! Raw field values.
//!
//! The reader keeps every field as the text it found in the file; callers may
//! store numbers directly. [`Value`] covers both without interpreting them:
//! field content is only checked by [`Record::validate`](crate::Record::validate).
//!
//! ```rust
//! use idf_core::Value;
//!
//! let text = Value::from("Concrete");
//! let real = Value::from(0.2);
//! let integer = Value::from(4);
//!
//! assert_eq!(text.as_str(), Some("Concrete"));
//! assert_eq!(real.to_string(), "0.2");
//! assert_eq!(integer.as_f64(), Some(4.0));
//! assert_eq!(Value::from("1.7").as_f64(), Some(1.7));
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single field value as stored in a [`Record`](crate::Record).
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl Value {
    /// If the value is text, returns a reference to it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a float, parsing text if it holds a number.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use idf_core::Value;
    ///
    /// assert_eq!(Value::Integer(3).as_f64(), Some(3.0));
    /// assert_eq!(Value::from(" 2.5 ").as_f64(), Some(2.5));
    /// assert_eq!(Value::from("autosize").as_f64(), None);
    /// ```
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(f) => Some(*f),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Returns the value as an integer, parsing text and accepting whole-number reals.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(f) if f.fract() == 0.0 => Some(*f as i64),
            Value::Real(_) => None,
            Value::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.fract() == 0.0)
                        .map(|f| f as i64)
                })
            }
        }
    }

    /// `true` for text that is empty or only whitespace.
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Value::Text(s) if s.trim().is_empty())
    }

    /// Case-insensitive comparison of a text value against a keyword such as `autosize`.
    #[must_use]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Value::Text(s) if s.trim().eq_ignore_ascii_case(keyword))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Text(s) => serializer.serialize_str(s),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Real(f) => serializer.serialize_f64(*f),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or a number")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::Integer(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(Value::Integer)
                    .map_err(|_| E::custom(format!("integer {} out of range", value)))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Value::Real(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::Text(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::Text(value))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Real(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keeps_text_verbatim() {
        assert_eq!(Value::from("Until: 24:00").to_string(), "Until: 24:00");
        assert_eq!(Value::Real(2200.0).to_string(), "2200");
        assert_eq!(Value::Integer(-3).to_string(), "-3");
    }

    #[test]
    fn test_keywords_and_blanks() {
        assert!(Value::from(" AutoSize ").is_keyword("autosize"));
        assert!(!Value::Real(1.0).is_keyword("autosize"));
        assert!(Value::from("  ").is_blank());
        assert!(!Value::from("x").is_blank());
    }

    #[test]
    fn test_serde_roundtrip() {
        let values = vec![Value::from("Smooth"), Value::Integer(4), Value::Real(0.5)];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"["Smooth",4,0.5]"#);
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }
}

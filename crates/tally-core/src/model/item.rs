use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ErrorCode;

/// Identity of an item within one collection.
///
/// Assigned by [`crate::store::ItemStore`]: the next id is the maximum live id
/// plus one, or `0` for an empty collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl ItemId {
    /// The id handed out when the collection is empty.
    pub const FIRST: Self = Self(0);

    /// The id that follows this one, or `None` past `u64::MAX`.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// A named numeric entry.
///
/// Snapshots from the older `calories` format load as long as every value is
/// a number. An entry whose value was stored as `null` (unparsable input in
/// that format) is rejected like any other corrupt snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    /// Older snapshots stored this field as `calories`.
    #[serde(alias = "calories")]
    pub value: i64,
}

impl Item {
    #[must_use]
    pub fn new(id: ItemId, name: impl Into<String>, value: i64) -> Self {
        Self {
            id,
            name: name.into(),
            value,
        }
    }
}

/// Raised when text cannot be coerced into an item value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}: {reason}: {raw:?}", ErrorCode::InvalidValue.code())]
pub struct InvalidValue {
    pub raw: String,
    pub reason: &'static str,
}

impl InvalidValue {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidValue
    }
}

/// Coerce form text into an item value.
///
/// Accepts optional surrounding whitespace, an optional `+`/`-` sign and then
/// the longest run of ASCII digits. Anything after the digits is ignored, so
/// `"300 kcal"` parses as `300`.
///
/// # Errors
///
/// Returns [`InvalidValue`] when no digits follow the optional sign or when
/// the number does not fit in an `i64`.
pub fn parse_value(raw: &str) -> Result<i64, InvalidValue> {
    let invalid = |reason| InvalidValue {
        raw: raw.to_string(),
        reason,
    };

    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(invalid("no leading digits"));
    }

    let mut value: i64 = 0;
    for digit in rest[..digits_len].bytes() {
        let d = i64::from(digit - b'0');
        value = value
            .checked_mul(10)
            .and_then(|v| if negative { v.checked_sub(d) } else { v.checked_add(d) })
            .ok_or_else(|| invalid("number out of range"))?;
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_integers() {
        assert_eq!(parse_value("300"), Ok(300));
        assert_eq!(parse_value("0"), Ok(0));
        assert_eq!(parse_value("007"), Ok(7));
    }

    #[test]
    fn parses_signs_and_whitespace() {
        assert_eq!(parse_value("  -42"), Ok(-42));
        assert_eq!(parse_value("+15"), Ok(15));
        assert_eq!(parse_value("\t12\n"), Ok(12));
    }

    #[test]
    fn ignores_trailing_text() {
        assert_eq!(parse_value("300kcal"), Ok(300));
        assert_eq!(parse_value("12.9"), Ok(12));
        assert_eq!(parse_value("5 6"), Ok(5));
    }

    #[test]
    fn rejects_text_without_digits() {
        for raw in ["", "   ", "abc", "-", "+", "- 5", "x12", ".5"] {
            let err = parse_value(raw).unwrap_err();
            assert_eq!(err.raw, raw);
            assert_eq!(err.code(), ErrorCode::InvalidValue);
        }
    }

    #[test]
    fn handles_i64_bounds() {
        assert_eq!(parse_value("9223372036854775807"), Ok(i64::MAX));
        assert_eq!(parse_value("-9223372036854775808"), Ok(i64::MIN));
        assert!(parse_value("9223372036854775808").is_err());
        assert!(parse_value("-9223372036854775809").is_err());
    }

    #[test]
    fn error_message_carries_code_and_input() {
        let err = parse_value("lots").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("E2002"), "{msg}");
        assert!(msg.contains("\"lots\""), "{msg}");
    }

    #[test]
    fn item_json_uses_value_and_reads_legacy_calories() {
        let item = Item::new(ItemId(3), "Eggs", 300);
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"id":3,"name":"Eggs","value":300}"#);

        let legacy: Item = serde_json::from_str(r#"{"id":3,"name":"Eggs","calories":300}"#).unwrap();
        assert_eq!(legacy, item);
    }

    #[test]
    fn legacy_null_calories_is_rejected() {
        let raw = r#"{"id":0,"name":"Eggs","calories":null}"#;
        assert!(serde_json::from_str::<Item>(raw).is_err());
    }

    #[test]
    fn item_id_next_and_display() {
        assert_eq!(ItemId::FIRST.next(), Some(ItemId(1)));
        assert_eq!(ItemId(41).to_string(), "41");
        assert_eq!(ItemId(u64::MAX).next(), None);
    }
}

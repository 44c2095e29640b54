//! User rating domain type

use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// Message used for every rejected rating
pub const RATING_RANGE_MESSAGE: &str = "Rating must be between 1 and 5";

/// A user-assigned rating, always within 1..=5.
///
/// Stored ratings of 0 mean "unrated" and never pass through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "i64")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    /// Validate an integer rating
    pub fn new(value: i64) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(Error::InvalidRating(RATING_RANGE_MESSAGE.to_string()))
        }
    }

    /// Validate a rating taken from a JSON body.
    ///
    /// Missing, null, fractional, string and boolean values are all rejected.
    pub fn from_json(value: Option<&Value>) -> Result<Self> {
        value
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::InvalidRating(RATING_RANGE_MESSAGE.to_string()))
            .and_then(Self::new)
    }

    pub fn get(self) -> i64 {
        i64::from(self.0)
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        rating.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rating_accepts_one_through_five() {
        for r in 1..=5 {
            assert_eq!(Rating::new(r).unwrap().get(), r);
        }
    }

    #[test]
    fn test_rating_rejects_out_of_range() {
        for r in [0, 6, -1, i64::MAX] {
            let err = Rating::new(r).unwrap_err();
            assert!(matches!(err, Error::InvalidRating(_)), "rating {} should be rejected", r);
        }
    }

    #[test]
    fn test_rating_from_json_rejects_non_integers() {
        for value in [json!(4.5), json!("4"), json!(true), Value::Null] {
            assert!(Rating::from_json(Some(&value)).is_err(), "{} should be rejected", value);
        }
        assert!(Rating::from_json(None).is_err());
        assert_eq!(Rating::from_json(Some(&json!(3))).unwrap().get(), 3);
    }

    #[test]
    fn test_rating_serializes_as_plain_integer() {
        let rating = Rating::new(4).unwrap();
        assert_eq!(serde_json::to_value(rating).unwrap(), json!(4));
    }

    #[test]
    fn test_rating_error_message() {
        let err = Rating::new(9).unwrap_err();
        assert_eq!(err.to_string(), RATING_RANGE_MESSAGE);
    }
}

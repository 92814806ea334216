use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use validator::{Validate, ValidationError};

/// A 1 to 5 score with an optional comment. The integer bound is
/// enforced here, before any request leaves the process; a zero or
/// missing score never reaches the wire.
#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RatePayload {
    #[validate(range(min = 1, max = 5, message = "Avaliação deve ser uma nota de 1 a 5"))]
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_comment")]
    pub comment: Option<String>,
}

impl RatePayload {
    pub fn new(rating: u8) -> Self {
        Self {
            rating,
            comment: None,
        }
    }

    pub fn with_comment(rating: u8, comment: impl Into<String>) -> Self {
        Self {
            rating,
            comment: Some(comment.into()),
        }
    }
}

fn validate_comment(comment: &str) -> Result<(), ValidationError> {
    if comment.graphemes(true).count() > 500 {
        let mut error = ValidationError::new("comment_length");
        error.message = Some("Comentário deve ter no máximo 500 caracteres".into());
        return Err(error);
    }
    Ok(())
}

/// Reply of the rate endpoint: the aggregates recomputed server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatingReceipt {
    pub material_id: String,
    pub avg_rating: f64,
    pub total_ratings: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_ok};
    use validator::Validate;

    #[test]
    fn zero_is_rejected() {
        assert_err!(RatePayload::new(0).validate());
    }

    #[test]
    fn six_is_rejected() {
        assert_err!(RatePayload::new(6).validate());
    }

    #[test]
    fn five_with_comment_is_accepted() {
        assert_ok!(RatePayload::with_comment(5, "ótimo material").validate());
    }

    #[test]
    fn oversized_comment_is_rejected() {
        let payload = RatePayload::with_comment(4, "x".repeat(501));
        assert_err!(payload.validate());
    }
}

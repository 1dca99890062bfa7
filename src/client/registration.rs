use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::users::repo::UserProfile;

use super::api::ProfileUpdate;
use super::auth::AuthContext;
use super::ClientError;

lazy_static! {
    // 2-3 digits, one Hangul syllable, 4 digits (e.g. 123가1234).
    static ref VEHICLE_RE: Regex = Regex::new(r"^\d{2,3}[가-힣]\d{4}$").unwrap();
    // 010-XXX(X)-XXXX.
    static ref PHONE_RE: Regex = Regex::new(r"^010-\d{3,4}-\d{4}$").unwrap();
}

pub const VEHICLE_FORMAT_ERROR: &str = "차량번호 형식이 올바르지 않습니다. (예: 123가1234)";
pub const PHONE_FORMAT_ERROR: &str = "휴대폰 번호 형식이 올바르지 않습니다. (예: 010-1234-5678)";

/// Re-dash a phone number as the user types: keep the digits, prefix group
/// of 3, final group of 4, middle group takes the rest (so a 10-digit number
/// comes out 010-XXX-XXXX and an 11-digit one 010-XXXX-XXXX). Total over any
/// input; over-long input grows the middle group so validation can reject it.
pub fn format_phone_number(input: &str) -> String {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() <= 3 {
        digits
    } else if digits.len() <= 7 {
        format!("{}-{}", &digits[..3], &digits[3..])
    } else {
        let split = digits.len() - 4;
        format!("{}-{}-{}", &digits[..3], &digits[3..split], &digits[split..])
    }
}

pub fn validate_vehicle(input: &str) -> bool {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    VEHICLE_RE.is_match(&cleaned)
}

pub fn validate_phone(input: &str) -> bool {
    PHONE_RE.is_match(input)
}

/// Validate-then-submit for the vehicle form. A failed check blocks the
/// request and surfaces the localized message.
pub async fn register_vehicle(
    ctx: &AuthContext,
    input: &str,
) -> Result<UserProfile, ClientError> {
    let value: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if !validate_vehicle(&value) {
        warn!(input, "vehicle number rejected");
        return Err(ClientError::Validation(VEHICLE_FORMAT_ERROR.to_string()));
    }
    ctx.update_user(&ProfileUpdate::Vehicle(Some(value))).await
}

pub async fn register_phone(ctx: &AuthContext, input: &str) -> Result<UserProfile, ClientError> {
    let value = input.trim();
    if !validate_phone(value) {
        warn!(input, "phone number rejected");
        return Err(ClientError::Validation(PHONE_FORMAT_ERROR.to_string()));
    }
    ctx.update_user(&ProfileUpdate::Phone(Some(value.to_string())))
        .await
}

/// Clearing is destructive, so the caller supplies the confirmation step
/// (modal or blocking confirm). Ok(None) means the user backed out.
pub async fn clear_vehicle(
    ctx: &AuthContext,
    confirm: impl FnOnce() -> bool,
) -> Result<Option<UserProfile>, ClientError> {
    if !confirm() {
        return Ok(None);
    }
    ctx.update_user(&ProfileUpdate::Vehicle(None)).await.map(Some)
}

pub async fn clear_phone(
    ctx: &AuthContext,
    confirm: impl FnOnce() -> bool,
) -> Result<Option<UserProfile>, ClientError> {
    if !confirm() {
        return Ok(None);
    }
    ctx.update_user(&ProfileUpdate::Phone(None)).await.map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::api::ApiClient;
    use crate::client::session::MemorySessionStore;

    #[test]
    fn formats_partial_input_while_typing() {
        assert_eq!(format_phone_number(""), "");
        assert_eq!(format_phone_number("010"), "010");
        assert_eq!(format_phone_number("0101"), "010-1");
        assert_eq!(format_phone_number("0101234"), "010-1234");
        assert_eq!(format_phone_number("0101234567"), "010-123-4567");
        assert_eq!(format_phone_number("01012345678"), "010-1234-5678");
    }

    #[test]
    fn formatting_strips_non_digits() {
        assert_eq!(format_phone_number("010-1234-5678"), "010-1234-5678");
        assert_eq!(format_phone_number("010 1234 5678"), "010-1234-5678");
        assert_eq!(format_phone_number("(010) 123-4567"), "010-123-4567");
    }

    #[test]
    fn formatting_is_idempotent_up_to_eleven_digits() {
        for raw in ["01", "010", "01012", "0101234", "010123456", "0101234567", "01012345678"] {
            let once = format_phone_number(raw);
            assert_eq!(format_phone_number(&once), once, "input {raw}");
        }
    }

    #[test]
    fn ten_digit_numbers_keep_a_four_digit_tail() {
        assert_eq!(format_phone_number("0101234567"), "010-123-4567");
        assert_eq!(format_phone_number("010123456789"), "010-12345-6789");
    }

    #[test]
    fn phone_validates_exactly_ten_or_eleven_digits_starting_with_010() {
        // 10 and 11 digits starting with 010 pass after formatting.
        assert!(validate_phone(&format_phone_number("0101234567")));
        assert!(validate_phone(&format_phone_number("01012345678")));

        // Too short, too long, or the wrong prefix fail.
        assert!(!validate_phone(&format_phone_number("010123456")));
        assert!(!validate_phone(&format_phone_number("010123456789")));
        assert!(!validate_phone(&format_phone_number("01112345678")));
        assert!(!validate_phone(&format_phone_number("")));
    }

    #[test]
    fn phone_rejects_undashed_input() {
        assert!(!validate_phone("01012345678"));
        assert!(validate_phone("010-123-4567"));
        assert!(validate_phone("010-1234-5678"));
    }

    #[test]
    fn vehicle_accepts_two_or_three_leading_digits() {
        assert!(validate_vehicle("123가1234"));
        assert!(validate_vehicle("12가1234"));
        assert!(!validate_vehicle("1234가1234"));
    }

    #[test]
    fn vehicle_strips_whitespace_before_checking() {
        assert!(validate_vehicle(" 123가1234 "));
        assert!(validate_vehicle("12 가 1234"));
    }

    #[test]
    fn vehicle_rejects_missing_or_latin_letter() {
        assert!(!validate_vehicle("1231234"));
        assert!(!validate_vehicle("123a1234"));
        assert!(!validate_vehicle("가123가1234"));
        assert!(!validate_vehicle(""));
    }

    fn offline_ctx() -> AuthContext {
        AuthContext::new(
            ApiClient::new("http://localhost:3000"),
            Box::new(MemorySessionStore::new()),
        )
    }

    #[tokio::test]
    async fn register_vehicle_blocks_bad_input_before_any_request() {
        let ctx = offline_ctx();
        let err = register_vehicle(&ctx, "1234가1234").await.unwrap_err();
        match err {
            ClientError::Validation(msg) => assert_eq!(msg, VEHICLE_FORMAT_ERROR),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_phone_blocks_bad_input_before_any_request() {
        let ctx = offline_ctx();
        let err = register_phone(&ctx, "010-12-345678").await.unwrap_err();
        match err {
            ClientError::Validation(msg) => assert_eq!(msg, PHONE_FORMAT_ERROR),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn clear_vehicle_backs_out_when_not_confirmed() {
        let ctx = offline_ctx();
        let result = clear_vehicle(&ctx, || false).await.unwrap();
        assert!(result.is_none());
    }
}

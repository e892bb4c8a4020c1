use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

/// 验证邮箱格式
pub fn validate_email(email: &str) -> AppResult<()> {
    if !EMAIL_REGEX.is_match(email) {
        return Err(AppError::ValidationError(
            "\"email\" must be a valid email".to_string(),
        ));
    }

    Ok(())
}

/// 请求体中的 id 字段必须 >= 1
pub fn validate_positive_id(value: i64, field: &str) -> AppResult<i64> {
    if value < 1 {
        return Err(AppError::ValidationError(format!(
            "\"{field}\" must be greater than or equal to 1"
        )));
    }
    Ok(value)
}

/// 路径参数解析为 >= 1 的整数
pub fn parse_positive_id(raw: &str, field: &str) -> AppResult<i64> {
    let value = raw
        .parse::<i64>()
        .map_err(|_| AppError::ValidationError(format!("\"{field}\" must be a number")))?;
    validate_positive_id(value, field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("attendee@driven.com.br").is_ok());
        assert!(validate_email("attendee@driven").is_err());
        assert!(validate_email("not an email").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_parse_positive_id() {
        assert_eq!(parse_positive_id("12", "bookingId").unwrap(), 12);
        assert!(parse_positive_id("0", "bookingId").is_err());
        assert!(parse_positive_id("-3", "bookingId").is_err());
        assert!(parse_positive_id("abc", "hotelId").is_err());
        assert!(parse_positive_id("1.5", "hotelId").is_err());
    }

    #[test]
    fn test_validate_positive_id() {
        assert_eq!(validate_positive_id(1, "roomId").unwrap(), 1);
        assert!(matches!(
            validate_positive_id(0, "roomId"),
            Err(AppError::ValidationError(_))
        ));
    }
}

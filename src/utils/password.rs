use bcrypt::{DEFAULT_COST, hash, verify};
use crate::error::{AppError, AppResult};

/// 对密码进行哈希
pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Failed to hash password: {e}")))
}

/// 验证密码；存储的哈希格式异常时视为不匹配
pub fn verify_password(password: &str, hash: &str) -> bool {
    match verify(password, hash) {
        Ok(valid) => valid,
        Err(e) => {
            log::warn!("Stored password hash could not be verified: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let password = "Password123";
        let hashed = hash_password(password).unwrap();

        assert!(verify_password(password, &hashed));
        assert!(!verify_password("WrongPassword", &hashed));
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        assert!(!verify_password("Password123", "plain-text"));
    }
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::user_entity;
use crate::error::{AppError, AppResult};
use crate::utils::validate_email;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignInRequest {
    #[schema(example = "attendee@example.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
}

impl SignInRequest {
    pub fn validate(&self) -> AppResult<()> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(AppError::ValidationError(
                "\"password\" is not allowed to be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// 第三方登录（前端完成身份验证后回传 email 与会话号）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInWithMethodRequest {
    #[schema(example = "attendee@example.com")]
    pub email: String,
    #[schema(example = 1700000000)]
    pub id_session: i64,
}

impl SignInWithMethodRequest {
    pub fn validate(&self) -> AppResult<()> {
        validate_email(&self.email)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SignedInUser {
    pub id: i64,
    pub email: String,
}

impl From<user_entity::Model> for SignedInUser {
    fn from(m: user_entity::Model) -> Self {
        SignedInUser {
            id: m.id,
            email: m.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignInResponse {
    pub user: SignedInUser,
    pub token: String,
}

use crate::entities::{session_entity as sessions, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{SignInRequest, SignInResponse, SignInWithMethodRequest, SignedInUser};
use crate::utils::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthService {
    pool: Arc<DatabaseConnection>,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: Arc<DatabaseConnection>, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    pub async fn sign_in(&self, request: SignInRequest) -> AppResult<SignInResponse> {
        request.validate()?;

        // 用户不存在与密码错误返回同一个错误
        let user = self
            .find_user_by_email(&request.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password) {
            log::info!("Failed sign-in attempt for user {}", user.id);
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_session(user.id).await?;

        Ok(SignInResponse {
            user: SignedInUser::from(user),
            token,
        })
    }

    /// 第三方登录：邮箱不存在时自动建号
    pub async fn sign_in_with_method(
        &self,
        request: SignInWithMethodRequest,
    ) -> AppResult<SignInResponse> {
        request.validate()?;

        let user = match self.find_user_by_email(&request.email).await? {
            Some(user) => user,
            None => self.create_user(&request.email, request.id_session).await?,
        };

        let token = self.create_session(user.id).await?;

        Ok(SignInResponse {
            user: SignedInUser::from(user),
            token,
        })
    }

    /// 校验 token 并确认会话存在，返回用户 ID
    pub async fn validate_session(&self, token: &str) -> AppResult<i64> {
        let user_id = self
            .jwt_service
            .verify_token(token)
            .map_err(|_| AppError::Unauthorized("Invalid access token".to_string()))?
            .user_id()?;

        let session = sessions::Entity::find()
            .filter(sessions::Column::Token.eq(token))
            .one(self.pool.as_ref())
            .await?;

        match session {
            Some(session) if session.user_id == user_id => Ok(user_id),
            _ => Err(AppError::Unauthorized("Session not found".to_string())),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(self.pool.as_ref())
            .await?)
    }

    async fn create_user(&self, email: &str, id_session: i64) -> AppResult<users::Model> {
        let password = hash_password(&id_session.to_string())?;
        let now = Utc::now();

        let inserted = users::ActiveModel {
            email: Set(email.to_string()),
            password: Set(password),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await;

        match inserted {
            Ok(user) => {
                log::info!("Created user {} via sign-in method", user.id);
                Ok(user)
            }
            // 并发登录时另一个请求已建号
            Err(e) if is_unique_violation(&e) => self
                .find_user_by_email(email)
                .await?
                .ok_or(AppError::DatabaseError(e)),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_session(&self, user_id: i64) -> AppResult<String> {
        let token = self.jwt_service.generate_token(user_id)?;
        let now = Utc::now();

        sessions::ActiveModel {
            user_id: Set(user_id),
            token: Set(token.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        Ok(token)
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn jwt() -> JwtService {
        JwtService::new("test-secret", 3600)
    }

    fn user(password: &str) -> users::Model {
        users::Model {
            id: 1,
            email: "attendee@example.com".into(),
            password: hash_password(password).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn session(user_id: i64, token: &str) -> sessions::Model {
        sessions::Model {
            id: 1,
            user_id,
            token: token.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_unknown_email_is_invalid_credentials() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();
        let service = AuthService::new(Arc::new(db), jwt());

        let result = service
            .sign_in(SignInRequest {
                email: "nobody@example.com".into(),
                password: "whatever".into(),
            })
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password_is_invalid_credentials() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user("right-password")]])
            .into_connection();
        let service = AuthService::new(Arc::new(db), jwt());

        let result = service
            .sign_in(SignInRequest {
                email: "attendee@example.com".into(),
                password: "wrong-password".into(),
            })
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_sign_in_creates_session() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user("right-password")]])
            .append_query_results([[session(1, "stored-token")]])
            .into_connection();
        let service = AuthService::new(Arc::new(db), jwt());

        let response = service
            .sign_in(SignInRequest {
                email: "attendee@example.com".into(),
                password: "right-password".into(),
            })
            .await
            .unwrap();

        assert_eq!(response.user.id, 1);
        assert_eq!(jwt().verify_token(&response.token).unwrap().user_id().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sign_in_with_method_creates_missing_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .append_query_results([[user("1700000000")]])
            .append_query_results([[session(1, "stored-token")]])
            .into_connection();
        let service = AuthService::new(Arc::new(db), jwt());

        let response = service
            .sign_in_with_method(SignInWithMethodRequest {
                email: "attendee@example.com".into(),
                id_session: 1_700_000_000,
            })
            .await
            .unwrap();

        assert_eq!(response.user.email, "attendee@example.com");
    }

    #[tokio::test]
    async fn test_validate_session() {
        let token = jwt().generate_token(1).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[session(1, &token)]])
            .into_connection();
        let service = AuthService::new(Arc::new(db), jwt());

        assert_eq!(service.validate_session(&token).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_validate_session_without_row_is_unauthorized() {
        let token = jwt().generate_token(1).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<sessions::Model>::new()])
            .into_connection();
        let service = AuthService::new(Arc::new(db), jwt());

        let result = service.validate_session(&token).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_validate_session_rejects_garbage_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = AuthService::new(Arc::new(db), jwt());

        let result = service.validate_session("not-a-jwt").await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}

pub mod activity;
pub mod auth;
pub mod booking;
pub mod hotel;

pub use activity::activity_config;
pub use auth::auth_config;
pub use booking::booking_config;
pub use hotel::hotel_config;

use crate::error::AppError;
use actix_web::{ResponseError, error::InternalError, web};

/// 请求体解析失败统一返回 400
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let app_error = AppError::ValidationError(err.to_string());
        let response = app_error.error_response();
        InternalError::from_response(err, response).into()
    })
}

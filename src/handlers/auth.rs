use crate::models::*;
use crate::services::AuthService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/authentication/sign-in",
    tag = "authentication",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "登录成功", body = SignInResponse),
        (status = 400, description = "请求参数错误"),
        (status = 401, description = "邮箱或密码错误")
    )
)]
pub async fn sign_in(
    auth_service: web::Data<AuthService>,
    request: web::Json<SignInRequest>,
) -> Result<HttpResponse> {
    match auth_service.sign_in(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/authentication/sign-in/method",
    tag = "authentication",
    request_body = SignInWithMethodRequest,
    responses(
        (status = 200, description = "登录成功（邮箱不存在时自动注册）", body = SignInResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn sign_in_with_method(
    auth_service: web::Data<AuthService>,
    request: web::Json<SignInWithMethodRequest>,
) -> Result<HttpResponse> {
    match auth_service.sign_in_with_method(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/authentication")
            .route("/sign-in", web::post().to(sign_in))
            .route("/sign-in/method", web::post().to(sign_in_with_method)),
    );
}

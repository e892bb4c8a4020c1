use crate::error::AppError;
use crate::services::AuthService;
use actix_web::dev::Payload;
use actix_web::http::Method;
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc;

// 公开路径配置
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            // 完全匹配的公开路径
            exact_paths: vec!["/swagger-ui", "/health"],
            // 前缀匹配的公开路径
            prefix_paths: vec!["/swagger-ui/", "/api-docs/", "/authentication/"],
        }
    }

    fn is_public_path(&self, path: &str) -> bool {
        if self.exact_paths.contains(&path) {
            return true;
        }

        self.prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
    }
}

/// 已通过鉴权的用户，由中间件写入请求扩展
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i64);

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<CurrentUser>()
                .copied()
                .ok_or_else(|| AppError::Unauthorized("Missing access token".to_string())),
        )
    }
}

pub struct AuthMiddleware {
    auth_service: AuthService,
}

impl AuthMiddleware {
    pub fn new(auth_service: AuthService) -> Self {
        Self { auth_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            auth_service: self.auth_service.clone(),
            public_paths: Rc::new(PublicPaths::new()),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    auth_service: AuthService,
    public_paths: Rc<PublicPaths>,
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS || self.public_paths.is_public_path(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let token = bearer_token(&req);
        let service = Rc::clone(&self.service);
        let auth_service = self.auth_service.clone();

        Box::pin(async move {
            let Some(token) = token else {
                return Err(AppError::Unauthorized("Missing access token".to_string()).into());
            };

            // token 有效且会话存在才放行
            let user_id = auth_service.validate_session(&token).await?;
            req.extensions_mut().insert(CurrentUser(user_id));

            service.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        let paths = PublicPaths::new();
        assert!(paths.is_public_path("/authentication/sign-in"));
        assert!(paths.is_public_path("/authentication/sign-in/method"));
        assert!(paths.is_public_path("/swagger-ui/index.html"));
        assert!(paths.is_public_path("/api-docs/openapi.json"));
        assert!(!paths.is_public_path("/booking"));
        assert!(!paths.is_public_path("/hotels/1"));
        assert!(!paths.is_public_path("/activity/booking"));
    }
}

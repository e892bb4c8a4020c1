use actix_cors::Cors;

/// 未配置来源时放开所有来源（本地开发）
pub fn create_cors(allowed_origins: &[String]) -> Cors {
    let cors = if allowed_origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
        .allow_any_header()
        .max_age(3600)
}

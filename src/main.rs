use actix_web::{App, HttpResponse, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use event_booking_backend::{
    cache::{MemoryCache, RedisCache, SharedCache},
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

fn init_logger() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();
}

/// 配置了 Redis 则使用 Redis，否则使用进程内缓存
fn build_cache(redis_url: Option<&str>) -> SharedCache {
    match redis_url {
        Some(url) => match RedisCache::new(url) {
            Ok(cache) => {
                log::info!("Using Redis cache");
                Arc::new(cache)
            }
            Err(e) => {
                log::error!("Invalid Redis URL, falling back to in-process cache: {e}");
                Arc::new(MemoryCache::new())
            }
        },
        None => {
            log::info!("REDIS_URL not set, using in-process cache");
            Arc::new(MemoryCache::new())
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logger();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    let pool = Arc::new(pool);

    let cache = build_cache(config.cache.redis_url.as_deref());

    // 创建JWT服务
    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.expires_in);

    // 创建服务
    let auth_service = AuthService::new(pool.clone(), jwt_service);
    let hotel_service = HotelService::new(pool.clone(), cache.clone());
    let booking_service = BookingService::new(pool.clone(), cache.clone());
    let activity_service = ActivityService::new(pool.clone(), cache.clone());
    let activity_booking_service = ActivityBookingService::new(pool.clone(), cache.clone());

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let allowed_origins = config.server.allowed_origins.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(auth_service.clone()))
            .wrap(create_cors(&allowed_origins))
            .wrap(Logger::default())
            .app_data(handlers::json_config())
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(hotel_service.clone()))
            .app_data(web::Data::new(booking_service.clone()))
            .app_data(web::Data::new(activity_service.clone()))
            .app_data(web::Data::new(activity_booking_service.clone()))
            .configure(swagger_config)
            .route("/health", web::get().to(|| async { HttpResponse::Ok().body("OK!") }))
            .configure(handlers::auth_config)
            .configure(handlers::hotel_config)
            .configure(handlers::booking_config)
            .configure(handlers::activity_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}

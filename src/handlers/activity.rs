use crate::middlewares::CurrentUser;
use crate::models::*;
use crate::services::{ActivityBookingService, ActivityService};
use crate::utils::parse_positive_id;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/activity",
    tag = "activity",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "活动日期列表", body = [ActivityDateResponse]),
        (status = 401, description = "未授权或门票不满足条件"),
        (status = 402, description = "门票未支付")
    )
)]
pub async fn get_activity_dates(
    service: web::Data<ActivityService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    match service.get_activity_dates(user.0).await {
        Ok(dates) => Ok(HttpResponse::Ok().json(dates)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/activity/{eventDateId}",
    tag = "activity",
    params(
        ("eventDateId" = i64, Path, description = "活动日期ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "该日期下的场地与活动", body = [ActivityLocalResponse]),
        (status = 400, description = "eventDateId 无效"),
        (status = 401, description = "未授权或门票不满足条件"),
        (status = 402, description = "门票未支付")
    )
)]
pub async fn get_activities_by_date(
    service: web::Data<ActivityService>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let date_id = match parse_positive_id(&path, "eventDateId") {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match service.get_activities_by_date(date_id, user.0).await {
        Ok(locals) => Ok(HttpResponse::Ok().json(locals)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/activity/booking",
    tag = "activity",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前用户的活动预订", body = [UserActivityBookingResponse]),
        (status = 401, description = "未授权或门票不满足条件"),
        (status = 402, description = "门票未支付")
    )
)]
pub async fn get_activity_bookings(
    service: web::Data<ActivityBookingService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    match service.get_activity_bookings(user.0).await {
        Ok(bookings) => Ok(HttpResponse::Ok().json(bookings)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/activity/booking",
    tag = "activity",
    request_body = BookActivityRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "预订成功", body = ActivityBookingIdResponse),
        (status = 400, description = "activityId 无效"),
        (status = 401, description = "未授权"),
        (status = 402, description = "门票未支付"),
        (status = 403, description = "不能预订（门票不满足条件或名额已满）"),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn book_activity(
    service: web::Data<ActivityBookingService>,
    user: CurrentUser,
    request: web::Json<BookActivityRequest>,
) -> Result<HttpResponse> {
    let activity_id = match request.validate() {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match service.book_activity(user.0, activity_id).await {
        Ok(activity_booking_id) => Ok(HttpResponse::Ok().json(ActivityBookingIdResponse {
            activity_booking_id,
        })),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn activity_config(cfg: &mut web::ServiceConfig) {
    // /booking 必须在 /{eventDateId} 之前注册
    cfg.service(
        web::scope("/activity")
            .route("", web::get().to(get_activity_dates))
            .route("/booking", web::get().to(get_activity_bookings))
            .route("/booking", web::post().to(book_activity))
            .route("/{eventDateId}", web::get().to(get_activities_by_date)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::entities::{enrollment_entity, session_entity};
    use crate::middlewares::AuthMiddleware;
    use crate::services::AuthService;
    use crate::utils::JwtService;
    use actix_web::{App, http::StatusCode, test};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    const SECRET: &str = "handler-test-secret";

    #[actix_web::test]
    async fn test_activity_booking_route_is_not_a_date_id() {
        let token = JwtService::new(SECRET, 3600).generate_token(1).unwrap();
        let session_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[session_entity::Model {
                id: 1,
                user_id: 1,
                token: token.clone(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }]])
            .into_connection();
        // 没有报名 → 读取接口返回 401
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<enrollment_entity::Model>::new()])
            .into_connection();
        let db = Arc::new(db);
        let cache = Arc::new(MemoryCache::new());

        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(AuthService::new(
                    Arc::new(session_db),
                    JwtService::new(SECRET, 3600),
                )))
                .app_data(web::Data::new(ActivityService::new(db.clone(), cache.clone())))
                .app_data(web::Data::new(ActivityBookingService::new(db, cache)))
                .configure(activity_config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/activity/booking")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_invalid_event_date_id_is_bad_request() {
        let token = JwtService::new(SECRET, 3600).generate_token(1).unwrap();
        let session_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[session_entity::Model {
                id: 1,
                user_id: 1,
                token: token.clone(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }]])
            .into_connection();
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let cache = Arc::new(MemoryCache::new());

        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(AuthService::new(
                    Arc::new(session_db),
                    JwtService::new(SECRET, 3600),
                )))
                .app_data(web::Data::new(ActivityService::new(db.clone(), cache.clone())))
                .app_data(web::Data::new(ActivityBookingService::new(db, cache)))
                .configure(activity_config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/activity/0")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

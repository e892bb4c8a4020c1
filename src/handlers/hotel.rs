use crate::middlewares::CurrentUser;
use crate::services::HotelService;
use crate::utils::parse_positive_id;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/hotels",
    tag = "hotels",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "酒店列表", body = [crate::models::HotelSummaryResponse]),
        (status = 401, description = "未授权或门票不满足条件"),
        (status = 402, description = "门票未支付")
    )
)]
pub async fn get_hotels(
    service: web::Data<HotelService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    match service.get_hotels(user.0).await {
        Ok(hotels) => Ok(HttpResponse::Ok().json(hotels)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/hotels/{hotelId}",
    tag = "hotels",
    params(
        ("hotelId" = i64, Path, description = "酒店ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "酒店及其房间", body = crate::models::HotelWithRoomsResponse),
        (status = 400, description = "hotelId 无效"),
        (status = 401, description = "未授权或门票不满足条件"),
        (status = 402, description = "门票未支付"),
        (status = 404, description = "酒店不存在")
    )
)]
pub async fn get_rooms_from_hotel(
    service: web::Data<HotelService>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let hotel_id = match parse_positive_id(&path, "hotelId") {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match service.get_rooms_from_hotel(hotel_id, user.0).await {
        Ok(hotel) => Ok(HttpResponse::Ok().json(hotel)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn hotel_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/hotels")
            .route("", web::get().to(get_hotels))
            .route("/{hotelId}", web::get().to(get_rooms_from_hotel)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::entities::{
        TicketStatus, enrollment_entity, session_entity, ticket_entity, ticket_type_entity,
    };
    use crate::middlewares::AuthMiddleware;
    use crate::services::AuthService;
    use crate::utils::JwtService;
    use actix_web::{App, http::StatusCode, test};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    const SECRET: &str = "handler-test-secret";

    fn ticket_db(status: TicketStatus, is_remote: bool) -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[enrollment_entity::Model {
                id: 1,
                user_id: 1,
                name: "Attendee".into(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }]])
            .append_query_results([[(
                ticket_entity::Model {
                    id: 1,
                    enrollment_id: 1,
                    ticket_type_id: 1,
                    status,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                },
                ticket_type_entity::Model {
                    id: 1,
                    name: "Ticket".into(),
                    price: 50000,
                    is_remote,
                    includes_hotel: !is_remote,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                },
            )]])
    }

    async fn get_hotels_status(db: MockDatabase) -> StatusCode {
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

        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(AuthService::new(
                    Arc::new(session_db),
                    JwtService::new(SECRET, 3600),
                )))
                .app_data(web::Data::new(HotelService::new(
                    Arc::new(db.into_connection()),
                    Arc::new(MemoryCache::new()),
                )))
                .configure(hotel_config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/hotels")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        test::call_service(&app, req).await.status()
    }

    #[actix_web::test]
    async fn test_get_hotels_with_remote_ticket_is_unauthorized() {
        let status = get_hotels_status(ticket_db(TicketStatus::Paid, true)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_get_hotels_with_reserved_ticket_requires_payment() {
        let status = get_hotels_status(ticket_db(TicketStatus::Reserved, false)).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    }

    #[actix_web::test]
    async fn test_get_hotels_with_paid_ticket_lists_hotels() {
        let db = ticket_db(TicketStatus::Paid, false)
            .append_query_results([Vec::<crate::entities::hotel_entity::Model>::new()]);
        let status = get_hotels_status(db).await;
        assert_eq!(status, StatusCode::OK);
    }
}

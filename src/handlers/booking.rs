use crate::middlewares::CurrentUser;
use crate::models::*;
use crate::services::BookingService;
use crate::utils::parse_positive_id;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/booking",
    tag = "booking",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前用户的预订", body = BookingResponse),
        (status = 401, description = "未授权"),
        (status = 404, description = "用户没有预订")
    )
)]
pub async fn get_booking(
    service: web::Data<BookingService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    match service.get_booking(user.0).await {
        Ok(booking) => Ok(HttpResponse::Ok().json(booking)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/booking",
    tag = "booking",
    request_body = BookingRoomRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "预订成功", body = BookingIdResponse),
        (status = 400, description = "roomId 无效"),
        (status = 401, description = "未授权"),
        (status = 402, description = "门票未支付"),
        (status = 403, description = "不能预订（门票不满足条件、已有预订或房间已满）"),
        (status = 404, description = "房间不存在")
    )
)]
pub async fn post_booking(
    service: web::Data<BookingService>,
    user: CurrentUser,
    request: web::Json<BookingRoomRequest>,
) -> Result<HttpResponse> {
    let room_id = match request.validate() {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match service.post_booking(user.0, room_id).await {
        Ok(booking_id) => Ok(HttpResponse::Ok().json(BookingIdResponse { booking_id })),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/booking/{bookingId}",
    tag = "booking",
    params(
        ("bookingId" = i64, Path, description = "预订ID")
    ),
    request_body = BookingRoomRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "换房成功", body = BookingIdResponse),
        (status = 400, description = "bookingId 或 roomId 无效"),
        (status = 401, description = "未授权"),
        (status = 403, description = "不能换房（非本人预订、同一房间或房间已满）"),
        (status = 404, description = "房间不存在")
    )
)]
pub async fn put_booking(
    service: web::Data<BookingService>,
    user: CurrentUser,
    path: web::Path<String>,
    request: web::Json<BookingRoomRequest>,
) -> Result<HttpResponse> {
    let ids = parse_positive_id(&path, "bookingId")
        .and_then(|booking_id| Ok((booking_id, request.validate()?)));
    let (booking_id, room_id) = match ids {
        Ok(ids) => ids,
        Err(e) => return Ok(e.error_response()),
    };

    match service.put_booking(user.0, booking_id, room_id).await {
        Ok(booking_id) => Ok(HttpResponse::Ok().json(BookingIdResponse { booking_id })),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn booking_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/booking")
            .route("", web::get().to(get_booking))
            .route("", web::post().to(post_booking))
            .route("/{bookingId}", web::put().to(put_booking)),
    );
}

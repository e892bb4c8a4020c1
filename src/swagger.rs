use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::TicketStatus;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::sign_in,
        handlers::auth::sign_in_with_method,
        handlers::hotel::get_hotels,
        handlers::hotel::get_rooms_from_hotel,
        handlers::booking::get_booking,
        handlers::booking::post_booking,
        handlers::booking::put_booking,
        handlers::activity::get_activity_dates,
        handlers::activity::get_activities_by_date,
        handlers::activity::get_activity_bookings,
        handlers::activity::book_activity,
    ),
    components(
        schemas(
            SignInRequest,
            SignInWithMethodRequest,
            SignedInUser,
            SignInResponse,
            HotelSummaryResponse,
            RoomResponse,
            HotelWithRoomsResponse,
            BookingRoomRequest,
            BookingIdResponse,
            BookingHotel,
            BookingRoom,
            BookingResponse,
            ActivityDateResponse,
            ActivityBookingEntry,
            ActivityResponse,
            ActivityLocalResponse,
            BookActivityRequest,
            ActivityBookingIdResponse,
            BookedActivity,
            UserActivityBookingResponse,
            TicketStatus,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "authentication", description = "Sign-in API"),
        (name = "hotels", description = "Hotel listing API"),
        (name = "booking", description = "Hotel booking API"),
        (name = "activity", description = "Activity listing and booking API"),
    ),
    info(
        title = "Event Booking Backend API",
        version = "1.0.0",
        description = "Event registration backend REST API documentation"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

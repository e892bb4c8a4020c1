use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::utils::validate_positive_id;

/// POST /booking 与 PUT /booking/{bookingId} 共用的请求体
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingRoomRequest {
    #[schema(example = 1, minimum = 1)]
    pub room_id: i64,
}

impl BookingRoomRequest {
    pub fn validate(&self) -> AppResult<i64> {
        validate_positive_id(self.room_id, "roomId")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingIdResponse {
    pub booking_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BookingHotel {
    pub id: i64,
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingRoom {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    pub hotel_id: i64,
    pub bookeds: i64,
}

/// 用户当前的酒店预订
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking_id: i64,
    pub hotel: BookingHotel,
    pub room: BookingRoom,
}

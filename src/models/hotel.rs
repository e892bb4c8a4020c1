use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{hotel_entity, room_entity};

/// 酒店列表项
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HotelSummaryResponse {
    pub id: i64,
    pub name: String,
    pub image: String,
    /// 房型标签, 例如 "Single, Double e Triple"
    pub capacity: String,
    /// 剩余床位 = 总容量 - 已预订数
    pub available_vacancies: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    pub hotel_id: i64,
    /// 已预订数
    pub bookeds: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoomResponse {
    pub fn from_model(m: room_entity::Model, bookeds: i64) -> Self {
        RoomResponse {
            id: m.id,
            name: m.name,
            capacity: m.capacity,
            hotel_id: m.hotel_id,
            bookeds,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// 酒店详情 (含房间)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HotelWithRoomsResponse {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "Rooms")]
    pub rooms: Vec<RoomResponse>,
}

impl HotelWithRoomsResponse {
    pub fn new(hotel: hotel_entity::Model, rooms: Vec<RoomResponse>) -> Self {
        HotelWithRoomsResponse {
            id: hotel.id,
            name: hotel.name,
            image: hotel.image,
            created_at: hotel.created_at,
            updated_at: hotel.updated_at,
            rooms,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{activity_booking_entity, activity_date_entity, activity_entity, activity_local_entity};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDateResponse {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<activity_date_entity::Model> for ActivityDateResponse {
    fn from(m: activity_date_entity::Model) -> Self {
        ActivityDateResponse {
            id: m.id,
            date: m.date,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityBookingEntry {
    pub id: i64,
    pub user_id: i64,
    pub activity_id: i64,
}

impl From<activity_booking_entity::Model> for ActivityBookingEntry {
    fn from(m: activity_booking_entity::Model) -> Self {
        ActivityBookingEntry {
            id: m.id,
            user_id: m.user_id,
            activity_id: m.activity_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub id: i64,
    pub name: String,
    pub date_id: i64,
    pub local_id: i64,
    pub capacity: i32,
    /// 剩余名额
    pub available_vacancies: i64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "ActivityBooking")]
    pub activity_booking: Vec<ActivityBookingEntry>,
}

impl ActivityResponse {
    pub fn new(m: activity_entity::Model, bookings: Vec<ActivityBookingEntry>) -> Self {
        let available_vacancies = (i64::from(m.capacity) - bookings.len() as i64).max(0);
        ActivityResponse {
            id: m.id,
            name: m.name,
            date_id: m.date_id,
            local_id: m.local_id,
            capacity: m.capacity,
            available_vacancies,
            starts_at: m.starts_at,
            ends_at: m.ends_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
            activity_booking: bookings,
        }
    }
}

/// 某日期下的场地及其活动
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLocalResponse {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "Activities")]
    pub activities: Vec<ActivityResponse>,
}

impl ActivityLocalResponse {
    pub fn new(m: activity_local_entity::Model, activities: Vec<ActivityResponse>) -> Self {
        ActivityLocalResponse {
            id: m.id,
            name: m.name,
            created_at: m.created_at,
            updated_at: m.updated_at,
            activities,
        }
    }
}

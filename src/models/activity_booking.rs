use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::activity_entity;
use crate::error::AppResult;
use crate::utils::validate_positive_id;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookActivityRequest {
    #[schema(example = 1, minimum = 1)]
    pub activity_id: i64,
}

impl BookActivityRequest {
    pub fn validate(&self) -> AppResult<i64> {
        validate_positive_id(self.activity_id, "activityId")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityBookingIdResponse {
    pub activity_booking_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookedActivity {
    pub id: i64,
    pub name: String,
    pub date_id: i64,
    pub capacity: i32,
    pub local_id: i64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl From<activity_entity::Model> for BookedActivity {
    fn from(m: activity_entity::Model) -> Self {
        BookedActivity {
            id: m.id,
            name: m.name,
            date_id: m.date_id,
            capacity: m.capacity,
            local_id: m.local_id,
            starts_at: m.starts_at,
            ends_at: m.ends_at,
        }
    }
}

/// 用户的一条活动预订
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserActivityBookingResponse {
    pub id: i64,
    #[serde(rename = "Activities")]
    pub activity: BookedActivity,
}

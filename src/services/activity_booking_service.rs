use crate::cache::{self, CacheKey, SharedCache};
use crate::entities::{activity_booking_entity as activity_bookings, activity_entity as activities};
use crate::error::{AppError, AppResult};
use crate::models::{BookedActivity, UserActivityBookingResponse};
use crate::services::eligibility::{TicketRequirement, check_eligibility};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct ActivityBookingService {
    pool: Arc<DatabaseConnection>,
    cache: SharedCache,
}

impl ActivityBookingService {
    pub fn new(pool: Arc<DatabaseConnection>, cache: SharedCache) -> Self {
        Self { pool, cache }
    }

    /// 预订活动，返回活动预订 ID
    ///
    /// 同一用户可以重复预订同一活动，每次都占用一个名额。
    pub async fn book_activity(&self, user_id: i64, activity_id: i64) -> AppResult<i64> {
        check_eligibility(self.pool.as_ref(), user_id, TicketRequirement::ACTIVITY)
            .await?
            .or_deny(|| AppError::CannotBookActivity)?;

        let txn = self.pool.begin().await?;

        let activity = activities::Entity::find_by_id(activity_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Activity not found".to_string()))?;

        let booked = activity_bookings::Entity::find()
            .filter(activity_bookings::Column::ActivityId.eq(activity.id))
            .count(&txn)
            .await?;
        if booked >= activity.capacity.max(0) as u64 {
            log::info!(
                "Activity {} is full ({booked}/{})",
                activity.id,
                activity.capacity
            );
            return Err(AppError::CannotBookActivity);
        }

        let now = Utc::now();
        let activity_booking = activity_bookings::ActiveModel {
            user_id: Set(user_id),
            activity_id: Set(activity.id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        log::info!(
            "User {user_id} booked activity {} (activity booking {})",
            activity.id,
            activity_booking.id
        );

        cache::invalidate(
            self.cache.as_ref(),
            &[
                CacheKey::ActivityDates,
                CacheKey::ActivitiesByDate(activity.date_id),
                CacheKey::UserActivityBookings(user_id),
            ],
        )
        .await;

        Ok(activity_booking.id)
    }

    pub async fn get_activity_bookings(
        &self,
        user_id: i64,
    ) -> AppResult<Vec<UserActivityBookingResponse>> {
        check_eligibility(self.pool.as_ref(), user_id, TicketRequirement::ACTIVITY)
            .await?
            .or_deny(|| AppError::Unauthorized("A valid in-person ticket is required".into()))?;

        let key = CacheKey::UserActivityBookings(user_id);
        if let Some(cached) = cache::get_json(self.cache.as_ref(), key).await {
            return Ok(cached);
        }

        let rows = activity_bookings::Entity::find()
            .filter(activity_bookings::Column::UserId.eq(user_id))
            .order_by_asc(activity_bookings::Column::Id)
            .find_also_related(activities::Entity)
            .all(self.pool.as_ref())
            .await?;

        let response: Vec<UserActivityBookingResponse> = rows
            .into_iter()
            .filter_map(|(booking, activity)| {
                activity.map(|activity| UserActivityBookingResponse {
                    id: booking.id,
                    activity: BookedActivity::from(activity),
                })
            })
            .collect();

        cache::set_json(self.cache.as_ref(), key, &response).await;

        Ok(response)
    }
}

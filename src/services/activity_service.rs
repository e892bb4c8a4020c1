use crate::cache::{self, CacheKey, SharedCache};
use crate::entities::{
    activity_booking_entity as activity_bookings, activity_date_entity as activity_dates,
    activity_entity as activities, activity_local_entity as activity_locals,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    ActivityBookingEntry, ActivityDateResponse, ActivityLocalResponse, ActivityResponse,
};
use crate::services::eligibility::{TicketRequirement, check_eligibility};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct ActivityService {
    pool: Arc<DatabaseConnection>,
    cache: SharedCache,
}

impl ActivityService {
    pub fn new(pool: Arc<DatabaseConnection>, cache: SharedCache) -> Self {
        Self { pool, cache }
    }

    pub async fn get_activity_dates(&self, user_id: i64) -> AppResult<Vec<ActivityDateResponse>> {
        self.validate_user_ticket(user_id).await?;

        if let Some(cached) = cache::get_json(self.cache.as_ref(), CacheKey::ActivityDates).await {
            return Ok(cached);
        }

        let dates: Vec<ActivityDateResponse> = activity_dates::Entity::find()
            .order_by_asc(activity_dates::Column::Date)
            .order_by_asc(activity_dates::Column::Id)
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(ActivityDateResponse::from)
            .collect();

        cache::set_json(self.cache.as_ref(), CacheKey::ActivityDates, &dates).await;

        Ok(dates)
    }

    /// 某日期下所有场地及其活动（场地没有活动时返回空列表）
    pub async fn get_activities_by_date(
        &self,
        date_id: i64,
        user_id: i64,
    ) -> AppResult<Vec<ActivityLocalResponse>> {
        self.validate_user_ticket(user_id).await?;

        let key = CacheKey::ActivitiesByDate(date_id);
        if let Some(cached) = cache::get_json(self.cache.as_ref(), key).await {
            return Ok(cached);
        }

        let locals = activity_locals::Entity::find()
            .order_by_asc(activity_locals::Column::Id)
            .all(self.pool.as_ref())
            .await?;
        if locals.is_empty() {
            return Ok(Vec::new());
        }

        let activity_list = activities::Entity::find()
            .filter(activities::Column::DateId.eq(date_id))
            .order_by_asc(activities::Column::StartsAt)
            .order_by_asc(activities::Column::Id)
            .all(self.pool.as_ref())
            .await?;

        let booking_list = if activity_list.is_empty() {
            Vec::new()
        } else {
            activity_bookings::Entity::find()
                .filter(
                    activity_bookings::Column::ActivityId
                        .is_in(activity_list.iter().map(|a| a.id)),
                )
                .order_by_asc(activity_bookings::Column::Id)
                .all(self.pool.as_ref())
                .await?
        };

        let response = group_by_local(locals, activity_list, booking_list);

        cache::set_json(self.cache.as_ref(), key, &response).await;

        Ok(response)
    }

    async fn validate_user_ticket(&self, user_id: i64) -> AppResult<()> {
        check_eligibility(self.pool.as_ref(), user_id, TicketRequirement::ACTIVITY)
            .await?
            .or_deny(|| AppError::Unauthorized("A valid in-person ticket is required".into()))?;
        Ok(())
    }
}

/// 把活动挂到场地下、把预订挂到活动下
pub fn group_by_local(
    locals: Vec<activity_locals::Model>,
    activity_list: Vec<activities::Model>,
    booking_list: Vec<activity_bookings::Model>,
) -> Vec<ActivityLocalResponse> {
    let mut bookings_by_activity: HashMap<i64, Vec<ActivityBookingEntry>> = HashMap::new();
    for booking in booking_list {
        bookings_by_activity
            .entry(booking.activity_id)
            .or_default()
            .push(ActivityBookingEntry::from(booking));
    }

    let mut activities_by_local: HashMap<i64, Vec<ActivityResponse>> = HashMap::new();
    for activity in activity_list {
        let local_id = activity.local_id;
        let bookings = bookings_by_activity.remove(&activity.id).unwrap_or_default();
        activities_by_local
            .entry(local_id)
            .or_default()
            .push(ActivityResponse::new(activity, bookings));
    }

    locals
        .into_iter()
        .map(|local| {
            let activities = activities_by_local.remove(&local.id).unwrap_or_default();
            ActivityLocalResponse::new(local, activities)
        })
        .collect()
}

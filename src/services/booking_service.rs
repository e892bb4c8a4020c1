use crate::cache::{self, CacheKey, SharedCache};
use crate::entities::{booking_entity as bookings, hotel_entity as hotels, room_entity as rooms};
use crate::error::{AppError, AppResult};
use crate::models::{BookingHotel, BookingResponse, BookingRoom};
use crate::services::eligibility::{TicketRequirement, check_eligibility};
use crate::services::hotel_service::room_booking_counts;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, SqlErr, TransactionTrait,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct BookingService {
    pool: Arc<DatabaseConnection>,
    cache: SharedCache,
}

impl BookingService {
    pub fn new(pool: Arc<DatabaseConnection>, cache: SharedCache) -> Self {
        Self { pool, cache }
    }

    /// 预订房间，返回预订 ID
    pub async fn post_booking(&self, user_id: i64, room_id: i64) -> AppResult<i64> {
        check_eligibility(self.pool.as_ref(), user_id, TicketRequirement::HOTEL)
            .await?
            .or_deny(|| AppError::CannotBooking)?;

        let existing = bookings::Entity::find()
            .filter(bookings::Column::UserId.eq(user_id))
            .one(self.pool.as_ref())
            .await?;
        if existing.is_some() {
            log::info!("User {user_id} already holds a booking");
            return Err(AppError::CannotBooking);
        }

        // 事务内锁定房间行，容量检查与插入对同一房间串行执行
        let txn = self.pool.begin().await?;

        let room = lock_room(&txn, room_id).await?;
        ensure_room_has_vacancy(&txn, &room).await?;

        let now = Utc::now();
        let booking = bookings::ActiveModel {
            user_id: Set(user_id),
            room_id: Set(room.id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(map_unique_violation)?;

        txn.commit().await?;

        log::info!(
            "User {user_id} booked room {} (booking {})",
            room.id,
            booking.id
        );

        cache::invalidate(
            self.cache.as_ref(),
            &[
                CacheKey::Hotels,
                CacheKey::HotelRooms(room.hotel_id),
                CacheKey::UserBooking(user_id),
            ],
        )
        .await;

        Ok(booking.id)
    }

    /// 更换房间，返回预订 ID
    pub async fn put_booking(
        &self,
        user_id: i64,
        booking_id: i64,
        room_id: i64,
    ) -> AppResult<i64> {
        let booking = bookings::Entity::find_by_id(booking_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or(AppError::CannotBooking)?;
        if booking.user_id != user_id {
            log::warn!("User {user_id} tried to change booking {booking_id} of another user");
            return Err(AppError::CannotBooking);
        }
        if booking.room_id == room_id {
            return Err(AppError::CannotBooking);
        }

        let txn = self.pool.begin().await?;

        let new_room = lock_room(&txn, room_id).await?;
        ensure_room_has_vacancy(&txn, &new_room).await?;

        let old_room = rooms::Entity::find_by_id(booking.room_id).one(&txn).await?;

        let old_room_id = booking.room_id;
        let mut active: bookings::ActiveModel = booking.into();
        active.room_id = Set(new_room.id);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        log::info!(
            "User {user_id} moved booking {} from room {old_room_id} to room {}",
            updated.id,
            new_room.id
        );

        let mut keys = vec![
            CacheKey::Hotels,
            CacheKey::HotelRooms(new_room.hotel_id),
            CacheKey::UserBooking(user_id),
        ];
        if let Some(old_room) = old_room
            && old_room.hotel_id != new_room.hotel_id
        {
            keys.push(CacheKey::HotelRooms(old_room.hotel_id));
        }
        cache::invalidate(self.cache.as_ref(), &keys).await;

        Ok(updated.id)
    }

    /// 查询用户的预订（含酒店与房间）
    pub async fn get_booking(&self, user_id: i64) -> AppResult<BookingResponse> {
        let key = CacheKey::UserBooking(user_id);
        if let Some(cached) = cache::get_json(self.cache.as_ref(), key).await {
            return Ok(cached);
        }

        let (booking, room) = bookings::Entity::find()
            .filter(bookings::Column::UserId.eq(user_id))
            .find_also_related(rooms::Entity)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        let room = room.ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

        let hotel = hotels::Entity::find_by_id(room.hotel_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Hotel not found".to_string()))?;

        let bookeds = room_booking_counts(self.pool.as_ref(), vec![room.id])
            .await?
            .get(&room.id)
            .copied()
            .unwrap_or(0);

        let response = BookingResponse {
            booking_id: booking.id,
            hotel: BookingHotel {
                id: hotel.id,
                name: hotel.name,
                image: hotel.image,
            },
            room: BookingRoom {
                id: room.id,
                name: room.name,
                capacity: room.capacity,
                hotel_id: room.hotel_id,
                bookeds,
            },
        };

        cache::set_json(self.cache.as_ref(), key, &response).await;

        Ok(response)
    }
}

/// SELECT ... FOR UPDATE
async fn lock_room<C: ConnectionTrait>(db: &C, room_id: i64) -> AppResult<rooms::Model> {
    rooms::Entity::find_by_id(room_id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Room not found".to_string()))
}

async fn ensure_room_has_vacancy<C: ConnectionTrait>(db: &C, room: &rooms::Model) -> AppResult<()> {
    let booked = bookings::Entity::find()
        .filter(bookings::Column::RoomId.eq(room.id))
        .count(db)
        .await?;

    if booked >= room.capacity.max(0) as u64 {
        log::info!("Room {} is full ({booked}/{})", room.id, room.capacity);
        return Err(AppError::CannotBooking);
    }
    Ok(())
}

/// 并发下第二个预订会撞上 user_id 唯一索引
fn map_unique_violation(err: DbErr) -> AppError {
    let sql_err = err.sql_err();
    booking_insert_error(err, sql_err)
}

fn booking_insert_error(err: DbErr, sql_err: Option<SqlErr>) -> AppError {
    match sql_err {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::CannotBooking,
        _ => AppError::DatabaseError(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Cache, MemoryCache};
    use crate::entities::{TicketStatus, enrollment_entity, ticket_entity, ticket_type_entity};
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn enrollment() -> enrollment_entity::Model {
        enrollment_entity::Model {
            id: 1,
            user_id: 1,
            name: "Attendee".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn paid_hotel_ticket() -> (ticket_entity::Model, ticket_type_entity::Model) {
        (
            ticket_entity::Model {
                id: 1,
                enrollment_id: 1,
                ticket_type_id: 2,
                status: TicketStatus::Paid,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            ticket_type_entity::Model {
                id: 2,
                name: "Presencial + Com Hotel".into(),
                price: 50000,
                is_remote: false,
                includes_hotel: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        )
    }

    fn room(id: i64, hotel_id: i64, capacity: i32) -> rooms::Model {
        rooms::Model {
            id,
            name: "101".into(),
            capacity,
            hotel_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn booking(id: i64, user_id: i64, room_id: i64) -> bookings::Model {
        bookings::Model {
            id,
            user_id,
            room_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    #[tokio::test]
    async fn test_post_booking_without_enrollment_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<enrollment_entity::Model>::new()])
            .into_connection();
        let service = BookingService::new(Arc::new(db), Arc::new(MemoryCache::new()));

        let result = service.post_booking(1, 1).await;
        assert!(matches!(result, Err(AppError::CannotBooking)));
    }

    #[tokio::test]
    async fn test_post_booking_when_user_already_booked_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[enrollment()]])
            .append_query_results([[paid_hotel_ticket()]])
            .append_query_results([[booking(7, 1, 3)]])
            .into_connection();
        let service = BookingService::new(Arc::new(db), Arc::new(MemoryCache::new()));

        let result = service.post_booking(1, 1).await;
        assert!(matches!(result, Err(AppError::CannotBooking)));
    }

    #[tokio::test]
    async fn test_post_booking_unknown_room_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[enrollment()]])
            .append_query_results([[paid_hotel_ticket()]])
            .append_query_results([Vec::<bookings::Model>::new()])
            .append_query_results([Vec::<rooms::Model>::new()])
            .into_connection();
        let service = BookingService::new(Arc::new(db), Arc::new(MemoryCache::new()));

        let result = service.post_booking(1, 42).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_post_booking_full_room_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[enrollment()]])
            .append_query_results([[paid_hotel_ticket()]])
            .append_query_results([Vec::<bookings::Model>::new()])
            .append_query_results([[room(1, 1, 1)]])
            .append_query_results([[count_row(1)]])
            .into_connection();
        let service = BookingService::new(Arc::new(db), Arc::new(MemoryCache::new()));

        let result = service.post_booking(1, 1).await;
        assert!(matches!(result, Err(AppError::CannotBooking)));
    }

    #[tokio::test]
    async fn test_post_booking_success_invalidates_cache() {
        let cache = Arc::new(MemoryCache::new());
        cache.set("hotels", "[]".into()).await.unwrap();
        cache.set("hotels:1:rooms", "{}".into()).await.unwrap();
        cache.set("hotels:2:rooms", "{}".into()).await.unwrap();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[enrollment()]])
            .append_query_results([[paid_hotel_ticket()]])
            .append_query_results([Vec::<bookings::Model>::new()])
            .append_query_results([[room(1, 1, 2)]])
            .append_query_results([[count_row(1)]])
            .append_query_results([[booking(10, 1, 1)]])
            .into_connection();
        let service = BookingService::new(Arc::new(db), cache.clone());

        let booking_id = service.post_booking(1, 1).await.unwrap();
        assert_eq!(booking_id, 10);
        assert!(!cache.contains("hotels").await);
        assert!(!cache.contains("hotels:1:rooms").await);
        // 其他酒店不受影响
        assert!(cache.contains("hotels:2:rooms").await);
    }

    #[tokio::test]
    async fn test_put_booking_of_another_user_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[booking(5, 2, 1)]])
            .into_connection();
        let service = BookingService::new(Arc::new(db), Arc::new(MemoryCache::new()));

        let result = service.put_booking(1, 5, 2).await;
        assert!(matches!(result, Err(AppError::CannotBooking)));
    }

    #[tokio::test]
    async fn test_put_booking_to_same_room_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[booking(5, 1, 3)]])
            .into_connection();
        let service = BookingService::new(Arc::new(db), Arc::new(MemoryCache::new()));

        let result = service.put_booking(1, 5, 3).await;
        assert!(matches!(result, Err(AppError::CannotBooking)));
    }

    #[tokio::test]
    async fn test_put_booking_to_full_room_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[booking(5, 1, 3)]])
            .append_query_results([[room(4, 2, 1)]])
            .append_query_results([[count_row(1)]])
            .into_connection();
        let service = BookingService::new(Arc::new(db), Arc::new(MemoryCache::new()));

        let result = service.put_booking(1, 5, 4).await;
        assert!(matches!(result, Err(AppError::CannotBooking)));
    }

    #[tokio::test]
    async fn test_put_booking_to_unknown_room_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[booking(5, 1, 3)]])
            .append_query_results([Vec::<rooms::Model>::new()])
            .into_connection();
        let service = BookingService::new(Arc::new(db), Arc::new(MemoryCache::new()));

        let result = service.put_booking(1, 5, 99).await;
        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg == "Room not found"));
    }

    #[tokio::test]
    async fn test_put_booking_moves_room_and_invalidates_both_hotels() {
        let cache = Arc::new(MemoryCache::new());
        cache.set("hotels", "[]".into()).await.unwrap();
        cache.set("hotels:1:rooms", "{}".into()).await.unwrap();
        cache.set("hotels:2:rooms", "{}".into()).await.unwrap();
        cache.set("users:1:booking", "{}".into()).await.unwrap();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[booking(5, 1, 3)]])
            .append_query_results([[room(4, 2, 3)]])
            .append_query_results([[count_row(0)]])
            .append_query_results([[room(3, 1, 1)]])
            .append_query_results([[booking(5, 1, 4)]])
            .into_connection();
        let service = BookingService::new(Arc::new(db), cache.clone());

        let booking_id = service.put_booking(1, 5, 4).await.unwrap();
        assert_eq!(booking_id, 5);
        for key in ["hotels", "hotels:1:rooms", "hotels:2:rooms", "users:1:booking"] {
            assert!(!cache.contains(key).await, "{key}");
        }
    }

    #[test]
    fn test_unique_violation_on_insert_is_forbidden() {
        let err = booking_insert_error(
            DbErr::Custom("duplicate key".into()),
            Some(SqlErr::UniqueConstraintViolation("bookings_user_id_key".into())),
        );
        assert!(matches!(err, AppError::CannotBooking));

        let err = booking_insert_error(DbErr::Custom("connection reset".into()), None);
        assert!(matches!(err, AppError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn test_get_booking_without_booking_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<(bookings::Model, rooms::Model)>::new()])
            .into_connection();
        let service = BookingService::new(Arc::new(db), Arc::new(MemoryCache::new()));

        let result = service.get_booking(1).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}

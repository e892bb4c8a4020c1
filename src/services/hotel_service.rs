use crate::cache::{self, CacheKey, SharedCache};
use crate::entities::{booking_entity as bookings, hotel_entity as hotels, room_entity as rooms};
use crate::error::{AppError, AppResult};
use crate::models::{HotelSummaryResponse, HotelWithRoomsResponse, RoomResponse};
use crate::services::eligibility::{TicketRequirement, check_eligibility};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

#[derive(Clone)]
pub struct HotelService {
    pool: Arc<DatabaseConnection>,
    cache: SharedCache,
}

impl HotelService {
    pub fn new(pool: Arc<DatabaseConnection>, cache: SharedCache) -> Self {
        Self { pool, cache }
    }

    /// 酒店列表（含房型标签与剩余床位）
    pub async fn get_hotels(&self, user_id: i64) -> AppResult<Vec<HotelSummaryResponse>> {
        self.validate_user_ticket(user_id).await?;

        if let Some(cached) = cache::get_json(self.cache.as_ref(), CacheKey::Hotels).await {
            return Ok(cached);
        }

        let hotel_list = hotels::Entity::find()
            .order_by_asc(hotels::Column::Id)
            .all(self.pool.as_ref())
            .await?;
        if hotel_list.is_empty() {
            return Ok(Vec::new());
        }

        let room_list = rooms::Entity::find()
            .filter(rooms::Column::HotelId.is_in(hotel_list.iter().map(|h| h.id)))
            .order_by_asc(rooms::Column::Id)
            .all(self.pool.as_ref())
            .await?;
        let counts =
            room_booking_counts(self.pool.as_ref(), room_list.iter().map(|r| r.id).collect()).await?;

        let summaries = summarize_hotels(hotel_list, &room_list, &counts);

        cache::set_json(self.cache.as_ref(), CacheKey::Hotels, &summaries).await;

        Ok(summaries)
    }

    /// 某酒店的房间列表（含每个房间的已预订数）
    pub async fn get_rooms_from_hotel(
        &self,
        hotel_id: i64,
        user_id: i64,
    ) -> AppResult<HotelWithRoomsResponse> {
        self.validate_user_ticket(user_id).await?;

        let key = CacheKey::HotelRooms(hotel_id);
        if let Some(cached) = cache::get_json(self.cache.as_ref(), key).await {
            return Ok(cached);
        }

        let hotel = hotels::Entity::find_by_id(hotel_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Hotel not found".to_string()))?;

        let room_list = rooms::Entity::find()
            .filter(rooms::Column::HotelId.eq(hotel_id))
            .order_by_asc(rooms::Column::Id)
            .all(self.pool.as_ref())
            .await?;
        let counts =
            room_booking_counts(self.pool.as_ref(), room_list.iter().map(|r| r.id).collect()).await?;

        let room_responses = room_list
            .into_iter()
            .map(|room| {
                let bookeds = counts.get(&room.id).copied().unwrap_or(0);
                RoomResponse::from_model(room, bookeds)
            })
            .collect();
        let response = HotelWithRoomsResponse::new(hotel, room_responses);

        cache::set_json(self.cache.as_ref(), key, &response).await;

        Ok(response)
    }

    async fn validate_user_ticket(&self, user_id: i64) -> AppResult<()> {
        check_eligibility(self.pool.as_ref(), user_id, TicketRequirement::HOTEL)
            .await?
            .or_deny(|| AppError::Unauthorized("A valid in-person ticket with hotel is required".into()))?;
        Ok(())
    }
}

#[derive(Debug, FromQueryResult)]
struct RoomBookingCount {
    room_id: i64,
    count: i64,
}

/// 按房间统计预订数
pub(crate) async fn room_booking_counts<C: ConnectionTrait>(
    db: &C,
    room_ids: Vec<i64>,
) -> AppResult<HashMap<i64, i64>> {
    if room_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = bookings::Entity::find()
        .select_only()
        .column(bookings::Column::RoomId)
        .column_as(bookings::Column::Id.count(), "count")
        .filter(bookings::Column::RoomId.is_in(room_ids))
        .group_by(bookings::Column::RoomId)
        .into_model::<RoomBookingCount>()
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|r| (r.room_id, r.count)).collect())
}

/// 房型标签：去重升序后 1/2/3 转为 Single/Double/Triple，最后两项用 " e " 连接
pub fn capacity_label(capacities: impl IntoIterator<Item = i32>) -> String {
    let names: Vec<String> = capacities
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|capacity| match capacity {
            1 => "Single".to_string(),
            2 => "Double".to_string(),
            3 => "Triple".to_string(),
            other => other.to_string(),
        })
        .collect();

    match names.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} e {}", rest.join(", "), last),
    }
}

pub fn summarize_hotels(
    hotel_list: Vec<hotels::Model>,
    room_list: &[rooms::Model],
    counts: &HashMap<i64, i64>,
) -> Vec<HotelSummaryResponse> {
    hotel_list
        .into_iter()
        .map(|hotel| {
            let hotel_rooms: Vec<&rooms::Model> =
                room_list.iter().filter(|r| r.hotel_id == hotel.id).collect();

            let available_vacancies = hotel_rooms
                .iter()
                .map(|r| i64::from(r.capacity) - counts.get(&r.id).copied().unwrap_or(0))
                .sum();

            HotelSummaryResponse {
                capacity: capacity_label(hotel_rooms.iter().map(|r| r.capacity)),
                available_vacancies,
                id: hotel.id,
                name: hotel.name,
                image: hotel.image,
                created_at: hotel.created_at,
                updated_at: hotel.updated_at,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::entities::{TicketStatus, enrollment_entity, ticket_entity, ticket_type_entity};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn hotel(id: i64) -> hotels::Model {
        hotels::Model {
            id,
            name: format!("Hotel {id}"),
            image: "https://example.com/hotel.jpg".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn room(id: i64, hotel_id: i64, capacity: i32) -> rooms::Model {
        rooms::Model {
            id,
            name: format!("{id}0{id}"),
            capacity,
            hotel_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn enrollment(user_id: i64) -> enrollment_entity::Model {
        enrollment_entity::Model {
            id: 1,
            user_id,
            name: "Attendee".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn ticket_with_type(
        status: TicketStatus,
        is_remote: bool,
        includes_hotel: bool,
    ) -> (ticket_entity::Model, ticket_type_entity::Model) {
        (
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
                name: "Presencial + Com Hotel".into(),
                price: 50000,
                is_remote,
                includes_hotel,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        )
    }

    #[test]
    fn test_capacity_label() {
        assert_eq!(capacity_label([2, 1, 1]), "Single e Double");
        assert_eq!(capacity_label([3, 1, 2]), "Single, Double e Triple");
        assert_eq!(capacity_label([2]), "Double");
        assert_eq!(capacity_label([4, 1]), "Single e 4");
        assert_eq!(capacity_label(Vec::<i32>::new()), "");
    }

    #[test]
    fn test_summarize_hotels() {
        let counts = HashMap::from([(1, 1)]);
        let summaries = summarize_hotels(
            vec![hotel(1), hotel(2)],
            &[room(1, 1, 1), room(2, 1, 2)],
            &counts,
        );

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].capacity, "Single e Double");
        assert_eq!(summaries[0].available_vacancies, 2);
        assert_eq!(summaries[1].capacity, "");
        assert_eq!(summaries[1].available_vacancies, 0);
    }

    #[tokio::test]
    async fn test_get_hotels_without_enrollment_is_unauthorized() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<enrollment_entity::Model>::new()])
            .into_connection();
        let service = HotelService::new(Arc::new(db), Arc::new(MemoryCache::new()));

        let result = service.get_hotels(1).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_get_hotels_with_unpaid_ticket_requires_payment() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[enrollment(1)]])
            .append_query_results([[ticket_with_type(TicketStatus::Reserved, false, true)]])
            .into_connection();
        let service = HotelService::new(Arc::new(db), Arc::new(MemoryCache::new()));

        let result = service.get_hotels(1).await;
        assert!(matches!(result, Err(AppError::PaymentRequired)));
    }

    #[tokio::test]
    async fn test_get_hotels_empty_list_is_not_an_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[enrollment(1)]])
            .append_query_results([[ticket_with_type(TicketStatus::Paid, false, true)]])
            .append_query_results([Vec::<hotels::Model>::new()])
            .into_connection();
        let service = HotelService::new(Arc::new(db), Arc::new(MemoryCache::new()));

        let result = service.get_hotels(1).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_get_hotels_served_from_cache() {
        let cache = Arc::new(MemoryCache::new());
        let summaries = summarize_hotels(vec![hotel(1)], &[room(1, 1, 3)], &HashMap::new());
        cache::set_json(cache.as_ref(), CacheKey::Hotels, &summaries).await;

        // 只有资格校验会访问数据库
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[enrollment(1)]])
            .append_query_results([[ticket_with_type(TicketStatus::Paid, false, true)]])
            .into_connection();
        let service = HotelService::new(Arc::new(db), cache);

        let result = service.get_hotels(1).await.unwrap();
        assert_eq!(result, summaries);
    }

    #[tokio::test]
    async fn test_get_rooms_from_missing_hotel_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[enrollment(1)]])
            .append_query_results([[ticket_with_type(TicketStatus::Paid, false, true)]])
            .append_query_results([Vec::<hotels::Model>::new()])
            .into_connection();
        let service = HotelService::new(Arc::new(db), Arc::new(MemoryCache::new()));

        let result = service.get_rooms_from_hotel(99, 1).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_rooms_from_hotel_counts_bookings_per_room() {
        let cache = Arc::new(MemoryCache::new());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[enrollment(1)]])
            .append_query_results([[ticket_with_type(TicketStatus::Paid, false, true)]])
            .append_query_results([[hotel(1)]])
            .append_query_results([[room(1, 1, 1), room(2, 1, 3), room(3, 1, 2)]])
            .append_query_results([[
                BTreeMap::from([
                    ("room_id", Value::BigInt(Some(1))),
                    ("count", Value::BigInt(Some(1))),
                ]),
                BTreeMap::from([
                    ("room_id", Value::BigInt(Some(2))),
                    ("count", Value::BigInt(Some(2))),
                ]),
            ]])
            .into_connection();
        let service = HotelService::new(Arc::new(db), cache.clone());

        let result = service.get_rooms_from_hotel(1, 1).await.unwrap();
        assert_eq!(result.id, 1);
        let bookeds: Vec<(i64, i64)> = result.rooms.iter().map(|r| (r.id, r.bookeds)).collect();
        assert_eq!(bookeds, vec![(1, 1), (2, 2), (3, 0)]);
        assert!(cache.contains("hotels:1:rooms").await);
    }
}

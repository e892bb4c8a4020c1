//! 旁路缓存 (advisory cache)
//!
//! 缓存只用于跳过重复的数据库读取，不是权威数据源：
//! - 读取未命中或缓存出错时一律回落到数据库
//! - 写操作后由业务方显式失效相关键，不使用 TTL
//! - 所有键名都由 [`CacheKey`] 生成

pub mod memory;
pub mod redis_cache;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;
use std::sync::Arc;

pub type CacheError = Box<dyn std::error::Error + Send + Sync>;

/// 键值存储协作者（字符串值，内容为 JSON）
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: String) -> Result<(), CacheError>;
    async fn delete(&self, keys: &[String]) -> Result<(), CacheError>;
}

pub type SharedCache = Arc<dyn Cache>;

/// 缓存键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// 酒店列表 (含容量标签与剩余床位)
    Hotels,
    /// 某酒店的房间列表
    HotelRooms(i64),
    /// 活动日期列表
    ActivityDates,
    /// 某日期下的场地与活动
    ActivitiesByDate(i64),
    /// 用户的酒店预订
    UserBooking(i64),
    /// 用户的活动预订列表
    UserActivityBookings(i64),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Hotels => write!(f, "hotels"),
            CacheKey::HotelRooms(hotel_id) => write!(f, "hotels:{hotel_id}:rooms"),
            CacheKey::ActivityDates => write!(f, "activity:dates"),
            CacheKey::ActivitiesByDate(date_id) => write!(f, "activity:dates:{date_id}"),
            CacheKey::UserBooking(user_id) => write!(f, "users:{user_id}:booking"),
            CacheKey::UserActivityBookings(user_id) => {
                write!(f, "users:{user_id}:activity-bookings")
            }
        }
    }
}

/// 读取并反序列化；未命中、连接失败或数据损坏都返回 None
pub async fn get_json<T: DeserializeOwned>(cache: &dyn Cache, key: CacheKey) -> Option<T> {
    let raw = match cache.get(&key.to_string()).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Cache read failed for {key}: {e}");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Discarding malformed cache entry {key}: {e}");
            None
        }
    }
}

/// 序列化并写入；失败只记录日志
pub async fn set_json<T: Serialize + ?Sized>(cache: &dyn Cache, key: CacheKey, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("Failed to serialize cache entry {key}: {e}");
            return;
        }
    };

    if let Err(e) = cache.set(&key.to_string(), raw).await {
        log::warn!("Cache write failed for {key}: {e}");
    }
}

/// 失效一组键；失败只记录日志
pub async fn invalidate(cache: &dyn Cache, keys: &[CacheKey]) {
    if keys.is_empty() {
        return;
    }
    let names: Vec<String> = keys.iter().map(ToString::to_string).collect();
    if let Err(e) = cache.delete(&names).await {
        log::warn!("Cache invalidation failed for {names:?}: {e}");
    }
}

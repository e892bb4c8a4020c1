//! 初始化演示数据：门票类型、酒店与房间、活动场地/日期/活动
//!
//! 已有数据的表会被跳过，可重复执行。

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set, TransactionTrait,
};

use event_booking_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    entities::{
        activity_date_entity, activity_entity, activity_local_entity, hotel_entity, room_entity,
        ticket_type_entity,
    },
};

struct TicketTypeSeed {
    name: &'static str,
    price: i32,
    is_remote: bool,
    includes_hotel: bool,
}

const TICKET_TYPES: [TicketTypeSeed; 3] = [
    TicketTypeSeed {
        name: "Online",
        price: 9000,
        is_remote: true,
        includes_hotel: false,
    },
    TicketTypeSeed {
        name: "Presencial + Com Hotel",
        price: 50000,
        is_remote: false,
        includes_hotel: true,
    },
    TicketTypeSeed {
        name: "Presencial + Sem Hotel",
        price: 20000,
        is_remote: false,
        includes_hotel: false,
    },
];

const HOTELS: [(&str, &str); 2] = [
    (
        "Driven Resort",
        "https://images.unsplash.com/photo-1566073771259-6a8506099945",
    ),
    (
        "Driven Palace",
        "https://images.unsplash.com/photo-1551882547-ff40c63fe5fa",
    ),
];

const LOCALS: [&str; 3] = ["Auditório Principal", "Auditório Lateral", "Sala de Workshop"];

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_toml().map_err(|e| anyhow::anyhow!("{e}"))?;
    let pool = create_pool(&config.database)
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    seed_ticket_types(&pool).await?;
    seed_hotels(&pool).await?;
    seed_activities(&pool).await?;

    log::info!("Seed finished");
    Ok(())
}

async fn seed_ticket_types(db: &DatabaseConnection) -> Result<()> {
    if ticket_type_entity::Entity::find().count(db).await? > 0 {
        log::info!("ticket_types already populated, skipping");
        return Ok(());
    }

    let now = Utc::now();
    for seed in &TICKET_TYPES {
        ticket_type_entity::ActiveModel {
            name: Set(seed.name.to_string()),
            price: Set(seed.price),
            is_remote: Set(seed.is_remote),
            includes_hotel: Set(seed.includes_hotel),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .with_context(|| format!("failed to insert ticket type {}", seed.name))?;
    }

    log::info!("Inserted {} ticket types", TICKET_TYPES.len());
    Ok(())
}

async fn seed_hotels(db: &DatabaseConnection) -> Result<()> {
    if hotel_entity::Entity::find().count(db).await? > 0 {
        log::info!("hotels already populated, skipping");
        return Ok(());
    }

    let now = Utc::now();
    let txn = db.begin().await?;
    for (name, image) in HOTELS {
        let hotel = hotel_entity::ActiveModel {
            name: Set(name.to_string()),
            image: Set(image.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // 每层 1~3 人间各一间
        for floor in 1..=3 {
            for capacity in 1..=3 {
                room_entity::ActiveModel {
                    name: Set(format!("{floor}0{capacity}")),
                    capacity: Set(capacity),
                    hotel_id: Set(hotel.id),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
            }
        }
    }
    txn.commit().await?;

    log::info!("Inserted {} hotels with rooms", HOTELS.len());
    Ok(())
}

async fn seed_activities(db: &DatabaseConnection) -> Result<()> {
    if activity_date_entity::Entity::find().count(db).await? > 0 {
        log::info!("activity tables already populated, skipping");
        return Ok(());
    }

    let now = Utc::now();
    let txn = db.begin().await?;

    let mut local_ids = Vec::with_capacity(LOCALS.len());
    for name in LOCALS {
        let local = activity_local_entity::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        local_ids.push(local.id);
    }

    for day in 0..3 {
        let date = event_day(day)?;
        let activity_date = activity_date_entity::ActiveModel {
            date: Set(date),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for (slot, local_id) in local_ids.iter().enumerate() {
            let starts_at = date + Duration::hours(9 + slot as i64);
            activity_entity::ActiveModel {
                name: Set(format!("Palestra {} - dia {}", slot + 1, day + 1)),
                date_id: Set(activity_date.id),
                local_id: Set(*local_id),
                capacity: Set(if slot == 2 { 1 } else { 27 }),
                starts_at: Set(starts_at),
                ends_at: Set(starts_at + Duration::hours(1)),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }
    txn.commit().await?;

    log::info!("Inserted {} activity locals and 3 event days", LOCALS.len());
    Ok(())
}

fn event_day(offset: i64) -> Result<DateTime<Utc>> {
    let first_day = Utc
        .with_ymd_and_hms(2024, 10, 22, 0, 0, 0)
        .single()
        .context("invalid event start date")?;
    Ok(first_day + Duration::days(offset))
}

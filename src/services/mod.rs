pub mod activity_booking_service;
pub mod activity_service;
pub mod auth_service;
pub mod booking_service;
pub mod eligibility;
pub mod hotel_service;

pub use activity_booking_service::*;
pub use activity_service::*;
pub use auth_service::*;
pub use booking_service::*;
pub use eligibility::*;
pub use hotel_service::*;

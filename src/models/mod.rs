pub mod activity;
pub mod activity_booking;
pub mod auth;
pub mod booking;
pub mod hotel;

pub use activity::*;
pub use activity_booking::*;
pub use auth::*;
pub use booking::*;
pub use hotel::*;

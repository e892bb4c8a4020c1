pub mod activities;
pub mod activity_bookings;
pub mod activity_dates;
pub mod activity_locals;
pub mod bookings;
pub mod enrollments;
pub mod hotels;
pub mod rooms;
pub mod sessions;
pub mod ticket_types;
pub mod tickets;
pub mod users;

pub use activities as activity_entity;
pub use activity_bookings as activity_booking_entity;
pub use activity_dates as activity_date_entity;
pub use activity_locals as activity_local_entity;
pub use bookings as booking_entity;
pub use enrollments as enrollment_entity;
pub use hotels as hotel_entity;
pub use rooms as room_entity;
pub use sessions as session_entity;
pub use ticket_types as ticket_type_entity;
pub use tickets as ticket_entity;
pub use tickets::TicketStatus;
pub use users as user_entity;

pub mod booking;
pub mod review;
pub mod turf;
pub mod user;

pub use booking::{Booking, BookingStatus, PaymentMethod};
pub use review::Review;
pub use turf::{Turf, TurfCategory};
pub use user::{User, UserRole};

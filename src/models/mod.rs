pub mod booking;
pub mod event;
pub mod payment;
pub mod user;

pub use booking::{Booking, BookingStatus, BookingWithEvent};
pub use event::{Event, EventImage, EventSummary};
pub use payment::{Payment, PaymentMethod};
pub use user::{User, UserRole};

pub mod booking;
pub mod movie;
pub mod seat;
pub mod user;

pub use booking::{Booking, CreatedBooking, NewBooking, Payment, PaymentProof, PaymentStatus};
pub use movie::{Movie, MovieDetail, Showtime, Theater};
pub use seat::{SeatId, SeatMap, SeatStatus};
pub use user::{Identity, Profile, ProfileUpdate, Registration, TokenPair};

pub mod account;
pub mod booking_flow;
pub mod bookings;
pub mod movies;

pub use account::{Account, Registered};
pub use booking_flow::{
    BookingFlowController, FlowState, Navigation, SeatToggle, SeatsRequest, SubmitFailure, SubmitOutcome,
    SubmitStage,
};
pub use bookings::BookingsController;
pub use movies::Catalog;

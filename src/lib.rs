pub mod config;
pub mod controllers;
pub mod error;
pub mod models;
pub mod services;
pub mod session;

pub use error::{ClientError, ClientResult};

use controllers::{Account, BookingFlowController, BookingsController, Catalog};
use services::api::ApiClient;
use session::Session;

// Общее состояние клиента: конфиг, сессия посетителя и HTTP-клиент.
// Контроллеры создаются отсюда и разделяют одну сессию.
#[derive(Clone)]
pub struct CinemaApp {
    pub config: crate::config::Config,
    pub session: Session,
    pub api: ApiClient,
}

impl CinemaApp {
    pub fn new(config: crate::config::Config) -> ClientResult<Self> {
        let session = Session::new();
        let api = ApiClient::from_config(&config.api, session.clone())?;
        Ok(Self { config, session, api })
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.api.clone())
    }

    pub fn account(&self) -> Account {
        Account::new(self.api.clone())
    }

    pub fn booking_flow(&self) -> BookingFlowController {
        BookingFlowController::new(self.api.clone())
    }

    pub fn bookings(&self) -> BookingsController {
        BookingsController::new(self.api.clone())
    }
}

//! Список броней и подтверждение оплаты персоналом.

use tracing::{info, warn};

use crate::{
    error::{ClientError, ClientResult},
    models::Booking,
    services::api::ApiClient,
};

pub struct BookingsController {
    api: ApiClient,
    bookings: Vec<Booking>,
}

impl BookingsController {
    pub fn new(api: ApiClient) -> Self {
        Self { api, bookings: Vec::new() }
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    /// Перезагружает список: посетителю свои брони, персоналу все.
    pub async fn refresh(&mut self) -> ClientResult<&[Booking]> {
        if !self.api.session().is_authenticated() {
            return Err(ClientError::validation("Please log in to view bookings"));
        }
        self.bookings = self.api.list_bookings().await?;
        info!("Loaded {} booking(s)", self.bookings.len());
        Ok(&self.bookings)
    }

    /// Подтверждает ожидающий платёж и перезагружает список с новым статусом.
    /// Только для персонала и только для брони в `PENDING_APPROVAL`.
    pub async fn approve(&mut self, payment_id: i64) -> ClientResult<&[Booking]> {
        if !self.api.session().is_privileged() {
            warn!("Approval of payment {} refused: not a staff session", payment_id);
            return Err(ClientError::Forbidden("Only staff can approve payments".to_string()));
        }

        // список мог устареть: новый платёж появляется только после перезагрузки
        if self.find_by_payment(payment_id).is_none() {
            self.refresh().await?;
        }

        let booking = self
            .find_by_payment(payment_id)
            .ok_or_else(|| ClientError::validation(format!("Payment {} is not in the bookings list", payment_id)))?;

        if !booking.awaiting_approval() {
            return Err(ClientError::validation(format!(
                "Booking {} is not awaiting approval (status {})",
                booking.id, booking.payment_status
            )));
        }

        self.api.approve_payment(payment_id).await?;
        self.refresh().await
    }

    fn find_by_payment(&self, payment_id: i64) -> Option<&Booking> {
        self.bookings
            .iter()
            .find(|b| b.payment.as_ref().map(|p| p.id) == Some(payment_id))
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use super::movie::Showtime;
use super::seat::{join_seats, split_seats, SeatId};

/// Статус оплаты брони. Словарь задаёт сервер; незнакомые значения
/// сохраняются как есть в `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    PendingApproval,
    Completed,
    Pending,
    Failed,
    Other(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::PendingApproval => "PENDING_APPROVAL",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "PENDING_APPROVAL" => PaymentStatus::PendingApproval,
            "COMPLETED" => PaymentStatus::Completed,
            "PENDING" => PaymentStatus::Pending,
            "FAILED" => PaymentStatus::Failed,
            _ => PaymentStatus::Other(raw),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub booking: i64,
    /// Где сервер сохранил загруженное подтверждение.
    #[serde(default)]
    pub payment_proof: Option<String>,
    #[serde(default)]
    pub approved: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub showtime: Showtime,
    pub num_tickets: u32,
    #[serde(rename = "booking_time")]
    pub booked_at: DateTime<Utc>,
    pub seats: String,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment: Option<Payment>,
}

impl Booking {
    pub fn seat_ids(&self) -> BTreeSet<SeatId> {
        split_seats(&self.seats).0
    }

    pub fn awaiting_approval(&self) -> bool {
        self.payment_status == PaymentStatus::PendingApproval
    }
}

/// Тело `POST /api/bookings/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBooking {
    pub showtime_id: i64,
    pub num_tickets: u32,
    pub seats: String,
}

impl NewBooking {
    /// Число билетов всегда равно числу мест.
    pub fn new(showtime_id: i64, seats: &BTreeSet<SeatId>) -> Self {
        NewBooking {
            showtime_id,
            num_tickets: seats.len() as u32,
            seats: join_seats(seats),
        }
    }
}

/// Часть ответа на создание брони, нужная потоку бронирования.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedBooking {
    pub id: i64,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BookedSeatsResponse {
    #[serde(default)]
    pub booked_seats: Vec<String>,
}

/// Подтверждение оплаты, сделанной вне системы.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentProof {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PaymentProof {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        PaymentProof {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("payment_proof")
            .to_string();
        let mime_type = mime_for_extension(path.extension().and_then(|e| e.to_str())).to_string();
        Ok(PaymentProof { file_name, mime_type, bytes })
    }
}

fn mime_for_extension(extension: Option<&str>) -> &'static str {
    match extension.map(|e| e.to_ascii_lowercase()).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_status_survives_a_round_trip() {
        let status: PaymentStatus = serde_json::from_value(json!("REFUNDED")).unwrap();
        assert_eq!(status, PaymentStatus::Other("REFUNDED".to_string()));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("REFUNDED"));

        let pending: PaymentStatus = serde_json::from_value(json!("PENDING_APPROVAL")).unwrap();
        assert_eq!(pending, PaymentStatus::PendingApproval);
    }

    #[test]
    fn new_booking_counts_and_joins_seats() {
        let seats: BTreeSet<SeatId> = ["C6".parse().unwrap(), "C5".parse().unwrap()].into();
        let body = serde_json::to_value(NewBooking::new(4, &seats)).unwrap();
        assert_eq!(body, json!({ "showtime_id": 4, "num_tickets": 2, "seats": "C5,C6" }));
    }

    #[test]
    fn mime_guess_falls_back_to_octet_stream() {
        assert_eq!(mime_for_extension(Some("JPG")), "image/jpeg");
        assert_eq!(mime_for_extension(Some("pdf")), "application/pdf");
        assert_eq!(mime_for_extension(None), "application/octet-stream");
    }
}

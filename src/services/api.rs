//! api.rs
//!
//! Типизированный HTTP-клиент для API кинотеатра.
//!
//! Ключевые моменты:
//! 1.  Каждый метод соответствует одному эндпоинту; ответы разбираются в модели из `models`.
//! 2.  Авторизованные вызовы берут bearer-токен из общей `Session`. Если сессии нет,
//!     запрос не отправляется вовсе (`ClientError::Unauthenticated`).
//! 3.  Ошибки классифицируются единообразно: сеть, статус сервера (с `detail` из тела),
//!     неожиданный тип ответа.

use reqwest::{header, multipart, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::{
    config::ApiConfig,
    error::{generic_status_message, ClientError, ClientResult},
    models::{
        booking::BookedSeatsResponse,
        seat::SeatId,
        user::Credentials,
        Booking, CreatedBooking, Movie, NewBooking, Payment, PaymentProof, Profile, ProfileUpdate,
        Registration, Showtime, TokenPair,
    },
    session::Session,
};

/// Клиент для API кинотеатра. Дёшево клонируется: HTTP-пул и сессия общие.
#[derive(Clone)]
pub struct ApiClient {
    /// Корень API без завершающего `/`, например `http://localhost:8000`.
    base_url: String,
    http_client: reqwest::Client,
    session: Session,
}

impl ApiClient {
    pub fn from_config(config: &ApiConfig, session: Session) -> ClientResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> ClientResult<RequestBuilder> {
        let token = self.session.token().ok_or(ClientError::Unauthenticated)?;
        Ok(request.bearer_auth(token))
    }

    /* ---------- catalog ---------- */

    // GET /api/movies/
    pub async fn list_movies(&self) -> ClientResult<Vec<Movie>> {
        let response = self.http_client.get(self.url("/api/movies/")).send().await?;
        read_json(response).await
    }

    // GET /api/movies/{id}/
    pub async fn movie(&self, movie_id: i64) -> ClientResult<Movie> {
        let response = self
            .http_client
            .get(self.url(&format!("/api/movies/{}/", movie_id)))
            .send()
            .await?;
        read_json(response).await
    }

    // GET /api/showtimes/ (фильтрация по фильму на стороне клиента)
    pub async fn list_showtimes(&self) -> ClientResult<Vec<Showtime>> {
        let response = self.http_client.get(self.url("/api/showtimes/")).send().await?;
        read_json(response).await
    }

    // GET /api/showtimes/{id}/booked-seats/
    pub async fn booked_seats(&self, showtime_id: i64) -> ClientResult<BTreeSet<SeatId>> {
        debug!("Fetching booked seats for showtime {}", showtime_id);
        let response = self
            .http_client
            .get(self.url(&format!("/api/showtimes/{}/booked-seats/", showtime_id)))
            .send()
            .await?;
        let body: BookedSeatsResponse = read_json(response).await?;

        let mut booked = BTreeSet::new();
        for raw in body.booked_seats {
            match raw.parse::<SeatId>() {
                Ok(seat) => {
                    booked.insert(seat);
                }
                Err(e) => warn!("Showtime {}: ignoring booked seat: {}", showtime_id, e),
            }
        }
        Ok(booked)
    }

    /* ---------- bookings & payments ---------- */

    // POST /api/bookings/
    pub async fn create_booking(&self, booking: &NewBooking) -> ClientResult<CreatedBooking> {
        info!(
            "Creating booking: showtime={}, seats={}",
            booking.showtime_id, booking.seats
        );
        let request = self.authorized(self.http_client.post(self.url("/api/bookings/")))?;
        let response = request.json(booking).send().await?;
        read_json(response).await
    }

    // POST /api/payments/ (multipart: booking + payment_proof)
    pub async fn upload_payment_proof(&self, booking_id: i64, proof: &PaymentProof) -> ClientResult<Payment> {
        info!(
            "Uploading payment proof for booking {}: {} ({} bytes)",
            booking_id,
            proof.file_name,
            proof.bytes.len()
        );
        let part = proof_part(proof, proof.bytes.clone())?;
        let form = multipart::Form::new()
            .text("booking", booking_id.to_string())
            .part("payment_proof", part);

        let request = self.authorized(self.http_client.post(self.url("/api/payments/")))?;
        let response = request.multipart(form).send().await?;

        // Тип содержимого проверяется до статуса: HTML-страница ошибки тоже неожиданный ответ.
        let status = response.status();
        let content_type = content_type(&response);
        if !is_json(&content_type) {
            let body = response.text().await.unwrap_or_default();
            warn!(
                "Payment upload returned non-JSON ({}, status {}): {}",
                content_type,
                status,
                body.chars().take(200).collect::<String>()
            );
            return Err(ClientError::UnexpectedResponse { status, content_type });
        }
        read_json(response).await
    }

    // POST /api/payments/{id}/approve/
    pub async fn approve_payment(&self, payment_id: i64) -> ClientResult<()> {
        info!("Approving payment {}", payment_id);
        let request = self.authorized(
            self.http_client
                .post(self.url(&format!("/api/payments/{}/approve/", payment_id))),
        )?;
        let response = request.send().await?;
        expect_success(response).await
    }

    // GET /api/bookings/
    pub async fn list_bookings(&self) -> ClientResult<Vec<Booking>> {
        let request = self.authorized(self.http_client.get(self.url("/api/bookings/")))?;
        let response = request.send().await?;
        read_json(response).await
    }

    /* ---------- accounts ---------- */

    // GET /api/users/me/
    pub async fn profile(&self) -> ClientResult<Profile> {
        let request = self.authorized(self.http_client.get(self.url("/api/users/me/")))?;
        read_json(request.send().await?).await
    }

    /// Как [`ApiClient::profile`], но с явным токеном: нужен сразу после
    /// получения токена, пока сессия ещё пуста.
    pub async fn profile_with_token(&self, token: &str) -> ClientResult<Profile> {
        let response = self
            .http_client
            .get(self.url("/api/users/me/"))
            .bearer_auth(token)
            .send()
            .await?;
        read_json(response).await
    }

    // PUT /api/users/me/
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<Profile> {
        let request = self.authorized(self.http_client.put(self.url("/api/users/me/")))?;
        read_json(request.json(update).send().await?).await
    }

    // POST /api/register/
    pub async fn register(&self, registration: &Registration) -> ClientResult<Profile> {
        info!("Registering account {}", registration.username);
        let response = self
            .http_client
            .post(self.url("/api/register/"))
            .json(registration)
            .send()
            .await?;
        read_json(response).await
    }

    // POST /api/token/
    pub async fn obtain_token(&self, username: &str, password: &str) -> ClientResult<TokenPair> {
        let response = self
            .http_client
            .post(self.url("/api/token/"))
            .json(&Credentials { username, password })
            .send()
            .await?;
        read_json(response).await
    }
}

/* ---------- helpers ---------- */

fn content_type(response: &Response) -> String {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string()
}

fn is_json(content_type: &str) -> bool {
    content_type.contains("application/json")
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(server_error(response).await);
    }

    let content_type = content_type(&response);
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        warn!("Could not decode response body (status {}): {}", status, e);
        ClientError::UnexpectedResponse { status, content_type }
    })
}

async fn expect_success(response: Response) -> ClientResult<()> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(server_error(response).await)
    }
}

async fn server_error(response: Response) -> ClientError {
    let status = response.status();
    let json_body = is_json(&content_type(&response));
    let body = response.text().await.unwrap_or_default();
    let message = if json_body {
        serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|value| error_message(&value))
    } else {
        None
    };
    ClientError::Server {
        status,
        message: message.unwrap_or_else(|| generic_status_message(status)),
    }
}

/// Проверяет MIME-тип доказательства оплаты локально, ничего не отправляя.
pub fn check_proof_type(proof: &PaymentProof) -> ClientResult<()> {
    proof_part(proof, Vec::new()).map(|_| ())
}

fn proof_part(proof: &PaymentProof, bytes: Vec<u8>) -> ClientResult<multipart::Part> {
    multipart::Part::bytes(bytes)
        .file_name(proof.file_name.clone())
        .mime_str(&proof.mime_type)
        .map_err(|_| ClientError::validation(format!("Unsupported file type: {}", proof.mime_type)))
}

/// Сначала `detail`, потом `error`, потом первая ошибка поля из тела валидации,
/// например `{"email": ["This email is already in use."]}`.
pub(crate) fn error_message(body: &Value) -> Option<String> {
    if let Some(detail) = body.get("detail").and_then(Value::as_str) {
        return Some(detail.to_string());
    }
    if let Some(error) = body.get("error").and_then(Value::as_str) {
        return Some(error.to_string());
    }
    body.as_object()?.values().find_map(|value| match value {
        Value::Array(items) => items.iter().find_map(Value::as_str).map(str::to_string),
        Value::String(s) => Some(s.clone()),
        _ => None,
    })
}

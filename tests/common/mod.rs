#![allow(dead_code)]

use cinema_client::{
    config::Config,
    models::{Identity, PaymentProof},
    services::api::ApiClient,
    session::Session,
    CinemaApp,
};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TOKEN: &str = "visitor-token";

pub fn visitor() -> Identity {
    Identity { username: "abebe".to_string(), privileged: false }
}

pub fn staff() -> Identity {
    Identity { username: "admin".to_string(), privileged: true }
}

pub fn app_for(server: &MockServer) -> CinemaApp {
    CinemaApp::new(Config::for_base_url(server.uri())).expect("client builds")
}

pub fn api_with(server: &MockServer, session: Session) -> ApiClient {
    ApiClient::from_config(&Config::for_base_url(server.uri()).api, session).expect("client builds")
}

pub fn proof() -> PaymentProof {
    PaymentProof::new("receipt.png", "image/png", b"\x89PNG fake receipt".to_vec())
}

pub fn movie_json(id: i64) -> Value {
    json!({
        "id": id,
        "title": "Adwa",
        "genre": "History",
        "duration": 120,
        "poster": "https://posters.test/adwa.jpg",
        "release_date": "2024-03-02"
    })
}

pub fn showtime_json(id: i64, movie_id: i64) -> Value {
    json!({
        "id": id,
        "movie": movie_json(movie_id),
        "theater": { "id": 1, "name": "Hall 1", "capacity": 50 },
        "date_time": "2024-05-01T18:30:00Z"
    })
}

pub fn booking_json(id: i64, seats: &str, status: &str, payment_id: Option<i64>) -> Value {
    let payment = payment_id.map(|pid| {
        json!({ "id": pid, "booking": id, "payment_proof": "/media/proofs/receipt.png" })
    });
    json!({
        "id": id,
        "showtime": showtime_json(1, 7),
        "num_tickets": seats.split(',').count(),
        "booking_time": "2024-04-30T10:00:00Z",
        "seats": seats,
        "payment_status": status,
        "transaction_id": "",
        "payment": payment
    })
}

pub fn profile_json(username: &str, is_staff: bool) -> Value {
    json!({
        "id": 5,
        "username": username,
        "email": format!("{}@cinema.test", username),
        "phone": "+251911000000",
        "is_staff": is_staff,
        "bookings": []
    })
}

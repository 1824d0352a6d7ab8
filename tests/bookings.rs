mod common;

use cinema_client::{
    controllers::BookingsController,
    models::PaymentStatus,
    session::Session,
    ClientError,
};
use common::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn refresh_requires_a_session() {
    let server = MockServer::start().await;
    let mut bookings = BookingsController::new(api_with(&server, Session::new()));

    let err = bookings.refresh().await.unwrap_err();
    assert_eq!(err.to_string(), "Please log in to view bookings");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn refresh_lists_bookings_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bookings/"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            booking_json(1, "A1,A2", "PENDING_APPROVAL", Some(10)),
            booking_json(2, "B4", "COMPLETED", Some(11)),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut bookings = BookingsController::new(api_with(&server, Session::with_token(TOKEN, visitor())));
    let list = bookings.refresh().await.unwrap();
    assert_eq!(list.len(), 2);
    assert!(list[0].awaiting_approval());
    assert_eq!(list[0].seat_ids().len(), 2);
    assert_eq!(list[1].payment_status, PaymentStatus::Completed);
}

#[tokio::test]
async fn approval_is_refused_for_visitors_without_calls() {
    let server = MockServer::start().await;
    let mut bookings = BookingsController::new(api_with(&server, Session::with_token(TOKEN, visitor())));

    let err = bookings.approve(10).await.unwrap_err();
    assert!(matches!(err, ClientError::Forbidden(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn approval_refreshes_the_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bookings/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            booking_json(1, "A1,A2", "PENDING_APPROVAL", Some(10)),
        ])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/payments/10/approve/"))
        .and(header("authorization", "Bearer staff-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "approved" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut bookings = BookingsController::new(api_with(&server, Session::with_token("staff-token", staff())));
    bookings.refresh().await.unwrap();

    Mock::given(method("GET"))
        .and(path("/api/bookings/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            booking_json(1, "A1,A2", "COMPLETED", Some(10)),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let list = bookings.approve(10).await.unwrap();
    assert_eq!(list[0].payment_status, PaymentStatus::Completed);
}

#[tokio::test]
async fn approval_only_for_pending_bookings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bookings/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            booking_json(3, "C1", "COMPLETED", Some(30)),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/payments/30/approve/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut bookings = BookingsController::new(api_with(&server, Session::with_token("staff-token", staff())));
    let err = bookings.approve(30).await.unwrap_err();
    assert_eq!(err.to_string(), "Booking 3 is not awaiting approval (status COMPLETED)");

    let err = bookings.approve(99).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn approval_reloads_a_stale_list_for_unknown_payment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bookings/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            booking_json(1, "A1", "COMPLETED", Some(10)),
        ])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    let mut bookings = BookingsController::new(api_with(&server, Session::with_token("staff-token", staff())));
    bookings.refresh().await.unwrap();
    assert_eq!(bookings.bookings().len(), 1);

    // на сервере появилась новая бронь, локальный список о ней не знает
    Mock::given(method("GET"))
        .and(path("/api/bookings/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            booking_json(1, "A1", "COMPLETED", Some(10)),
            booking_json(2, "B2", "PENDING_APPROVAL", Some(20)),
        ])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/payments/20/approve/"))
        .and(header("authorization", "Bearer staff-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "approved" })))
        .expect(1)
        .mount(&server)
        .await;

    let list = bookings.approve(20).await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}

//! booking_flow.rs
//!
//! Машина состояний бронирования со стороны посетителя:
//! выбор сеанса → выбор мест → отправка брони с подтверждением оплаты → результат.
//!
//! ```text
//! Idle ──choose showtime──▶ ShowtimeChosen ──toggle seat──▶ SeatsSelected
//!                                                              │ submit
//!                                                              ▼
//!                                   Failed ◀──── error ──── Submitting ──ok──▶ Submitted
//!                                     │ retry
//!                                     └──────────────▶ SeatsSelected
//! ```
//!
//! Инварианты:
//! - выбранные места никогда не пересекаются с забронированными;
//! - загрузка подтверждения оплаты идёт только после ответа на создание брони
//!   и всегда несёт его `id`;
//! - ответ по занятым местам для устаревшего выбора сеанса отбрасывается.

use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::{
    error::{ClientError, ClientResult},
    models::{seat::join_seats, NewBooking, Payment, PaymentProof, SeatId},
    services::api::{check_proof_type, ApiClient},
};

pub const SUCCESS_MESSAGE: &str = "Booking successful, pending approval.";
pub const SEAT_AVAILABILITY_ERROR: &str = "Error loading seat availability.";
pub const SELECTION_REQUIRED: &str = "Please select a showtime and at least one seat.";
pub const PROOF_REQUIRED: &str = "Please attach a payment proof.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    ShowtimeChosen,
    SeatsSelected,
    Submitting,
    Submitted,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatToggle {
    Selected,
    Deselected,
    /// Место занято или поток сейчас не принимает изменений.
    Ignored,
}

/// Какой из двух вызовов отправки упал.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStage {
    Booking,
    PaymentProof,
}

impl SubmitStage {
    fn label(self) -> &'static str {
        match self {
            SubmitStage::Booking => "Booking failed",
            SubmitStage::PaymentProof => "Payment proof upload failed",
        }
    }
}

/// Куда отправить посетителя дальше.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Login,
    Bookings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitFailure {
    pub stage: SubmitStage,
    pub message: String,
    /// Бронь создана, но подтверждение оплаты не загрузилось.
    /// Такая бронь остаётся на сервере как есть.
    pub orphaned_booking: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Нет активной сессии, ничего не отправлено.
    LoginRequired,
    /// Не выполнено предусловие, ничего не отправлено.
    Rejected(String),
    Submitted {
        booking_id: i64,
        payment: Payment,
        message: String,
    },
    Failed(SubmitFailure),
}

impl SubmitOutcome {
    pub fn message(&self) -> &str {
        match self {
            SubmitOutcome::LoginRequired => "Please log in to book tickets.",
            SubmitOutcome::Rejected(message) => message,
            SubmitOutcome::Submitted { message, .. } => message,
            SubmitOutcome::Failed(failure) => &failure.message,
        }
    }

    pub fn redirect(&self) -> Option<Navigation> {
        match self {
            SubmitOutcome::LoginRequired => Some(Navigation::Login),
            SubmitOutcome::Submitted { .. } => Some(Navigation::Bookings),
            _ => None,
        }
    }
}

/// Билет на одну загрузку занятых мест. Учитывается только билет
/// последнего выбора сеанса.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatsRequest {
    pub showtime_id: i64,
    generation: u64,
}

pub struct BookingFlowController {
    api: ApiClient,
    state: FlowState,
    showtime_id: Option<i64>,
    booked: BTreeSet<SeatId>,
    selected: BTreeSet<SeatId>,
    proof: Option<PaymentProof>,
    generation: u64,
    attached: bool,
    notice: Option<String>,
}

impl BookingFlowController {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: FlowState::Idle,
            showtime_id: None,
            booked: BTreeSet::new(),
            selected: BTreeSet::new(),
            proof: None,
            generation: 0,
            attached: true,
            notice: None,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn showtime_id(&self) -> Option<i64> {
        self.showtime_id
    }

    pub fn booked_seats(&self) -> &BTreeSet<SeatId> {
        &self.booked
    }

    pub fn selected_seats(&self) -> &BTreeSet<SeatId> {
        &self.selected
    }

    pub fn proof(&self) -> Option<&PaymentProof> {
        self.proof.as_ref()
    }

    /// Последнее сообщение для посетителя (ошибка или успех).
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Можно ли сейчас нажимать «забронировать».
    pub fn can_submit(&self) -> bool {
        !matches!(self.state, FlowState::Submitting | FlowState::Submitted) && !self.selected.is_empty()
    }

    /* ---------- showtime ---------- */

    /// Запоминает выбор сеанса и возвращает билет на загрузку его занятых мест.
    /// Смена сеанса сбрасывает выбранные места. Первый выбор их сохраняет,
    /// а ответ по занятым местам потом отфильтрует.
    pub fn choose_showtime(&mut self, showtime_id: i64) -> SeatsRequest {
        if let Some(current) = self.showtime_id {
            if current != showtime_id {
                self.selected.clear();
            }
        }
        self.showtime_id = Some(showtime_id);
        self.booked.clear();
        self.notice = None;
        self.generation += 1;
        self.settle_selection_state();

        info!("Showtime {} chosen", showtime_id);
        SeatsRequest {
            showtime_id,
            generation: self.generation,
        }
    }

    /// Применяет ответ по занятым местам. `false`, если ответ отброшен:
    /// сеанс уже выбран заново или экран закрыт.
    pub fn apply_booked_seats(&mut self, request: SeatsRequest, result: ClientResult<BTreeSet<SeatId>>) -> bool {
        if !self.attached || request.generation != self.generation {
            debug!(
                "Discarding stale booked seats for showtime {} (generation {}, current {})",
                request.showtime_id, request.generation, self.generation
            );
            return false;
        }

        match result {
            Ok(booked) => {
                let before = self.selected.len();
                self.selected.retain(|seat| !booked.contains(seat));
                if self.selected.len() != before {
                    info!(
                        "Showtime {}: {} selected seat(s) already booked, removed",
                        request.showtime_id,
                        before - self.selected.len()
                    );
                }
                self.booked = booked;
            }
            Err(e) => {
                warn!("Failed to load booked seats for showtime {}: {}", request.showtime_id, e);
                self.booked.clear();
                self.notice = Some(SEAT_AVAILABILITY_ERROR.to_string());
            }
        }
        self.settle_selection_state();
        true
    }

    /// Выбирает сеанс и дожидается его занятых мест.
    pub async fn select_showtime(&mut self, showtime_id: i64) -> bool {
        let request = self.choose_showtime(showtime_id);
        let result = self.api.booked_seats(showtime_id).await;
        self.apply_booked_seats(request, result)
    }

    /* ---------- seats & proof ---------- */

    pub fn toggle_seat(&mut self, seat: SeatId) -> SeatToggle {
        if matches!(self.state, FlowState::Submitting | FlowState::Submitted) {
            return SeatToggle::Ignored;
        }
        if self.booked.contains(&seat) {
            debug!("Seat {} is booked, toggle ignored", seat);
            return SeatToggle::Ignored;
        }

        let toggle = if self.selected.remove(&seat) {
            SeatToggle::Deselected
        } else {
            self.selected.insert(seat);
            SeatToggle::Selected
        };
        self.settle_selection_state();
        toggle
    }

    /// Выбирает сразу несколько мест, например из командной строки.
    /// Повторы схлопываются, уже выбранные места не снимаются.
    /// Если часть мест занята, возвращает ошибку с их списком.
    pub fn pick_seats(&mut self, seats: impl IntoIterator<Item = SeatId>) -> ClientResult<()> {
        let wanted: BTreeSet<SeatId> = seats.into_iter().collect();
        let mut unavailable = BTreeSet::new();
        for seat in wanted {
            if self.selected.contains(&seat) {
                continue;
            }
            if self.toggle_seat(seat) == SeatToggle::Ignored {
                unavailable.insert(seat);
            }
        }
        if !unavailable.is_empty() {
            return Err(ClientError::validation(format!(
                "Seats not available: {}",
                join_seats(&unavailable)
            )));
        }
        Ok(())
    }

    pub fn attach_proof(&mut self, proof: PaymentProof) {
        self.proof = Some(proof);
    }

    pub fn clear_proof(&mut self) {
        self.proof = None;
    }

    /// Выход из `Failed` для новой попытки; места и подтверждение остаются.
    pub fn retry(&mut self) -> bool {
        if self.state != FlowState::Failed {
            return false;
        }
        self.notice = None;
        self.settle_selection_state();
        true
    }

    /// Экран закрыт: ответы по занятым местам с этого момента отбрасываются.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /* ---------- submission ---------- */

    pub async fn submit(&mut self) -> SubmitOutcome {
        match self.state {
            FlowState::Submitting => {
                return SubmitOutcome::Rejected("A booking is already being submitted.".to_string());
            }
            FlowState::Submitted => {
                return SubmitOutcome::Rejected("This booking has already been submitted.".to_string());
            }
            _ => {}
        }

        if !self.api.session().is_authenticated() {
            info!("Submission without a session, redirecting to login");
            return SubmitOutcome::LoginRequired;
        }

        let showtime_id = match self.showtime_id {
            Some(id) if !self.selected.is_empty() => id,
            _ => return self.reject(SELECTION_REQUIRED),
        };
        let proof = match self.proof.clone() {
            Some(proof) => proof,
            None => return self.reject(PROOF_REQUIRED),
        };
        // MIME-тип проверяем до шага 1, иначе бронь останется без подтверждения
        if let Err(e) = check_proof_type(&proof) {
            return self.reject(&e.to_string());
        }

        let resume_state = self.state;
        self.state = FlowState::Submitting;
        self.notice = None;

        // Шаг 1: создаём бронь
        let booking = NewBooking::new(showtime_id, &self.selected);
        let created = match self.api.create_booking(&booking).await {
            Ok(created) => created,
            Err(ClientError::Unauthenticated) => {
                self.state = resume_state;
                return SubmitOutcome::LoginRequired;
            }
            Err(e) => return self.fail(SubmitStage::Booking, e, None),
        };
        info!("Booking {} created, uploading payment proof", created.id);

        // Шаг 2: загружаем подтверждение оплаты с id брони из шага 1
        match self.api.upload_payment_proof(created.id, &proof).await {
            Ok(payment) => {
                info!("Payment {} recorded for booking {}", payment.id, created.id);
                self.state = FlowState::Submitted;
                self.notice = Some(SUCCESS_MESSAGE.to_string());
                SubmitOutcome::Submitted {
                    booking_id: created.id,
                    payment,
                    message: SUCCESS_MESSAGE.to_string(),
                }
            }
            Err(e) => {
                warn!(
                    "Booking {} exists without a payment proof; it is not cancelled",
                    created.id
                );
                self.fail(SubmitStage::PaymentProof, e, Some(created.id))
            }
        }
    }

    fn reject(&mut self, message: &str) -> SubmitOutcome {
        self.notice = Some(message.to_string());
        SubmitOutcome::Rejected(message.to_string())
    }

    fn fail(&mut self, stage: SubmitStage, error: ClientError, orphaned_booking: Option<i64>) -> SubmitOutcome {
        let message = failure_message(stage, &error);
        warn!("{:?} step failed: {}", stage, error);
        self.state = FlowState::Failed;
        self.notice = Some(message.clone());
        SubmitOutcome::Failed(SubmitFailure {
            stage,
            message,
            orphaned_booking,
        })
    }

    fn settle_selection_state(&mut self) {
        if matches!(self.state, FlowState::Submitting | FlowState::Submitted) {
            return;
        }
        self.state = match (self.showtime_id, self.selected.is_empty()) {
            (None, _) => FlowState::Idle,
            (Some(_), true) => FlowState::ShowtimeChosen,
            (Some(_), false) => FlowState::SeatsSelected,
        };
    }
}

/// "Booking failed: <detail сервера>" или просто название шага,
/// если сервер не дал ничего полезного.
pub fn failure_message(stage: SubmitStage, error: &ClientError) -> String {
    match error {
        ClientError::Server { .. } => match error.server_detail() {
            Some(detail) => format!("{}: {}", stage.label(), detail),
            None => stage.label().to_string(),
        },
        ClientError::UnexpectedResponse { status, .. } => format!(
            "{}: server returned a non-JSON response (status {})",
            stage.label(),
            status.as_u16()
        ),
        ClientError::Validation(message) => format!("{}: {}", stage.label(), message),
        _ => stage.label().to_string(),
    }
}

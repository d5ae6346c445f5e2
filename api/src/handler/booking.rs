use crate::{
    extractor::AuthorizedUser,
    model::booking::{BookingResponse, BookingsResponse, CreateBookingRequest},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use kernel::model::booking::{
    event::{CancelBooking, CreateBooking},
    ledger, Booking,
};
use kernel::model::id::BookingId;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

// イベントは主キーでもイベントコードでも指定できる
pub async fn book_event(
    user: AuthorizedUser,
    Path(event_ref): Path<String>,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<BookingResponse>)> {
    // 座席数はストレージに触れる前に検査する
    ledger::validate_seat_count(req.seats)?;

    let event = registry
        .event_repository()
        .find_by_id_or_code(&event_ref)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("event ({event_ref}) not found")))?;

    // 容量・一人あたり上限の検査と予約行の挿入は
    // リポジトリ側の単一トランザクションで行われる
    let create_booking = CreateBooking::new(event.event_id, user.id(), req.seats, Utc::now());
    let booking_id = registry
        .booking_repository()
        .create(create_booking)
        .await?;

    let booking = registry
        .booking_repository()
        .find_by_id(booking_id)
        .await?;

    // 確認メールはコミット後の後追い処理。
    // 失敗してもログに残すだけで、予約の成否には影響させない
    spawn_confirmation_mail(&registry, &user, &booking);

    Ok((StatusCode::CREATED, Json(booking.into())))
}

pub async fn cancel_booking(
    user: AuthorizedUser,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    // メール文面のためにキャンセル前の予約内容を控えておく
    let booking = registry.booking_repository().find_by_id(booking_id).await?;

    let cancel_booking = CancelBooking::new(booking_id, user.id(), Utc::now());
    registry.booking_repository().cancel(cancel_booking).await?;

    spawn_cancellation_mail(&registry, &user, &booking);

    Ok(StatusCode::OK)
}

pub async fn show_my_bookings(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingsResponse>> {
    registry
        .booking_repository()
        .find_all_by_user_id(user.id())
        .await
        .map(BookingsResponse::from)
        .map(Json)
}

fn spawn_confirmation_mail(registry: &AppRegistry, user: &AuthorizedUser, booking: &Booking) {
    let notifier = registry.booking_notifier();
    let to = user.user.email.clone();
    let subject = format!("Booking Confirmation - {}", booking.event.title);
    let body = format!(
        "Hello {},\n\nYou have successfully booked {} seat(s) for:\n\
         Event: {}\nDate: {}\nLocation: {}\n\nWe look forward to seeing you there!",
        user.user.user_name,
        booking.seats,
        booking.event.title,
        booking.event.event_date.format("%d %b %Y"),
        booking.event.location.as_ref(),
    );
    tokio::spawn(async move {
        if let Err(e) = notifier.send(&to, &subject, &body).await {
            tracing::warn!(
                error.message = %e,
                %to,
                "booking saved, but confirmation mail failed"
            );
        }
    });
}

fn spawn_cancellation_mail(registry: &AppRegistry, user: &AuthorizedUser, booking: &Booking) {
    let notifier = registry.booking_notifier();
    let to = user.user.email.clone();
    let subject = format!("Booking Cancelled - {}", booking.event.title);
    let body = format!(
        "Your booking for {} has been cancelled.\nScheduled Date: {}\n\n\
         We're sorry to see you go. Feel free to book again anytime.",
        booking.event.title,
        booking.event.event_date.format("%d %b %Y"),
    );
    tokio::spawn(async move {
        if let Err(e) = notifier.send(&to, &subject, &body).await {
            tracing::warn!(
                error.message = %e,
                %to,
                "booking cancelled, but cancellation mail failed"
            );
        }
    });
}

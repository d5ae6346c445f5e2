use axum::{
    routing::{delete, get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::booking::{book_event, cancel_booking, show_my_bookings};

pub fn build_booking_routers() -> Router<AppRegistry> {
    let bookings_routers = Router::new()
        .route("/:booking_id", delete(cancel_booking))
        .route("/me", get(show_my_bookings));

    Router::new()
        .nest("/bookings", bookings_routers)
        // イベントIDまたはイベントコードで予約する
        .route("/events/:event_id/bookings", post(book_event))
}

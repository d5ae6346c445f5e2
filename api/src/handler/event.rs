use crate::{
    extractor::AuthorizedUser,
    model::event::{
        CreateEventRequest, EventResponse, EventsResponse, ListEventsQuery, UpdateEventRequest,
        UpdateEventRequestWithIds,
    },
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{event::event::DeleteEvent, id::EventId};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn register_event(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<EventResponse>)> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }
    req.validate()?;

    let event_id = registry.event_repository().create(req.into()).await?;
    let event = registry
        .event_repository()
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound("created event not found".into()))?;

    Ok((StatusCode::CREATED, Json(event.into())))
}

pub async fn show_event_list(
    Query(query): Query<ListEventsQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventsResponse>> {
    registry
        .event_repository()
        .find_all(query.into())
        .await
        .map(EventsResponse::from)
        .map(Json)
}

pub async fn show_event(
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventResponse>> {
    registry
        .event_repository()
        .find_by_id(event_id)
        .await
        .and_then(|e| match e {
            Some(e) => Ok(Json(e.into())),
            None => Err(AppError::EntityNotFound("not found".into())),
        })
}

pub async fn update_event(
    user: AuthorizedUser,
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateEventRequest>,
) -> AppResult<StatusCode> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }
    req.validate()?;

    let update_event = UpdateEventRequestWithIds::new(event_id, user.id(), req);
    registry
        .event_repository()
        .update(update_event.into())
        .await
        .map(|_| StatusCode::OK)
}

pub async fn delete_event(
    user: AuthorizedUser,
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }

    let delete_event = DeleteEvent {
        event_id,
        requested_user: user.id(),
    };
    registry
        .event_repository()
        .delete(delete_event)
        .await
        .map(|_| StatusCode::OK)
}

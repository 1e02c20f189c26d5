use log::{debug, error};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::path::FullPath;
use warp::reply::Response;
use warp::{reply, Filter, Rejection, Reply};

use super::status::{render_html, StatusBoard};
use super::types::ApiError;
use crate::admission::AdmissionLimiter;
use crate::error_handling::types::WakeError;
use crate::lifecycle::WakeRouter;

/// Rejection raised when the admission limiter has no token left.
#[derive(Debug)]
pub struct RateLimited;

impl warp::reject::Reject for RateLimited {}

/// Admits a request or rejects it with [`RateLimited`] before any handler runs.
pub fn with_admission(
    limiter: Arc<AdmissionLimiter>,
) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::any()
        .and_then(move || {
            let limiter = limiter.clone();
            async move {
                if limiter.try_acquire() {
                    Ok(())
                } else {
                    Err(warp::reject::custom(RateLimited))
                }
            }
        })
        .untuple_one()
}

/// /health, any method
pub fn health_route(
    board: Arc<StatusBoard>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path("health")
        .and(warp::path::end())
        .and_then(move || {
            let board = board.clone();
            async move { Ok::<_, Rejection>(health(&board).await) }
        })
}

/// /containers, any method
pub fn containers_route(
    board: Arc<StatusBoard>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path("containers")
        .and(warp::path::end())
        .and_then(move || {
            let board = board.clone();
            async move { Ok::<_, Rejection>(containers_html(&board).await) }
        })
}

/// /api/containers, any method
pub fn api_containers_route(
    board: Arc<StatusBoard>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("api" / "containers")
        .and_then(move || {
            let board = board.clone();
            async move { Ok::<_, Rejection>(containers_json(&board).await) }
        })
}

/// Any other request: wake the container behind the Host header and send the client back.
pub fn wake_route(
    router: Arc<WakeRouter>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let query = warp::query::raw()
        .or(warp::any().map(String::new))
        .unify();

    warp::header::optional::<String>("host")
        .and(warp::path::full())
        .and(query)
        .and_then(move |host: Option<String>, path: FullPath, query: String| {
            let router = router.clone();
            async move {
                let location = if query.is_empty() {
                    path.as_str().to_string()
                } else {
                    format!("{}?{}", path.as_str(), query)
                };
                Ok::<_, Rejection>(wake(&router, host.as_deref(), location).await)
            }
        })
}

pub async fn health(board: &StatusBoard) -> Response {
    match board.ping().await {
        Ok(()) => reply::with_status("Healthy", StatusCode::OK).into_response(),
        Err(e) => {
            error!("Health check failed: {}", e);
            reply::with_status(
                "Failed to connect to Docker API",
                StatusCode::INTERNAL_SERVER_ERROR,
            )
            .into_response()
        }
    }
}

pub async fn containers_html(board: &StatusBoard) -> Response {
    match board.snapshot().await {
        Ok(list) => reply::html(render_html(&list)).into_response(),
        Err(e) => {
            error!("Failed to fetch containers: {}", e);
            reply::with_status(
                "Failed to fetch containers",
                StatusCode::INTERNAL_SERVER_ERROR,
            )
            .into_response()
        }
    }
}

pub async fn containers_json(board: &StatusBoard) -> Response {
    match board.snapshot().await {
        Ok(list) => reply::with_status(reply::json(&list), StatusCode::OK).into_response(),
        Err(e) => {
            error!("Failed to fetch containers: {}", e);
            reply::with_status(
                reply::json(&ApiError {
                    message: "Failed to fetch containers".to_string(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
            .into_response()
        }
    }
}

/// Runs a wake and turns the outcome into a 303 back to `location` or an error status.
pub async fn wake(router: &WakeRouter, host: Option<&str>, location: String) -> Response {
    let result = match host {
        Some(host) => router.wake(host).await,
        None => Err(WakeError::MissingHost),
    };
    match result {
        Ok(outcome) => {
            debug!(
                "Redirecting to {} after waking {} (started: {})",
                location, outcome.container_name, outcome.started
            );
            reply::with_status(
                reply::with_header(reply::reply(), "location", location),
                StatusCode::SEE_OTHER,
            )
            .into_response()
        }
        Err(e) => wake_error_response(&e),
    }
}

pub fn wake_error_response(err: &WakeError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!("{}", err);
    } else {
        debug!("{}", err);
    }
    reply::with_status(err.to_string(), status).into_response()
}

/// Maps admission rejections to 429, leaves every other rejection to warp.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Rejection> {
    if err.find::<RateLimited>().is_some() {
        return Ok(wake_error_response(&WakeError::RateLimited));
    }
    Err(err)
}

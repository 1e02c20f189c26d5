use log::info;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

use super::routes::*;
use super::status::StatusBoard;
use crate::admission::AdmissionLimiter;
use crate::error_handling::types::WebError;
use crate::lifecycle::WakeRouter;

/// HTTP surface: wake trigger, status listing and liveness probe.
///
/// Every request first takes a token from the admission limiter; rejected requests get a
/// 429 and touch neither the runtime nor the ledger.
pub struct WebServer {
    board: Arc<StatusBoard>,
    router: Arc<WakeRouter>,
    limiter: Arc<AdmissionLimiter>,
}

impl WebServer {
    pub fn new(
        board: Arc<StatusBoard>,
        router: Arc<WakeRouter>,
        limiter: Arc<AdmissionLimiter>,
    ) -> Self {
        Self {
            board,
            router,
            limiter,
        }
    }

    /// Composed filter tree, exposed for embedding and tests.
    pub fn routes(&self) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
        let board = self.board.clone();
        let routes = health_route(board.clone())
            .or(containers_route(board.clone()))
            .unify()
            .or(api_containers_route(board))
            .unify()
            .or(wake_route(self.router.clone()))
            .unify();

        with_admission(self.limiter.clone())
            .and(routes)
            .recover(handle_rejection)
    }

    /// Serves until the returned future is dropped.
    pub async fn start(&self, bind_address: &str, port: u16) -> Result<(), WebError> {
        let ip: IpAddr = bind_address
            .parse()
            .map_err(|e| WebError::BindFailed(format!("{}: {}", bind_address, e)))?;
        let addr = SocketAddr::new(ip, port);

        info!("Server started at: {}", addr);
        warp::serve(self.routes()).run(addr).await;
        Ok(())
    }
}

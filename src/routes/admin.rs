use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use log::{info, Logger};
use tokio::sync::mpsc;
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, Reply};
use warp::Filter;

use super::response::SuccessResponse;
use crate::environment::Environment;

pub fn make_healthz_route(
    _environment: Environment,
) -> impl warp::Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
    warp::path("healthz").and(warp::get()).map(move || {
        json(&SuccessResponse::Healthz {
            revision: info::REVISION,
            timestamp: info::BUILD_TIMESTAMP,
            version: info::VERSION,
        })
    })
}

type TerminationFuture<'a> = BoxFuture<'a, ()>;

pub type TerminationFunctionWrapper<'a> =
    Arc<dyn Fn() -> TerminationFuture<'a> + Send + Sync + 'a>;

/// Resolves once shutdown has been requested; every listener awaits a clone.
pub type ShutdownSignal = Shared<BoxFuture<'static, ()>>;

/// Pairs the function [`make_termination_route`] calls with the signal
/// it fires. The signal also fires on ctrl-c.
pub fn shutdown_channel(logger: Arc<Logger>) -> (TerminationFunctionWrapper<'static>, ShutdownSignal) {
    let (sender, mut receiver) = mpsc::channel::<()>(1);

    let terminate: TerminationFunctionWrapper<'static> = Arc::new(move || {
        let sender = sender.clone();

        async move {
            // the receiver only goes away once shutdown has begun
            let _ = sender.send(()).await;
        }
        .boxed()
    });

    let signal = async move {
        tokio::select! {
            _ = receiver.recv() => {},
            _ = tokio::signal::ctrl_c() => {
                info!(logger, "Interrupted");
            }
        }
    }
    .boxed()
    .shared();

    (terminate, signal)
}

pub fn make_termination_route<'a>(
    environment: Environment,
    terminate: TerminationFunctionWrapper<'a>,
) -> impl warp::Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone + 'a {
    let handler = move || -> BoxFuture<Result<StatusCode, std::convert::Infallible>> {
        let terminate = terminate.clone();
        let logger = environment.logger.clone();

        async move {
            info!(logger, "Termination requested");
            terminate().await;
            Ok(StatusCode::NO_CONTENT)
        }
        .boxed()
    };

    warp::path("terminate").and(warp::post()).and_then(handler)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::db::mock::MemoryDb;
    use crate::environment::Config;
    use crate::urls::Urls;

    fn environment() -> Environment {
        let urls = Urls::new("http://localhost:8080", "api").expect("build URLs");

        Environment::new(
            Arc::new(log::discard()),
            Arc::new(MemoryDb::new()),
            Arc::new(urls),
            Config::default(),
        )
    }

    #[tokio::test]
    async fn terminate_fires_the_shutdown_signal() {
        let env = environment();
        let (terminate, signal) = shutdown_channel(env.logger.clone());
        let route = make_termination_route(env, terminate);

        let response = warp::test::request()
            .method("POST")
            .path("/terminate")
            .reply(&route)
            .await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        tokio::time::timeout(Duration::from_secs(1), signal.clone())
            .await
            .expect("signal fires");
        tokio::time::timeout(Duration::from_secs(1), signal)
            .await
            .expect("every clone sees it");
    }

    #[tokio::test]
    async fn signal_waits_for_a_request() {
        let (_terminate, signal) = shutdown_channel(Arc::new(log::discard()));

        assert!(tokio::time::timeout(Duration::from_millis(50), signal).await.is_err());
    }
}

//! Per-user rate limiting for order placement
//!
//! Requests are keyed by the authenticated subject, so the limiter has to sit
//! inside the authentication gate. A caller over budget gets `429 Too Many
//! Requests` from the governor layer.

use crate::auth::AuthContext;
use axum::http::Request;
use axum::routing::MethodRouter;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::KeyExtractor, GovernorError, GovernorLayer,
};
use uuid::Uuid;

const HOUR: Duration = Duration::from_secs(60 * 60);

/// Keys a request by the subject id in its [`AuthContext`]
#[derive(Debug, Clone, Copy)]
pub struct SubjectKeyExtractor;

impl KeyExtractor for SubjectKeyExtractor {
    type Key = Uuid;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        req.extensions()
            .get::<AuthContext>()
            .map(|ctx| ctx.id)
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Allow each subject `per_hour` calls to `route`, replenished evenly over
/// the hour. `0` leaves the route unlimited.
pub fn limit_per_hour<S>(route: MethodRouter<S>, per_hour: u32) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    if per_hour == 0 {
        return route;
    }

    let config = GovernorConfigBuilder::default()
        .period(HOUR / per_hour)
        .burst_size(per_hour)
        .key_extractor(SubjectKeyExtractor)
        .finish();

    match config {
        Some(config) => route.layer(GovernorLayer {
            config: Arc::new(config),
        }),
        None => {
            tracing::warn!(per_hour, "invalid rate limit, leaving route unlimited");
            route
        }
    }
}

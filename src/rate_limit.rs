use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::clock::{Clock, DefaultClock};
use governor::middleware::StateInformationMiddleware;
use governor::state::keyed::DashMapStateStore;
use governor::Quota;
use tracing::debug;

use crate::models::error::AppError;

type KeyedLimiter<C> = governor::RateLimiter<IpAddr, DashMapStateStore<IpAddr>, C, StateInformationMiddleware>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Throttled { retry_after: Duration },
}

/// Per-client-IP request quota, replenished over one minute.
pub struct RateLimiter<C: Clock = DefaultClock> {
    limit: u32,
    clock: C,
    clients: KeyedLimiter<C>,
}

impl RateLimiter {
    pub fn per_minute(limit: u32) -> Self {
        Self::with_clock(limit, DefaultClock::default())
    }
}

impl<C: Clock> RateLimiter<C> {
    pub fn with_clock(limit: u32, clock: C) -> Self {
        let limit = NonZeroU32::new(limit).unwrap_or(NonZeroU32::MIN);
        let clients = governor::RateLimiter::dashmap_with_clock(Quota::per_minute(limit), &clock)
            .with_middleware::<StateInformationMiddleware>();
        Self {
            limit: limit.get(),
            clock,
            clients,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Counts one request against `client`.
    pub fn check(&self, client: IpAddr) -> Decision {
        match self.clients.check_key(&client) {
            Ok(snapshot) => Decision::Allowed {
                remaining: snapshot.remaining_burst_capacity(),
            },
            Err(not_until) => Decision::Throttled {
                retry_after: not_until.wait_time_from(self.clock.now()),
            },
        }
    }

    /// Forgets clients whose quota has fully replenished.
    pub fn purge(&self) {
        self.clients.retain_recent();
        self.clients.shrink_to_fit();
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.clients.len()
    }
}

fn whole_seconds(wait: Duration) -> u64 {
    wait.as_secs() + u64::from(wait.subsec_nanos() > 0)
}

pub async fn rate_limit<B>(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<B>,
    next: Next<B>,
) -> Response {
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    let mut response = match limiter.check(client) {
        Decision::Allowed { remaining } => {
            let mut response = next.run(req).await;
            response
                .headers_mut()
                .insert("ratelimit-remaining", HeaderValue::from(remaining));
            response
        }
        Decision::Throttled { retry_after } => {
            debug!("Rate limit exceeded for {}", client);
            let seconds = HeaderValue::from(whole_seconds(retry_after));
            let mut response = AppError::RateLimited.into_response();
            let headers = response.headers_mut();
            headers.insert("ratelimit-remaining", HeaderValue::from(0u32));
            headers.insert("ratelimit-reset", seconds.clone());
            headers.insert(header::RETRY_AFTER, seconds);
            response
        }
    };
    response
        .headers_mut()
        .insert("ratelimit-limit", HeaderValue::from(limiter.limit()));
    response
}

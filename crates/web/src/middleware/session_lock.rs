//! Per-session request serialization.
//!
//! tower-sessions loads a session when a request starts and saves it when the
//! response is produced. Two overlapping requests from one browser (a double
//! click on "add to cart") would both load the same cart and the second save
//! would drop the first change. This middleware sits outside the session layer
//! and holds a per-session mutex for the whole load, handle, save cycle.
//!
//! Requests without a session cookie have nothing to race on and pass through.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, Weak};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::COOKIE},
    middleware::Next,
    response::Response,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tower_sessions::cookie::Cookie;

use super::session::SESSION_COOKIE_NAME;
use crate::state::AppState;

/// Registry size at which dead entries are first pruned.
const MIN_PRUNE_AT: usize = 1024;

/// Async mutexes keyed by session cookie value.
///
/// The registry only holds weak handles. A mutex lives while a request holds
/// or waits on it, so an entry can never be dropped out from under a holder
/// and the next request for that session always finds the same mutex.
#[derive(Clone, Default)]
pub struct SessionLocks {
    registry: Arc<std::sync::Mutex<Registry>>,
}

struct Registry {
    locks: HashMap<String, Weak<Mutex<()>>>,
    prune_at: usize,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            locks: HashMap::new(),
            prune_at: MIN_PRUNE_AT,
        }
    }
}

impl Registry {
    fn lock_for(&mut self, session_id: &str) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.get(session_id).and_then(Weak::upgrade) {
            return lock;
        }

        // Amortized cleanup of sessions nobody is using.
        if self.locks.len() >= self.prune_at {
            self.locks.retain(|_, lock| lock.strong_count() > 0);
            self.prune_at = (self.locks.len() * 2).max(MIN_PRUNE_AT);
        }

        let lock = Arc::new(Mutex::new(()));
        self.locks
            .insert(session_id.to_owned(), Arc::downgrade(&lock));
        lock
    }
}

impl SessionLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `session_id`.
    pub async fn acquire(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .lock_for(session_id);
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .locks
            .len()
    }
}

/// Serialize requests that carry the same session cookie.
pub async fn session_lock_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if path.starts_with("/static/") || path.starts_with("/health") {
        return next.run(request).await;
    }

    let Some(session_id) = session_cookie(request.headers()) else {
        return next.run(request).await;
    };

    let _guard = state.session_locks().acquire(&session_id).await;
    next.run(request).await
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_cookie_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; cafe_session=abc123; lang=en"),
        );
        assert_eq!(session_cookie(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_session_cookie_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_cookie(&headers), None);
        assert_eq!(session_cookie(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_same_session_is_exclusive() {
        let locks = SessionLocks::new();
        let guard = locks.acquire("abc").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.acquire("abc").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        // A different session is not blocked.
        let _other = locks.acquire("xyz").await;

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_held_lock_survives_many_other_sessions() {
        let locks = SessionLocks::new();
        let guard = locks.acquire("abc").await;

        // Enough short-lived sessions to force several prunes.
        for n in 0..(MIN_PRUNE_AT * 4) {
            drop(locks.acquire(&format!("other-{n}")).await);
        }

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.acquire("abc").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_released_sessions_are_pruned() {
        let locks = SessionLocks::new();
        for n in 0..(MIN_PRUNE_AT * 3) {
            drop(locks.acquire(&format!("s-{n}")).await);
        }
        assert!(locks.tracked() <= MIN_PRUNE_AT);
    }
}

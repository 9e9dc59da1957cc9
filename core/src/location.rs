//! Bridge from a delegate-style location platform to awaitable calls.
//!
//! # Design
//! The platform exposes fire-and-forget triggers and reports results later
//! through delegate callbacks. `LocationBridge` keeps one `PendingSlot` per
//! track (permission, location). Starting a request fills the slot with a
//! `oneshot` sender and awaits the receiver; the next matching callback takes
//! the sender out and resolves it. Because the sender is moved out under the
//! slot lock, a continuation is resolved at most once, and a callback with an
//! empty slot does nothing.
//!
//! A second request while the slot is full fails with
//! `LocationError::AlreadyRequesting` and leaves the first caller untouched.
//! The slot lock is never held while calling into the platform, so callbacks
//! may arrive synchronously from inside a trigger or from any thread.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::LocationError;

/// Latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Location authorization as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    AuthorizedWhenInUse,
    AuthorizedAlways,
}

impl AuthorizationStatus {
    pub fn is_authorized(&self) -> bool {
        matches!(
            self,
            AuthorizationStatus::AuthorizedWhenInUse | AuthorizationStatus::AuthorizedAlways
        )
    }

    pub fn is_determined(&self) -> bool {
        !matches!(self, AuthorizationStatus::NotDetermined)
    }
}

/// The platform location manager. Results come back through the bridge's
/// `did_*` methods.
pub trait LocationPlatform: Send + Sync {
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Show the when-in-use prompt. Answered by `did_change_authorization`.
    fn request_when_in_use_authorization(&self);

    /// Ask for a single location fix. Answered by `did_update_locations` or
    /// `did_fail`.
    fn request_location(&self);
}

/// Single-slot holder for one awaiting caller.
struct PendingSlot<T> {
    track: &'static str,
    sender: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> PendingSlot<T> {
    fn new(track: &'static str) -> Self {
        Self {
            track,
            sender: Mutex::new(None),
        }
    }

    /// Idle -> Pending. Fails if a live caller already occupies the slot.
    fn begin(&self) -> Result<oneshot::Receiver<T>, LocationError> {
        let mut slot = self.sender.lock();
        if let Some(existing) = slot.as_ref() {
            if !existing.is_closed() {
                return Err(LocationError::AlreadyRequesting(self.track));
            }
            // The previous caller stopped waiting; its slot is free again.
            debug!(track = self.track, "reclaiming slot of abandoned request");
        }
        let (tx, rx) = oneshot::channel();
        *slot = Some(tx);
        Ok(rx)
    }

    /// Pending -> Idle. Returns `false` when nothing was pending.
    fn resolve(&self, value: T) -> bool {
        let sender = self.sender.lock().take();
        match sender {
            Some(sender) => {
                if sender.send(value).is_err() {
                    debug!(track = self.track, "caller stopped waiting before resolution");
                }
                true
            }
            None => {
                debug!(track = self.track, "callback with no pending request ignored");
                false
            }
        }
    }

    fn is_pending(&self) -> bool {
        self.sender
            .lock()
            .as_ref()
            .is_some_and(|sender| !sender.is_closed())
    }
}

/// Awaitable front for a `LocationPlatform`.
///
/// The host routes the platform's delegate callbacks to `did_change_authorization`,
/// `did_update_locations` and `did_fail`.
pub struct LocationBridge {
    platform: Arc<dyn LocationPlatform>,
    permission: PendingSlot<AuthorizationStatus>,
    location: PendingSlot<Result<Coordinate, LocationError>>,
}

impl LocationBridge {
    pub fn new(platform: Arc<dyn LocationPlatform>) -> Self {
        Self {
            platform,
            permission: PendingSlot::new("permission"),
            location: PendingSlot::new("location"),
        }
    }

    pub fn authorization_status(&self) -> AuthorizationStatus {
        self.platform.authorization_status()
    }

    /// Ask for when-in-use authorization and wait for the answer.
    ///
    /// Returns immediately when the user has already decided.
    ///
    /// # Errors
    /// - `LocationError::AlreadyRequesting` if a prompt is already pending
    /// - `LocationError::Abandoned` if the bridge is dropped first
    pub async fn request_permission(&self) -> Result<AuthorizationStatus, LocationError> {
        let current = self.platform.authorization_status();
        if current.is_determined() {
            return Ok(current);
        }

        let receiver = self.permission.begin()?;
        debug!("requesting location authorization");
        self.platform.request_when_in_use_authorization();
        receiver
            .await
            .map_err(|_| LocationError::Abandoned(self.permission.track))
    }

    /// Ask for one location fix and wait for it.
    ///
    /// # Errors
    /// - `LocationError::AlreadyRequesting` if a fix is already pending
    /// - `LocationError::NoLocationFound` if the platform reports an empty batch
    /// - `LocationError::Platform` if the platform reports a failure
    /// - `LocationError::Abandoned` if the bridge is dropped first
    pub async fn request_location(&self) -> Result<Coordinate, LocationError> {
        let receiver = self.location.begin()?;
        debug!("requesting current location");
        self.platform.request_location();
        receiver
            .await
            .map_err(|_| LocationError::Abandoned(self.location.track))?
    }

    pub fn is_requesting_permission(&self) -> bool {
        self.permission.is_pending()
    }

    pub fn is_requesting_location(&self) -> bool {
        self.location.is_pending()
    }

    // -----------------------------------------------------------------------
    // Delegate callbacks
    // -----------------------------------------------------------------------

    /// Authorization changed. `NotDetermined` is not an answer and keeps the
    /// prompt pending.
    pub fn did_change_authorization(&self, status: AuthorizationStatus) {
        if !status.is_determined() {
            return;
        }
        self.permission.resolve(status);
    }

    /// New fixes arrived; the most recent one answers the pending request.
    pub fn did_update_locations(&self, locations: &[Coordinate]) {
        let outcome = locations
            .last()
            .copied()
            .ok_or(LocationError::NoLocationFound);
        self.location.resolve(outcome);
    }

    pub fn did_fail(&self, error: impl Into<String>) {
        self.location
            .resolve(Err(LocationError::Platform(error.into())));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{OnceLock, Weak};

    use tokio::sync::Notify;

    use super::*;

    /// Platform that records triggers and lets the test play the delegate.
    struct FakePlatform {
        status: Mutex<AuthorizationStatus>,
        prompts: AtomicUsize,
        fixes: AtomicUsize,
        triggered: Notify,
    }

    impl FakePlatform {
        fn new(status: AuthorizationStatus) -> Arc<Self> {
            Arc::new(Self {
                status: Mutex::new(status),
                prompts: AtomicUsize::new(0),
                fixes: AtomicUsize::new(0),
                triggered: Notify::new(),
            })
        }
    }

    impl LocationPlatform for FakePlatform {
        fn authorization_status(&self) -> AuthorizationStatus {
            *self.status.lock()
        }

        fn request_when_in_use_authorization(&self) {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            self.triggered.notify_one();
        }

        fn request_location(&self) {
            self.fixes.fetch_add(1, Ordering::SeqCst);
            self.triggered.notify_one();
        }
    }

    fn bridge(status: AuthorizationStatus) -> (Arc<LocationBridge>, Arc<FakePlatform>) {
        let platform = FakePlatform::new(status);
        (Arc::new(LocationBridge::new(platform.clone())), platform)
    }

    const HERE: Coordinate = Coordinate {
        latitude: 37.3349,
        longitude: -122.009,
    };

    #[tokio::test]
    async fn location_resolves_with_last_fix() {
        let (bridge, platform) = bridge(AuthorizationStatus::AuthorizedWhenInUse);
        let task = tokio::spawn({
            let bridge = bridge.clone();
            async move { bridge.request_location().await }
        });

        platform.triggered.notified().await;
        assert!(bridge.is_requesting_location());
        bridge.did_update_locations(&[Coordinate::new(0.0, 0.0), HERE]);

        assert_eq!(task.await.unwrap().unwrap(), HERE);
        assert!(!bridge.is_requesting_location());
        assert_eq!(platform.fixes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_batch_is_no_location_found() {
        let (bridge, platform) = bridge(AuthorizationStatus::AuthorizedWhenInUse);
        let task = tokio::spawn({
            let bridge = bridge.clone();
            async move { bridge.request_location().await }
        });

        platform.triggered.notified().await;
        bridge.did_update_locations(&[]);

        assert!(matches!(
            task.await.unwrap(),
            Err(LocationError::NoLocationFound)
        ));
    }

    #[tokio::test]
    async fn second_request_fails_fast_and_first_still_resolves() {
        let (bridge, platform) = bridge(AuthorizationStatus::AuthorizedWhenInUse);
        let first = tokio::spawn({
            let bridge = bridge.clone();
            async move { bridge.request_location().await }
        });
        platform.triggered.notified().await;

        let second = bridge.request_location().await;
        assert!(matches!(
            second,
            Err(LocationError::AlreadyRequesting("location"))
        ));
        assert_eq!(platform.fixes.load(Ordering::SeqCst), 1);

        bridge.did_update_locations(&[HERE]);
        assert_eq!(first.await.unwrap().unwrap(), HERE);
    }

    #[tokio::test]
    async fn failure_resolves_once_and_stray_callbacks_are_ignored() {
        let (bridge, platform) = bridge(AuthorizationStatus::AuthorizedWhenInUse);
        let task = tokio::spawn({
            let bridge = bridge.clone();
            async move { bridge.request_location().await }
        });
        platform.triggered.notified().await;

        bridge.did_fail("kCLErrorLocationUnknown");
        bridge.did_fail("second failure");
        bridge.did_update_locations(&[HERE]);

        match task.await.unwrap() {
            Err(LocationError::Platform(message)) => assert_eq!(message, "kCLErrorLocationUnknown"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!bridge.is_requesting_location());
    }

    #[tokio::test]
    async fn tracks_are_independent() {
        let (bridge, platform) = bridge(AuthorizationStatus::NotDetermined);
        let permission = tokio::spawn({
            let bridge = bridge.clone();
            async move { bridge.request_permission().await }
        });
        platform.triggered.notified().await;

        let location = tokio::spawn({
            let bridge = bridge.clone();
            async move { bridge.request_location().await }
        });
        platform.triggered.notified().await;

        bridge.did_update_locations(&[HERE]);
        assert_eq!(location.await.unwrap().unwrap(), HERE);
        assert!(bridge.is_requesting_permission());

        bridge.did_change_authorization(AuthorizationStatus::Denied);
        assert_eq!(
            permission.await.unwrap().unwrap(),
            AuthorizationStatus::Denied
        );
    }

    #[tokio::test]
    async fn permission_waits_for_a_determined_status() {
        let (bridge, platform) = bridge(AuthorizationStatus::NotDetermined);
        let task = tokio::spawn({
            let bridge = bridge.clone();
            async move { bridge.request_permission().await }
        });
        platform.triggered.notified().await;

        bridge.did_change_authorization(AuthorizationStatus::NotDetermined);
        assert!(bridge.is_requesting_permission());

        bridge.did_change_authorization(AuthorizationStatus::AuthorizedWhenInUse);
        assert_eq!(
            task.await.unwrap().unwrap(),
            AuthorizationStatus::AuthorizedWhenInUse
        );
        assert_eq!(platform.prompts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn determined_permission_skips_the_prompt() {
        let (bridge, platform) = bridge(AuthorizationStatus::Restricted);
        let status = bridge.request_permission().await.unwrap();
        assert_eq!(status, AuthorizationStatus::Restricted);
        assert!(!status.is_authorized());
        assert_eq!(platform.prompts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn second_permission_request_fails_fast() {
        let (bridge, platform) = bridge(AuthorizationStatus::NotDetermined);
        let first = tokio::spawn({
            let bridge = bridge.clone();
            async move { bridge.request_permission().await }
        });
        platform.triggered.notified().await;

        assert!(matches!(
            bridge.request_permission().await,
            Err(LocationError::AlreadyRequesting("permission"))
        ));

        bridge.did_change_authorization(AuthorizationStatus::AuthorizedAlways);
        assert_eq!(
            first.await.unwrap().unwrap(),
            AuthorizationStatus::AuthorizedAlways
        );
    }

    #[tokio::test]
    async fn dropped_caller_frees_the_slot() {
        let (bridge, platform) = bridge(AuthorizationStatus::AuthorizedWhenInUse);
        let task = tokio::spawn({
            let bridge = bridge.clone();
            async move { bridge.request_location().await }
        });
        platform.triggered.notified().await;
        task.abort();
        let _ = task.await;

        assert!(!bridge.is_requesting_location());
        let retry = tokio::spawn({
            let bridge = bridge.clone();
            async move { bridge.request_location().await }
        });
        platform.triggered.notified().await;
        bridge.did_update_locations(&[HERE]);
        assert_eq!(retry.await.unwrap().unwrap(), HERE);
    }

    /// Platform that answers from inside the trigger, like a cached fix.
    struct ImmediatePlatform {
        bridge: OnceLock<Weak<LocationBridge>>,
    }

    impl LocationPlatform for ImmediatePlatform {
        fn authorization_status(&self) -> AuthorizationStatus {
            AuthorizationStatus::AuthorizedWhenInUse
        }

        fn request_when_in_use_authorization(&self) {}

        fn request_location(&self) {
            if let Some(bridge) = self.bridge.get().and_then(Weak::upgrade) {
                bridge.did_update_locations(&[HERE]);
            }
        }
    }

    #[tokio::test]
    async fn synchronous_callback_resolves_the_request() {
        let platform = Arc::new(ImmediatePlatform {
            bridge: OnceLock::new(),
        });
        let bridge = Arc::new(LocationBridge::new(platform.clone()));
        platform.bridge.set(Arc::downgrade(&bridge)).unwrap();

        assert_eq!(bridge.request_location().await.unwrap(), HERE);
        assert!(!bridge.is_requesting_location());
    }
}

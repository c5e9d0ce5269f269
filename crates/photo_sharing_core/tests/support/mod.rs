//! Shared fixtures for the core integration tests.
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use photo_sharing_core::memory::{InMemoryBlobStore, InMemoryStore};
use photo_sharing_core::{
    BlobStore, Clock, FeedHydrator, FeedService, Identity, MutationEngine, PasswordHasher,
    Photo, PhotoStore, PortError, PortResult, Registration, RegistrationForm, Session,
    SessionManager,
};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Salted but reversible; good enough to exercise the hasher contract.
pub struct TestHasher;

impl PasswordHasher for TestHasher {
    fn hash(&self, plain: &str) -> PortResult<String> {
        Ok(format!("test${}${}", Uuid::new_v4().simple(), plain))
    }

    fn verify(&self, plain: &str, hash: &str) -> PortResult<bool> {
        let mut parts = hash.splitn(3, '$');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("test"), Some(_salt), Some(stored)) => Ok(stored == plain),
            _ => Err(PortError::Unexpected("malformed hash".to_string())),
        }
    }
}

/// A clock that only moves when told to.
pub struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    pub fn new() -> Self {
        Self(Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<TestClock>,
    pub engine: MutationEngine,
    pub sessions: SessionManager,
    pub feed: FeedService,
}

impl Harness {
    pub fn new() -> (Self, Arc<InMemoryBlobStore>) {
        let blobs = Arc::new(InMemoryBlobStore::default());
        (Self::with_blobs(blobs.clone()), blobs)
    }

    pub fn with_blobs(blobs: Arc<dyn BlobStore>) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(TestClock::new());
        let hasher = Arc::new(TestHasher);
        let engine = MutationEngine::new(
            store.clone(),
            store.clone(),
            blobs.clone(),
            hasher.clone(),
            clock.clone(),
        );
        let sessions = SessionManager::new(store.clone(), store.clone(), hasher, clock.clone());
        let feed = FeedService::new(
            store.clone(),
            store.clone(),
            FeedHydrator::new(store.clone(), blobs),
        );
        Self {
            store,
            clock,
            engine,
            sessions,
            feed,
        }
    }

    pub async fn register(&self, login: &str) -> Identity {
        self.engine
            .register_user(registration(login, "secret"))
            .await
            .expect("registration succeeds")
    }

    pub async fn store_photo(&self, photo_id: Uuid) -> Photo {
        self.store
            .get_photo(photo_id)
            .await
            .expect("store reachable")
            .expect("photo exists")
    }

    /// Registers `login` and returns an authenticated session for them.
    pub async fn user(&self, login: &str) -> Session {
        Session::Authenticated(self.register(login).await)
    }
}

pub fn form(login: &str, password: &str) -> RegistrationForm {
    RegistrationForm {
        login_name: login.to_string(),
        password: password.to_string(),
        confirm_password: password.to_string(),
        first_name: format!("{}-first", login),
        last_name: format!("{}-last", login),
        ..Default::default()
    }
}

pub fn registration(login: &str, password: &str) -> Registration {
    Registration::try_from_form(form(login, password)).expect("valid form")
}

pub fn id_of(session: &Session) -> Uuid {
    session.identity().expect("authenticated").id
}

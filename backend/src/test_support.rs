//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and when the `test-support` feature is enabled.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

/// Clock frozen at a chosen instant until a test moves it.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Freeze the clock at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward by whole seconds.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    /// Jump to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

pub mod multipart {
    //! Hand-assembled `multipart/form-data` bodies for handler tests.

    /// Builder for a multipart body with a fixed boundary.
    #[derive(Debug, Default)]
    pub struct MultipartBody {
        body: Vec<u8>,
    }

    const BOUNDARY: &str = "deals-test-boundary";

    impl MultipartBody {
        /// Start an empty body.
        pub fn new() -> Self {
            Self::default()
        }

        /// Append a text field.
        #[must_use]
        pub fn text(mut self, name: &str, value: &str) -> Self {
            self.body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
            self
        }

        /// Append a file part.
        #[must_use]
        pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
            self.body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            self.body.extend_from_slice(bytes);
            self.body.extend_from_slice(b"\r\n");
            self
        }

        /// `Content-Type` header value matching the boundary.
        pub fn content_type() -> String {
            format!("multipart/form-data; boundary={BOUNDARY}")
        }

        /// Close the body and return its bytes.
        pub fn finish(mut self) -> Vec<u8> {
            self.body
                .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
            self.body
        }
    }
}

pub mod harness {
    //! In-memory wiring of the full HTTP state over a temporary content root.

    use std::path::Path;
    use std::sync::Arc;

    use actix_web::web;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use super::MutableClock;
    use crate::inbound::http::state::{Adapters, HttpState, HttpStatePorts};
    use crate::outbound::assets::CapStdAssetStore;
    use crate::outbound::memory::{InMemoryAccountRepository, InMemoryDealRepository};
    use crate::outbound::security::Argon2PasswordHasher;
    use crate::outbound::token::JwtTokenCodec;

    /// Signing secret used by harness token codecs.
    pub const TEST_SECRET: &[u8] = b"test-secret-test-secret-test-sec";

    /// Real services over in-memory repositories and a temp content root.
    pub struct InMemoryHarness {
        content_root: TempDir,
        /// Clock shared by the repositories, asset store, and token codec.
        pub clock: Arc<MutableClock>,
        /// Shared state ready for `App::app_data`.
        pub state: web::Data<HttpState>,
    }

    impl InMemoryHarness {
        /// Build the harness with the clock at 2025-01-01T00:00:00Z.
        pub fn new() -> Self {
            let content_root = TempDir::new().expect("temp content root");
            let start = Utc
                .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
                .single()
                .expect("valid date");
            let clock = Arc::new(MutableClock::new(start));
            let assets = CapStdAssetStore::open_in(content_root.path(), clock.clone())
                .expect("open content root");

            let ports = HttpStatePorts::from(Adapters {
                accounts: Arc::new(InMemoryAccountRepository::new(clock.clone())),
                deals: Arc::new(InMemoryDealRepository::new(clock.clone())),
                assets: Arc::new(assets),
                tokens: Arc::new(JwtTokenCodec::new(
                    TEST_SECRET.to_vec(),
                    chrono::Duration::minutes(crate::outbound::token::DEFAULT_TOKEN_TTL_MINUTES),
                    clock.clone(),
                )),
                hasher: Arc::new(Argon2PasswordHasher::new()),
            });

            Self {
                content_root,
                clock,
                state: web::Data::new(HttpState::new(ports)),
            }
        }

        /// Directory backing the asset store.
        pub fn content_root(&self) -> &Path {
            self.content_root.path()
        }

        /// Names of the files currently in the content root, sorted.
        pub fn stored_files(&self) -> Vec<String> {
            let root = cap_std::fs::Dir::open_ambient_dir(
                self.content_root.path(),
                cap_std::ambient_authority(),
            )
            .expect("open content root");
            let mut names: Vec<String> = root
                .entries()
                .expect("list content root")
                .filter_map(Result::ok)
                .filter_map(|entry| entry.file_name().into_string().ok())
                .collect();
            names.sort();
            names
        }
    }

    impl Default for InMemoryHarness {
        fn default() -> Self {
            Self::new()
        }
    }
}

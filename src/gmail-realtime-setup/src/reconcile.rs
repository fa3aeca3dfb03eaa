// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Converge a remote resource to its desired state.
//!
//! # Algorithm
//!
//! 1. Fetch the resource and classify the result as [Existence].
//! 2. If the resource exists and is valid, leave it unchanged.
//! 3. If the resource exists but drifted, update it.
//! 4. If the resource is absent, create it. If the create fails because
//!    another process created the resource concurrently, fetch it again and
//!    continue as in (2) and (3).
//! 5. If the existence of the resource cannot be determined, fail.
//!
//! Nothing is retried: any other error stops the reconciliation.

use crate::{Error, Result};
use google_cloud_gax::error::Error as ServiceError;
use google_cloud_gax::error::rpc::Code;

/// The result of probing for a remote resource.
#[derive(Debug)]
pub enum Existence<T> {
    /// The resource exists, with its current state.
    Confirmed(T),
    /// The service reported the resource does not exist.
    Absent,
    /// The probe failed for some other reason.
    Unknown(ServiceError),
}

impl<T> From<google_cloud_gax::Result<T>> for Existence<T> {
    fn from(result: google_cloud_gax::Result<T>) -> Self {
        match result {
            Ok(t) => Self::Confirmed(t),
            Err(e) if is_not_found(&e) => Self::Absent,
            Err(e) => Self::Unknown(e),
        }
    }
}

/// Classifies the result of fetching a resource.
pub fn probe<T>(result: google_cloud_gax::Result<T>) -> Existence<T> {
    Existence::from(result)
}

/// Returns true if the service reported the resource does not exist.
pub fn is_not_found(error: &ServiceError) -> bool {
    error
        .status()
        .map(|s| s.code == Code::NotFound)
        .unwrap_or_else(|| error.http_status_code() == Some(404))
}

/// Returns true if a create failed because the resource already exists.
pub fn is_conflict(error: &ServiceError) -> bool {
    match error.status() {
        Some(s) if s.code == Code::AlreadyExists => true,
        Some(s) => {
            error.http_status_code() == Some(409)
                && s.message.to_lowercase().contains("already exists")
        }
        None => false,
    }
}

/// How a reconciliation changed the resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Unchanged,
    Updated,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Unchanged => "unchanged",
            Self::Updated => "updated",
        };
        f.write_str(s)
    }
}

/// A resource after reconciliation.
#[derive(Clone, Debug, PartialEq)]
pub struct Reconciled<T> {
    pub outcome: Outcome,
    pub resource: T,
}

impl<T> Reconciled<T> {
    pub fn new(outcome: Outcome, resource: T) -> Self {
        Self { outcome, resource }
    }

    pub fn into_resource(self) -> T {
        self.resource
    }
}

/// The resource specific steps of a reconciliation.
#[async_trait::async_trait]
pub trait Resource: Send + Sync {
    type Target: std::fmt::Debug + Send;

    /// The name of the API call creating the resource, used in errors.
    const CREATE: &'static str;

    /// The name of the API call updating the resource, used in errors.
    ///
    /// Only meaningful for resources overriding [Resource::update].
    const UPDATE: &'static str = "Update";

    /// The full name of the resource, used in logs and errors.
    fn name(&self) -> String;

    async fn fetch(&self) -> google_cloud_gax::Result<Self::Target>;

    /// Creates the resource in its desired state.
    async fn create(&self) -> google_cloud_gax::Result<Self::Target>;

    /// Returns false if `current` drifted from the desired state.
    fn is_valid(&self, _current: &Self::Target) -> bool {
        true
    }

    /// Repairs a resource that failed [Resource::is_valid].
    async fn update(&self, current: Self::Target) -> google_cloud_gax::Result<Self::Target> {
        Ok(current)
    }
}

/// Converges `resource` to its desired state.
pub async fn reconcile<R>(resource: &R) -> Result<Reconciled<R::Target>>
where
    R: Resource + ?Sized,
{
    let name = resource.name();
    match probe(resource.fetch().await) {
        Existence::Confirmed(current) => {
            tracing::info!("{name} already exists, validating");
            converge(resource, current).await
        }
        Existence::Absent => {
            tracing::info!("{name} not found, creating");
            match resource.create().await {
                Ok(created) => {
                    tracing::info!("created {name}");
                    tracing::debug!("created {name}: {created:?}");
                    Ok(Reconciled::new(Outcome::Created, created))
                }
                Err(e) if is_conflict(&e) => {
                    tracing::warn!("{name} was created concurrently, fetching it: {e}");
                    let current = resource
                        .fetch()
                        .await
                        .map_err(|source| Error::Undetermined {
                            resource: name.clone(),
                            source,
                        })?;
                    converge(resource, current).await
                }
                Err(source) => Err(Error::Service {
                    operation: R::CREATE,
                    source,
                }),
            }
        }
        Existence::Unknown(source) => Err(Error::Undetermined {
            resource: name,
            source,
        }),
    }
}

async fn converge<R>(resource: &R, current: R::Target) -> Result<Reconciled<R::Target>>
where
    R: Resource + ?Sized,
{
    let name = resource.name();
    if resource.is_valid(&current) {
        tracing::info!("{name} is valid");
        return Ok(Reconciled::new(Outcome::Unchanged, current));
    }
    tracing::info!("{name} is not valid, updating");
    tracing::debug!("current state of {name}: {current:?}");
    let updated = resource
        .update(current)
        .await
        .map_err(Error::service(R::UPDATE))?;
    Ok(Reconciled::new(Outcome::Updated, updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::tests::{already_exists, not_found, permission_denied};
    use google_cloud_gax::error::rpc::Status;
    use std::sync::Mutex;
    use test_case::test_case;

    #[test]
    fn classify() {
        assert!(matches!(probe(Ok(1)), Existence::Confirmed(1)));
        assert!(matches!(probe::<i32>(Err(not_found())), Existence::Absent));
        assert!(matches!(
            probe::<i32>(Err(permission_denied())),
            Existence::Unknown(_)
        ));
        assert!(matches!(
            probe::<i32>(Err(ServiceError::io("connection reset"))),
            Existence::Unknown(_)
        ));
    }

    #[test]
    fn not_found_from_http() {
        let e = ServiceError::http(404, http::HeaderMap::new(), bytes::Bytes::new());
        assert!(is_not_found(&e), "{e:?}");
        let e = ServiceError::http(403, http::HeaderMap::new(), bytes::Bytes::new());
        assert!(!is_not_found(&e), "{e:?}");
    }

    #[test_case(already_exists(), true)]
    #[test_case(not_found(), false)]
    #[test_case(permission_denied(), false)]
    #[test_case(ServiceError::io("broken pipe"), false)]
    fn conflict(error: ServiceError, want: bool) {
        assert_eq!(is_conflict(&error), want, "{error:?}");
    }

    #[test]
    fn conflict_from_http_metadata() {
        let status = Status::default()
            .set_code(Code::Aborted)
            .set_message("Service account nylas-gmail-realtime already exists within project");
        let e = ServiceError::service_with_http_metadata(status.clone(), Some(409), None);
        assert!(is_conflict(&e), "{e:?}");

        let status = status.set_message("concurrent policy change");
        let e = ServiceError::service_with_http_metadata(status, Some(409), None);
        assert!(!is_conflict(&e), "{e:?}");
    }

    #[test]
    fn outcome_display() {
        assert_eq!(Outcome::Created.to_string(), "created");
        assert_eq!(Outcome::Unchanged.to_string(), "unchanged");
        assert_eq!(Outcome::Updated.to_string(), "updated");
    }

    /// A resource holding a single integer, valid when it equals 42.
    #[derive(Debug, Default)]
    struct Counter {
        fetch: Mutex<Vec<google_cloud_gax::Result<i32>>>,
        create: Mutex<Option<google_cloud_gax::Result<i32>>>,
        updates: Mutex<Vec<i32>>,
    }

    impl Counter {
        fn with_fetch<I>(self, results: I) -> Self
        where
            I: IntoIterator<Item = google_cloud_gax::Result<i32>>,
        {
            // Results are popped from the back.
            let mut v: Vec<_> = results.into_iter().collect();
            v.reverse();
            *self.fetch.lock().unwrap() = v;
            self
        }

        fn with_create(self, result: google_cloud_gax::Result<i32>) -> Self {
            *self.create.lock().unwrap() = Some(result);
            self
        }
    }

    #[async_trait::async_trait]
    impl Resource for Counter {
        type Target = i32;
        const CREATE: &'static str = "CreateCounter";
        const UPDATE: &'static str = "UpdateCounter";

        fn name(&self) -> String {
            "counters/test".to_string()
        }

        async fn fetch(&self) -> google_cloud_gax::Result<i32> {
            self.fetch
                .lock()
                .unwrap()
                .pop()
                .expect("unexpected call to fetch()")
        }

        async fn create(&self) -> google_cloud_gax::Result<i32> {
            self.create
                .lock()
                .unwrap()
                .take()
                .expect("unexpected call to create()")
        }

        fn is_valid(&self, current: &i32) -> bool {
            *current == 42
        }

        async fn update(&self, current: i32) -> google_cloud_gax::Result<i32> {
            self.updates.lock().unwrap().push(current);
            Ok(42)
        }
    }

    #[tokio::test]
    async fn present_valid() -> anyhow::Result<()> {
        let counter = Counter::default().with_fetch([Ok(42)]);
        let got = reconcile(&counter).await?;
        assert_eq!(got, Reconciled::new(Outcome::Unchanged, 42));
        assert!(counter.updates.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn present_invalid() -> anyhow::Result<()> {
        let counter = Counter::default().with_fetch([Ok(7)]);
        let got = reconcile(&counter).await?;
        assert_eq!(got, Reconciled::new(Outcome::Updated, 42));
        assert_eq!(*counter.updates.lock().unwrap(), vec![7]);
        Ok(())
    }

    #[tokio::test]
    async fn absent() -> anyhow::Result<()> {
        let counter = Counter::default()
            .with_fetch([Err(not_found())])
            .with_create(Ok(42));
        let got = reconcile(&counter).await?;
        assert_eq!(got, Reconciled::new(Outcome::Created, 42));
        Ok(())
    }

    #[tokio::test]
    async fn absent_create_error() {
        let counter = Counter::default()
            .with_fetch([Err(not_found())])
            .with_create(Err(permission_denied()));
        let got = reconcile(&counter).await;
        assert!(
            matches!(got, Err(Error::Service { operation, .. }) if operation == "CreateCounter"),
            "{got:?}"
        );
    }

    #[tokio::test]
    async fn update_error_names_operation() {
        let counter = FailingUpdate(Counter::default().with_fetch([Ok(7)]));
        let got = reconcile(&counter).await;
        assert!(
            matches!(&got, Err(Error::Service { operation, .. }) if *operation == "UpdateCounter"),
            "{got:?}"
        );
        let msg = got.unwrap_err().to_string();
        assert!(msg.starts_with("UpdateCounter failed"), "{msg}");
    }

    /// A [Counter] whose updates always fail.
    #[derive(Debug)]
    struct FailingUpdate(Counter);

    #[async_trait::async_trait]
    impl Resource for FailingUpdate {
        type Target = i32;
        const CREATE: &'static str = Counter::CREATE;
        const UPDATE: &'static str = Counter::UPDATE;

        fn name(&self) -> String {
            self.0.name()
        }

        async fn fetch(&self) -> google_cloud_gax::Result<i32> {
            self.0.fetch().await
        }

        async fn create(&self) -> google_cloud_gax::Result<i32> {
            self.0.create().await
        }

        fn is_valid(&self, current: &i32) -> bool {
            self.0.is_valid(current)
        }

        async fn update(&self, _current: i32) -> google_cloud_gax::Result<i32> {
            Err(permission_denied())
        }
    }

    #[tokio::test]
    async fn unknown_is_fatal() {
        // No create() result is configured, calling it would panic.
        let counter = Counter::default().with_fetch([Err(permission_denied())]);
        let got = reconcile(&counter).await;
        assert!(
            matches!(&got, Err(Error::Undetermined { resource, .. }) if resource == "counters/test"),
            "{got:?}"
        );
    }

    #[test_case(42, Outcome::Unchanged; "concurrent create is valid")]
    #[test_case(7, Outcome::Updated; "concurrent create has drifted")]
    #[tokio::test]
    async fn conflict_refetch(refetched: i32, want: Outcome) -> anyhow::Result<()> {
        let counter = Counter::default()
            .with_fetch([Err(not_found()), Ok(refetched)])
            .with_create(Err(already_exists()));
        let got = reconcile(&counter).await?;
        assert_eq!(got, Reconciled::new(want, 42));
        Ok(())
    }

    #[tokio::test]
    async fn conflict_refetch_error() {
        let counter = Counter::default()
            .with_fetch([Err(not_found()), Err(permission_denied())])
            .with_create(Err(already_exists()));
        let got = reconcile(&counter).await;
        assert!(matches!(got, Err(Error::Undetermined { .. })), "{got:?}");
    }
}

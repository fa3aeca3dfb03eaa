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

//! Errors returned while provisioning.
//!
//! Configuration errors are detected before any remote call. All other
//! variants wrap the [google_cloud_gax::error::Error] returned by the client
//! libraries, together with the operation that failed.

use google_cloud_gax::error::Error as ServiceError;

/// The result type for all provisioning operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error that stops the provisioning run.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The environment tag has no realtime endpoint.
    #[error("environment `{0}` is not supported, valid values are us, eu, staging")]
    UnsupportedEnvironment(String),

    /// The project id was not provided or is empty.
    #[error("the project id must be set")]
    MissingProject,

    /// A request to a Google Cloud service failed.
    #[error("{operation} failed: {source}")]
    Service {
        operation: &'static str,
        #[source]
        source: ServiceError,
    },

    /// Could not determine if a resource exists.
    ///
    /// Only a `NOT_FOUND` response proves a resource is absent. Any other
    /// failure while probing leaves the state unknown, and creating the
    /// resource anyway could mask problems such as missing permissions.
    #[error("cannot determine if {resource} exists: {source}")]
    Undetermined {
        resource: String,
        #[source]
        source: ServiceError,
    },

    /// The service returned a response missing required fields.
    #[error("{operation} returned a malformed response: {reason}")]
    MalformedResponse {
        operation: &'static str,
        reason: String,
    },
}

impl Error {
    pub(crate) fn service(operation: &'static str) -> impl FnOnce(ServiceError) -> Self {
        move |source| Self::Service { operation, source }
    }

    pub(crate) fn malformed<T: Into<String>>(operation: &'static str, reason: T) -> Self {
        Self::MalformedResponse {
            operation,
            reason: reason.into(),
        }
    }

    /// Returns true for errors detected before contacting any service.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::UnsupportedEnvironment(_) | Self::MissingProject)
    }

    /// The error returned by the service, if any.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Service { source, .. } | Self::Undetermined { source, .. } => Some(source),
            _ => None,
        }
    }
}

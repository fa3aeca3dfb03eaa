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

//! Provision the Google Cloud resources used by Gmail realtime sync.
//!
//! Gmail delivers mailbox change notifications through Pub/Sub. This crate
//! ensures a project contains everything needed to receive them:
//!
//! - a service account used to authenticate push deliveries,
//! - a topic Gmail publishes to,
//! - publish rights on that topic for the Gmail push service account,
//! - a push subscription forwarding the notifications to the realtime
//!   endpoint of a deployment environment.
//!
//! Each step fetches the current state of a resource, creates it when it is
//! missing and repairs it when it has drifted. Running the provisioner again
//! against a converged project changes nothing.

pub mod args;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod policy;
pub mod provision;
pub mod reconcile;
pub mod service_account;
pub mod stub;
pub mod subscription;
pub mod topic;
mod transport;

pub use error::{Error, Result};

/// The name of the service account and the id of the topic.
pub const RESOURCE_NAME: &str = "nylas-gmail-realtime";

/// The prefix of the subscription id, completed with the environment tag.
pub const SUBSCRIPTION_PREFIX: &str = "push-nylas-gmail-realtime-sub-";

/// The service account Gmail uses to publish notifications.
pub const GMAIL_PUBLISHER: &str = "serviceAccount:gmail-api-push@system.gserviceaccount.com";

/// Allows the push subscription to mint OIDC tokens for the service account.
pub const TOKEN_CREATOR_ROLE: &str = "roles/iam.serviceAccountTokenCreator";

/// Allows Gmail to publish into the topic.
pub const PUBLISHER_ROLE: &str = "roles/pubsub.publisher";

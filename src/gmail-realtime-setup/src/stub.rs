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

//! Traits for the remote operations used by the provisioner.
//!
//! The reconcilers only talk to Google Cloud through these traits. The
//! production implementations wrap the client libraries (see `transport.rs`),
//! tests use mocks or in-memory fakes.

use google_cloud_gax::Result;
use google_cloud_iam_admin_v1::model::ServiceAccount;
use google_cloud_iam_v1::model::Policy;
use google_cloud_pubsub::model::{Subscription, Topic};
use google_cloud_wkt::FieldMask;

/// Get and set the IAM policy of a resource.
#[async_trait::async_trait]
pub trait IamPolicyOperations: std::fmt::Debug + Send + Sync {
    /// Gets the current IAM policy, including its `etag`.
    async fn get_iam_policy(&self, resource: &str) -> Result<Policy>;

    /// Replaces the IAM policy of `resource` with `policy`.
    async fn set_iam_policy(&self, resource: &str, policy: Policy) -> Result<Policy>;
}

/// Service account operations in the IAM admin API.
#[async_trait::async_trait]
pub trait ServiceAccounts: IamPolicyOperations {
    /// Gets a service account by its full resource name.
    async fn get_service_account(&self, name: &str) -> Result<ServiceAccount>;

    /// Creates a service account in `project`, a `projects/{id}` name.
    async fn create_service_account(
        &self,
        project: &str,
        account_id: &str,
        display_name: &str,
    ) -> Result<ServiceAccount>;
}

/// Topic operations in the Pub/Sub admin API.
///
/// The IAM policy of a topic is managed through [IamPolicyOperations] on a
/// separate client.
#[async_trait::async_trait]
pub trait Topics: std::fmt::Debug + Send + Sync {
    async fn get_topic(&self, name: &str) -> Result<Topic>;

    /// Creates a topic with the default configuration.
    async fn create_topic(&self, name: &str) -> Result<Topic>;
}

/// Subscription operations in the Pub/Sub admin API.
#[async_trait::async_trait]
pub trait Subscriptions: std::fmt::Debug + Send + Sync {
    async fn get_subscription(&self, name: &str) -> Result<Subscription>;

    async fn create_subscription(&self, subscription: Subscription) -> Result<Subscription>;

    /// Updates the fields of `subscription` listed in `update_mask`.
    async fn update_subscription(
        &self,
        subscription: Subscription,
        update_mask: FieldMask,
    ) -> Result<Subscription>;
}

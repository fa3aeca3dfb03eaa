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

//! Ensure the push subscription delivers notifications to the environment.
//!
//! The desired subscription:
//! - is bound to the notification topic,
//! - pushes to the realtime endpoint of the environment,
//! - authenticates each push with an OIDC token for the service account,
//! - never expires.
//!
//! An existing subscription that differs in any of these is repaired with a
//! partial update of its push configuration and expiration policy. The topic
//! of a subscription cannot be changed, a subscription bound to another topic
//! is reported but left bound to it.

use crate::Result;
use crate::config::Config;
use crate::reconcile::{Reconciled, Resource, reconcile};
use crate::stub::Subscriptions;
use google_cloud_iam_admin_v1::model::ServiceAccount;
use google_cloud_pubsub::model::push_config::{AuthenticationMethod, OidcToken};
use google_cloud_pubsub::model::{ExpirationPolicy, PushConfig, Subscription, Topic};
use google_cloud_wkt::FieldMask;

/// The fields changed when repairing a subscription.
pub const UPDATE_PATHS: [&str; 2] = ["push_config", "expiration_policy"];

/// Fetches, creates, or repairs the push subscription.
pub async fn ensure<C>(
    client: &C,
    config: &Config,
    topic: &Topic,
    account: &ServiceAccount,
) -> Result<Reconciled<Subscription>>
where
    C: Subscriptions + ?Sized,
{
    let desired = desired(config, topic, account);
    reconcile(&SubscriptionResource { client, desired }).await
}

/// The subscription in its desired state.
pub fn desired(config: &Config, topic: &Topic, account: &ServiceAccount) -> Subscription {
    Subscription::new()
        .set_name(config.subscription_name())
        .set_topic(&topic.name)
        .set_push_config(push_config(config.push_endpoint(), &account.email))
        .set_expiration_policy(never_expire())
}

/// A push configuration authenticated with an OIDC token for `email`.
pub fn push_config(endpoint: &str, email: &str) -> PushConfig {
    PushConfig::new()
        .set_push_endpoint(endpoint)
        .set_oidc_token(OidcToken::new().set_service_account_email(email))
}

/// An expiration policy without a `ttl`, the subscription never expires.
pub fn never_expire() -> ExpirationPolicy {
    ExpirationPolicy::new()
}

/// Returns true if `policy` disables the expiration of the subscription.
///
/// A missing policy is not infinite, the service applies its default `ttl`.
pub fn is_infinite(policy: Option<&ExpirationPolicy>) -> bool {
    policy.is_some_and(|p| {
        p.ttl
            .as_ref()
            .is_none_or(|ttl| *ttl == google_cloud_wkt::Duration::default())
    })
}

/// Returns true if `current` matches `desired` in the validated fields.
///
/// The validated fields are the topic, the push endpoint, the service account
/// used in the OIDC token, and the expiration policy.
pub fn validate(current: &Subscription, desired: &Subscription) -> bool {
    let endpoint = |s: &Subscription| s.push_config.as_ref().map(|p| p.push_endpoint.clone());
    current.topic == desired.topic
        && endpoint(current) == endpoint(desired)
        && oidc_email(current).is_some()
        && oidc_email(current) == oidc_email(desired)
        && is_infinite(current.expiration_policy.as_ref())
}

fn oidc_email(subscription: &Subscription) -> Option<&str> {
    match subscription
        .push_config
        .as_ref()
        .and_then(|p| p.authentication_method.as_ref())
    {
        Some(AuthenticationMethod::OidcToken(token)) => Some(token.service_account_email.as_str()),
        _ => None,
    }
}

/// The update mask used when repairing a subscription.
pub fn update_mask() -> FieldMask {
    let paths = UPDATE_PATHS.iter().map(|p| p.to_string()).collect::<Vec<_>>();
    FieldMask::default().set_paths(paths)
}

struct SubscriptionResource<'a, C: ?Sized> {
    client: &'a C,
    desired: Subscription,
}

#[async_trait::async_trait]
impl<C> Resource for SubscriptionResource<'_, C>
where
    C: Subscriptions + ?Sized,
{
    type Target = Subscription;
    const CREATE: &'static str = "CreateSubscription";
    const UPDATE: &'static str = "UpdateSubscription";

    fn name(&self) -> String {
        self.desired.name.clone()
    }

    async fn fetch(&self) -> google_cloud_gax::Result<Subscription> {
        self.client.get_subscription(&self.desired.name).await
    }

    async fn create(&self) -> google_cloud_gax::Result<Subscription> {
        self.client.create_subscription(self.desired.clone()).await
    }

    fn is_valid(&self, current: &Subscription) -> bool {
        validate(current, &self.desired)
    }

    async fn update(&self, current: Subscription) -> google_cloud_gax::Result<Subscription> {
        if current.topic != self.desired.topic {
            tracing::warn!(
                "{} is bound to {}, expected {}, the topic cannot be changed with an update",
                current.name,
                current.topic,
                self.desired.topic
            );
        }
        let mut update = Subscription::new().set_name(&current.name);
        update.push_config = self.desired.push_config.clone();
        update.expiration_policy = self.desired.expiration_policy.clone();
        self.client
            .update_subscription(update, update_mask())
            .await
    }
}

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

//! Run all the provisioning steps in order.
//!
//! Each step depends on the previous one: the subscription needs the topic
//! and the service account. The first error stops the run, resources created
//! by earlier steps are kept.

use crate::config::Config;
use crate::reconcile::Outcome;
use crate::stub::{IamPolicyOperations, ServiceAccounts, Subscriptions, Topics};
use crate::{GMAIL_PUBLISHER, Result, service_account, subscription, topic};
use tracing::Instrument;

/// Provisions a project using the given clients.
///
/// `topic_policies` manages the IAM policy of the topic, it must accept
/// `projects/*/topics/*` resource names.
#[derive(Debug)]
pub struct Provisioner<'a, I: ?Sized, T: ?Sized, P: ?Sized, S: ?Sized> {
    config: Config,
    iam: &'a I,
    topics: &'a T,
    topic_policies: &'a P,
    subscriptions: &'a S,
}

impl<'a, I, T, P, S> Provisioner<'a, I, T, P, S>
where
    I: ServiceAccounts + ?Sized,
    T: Topics + ?Sized,
    P: IamPolicyOperations + ?Sized,
    S: Subscriptions + ?Sized,
{
    pub fn new(
        config: Config,
        iam: &'a I,
        topics: &'a T,
        topic_policies: &'a P,
        subscriptions: &'a S,
    ) -> Self {
        Self {
            config,
            iam,
            topics,
            topic_policies,
            subscriptions,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs every step, stopping at the first error.
    pub async fn run(&self) -> Result<Report> {
        let config = &self.config;
        tracing::info!(
            "provisioning project {} for environment {}",
            config.project_id(),
            config.environment()
        );

        let account = service_account::ensure(self.iam, config)
            .instrument(tracing::info_span!(
                "service_account",
                name = config.service_account_name()
            ))
            .await?;

        let topic = topic::ensure(self.topics, config)
            .instrument(tracing::info_span!("topic", name = config.topic_name()))
            .await?;

        topic::grant_publish(self.topic_policies, &topic.resource, GMAIL_PUBLISHER)
            .instrument(tracing::info_span!(
                "topic_iam",
                name = config.topic_name(),
                member = GMAIL_PUBLISHER
            ))
            .await?;

        let subscription =
            subscription::ensure(self.subscriptions, config, &topic.resource, &account.resource)
                .instrument(tracing::info_span!(
                    "subscription",
                    name = config.subscription_name()
                ))
                .await?;

        Ok(Report {
            project_id: config.project_id().to_string(),
            service_account_email: account.resource.email,
            service_account: account.outcome,
            topic: topic.outcome,
            subscription: subscription.outcome,
            subscription_name: subscription.resource.name,
        })
    }
}

/// A summary of a successful provisioning run.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub project_id: String,
    pub service_account_email: String,
    pub service_account: Outcome,
    pub topic: Outcome,
    pub subscription: Outcome,
    pub subscription_name: String,
}

impl Report {
    /// Returns true if no resource was created or updated.
    pub fn is_converged(&self) -> bool {
        [self.service_account, self.topic, self.subscription]
            .iter()
            .all(|o| *o == Outcome::Unchanged)
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "service account {}: {}",
            self.service_account_email, self.service_account
        )?;
        writeln!(f, "topic: {}", self.topic)?;
        write!(
            f,
            "subscription {}: {}",
            self.subscription_name, self.subscription
        )
    }
}

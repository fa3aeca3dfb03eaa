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

//! Implement the provisioner traits using the Google Cloud client libraries.

use crate::stub::{IamPolicyOperations, ServiceAccounts, Subscriptions, Topics};
use google_cloud_gax::Result;
use google_cloud_iam_admin_v1::client::Iam;
use google_cloud_iam_admin_v1::model::ServiceAccount;
use google_cloud_iam_v1::model::Policy;
use google_cloud_pubsub::client::{SchemaService, SubscriptionAdmin, TopicAdmin};
use google_cloud_pubsub::model::{Subscription, Topic};
use google_cloud_wkt::FieldMask;

#[async_trait::async_trait]
impl IamPolicyOperations for Iam {
    async fn get_iam_policy(&self, resource: &str) -> Result<Policy> {
        self.get_iam_policy().set_resource(resource).send().await
    }

    async fn set_iam_policy(&self, resource: &str, policy: Policy) -> Result<Policy> {
        self.set_iam_policy()
            .set_resource(resource)
            .set_policy(policy)
            .send()
            .await
    }
}

#[async_trait::async_trait]
impl ServiceAccounts for Iam {
    async fn get_service_account(&self, name: &str) -> Result<ServiceAccount> {
        self.get_service_account().set_name(name).send().await
    }

    async fn create_service_account(
        &self,
        project: &str,
        account_id: &str,
        display_name: &str,
    ) -> Result<ServiceAccount> {
        self.create_service_account()
            .set_name(project)
            .set_account_id(account_id)
            .set_service_account(ServiceAccount::new().set_display_name(display_name))
            .send()
            .await
    }
}

// The Pub/Sub IAM routes accept topic, subscription, and schema names, but
// only the schema client exposes them.
#[async_trait::async_trait]
impl IamPolicyOperations for SchemaService {
    async fn get_iam_policy(&self, resource: &str) -> Result<Policy> {
        self.get_iam_policy().set_resource(resource).send().await
    }

    async fn set_iam_policy(&self, resource: &str, policy: Policy) -> Result<Policy> {
        self.set_iam_policy()
            .set_resource(resource)
            .set_policy(policy)
            .send()
            .await
    }
}

#[async_trait::async_trait]
impl Topics for TopicAdmin {
    async fn get_topic(&self, name: &str) -> Result<Topic> {
        self.get_topic().set_topic(name).send().await
    }

    async fn create_topic(&self, name: &str) -> Result<Topic> {
        self.create_topic().set_name(name).send().await
    }
}

#[async_trait::async_trait]
impl Subscriptions for SubscriptionAdmin {
    async fn get_subscription(&self, name: &str) -> Result<Subscription> {
        self.get_subscription().set_subscription(name).send().await
    }

    async fn create_subscription(&self, subscription: Subscription) -> Result<Subscription> {
        self.create_subscription()
            .with_request(subscription)
            .send()
            .await
    }

    async fn update_subscription(
        &self,
        subscription: Subscription,
        update_mask: FieldMask,
    ) -> Result<Subscription> {
        self.update_subscription()
            .set_subscription(subscription)
            .set_update_mask(update_mask)
            .send()
            .await
    }
}

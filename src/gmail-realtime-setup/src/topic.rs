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

//! Ensure the notification topic exists and Gmail can publish to it.

use crate::config::Config;
use crate::reconcile::{Reconciled, Resource, reconcile};
use crate::stub::{IamPolicyOperations, Topics};
use crate::{PUBLISHER_ROLE, Result, policy};
use google_cloud_iam_v1::model::Policy;
use google_cloud_pubsub::model::Topic;

/// Fetches the topic, creating it with the default configuration if needed.
///
/// An existing topic is returned as-is, its configuration is not validated.
pub async fn ensure<C>(client: &C, config: &Config) -> Result<Reconciled<Topic>>
where
    C: Topics + ?Sized,
{
    let name = config.topic_name();
    reconcile(&TopicResource { client, name }).await
}

/// Grants `member` the publisher role on `topic`.
///
/// `client` must accept topic names in its IAM policy requests.
pub async fn grant_publish<C>(client: &C, topic: &Topic, member: &str) -> Result<Policy>
where
    C: IamPolicyOperations + ?Sized,
{
    policy::grant(client, &topic.name, PUBLISHER_ROLE, member).await
}

struct TopicResource<'a, C: ?Sized> {
    client: &'a C,
    name: String,
}

#[async_trait::async_trait]
impl<C> Resource for TopicResource<'_, C>
where
    C: Topics + ?Sized,
{
    type Target = Topic;
    const CREATE: &'static str = "CreateTopic";

    fn name(&self) -> String {
        self.name.clone()
    }

    async fn fetch(&self) -> google_cloud_gax::Result<Topic> {
        self.client.get_topic(&self.name).await
    }

    async fn create(&self) -> google_cloud_gax::Result<Topic> {
        self.client.create_topic(&self.name).await
    }
}

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

use crate::endpoint::Environment;
use crate::{Error, RESOURCE_NAME, Result, SUBSCRIPTION_PREFIX};

/// The desired state of a provisioning run.
///
/// Every resource name is derived from the project id and the environment,
/// so two runs with the same configuration converge to the same state.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    project_id: String,
    environment: Environment,
}

impl Config {
    /// Surrounding whitespace in `project_id` is ignored.
    pub fn new<T: AsRef<str>>(project_id: T, environment: Environment) -> Result<Self> {
        let project_id = project_id.as_ref().trim();
        if project_id.is_empty() {
            return Err(Error::MissingProject);
        }
        Ok(Self {
            project_id: project_id.to_string(),
            environment,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// The parent used to create service accounts.
    pub fn project_name(&self) -> String {
        format!("projects/{}", self.project_id)
    }

    pub fn service_account_id(&self) -> &'static str {
        RESOURCE_NAME
    }

    pub fn service_account_email(&self) -> String {
        format!("{RESOURCE_NAME}@{}.iam.gserviceaccount.com", self.project_id)
    }

    /// The full resource name of the service account.
    pub fn service_account_name(&self) -> String {
        format!(
            "projects/{}/serviceAccounts/{}",
            self.project_id,
            self.service_account_email()
        )
    }

    pub fn topic_name(&self) -> String {
        format!("projects/{}/topics/{RESOURCE_NAME}", self.project_id)
    }

    pub fn subscription_id(&self) -> String {
        format!("{SUBSCRIPTION_PREFIX}{}", self.environment)
    }

    pub fn subscription_name(&self) -> String {
        format!(
            "projects/{}/subscriptions/{}",
            self.project_id,
            self.subscription_id()
        )
    }

    pub fn push_endpoint(&self) -> &'static str {
        self.environment.push_endpoint()
    }
}

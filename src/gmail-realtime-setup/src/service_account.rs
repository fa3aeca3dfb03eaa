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

//! Ensure the push service account exists and can mint OIDC tokens.

use crate::config::Config;
use crate::reconcile::{Outcome, Reconciled, Resource, reconcile};
use crate::stub::ServiceAccounts;
use crate::{Error, Result, TOKEN_CREATOR_ROLE, policy};
use google_cloud_iam_admin_v1::model::ServiceAccount;

/// Fetches or creates the service account, then grants it the token creator
/// role on itself.
///
/// The binding is merged into the existing policy of the service account and
/// written back on every run.
pub async fn ensure<C>(client: &C, config: &Config) -> Result<Reconciled<ServiceAccount>>
where
    C: ServiceAccounts + ?Sized,
{
    let reconciled = reconcile(&Account { client, config }).await?;
    let account = &reconciled.resource;
    if account.email.is_empty() || account.name.is_empty() {
        let operation = match reconciled.outcome {
            Outcome::Created => "CreateServiceAccount",
            _ => "GetServiceAccount",
        };
        return Err(Error::malformed(
            operation,
            format!("service account is missing its name or email: {account:?}"),
        ));
    }
    tracing::info!(
        "{} service account: {}",
        reconciled.outcome,
        account.email
    );

    let member = member(account);
    policy::grant(client, &account.name, TOKEN_CREATOR_ROLE, &member).await?;
    tracing::info!("added role to service account: {TOKEN_CREATOR_ROLE}");
    Ok(reconciled)
}

/// The IAM member identifying a service account.
pub fn member(account: &ServiceAccount) -> String {
    format!("serviceAccount:{}", account.email)
}

struct Account<'a, C: ?Sized> {
    client: &'a C,
    config: &'a Config,
}

#[async_trait::async_trait]
impl<C> Resource for Account<'_, C>
where
    C: ServiceAccounts + ?Sized,
{
    type Target = ServiceAccount;
    const CREATE: &'static str = "CreateServiceAccount";

    fn name(&self) -> String {
        self.config.service_account_name()
    }

    async fn fetch(&self) -> google_cloud_gax::Result<ServiceAccount> {
        self.client
            .get_service_account(&self.config.service_account_name())
            .await
    }

    async fn create(&self) -> google_cloud_gax::Result<ServiceAccount> {
        let id = self.config.service_account_id();
        self.client
            .create_service_account(&self.config.project_name(), id, id)
            .await
    }
}

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

//! Helpers to merge role bindings into IAM policies.
//!
//! Policies are always updated with a read-modify-write cycle: the current
//! policy is fetched, the desired binding merged into it, and the full policy
//! (including its `etag`) written back. Unrelated bindings are preserved.

use crate::stub::IamPolicyOperations;
use crate::{Error, Result};
use google_cloud_iam_v1::model::{Binding, Policy};

/// Grants `role` to `member` on `resource`, keeping all other bindings.
///
/// The merged policy is always written back, even if the member already held
/// the role, so each run re-applies the binding. The write carries the `etag`
/// of the policy that was read: a concurrent change makes it fail instead of
/// silently discarding the other writer's bindings.
pub async fn grant<C>(client: &C, resource: &str, role: &str, member: &str) -> Result<Policy>
where
    C: IamPolicyOperations + ?Sized,
{
    let mut policy = client
        .get_iam_policy(resource)
        .await
        .map_err(Error::service("GetIamPolicy"))?;
    if add_member(&mut policy, role, member) {
        tracing::info!("adding {member} to {role} on {resource}");
    } else {
        tracing::info!("{member} already holds {role} on {resource}, re-applying");
    }
    let updated = client
        .set_iam_policy(resource, policy)
        .await
        .map_err(Error::service("SetIamPolicy"))?;
    if !has_member(&updated, role, member) {
        return Err(Error::malformed(
            "SetIamPolicy",
            format!("the policy for {resource} does not grant {role} to {member}"),
        ));
    }
    Ok(updated)
}

/// Adds `member` to `role` in `policy`.
///
/// Conditional bindings are never modified, the member is added to the
/// unconditional binding for the role, which is created if needed.
///
/// Returns `true` if the policy changed.
pub fn add_member(policy: &mut Policy, role: &str, member: &str) -> bool {
    let existing = policy
        .bindings
        .iter_mut()
        .find(|b| b.role == role && b.condition.is_none());
    match existing {
        Some(binding) if binding.members.iter().any(|m| m == member) => false,
        Some(binding) => {
            binding.members.push(member.to_string());
            true
        }
        None => {
            policy
                .bindings
                .push(Binding::new().set_role(role).set_members([member]));
            true
        }
    }
}

/// Returns true if `member` holds `role` unconditionally in `policy`.
pub fn has_member(policy: &Policy, role: &str, member: &str) -> bool {
    policy
        .bindings
        .iter()
        .filter(|b| b.role == role && b.condition.is_none())
        .any(|b| b.members.iter().any(|m| m == member))
}

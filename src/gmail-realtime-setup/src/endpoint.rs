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

//! Maps deployment environments to their realtime push endpoints.

use crate::{Error, Result};
use std::str::FromStr;

/// The deployment environments receiving Gmail notifications.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Us,
    Eu,
    Staging,
}

impl Environment {
    /// The tag used on the command line and in the subscription id.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::Eu => "eu",
            Self::Staging => "staging",
        }
    }

    /// The HTTPS endpoint the push subscription delivers to.
    pub fn push_endpoint(&self) -> &'static str {
        match self {
            Self::Us => "https://gmailrealtime.us.nylas.com",
            Self::Eu => "https://gmailrealtime.eu.nylas.com",
            Self::Staging => "https://gmailrealtime-stg.us.nylas.com",
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "us" => Ok(Self::Us),
            "eu" => Ok(Self::Eu),
            "staging" => Ok(Self::Staging),
            _ => Err(Error::UnsupportedEnvironment(s.to_string())),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the push endpoint for an environment tag.
///
/// # Example
/// ```
/// # use gmail_realtime_setup::endpoint::resolve;
/// assert_eq!(resolve("eu")?, "https://gmailrealtime.eu.nylas.com");
/// assert!(resolve("mars").is_err());
/// # Ok::<(), gmail_realtime_setup::Error>(())
/// ```
pub fn resolve(environment: &str) -> Result<&'static str> {
    environment
        .parse::<Environment>()
        .map(|e| e.push_endpoint())
}

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

use crate::Result;
use crate::config::Config;
use crate::endpoint::Environment;
use clap::Parser;

const DESCRIPTION: &str = concat!(
    "Creates or repairs the service account, Pub/Sub topic, IAM bindings,",
    " and push subscription used to receive Gmail realtime notifications.",
    " Running it again against a provisioned project changes nothing."
);

/// Command-line options for the provisioner.
#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = DESCRIPTION)]
pub struct Args {
    /// The deployment environment receiving the notifications.
    ///
    /// One of `us`, `eu` or `staging`.
    #[arg(long, env = "GMAIL_REALTIME_ENV", default_value = "us")]
    pub env: String,

    /// The Google Cloud project to provision.
    #[arg(long, alias = "projectId", env = "GOOGLE_CLOUD_PROJECT")]
    pub project_id: String,
}

impl Args {
    /// Validates the arguments and derives the provisioning configuration.
    pub fn to_config(&self) -> Result<Config> {
        let environment = self.env.parse::<Environment>()?;
        Config::new(self.project_id.as_str(), environment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use scoped_env::ScopedEnv;
    use test_case::test_case;

    const ENV_VAR: &str = "GMAIL_REALTIME_ENV";
    const PROJECT_VAR: &str = "GOOGLE_CLOUD_PROJECT";

    // These tests must run serially because the flags read the environment.
    #[test]
    #[serial_test::serial]
    fn defaults() -> anyhow::Result<()> {
        let _e = ScopedEnv::remove(ENV_VAR);
        let _p = ScopedEnv::remove(PROJECT_VAR);
        let args = Args::try_parse_from(["program", "--project-id=my-project"])?;
        assert_eq!(args.project_id, "my-project");
        let config = args.to_config()?;
        assert_eq!(config.project_id(), "my-project");
        assert_eq!(config.environment(), Environment::Us);
        Ok(())
    }

    #[test_case(&["program", "--project-id=p", "--env=eu"], Environment::Eu; "long flag")]
    #[test_case(&["program", "--projectId=p", "--env=staging"], Environment::Staging; "alias")]
    #[test_case(&["program", "--env", "us", "--project-id", "p"], Environment::Us; "separate values")]
    #[serial_test::serial]
    fn parse(input: &[&str], want: Environment) -> anyhow::Result<()> {
        let _e = ScopedEnv::remove(ENV_VAR);
        let args = Args::try_parse_from(input)?;
        let config = args.to_config()?;
        assert_eq!(config.project_id(), "p");
        assert_eq!(config.environment(), want);
        Ok(())
    }

    #[test]
    #[serial_test::serial]
    fn from_environment() -> anyhow::Result<()> {
        let _e = ScopedEnv::set(ENV_VAR, "staging");
        let _p = ScopedEnv::set(PROJECT_VAR, "env-project");
        let config = Args::try_parse_from(["program"])?.to_config()?;
        assert_eq!(config.project_id(), "env-project");
        assert_eq!(config.environment(), Environment::Staging);

        // Flags take precedence over the environment.
        let args = Args::try_parse_from(["program", "--env=eu", "--project-id=p"])?;
        let config = args.to_config()?;
        assert_eq!(config.project_id(), "p");
        assert_eq!(config.environment(), Environment::Eu);
        Ok(())
    }

    #[test]
    #[serial_test::serial]
    fn missing_project() {
        let _p = ScopedEnv::remove(PROJECT_VAR);
        let got = Args::try_parse_from(["program", "--env=us"]);
        assert!(got.is_err(), "{got:?}");
    }

    #[test]
    #[serial_test::serial]
    fn unsupported_environment() -> anyhow::Result<()> {
        let args = Args::try_parse_from(["program", "--project-id=p", "--env=mars"])?;
        let got = args.to_config();
        assert!(
            matches!(&got, Err(Error::UnsupportedEnvironment(e)) if e == "mars"),
            "{got:?}"
        );
        Ok(())
    }

    #[test]
    #[serial_test::serial]
    fn empty_project() -> anyhow::Result<()> {
        let args = Args::try_parse_from(["program", "--project-id="])?;
        let got = args.to_config();
        assert!(matches!(got, Err(Error::MissingProject)), "{got:?}");
        Ok(())
    }

    #[test]
    fn unknown_flag() {
        let got = Args::try_parse_from(["program", "--project-id=p", "--region=us"]);
        assert!(got.is_err(), "{got:?}");
    }
}

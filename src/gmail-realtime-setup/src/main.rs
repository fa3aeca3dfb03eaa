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

//! Provision a Google Cloud project for Gmail realtime notifications.

use clap::Parser;
use gmail_realtime_setup::args::Args;
use gmail_realtime_setup::provision::Provisioner;
use google_cloud_iam_admin_v1::client::Iam;
use google_cloud_pubsub::client::{SchemaService, SubscriptionAdmin, TopicAdmin};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    enable_tracing()?;
    tracing::info!("Configuration: {args:?}");
    let config = args.to_config()?;

    // All clients use Application Default Credentials.
    let iam = Iam::builder().with_tracing().build().await?;
    let topics = TopicAdmin::builder().with_tracing().build().await?;
    // Topic IAM policies are only reachable through the schema client.
    let topic_policies = SchemaService::builder().with_tracing().build().await?;
    let subscriptions = SubscriptionAdmin::builder().with_tracing().build().await?;

    let project = config.project_id().to_string();
    let report = Provisioner::new(config, &iam, &topics, &topic_policies, &subscriptions)
        .run()
        .await?;
    println!("{report}");
    println!("Successfully setup GCP project {project} for realtime google email sync");
    Ok(())
}

fn enable_tracing() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_level(true)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

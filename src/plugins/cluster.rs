//! `drove cluster ...`: cluster level health and summary.

use crate::client::DroveClient;
use crate::constants;
use crate::error::Error;
use crate::output::{self, value_text};
use crate::plugin::{parse_options, CommandRegistry, HandlerFuture, Plugin};
use clap::{ArgMatches, Args};
use serde_json::Value;

pub const GROUP: &str = "cluster";

#[derive(Debug, Clone, Args)]
pub struct PingOptions {}

#[derive(Debug, Clone, Args)]
pub struct SummaryOptions {}

#[derive(Debug, Default, Clone, Copy)]
pub struct Cluster;

impl Plugin for Cluster {
    fn name(&self) -> &'static str {
        GROUP
    }

    fn populate_options(&self, registry: &mut CommandRegistry) -> Result<(), Error> {
        registry
            .add_group(GROUP, "Drove cluster related commands")?
            .leaf::<PingOptions>("ping", "Check connectivity to the cluster", ping)?
            .leaf::<SummaryOptions>("summary", "Show cluster summary", summary)?;
        Ok(())
    }
}

fn ping<'a>(client: &'a DroveClient, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    Box::pin(async move {
        let _: PingOptions = parse_options(matches)?;
        client.get(constants::PATH_PING, 200).await?;
        output::print_lines([format!("Cluster at {} is reachable", client.endpoint())])?;
        Ok(())
    })
}

fn summary<'a>(client: &'a DroveClient, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    Box::pin(async move {
        let _: SummaryOptions = parse_options(matches)?;
        let data = client.get(constants::PATH_CLUSTER, 200).await?;
        output::print_dict(&summary_pairs(&data))?;
        Ok(())
    })
}

/// One row per top-level field of the cluster summary.
#[must_use]
pub fn summary_pairs(data: &Value) -> Vec<(String, String)> {
    data.as_object()
        .map(|fields| {
            fields
                .iter()
                .map(|(key, value)| (key.clone(), value_text(Some(value))))
                .collect()
        })
        .unwrap_or_default()
}

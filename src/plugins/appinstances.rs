//! `drove appinstances ...`: application instance listing, inspection and logs.

use crate::client::DroveClient;
use crate::constants;
use crate::error::Error;
use crate::output::{self, to_date, value_text};
use crate::plugin::{parse_options, CommandRegistry, HandlerFuture, Plugin};
use crate::plugins::logs::{self, LogTail, LogTarget};
use clap::{ArgMatches, Args};
use serde_json::{Map, Value};
use std::io;
use std::path::PathBuf;

pub const GROUP: &str = "appinstances";

const LIST_HEADERS: [&str; 6] = [
    "Instance ID",
    "Executor Host",
    "State",
    "Error Message",
    "Created",
    "Last Updated",
];

/// Application and instance a command acts on.
#[derive(Debug, Clone, Args)]
pub struct InstanceRef {
    /// Application ID
    #[arg(value_name = "app-id")]
    pub app_id: String,
    /// Application instance ID
    #[arg(value_name = "instance-id")]
    pub instance_id: String,
}

impl InstanceRef {
    fn log_target(&self) -> LogTarget<'_> {
        LogTarget::new(constants::LOG_KIND_APPLICATIONS, &self.app_id, &self.instance_id)
    }
}

#[derive(Debug, Clone, Args)]
pub struct ListOptions {
    /// Application ID
    #[arg(value_name = "app-id")]
    pub app_id: String,
    /// Show old instances
    #[arg(long, short)]
    pub old: bool,
    /// Sort output by column
    #[arg(
        long,
        short,
        default_value_t = 0,
        value_parser = clap::value_parser!(u8).range(0..6)
    )]
    pub sort: u8,
    /// Sort in reverse order
    #[arg(long, short)]
    pub reverse: bool,
}

#[derive(Debug, Clone, Args)]
pub struct InfoOptions {
    #[command(flatten)]
    pub instance: InstanceRef,
}

#[derive(Debug, Clone, Args)]
pub struct LogsOptions {
    #[command(flatten)]
    pub instance: InstanceRef,
}

#[derive(Debug, Clone, Args)]
pub struct TailOptions {
    #[command(flatten)]
    pub instance: InstanceRef,
    /// Log filename to tail
    #[arg(long, short, default_value = constants::DEFAULT_TAIL_FILE)]
    pub file: String,
}

#[derive(Debug, Clone, Args)]
pub struct DownloadOptions {
    #[command(flatten)]
    pub instance: InstanceRef,
    /// Log filename to download
    pub file: String,
    /// Filename to download to; defaults to the log filename
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AppInstances;

impl Plugin for AppInstances {
    fn name(&self) -> &'static str {
        GROUP
    }

    fn populate_options(&self, registry: &mut CommandRegistry) -> Result<(), Error> {
        registry
            .add_group(GROUP, "Drove application instance related commands")?
            .leaf::<ListOptions>("list", "List all application instances", list)?
            .leaf::<InfoOptions>("info", "Print details for an application instance", info)?
            .leaf::<LogsOptions>("logs", "Print list of logs for application instance", log_files)?
            .leaf::<TailOptions>("tail", "Tail log for application instance", tail)?
            .leaf::<DownloadOptions>("download", "Download log for application instance", download)?;
        Ok(())
    }
}

fn list<'a>(client: &'a DroveClient, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    Box::pin(async move {
        let options: ListOptions = parse_options(matches)?;
        list_instances(client, &options).await
    })
}

fn info<'a>(client: &'a DroveClient, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    Box::pin(async move {
        let options: InfoOptions = parse_options(matches)?;
        show_instance(client, &options.instance).await
    })
}

fn log_files<'a>(client: &'a DroveClient, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    Box::pin(async move {
        let options: LogsOptions = parse_options(matches)?;
        let files = logs::list_logs(client, options.instance.log_target()).await?;
        output::print_lines(files)?;
        Ok(())
    })
}

fn tail<'a>(client: &'a DroveClient, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    Box::pin(async move {
        let options: TailOptions = parse_options(matches)?;
        let mut tail = LogTail::new(client, options.instance.log_target(), &options.file);
        tail.follow(&mut io::stdout()).await
    })
}

fn download<'a>(client: &'a DroveClient, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    Box::pin(async move {
        let options: DownloadOptions = parse_options(matches)?;
        let destination = options
            .out
            .clone()
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(&options.file));
        let size = logs::download_log(
            client,
            options.instance.log_target(),
            &options.file,
            &destination,
        )
        .await?;
        output::print_lines([format!(
            "Log {} downloaded to {} ({size} bytes)",
            options.file,
            destination.display()
        )])?;
        Ok(())
    })
}

fn instances_path(app_id: &str, old: bool) -> String {
    let suffix = if old { "/old" } else { "" };
    format!("{}/{app_id}/instances{suffix}", constants::PATH_APPLICATIONS)
}

/// Fetches and prints the instance table of an application.
///
/// # Errors
/// Propagates client errors and write failures.
pub async fn list_instances(client: &DroveClient, options: &ListOptions) -> Result<(), Error> {
    let data = client
        .get(&instances_path(&options.app_id, options.old), 200)
        .await?;
    let rows = instance_rows(&data, usize::from(options.sort), options.reverse);
    output::print_table(&LIST_HEADERS, &rows)?;
    Ok(())
}

/// Fetches and prints the details of one instance.
///
/// # Errors
/// Propagates client errors and write failures.
pub async fn show_instance(client: &DroveClient, instance: &InstanceRef) -> Result<(), Error> {
    let path = format!(
        "{}/{}",
        instances_path(&instance.app_id, false),
        instance.instance_id
    );
    let data = client.get(&path, 200).await?;
    output::print_dict(&instance_details(&data))?;
    Ok(())
}

fn instance_row(instance: &Value) -> Vec<String> {
    vec![
        value_text(instance.get("instanceId")),
        value_text(instance.pointer("/localInfo/hostname")),
        value_text(instance.get("state")),
        value_text(instance.get("errorMessage")),
        to_date(instance.get("created")),
        to_date(instance.get("updated")),
    ]
}

/// Table rows for an instance listing, sorted on `column`.
///
/// A payload that is not an array yields no rows.
#[must_use]
pub fn instance_rows(data: &Value, column: usize, reverse: bool) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = data
        .as_array()
        .map(|instances| instances.iter().map(instance_row).collect())
        .unwrap_or_default();
    sort_rows(&mut rows, column, reverse);
    rows
}

/// Stable sort on one column; rows with equal keys keep their order either way.
pub fn sort_rows(rows: &mut [Vec<String>], column: usize, reverse: bool) {
    rows.sort_by(|a, b| {
        let ordering = a.get(column).cmp(&b.get(column));
        if reverse {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

fn numa_summary(nodes: Option<&Value>, label: &str) -> String {
    nodes
        .and_then(Value::as_object)
        .map(|nodes| {
            nodes
                .iter()
                .map(|(node, value)| format!("NUMA Node {node}: {label}: {}", value_text(Some(value))))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

fn resource<'a>(instance: &'a Value, kind: &str) -> Option<&'a Value> {
    instance
        .get("resources")
        .and_then(Value::as_array)?
        .iter()
        .find(|r| r.get("type").and_then(Value::as_str) == Some(kind))
}

fn ports_summary(ports: Option<&Map<String, Value>>) -> String {
    ports
        .map(|ports| {
            ports
                .iter()
                .map(|(name, port)| {
                    format!(
                        "Name: {name} Container: {} Host: {} Type: {}",
                        value_text(port.get("containerPort")),
                        value_text(port.get("hostPort")),
                        value_text(port.get("portType")),
                    )
                })
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

fn metadata_summary(metadata: Option<&Map<String, Value>>) -> String {
    metadata
        .map(|metadata| {
            metadata
                .iter()
                .map(|(key, value)| format!("{key}: {}", value_text(Some(value))))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

/// Key/value rows describing a single instance.
#[must_use]
pub fn instance_details(instance: &Value) -> Vec<(String, String)> {
    let mut details = vec![
        ("Instance ID".to_string(), value_text(instance.get("instanceId"))),
        ("App ID".to_string(), value_text(instance.get("appId"))),
        ("State".to_string(), value_text(instance.get("state"))),
        (
            "Host".to_string(),
            value_text(instance.pointer("/localInfo/hostname")),
        ),
    ];

    if let Some(cpu) = resource(instance, "CPU") {
        details.push((
            "CPU".to_string(),
            numa_summary(cpu.get("cores"), "Cores"),
        ));
    }
    if let Some(memory) = resource(instance, "MEMORY") {
        details.push((
            "Memory (MB)".to_string(),
            numa_summary(memory.get("memoryInMB"), "Memory"),
        ));
    }

    details.push((
        "Ports".to_string(),
        ports_summary(instance.pointer("/localInfo/ports").and_then(Value::as_object)),
    ));
    details.push((
        "Metadata".to_string(),
        metadata_summary(instance.get("metadata").and_then(Value::as_object)),
    ));
    details.push((
        "Error Message".to_string(),
        value_text(instance.get("errorMessage")).trim_matches('\n').to_string(),
    ));
    details.push(("Created".to_string(), to_date(instance.get("created"))));
    details.push(("Last Updated".to_string(), to_date(instance.get("updated"))));
    details
}

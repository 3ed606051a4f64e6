
use clap::{ArgMatches, Args};
use drove_cli::cli::root_command;
use drove_cli::client::DroveClient;
use drove_cli::error::Error;
use drove_cli::plugin::{parse_options, CommandRegistry, HandlerFuture, Plugin};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use test_helpers::{start_client, success};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer};

static NODES_LIST_CALLS: AtomicUsize = AtomicUsize::new(0);
static TASKS_SHOW_CALLS: AtomicUsize = AtomicUsize::new(0);
static LAST_TASK: Mutex<Option<(String, bool)>> = Mutex::new(None);
// Tests that read the counters above must not overlap
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Args)]
struct NodesListOptions {}

#[derive(Debug, Args)]
struct TaskShowOptions {
    /// Task ID
    task_id: String,
    #[arg(long, short)]
    all: bool,
}

fn nodes_list<'a>(client: &'a DroveClient, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    Box::pin(async move {
        let _: NodesListOptions = parse_options(matches)?;
        client.get("/apis/v1/cluster/executors", 200).await?;
        NODES_LIST_CALLS.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

fn task_show<'a>(_client: &'a DroveClient, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    Box::pin(async move {
        let options: TaskShowOptions = parse_options(matches)?;
        *LAST_TASK.lock().unwrap() = Some((options.task_id, options.all));
        TASKS_SHOW_CALLS.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

struct Nodes;

impl Plugin for Nodes {
    fn name(&self) -> &'static str {
        "nodes"
    }

    fn populate_options(&self, registry: &mut CommandRegistry) -> Result<(), Error> {
        registry
            .add_group("nodes", "Cluster nodes")?
            .leaf::<NodesListOptions>("list", "List nodes", nodes_list)?;
        Ok(())
    }
}

struct Tasks;

impl Plugin for Tasks {
    fn name(&self) -> &'static str {
        "tasks"
    }

    fn populate_options(&self, registry: &mut CommandRegistry) -> Result<(), Error> {
        registry
            .add_group("tasks", "Tasks")?
            .leaf::<TaskShowOptions>("show", "Show a task", task_show)?;
        Ok(())
    }
}

/// Claims a group another plugin already owns
struct Impostor;

impl Plugin for Impostor {
    fn name(&self) -> &'static str {
        "impostor"
    }

    fn populate_options(&self, registry: &mut CommandRegistry) -> Result<(), Error> {
        registry.add_group("nodes", "Not really nodes")?;
        Ok(())
    }
}

fn plugins() -> Vec<Box<dyn Plugin>> {
    vec![Box::new(Nodes), Box::new(Tasks)]
}

#[tokio::test]
async fn test_dispatch_reaches_only_the_selected_handler() {
    let _serial = serial();
    let server = MockServer::start().await;
    let client = start_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/apis/v1/cluster/executors"))
        .respond_with(success(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let registry = CommandRegistry::with_plugins(root_command(), &plugins()).unwrap();

    let nodes_before = NODES_LIST_CALLS.load(Ordering::SeqCst);
    let tasks_before = TASKS_SHOW_CALLS.load(Ordering::SeqCst);

    let invocation = registry.parse_from(["drove", "nodes", "list"]).unwrap();
    registry.dispatch(&client, &invocation).await.unwrap();

    assert_eq!(NODES_LIST_CALLS.load(Ordering::SeqCst), nodes_before + 1);
    assert_eq!(TASKS_SHOW_CALLS.load(Ordering::SeqCst), tasks_before);
}

#[tokio::test]
async fn test_handler_receives_typed_options() {
    let _serial = serial();
    let server = MockServer::start().await;
    let client = start_client(&server).await;
    let registry = CommandRegistry::with_plugins(root_command(), &plugins()).unwrap();

    let invocation = registry
        .parse_from(["drove", "tasks", "show", "T-42", "--all"])
        .unwrap();
    registry.dispatch(&client, &invocation).await.unwrap();

    assert_eq!(
        LAST_TASK.lock().unwrap().clone(),
        Some(("T-42".to_string(), true))
    );
}

#[tokio::test]
async fn test_handler_errors_propagate_from_dispatch() {
    let server = MockServer::start().await;
    let client = start_client(&server).await;
    // Nothing mounted for the executors path: wiremock answers 404
    let registry = CommandRegistry::with_plugins(root_command(), &plugins()).unwrap();

    let invocation = registry.parse_from(["drove", "nodes", "list"]).unwrap();
    let err = registry.dispatch(&client, &invocation).await.unwrap_err();
    let drove = err.as_drove().unwrap();
    assert_eq!(drove.status_code, 404);
}

#[test]
fn test_plugins_are_independent_of_registration_order() {
    let forward = CommandRegistry::with_plugins(root_command(), &plugins()).unwrap();
    let reversed: Vec<Box<dyn Plugin>> = vec![Box::new(Tasks), Box::new(Nodes)];
    let backward = CommandRegistry::with_plugins(root_command(), &reversed).unwrap();

    for registry in [&forward, &backward] {
        assert!(registry.handler("nodes", "list").is_some());
        assert!(registry.handler("tasks", "show").is_some());
    }
}

#[test]
fn test_duplicate_group_across_plugins_fails() {
    let plugins: Vec<Box<dyn Plugin>> = vec![Box::new(Nodes), Box::new(Impostor)];
    let err = CommandRegistry::with_plugins(root_command(), &plugins).unwrap_err();
    assert!(matches!(err, Error::DuplicateCommandGroup { name } if name == "nodes"));
}

#[test]
fn test_unregistered_group_is_usage_error() {
    let registry = CommandRegistry::with_plugins(root_command(), &plugins()).unwrap();
    let err = registry.parse_from(["drove", "apps", "list"]).unwrap_err();
    assert!(matches!(err, Error::Usage(_)));
}

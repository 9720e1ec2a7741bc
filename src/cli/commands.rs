//! Command dispatch

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::generate;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::application::services::{FilterOutcome, RenderedDoc};
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::display;
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{DomainError, NodeTree};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::api::ApiError;
use crate::infrastructure::traits::{MessageSource, SelectionItem};
use crate::infrastructure::InfraError;

const NOTHING_FOUND: &str = "No aspects found";

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see --help".to_string(),
        ));
    };

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "dskview", &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => config(cli, command),
        command => {
            let container = ServiceContainer::new(load_settings(cli)?)?;
            run(cli, &container, command)
        }
    }
}

/// Run a command against an assembled container.
pub fn run(cli: &Cli, container: &ServiceContainer, command: &Commands) -> CliResult<()> {
    match command {
        Commands::Tree { filter } => tree(cli, container, filter.as_deref()),
        Commands::Filter { query } => tree(cli, container, Some(query)),
        Commands::Flatten => flatten(cli, container),
        Commands::Search { query } => search(cli, container, query),
        Commands::Show { url } => show(cli, container, url),
        Commands::Pick => pick(cli, container),
        Commands::Watch { filter, node } => {
            watch(cli, container, filter.as_deref(), node.as_deref())
        }
        Commands::Hello => hello(cli, container),
        Commands::Config { .. } | Commands::Completion { .. } => Err(CliError::Usage(
            "command does not talk to the backend".to_string(),
        )),
    }
}

fn local_dir(cli: &Cli) -> Option<PathBuf> {
    cli.dir.clone().or_else(|| std::env::current_dir().ok())
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let settings = Settings::load(local_dir(cli).as_deref())?;
    Ok(settings.with_overrides(cli.api_url.clone(), cli.source.clone()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| InfraError::io("write json", e.into()))?;
    output::info(&json);
    Ok(())
}

fn print_tree(cli: &Cli, tree: &NodeTree, filtered: bool) -> CliResult<()> {
    if cli.json {
        return print_json(&tree.to_node());
    }
    if filtered && tree.len() <= 1 {
        output::warning(NOTHING_FOUND);
        return Ok(());
    }
    match display::node_tree(tree) {
        Some(rendered) => output::info(&rendered),
        None => output::warning(NOTHING_FOUND),
    }
    Ok(())
}

#[instrument(level = "debug", skip(cli, container))]
fn tree(cli: &Cli, container: &ServiceContainer, filter: Option<&str>) -> CliResult<()> {
    container.store.sync()?;
    let Some(query) = filter else {
        let tree = container.navigation.visible_tree()?;
        return print_tree(cli, &tree, false);
    };

    match container.navigation.set_filter(query)? {
        FilterOutcome::Applied(filtered) => print_tree(cli, &filtered, true),
        FilterOutcome::Cleared => {
            let tree = container.navigation.visible_tree()?;
            print_tree(cli, &tree, false)
        }
        FilterOutcome::Stale => {
            debug!("filter {:?} superseded", query);
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct FlatEntry<'a> {
    url: &'a str,
    title: &'a str,
}

fn flatten(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    container.store.sync()?;
    let flat = container.store.flatten()?;

    if cli.json {
        let entries: Vec<_> = flat
            .iter()
            .map(|n| FlatEntry {
                url: &n.url,
                title: &n.title,
            })
            .collect();
        return print_json(&entries);
    }
    for node in flat.iter() {
        output::info(&format!("{}\t{}", node.url, node.title));
    }
    Ok(())
}

fn search(cli: &Cli, container: &ServiceContainer, query: &str) -> CliResult<()> {
    let hits = container.navigation.search(query)?;
    if cli.json {
        return print_json(&hits);
    }
    if hits.is_empty() {
        output::warning(NOTHING_FOUND);
        return Ok(());
    }
    for hit in &hits {
        let title = if hit.title.is_empty() { &hit.url } else { &hit.title };
        output::action(title, &hit.url);
        if !hit.description.is_empty() {
            output::detail(&hit.description);
        }
        for fragment in &hit.fragments {
            output::detail(&format!("… {fragment}"));
        }
    }
    Ok(())
}

fn print_docs(cli: &Cli, url: &str, docs: &[RenderedDoc]) -> CliResult<()> {
    if cli.json {
        return print_json(docs);
    }
    output::header(url);
    if docs.is_empty() {
        output::detail("(no documents)");
    }
    for doc in docs {
        output::info(&display::render_tree(&doc.title, &doc.content));
    }
    Ok(())
}

fn render(cli: &Cli, container: &ServiceContainer, url: &str) -> CliResult<()> {
    let detail = container.navigation.open(url)?;
    let docs = container.documents.render_node(&detail)?;
    print_docs(cli, &detail.url, &docs)
}

#[instrument(level = "debug", skip(cli, container))]
fn show(cli: &Cli, container: &ServiceContainer, url: &str) -> CliResult<()> {
    let url = url.trim().trim_matches('/');
    if url.is_empty() {
        return Err(CliError::InvalidArgs(
            "node url must not be empty, the root has no documents".to_string(),
        ));
    }
    render(cli, container, url)
}

fn pick(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    container.store.sync()?;
    let items: Vec<SelectionItem> = container
        .store
        .flatten()?
        .iter()
        .map(|n| SelectionItem {
            display: n.to_string(),
            value: n.url.clone(),
        })
        .collect();

    let selected = container
        .selector
        .select_one(&items, "node> ")
        .map_err(|message| InfraError::Selector { message })?;

    match selected {
        Some(item) => render(cli, container, &item.value),
        None => {
            info!("selection cancelled");
            Ok(())
        }
    }
}

#[instrument(level = "debug", skip(cli, container))]
fn watch(
    cli: &Cli,
    container: &ServiceContainer,
    filter: Option<&str>,
    node: Option<&str>,
) -> CliResult<()> {
    tree(cli, container, filter)?;
    if let Some(url) = node {
        render(cli, container, url)?;
    }

    let mut messages = container.connect_messages()?;
    output::success(&format!("watching {}", container.settings.api_url));
    follow(cli, container, messages.as_mut())
}

/// Failures that leave the last good tree in place; watching goes on.
fn is_transient(e: &ApplicationError) -> bool {
    matches!(
        e,
        ApplicationError::Network { .. }
            | ApplicationError::Decode { .. }
            | ApplicationError::Domain(DomainError::DuplicateUrl(_))
    )
}

/// React to push messages until the channel closes.
pub fn follow(
    cli: &Cli,
    container: &ServiceContainer,
    messages: &mut dyn MessageSource,
) -> CliResult<()> {
    loop {
        let msg = match messages.next_message() {
            Ok(Some(msg)) => msg,
            Ok(None) => break,
            Err(e @ ApiError::Decode { .. }) => {
                warn!("skipping message: {}", e);
                continue;
            }
            Err(e) => {
                return Err(InfraError::Messages {
                    message: e.to_string(),
                }
                .into())
            }
        };

        let refresh = match container.navigation.handle_message(&msg) {
            Ok(refresh) => refresh,
            Err(e) if is_transient(&e) => {
                output::warning(&e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if !refresh.resynced {
            continue;
        }
        output::success(&msg.text);
        let tree = container.navigation.visible_tree()?;
        print_tree(cli, &tree, refresh.refiltered)?;
        if refresh.active_gone {
            output::warning("current aspect has gone away after tree sync");
        }
        if refresh.reload_active {
            if let Some(url) = container.navigation.active() {
                match render(cli, container, &url) {
                    Err(CliError::Infra(InfraError::Application(e))) if is_transient(&e) => {
                        output::warning(&e)
                    }
                    other => other?,
                }
            }
        }
    }
    info!("message channel closed");
    Ok(())
}

fn hello(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    let hello = container
        .api
        .hello()
        .map_err(|e| ApplicationError::Network {
            context: "hello".to_string(),
            source: e,
        })?;
    if cli.json {
        return print_json(&hello);
    }
    output::action(&hello.hello, &format!("{} / {}", hello.org, hello.project));
    output::detail(&format!("version {}", hello.version));
    Ok(())
}

fn config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            let describe = |path: PathBuf| {
                let state = if path.exists() { "exists" } else { "missing" };
                format!("{} ({state})", path.display())
            };
            match global_config_path() {
                Some(path) => output::action("global", &describe(path)),
                None => output::action("global", &"(no config directory)"),
            }
            if let Some(dir) = local_dir(cli) {
                output::action("local", &describe(local_config_path(&dir)));
            }
        }
    }
    Ok(())
}

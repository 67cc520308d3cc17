//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{ForestService, ForestSummary, NodeSummary};
use crate::application::{Entry, Key};
use crate::cli::args::{Cli, Commands, ConfigCommands, Scope};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{Forest, Priority, Record, Shape, View};
use crate::tree_traits::{dismantle, TreeNodeConvert};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Completion { shell }) => {
            generate(*shell, &mut Cli::command(), "forestry", &mut io::stdout());
            Ok(())
        }
        Some(command) => {
            let service = ForestService::new(load_settings(cli)?);
            match command {
                Commands::Tree {
                    file,
                    scope,
                    priority,
                } => cmd_tree(&service, file, *scope, *priority),
                Commands::List {
                    file,
                    scope,
                    shape,
                    priority,
                    distance,
                    json,
                } => cmd_list(&service, file, *scope, *shape, *priority, *distance, *json),
                Commands::Descendants {
                    file,
                    id,
                    max_depth,
                    include_self,
                    json,
                } => cmd_descendants(&service, file, id, *max_depth, *include_self, *json),
                Commands::Info { file, json } => cmd_info(&service, file, *json),
                Commands::Config { command } => cmd_config(cli, service.settings(), command),
                Commands::Completion { .. } => Ok(()),
            }
        }
        None => Err(CliError::Usage(
            "no command given, see 'forestry --help'".into(),
        )),
    }
}

/// Settings from config layers, with the `--cycle-policy` flag on top.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let local_dir = match &cli.config_dir {
        Some(dir) => {
            if !dir.is_dir() {
                return Err(CliError::InvalidArgs(format!(
                    "not a directory: {}",
                    dir.display()
                )));
            }
            Some(dir.clone())
        }
        None => std::env::current_dir().ok(),
    };
    let mut settings = Settings::load(local_dir.as_deref())?;
    if let Some(policy) = cli.cycle_policy {
        settings.cycle_policy = policy;
    }
    debug!(?settings, "effective settings");
    Ok(settings)
}

fn select<'a>(
    forest: &'a Forest<Entry>,
    scope: Scope,
    shape: Shape,
    priority: Priority,
) -> View<'a, Entry> {
    match scope {
        Scope::Linked => forest.linked(shape),
        Scope::Unlinked => forest.unlinked(shape),
        Scope::Both => forest.both(shape, priority),
    }
}

#[instrument(level = "debug", skip(service))]
fn cmd_tree(
    service: &ForestService,
    file: &Path,
    scope: Scope,
    priority: Option<Priority>,
) -> CliResult<()> {
    let forest = service.load(file)?;
    let priority = priority.unwrap_or(service.settings().priority);
    let view = select(&forest, scope, Shape::Tree, priority);
    if view.is_empty() {
        output::warning("no trees in selection");
    }
    for top in view.iter() {
        let tree = top.to_tree_string();
        output::info(&tree);
        dismantle(tree);
    }
    Ok(())
}

#[instrument(level = "debug", skip(service))]
fn cmd_list(
    service: &ForestService,
    file: &Path,
    scope: Scope,
    shape: Option<Shape>,
    priority: Option<Priority>,
    distance: bool,
    json: bool,
) -> CliResult<()> {
    let forest = service.load(file)?;
    let settings = service.settings();
    let view = select(
        &forest,
        scope,
        shape.unwrap_or(settings.shape),
        priority.unwrap_or(settings.priority),
    );

    if json {
        let summaries: Vec<NodeSummary> = view.iter().map(NodeSummary::from_node).collect();
        output::info(&serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    let show_distance = distance || settings.show_distance;
    for node in view.iter() {
        let hops = node.distance_to_base();
        output::node_line(
            hops,
            &node.record().label(),
            node.is_linked(),
            show_distance.then_some(hops),
        );
    }
    Ok(())
}

#[instrument(level = "debug", skip(service))]
fn cmd_descendants(
    service: &ForestService,
    file: &Path,
    id: &Key,
    max_depth: Option<usize>,
    include_self: bool,
    json: bool,
) -> CliResult<()> {
    let forest = service.load(file)?;
    let node = ForestService::find(&forest, id)?;
    let found = node.descendants(max_depth, include_self);

    if json {
        let summaries: Vec<NodeSummary> = found.into_iter().map(NodeSummary::from_node).collect();
        output::info(&serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    let offset = node.distance_to_base();
    for descendant in found {
        output::node_line(
            descendant.distance_to_base() - offset,
            &descendant.record().label(),
            descendant.is_linked(),
            None,
        );
    }
    Ok(())
}

#[instrument(level = "debug", skip(service))]
fn cmd_info(service: &ForestService, file: &Path, json: bool) -> CliResult<()> {
    let forest = service.load(file)?;
    let summary = ForestSummary::of(&forest);

    if json {
        output::info(&serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    output::header(&file.display());
    output::field("nodes", &summary.nodes);
    output::field("trees", &summary.trees);
    output::field("unlinked bases", &summary.unlinked_bases);
    output::field("linked nodes", &summary.linked_nodes);
    output::field("unlinked nodes", &summary.unlinked_nodes);
    output::field("max depth", &summary.max_depth);
    Ok(())
}

fn cmd_config(cli: &Cli, settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::field("global", &path.display()),
                None => output::warning("no config directory for this platform"),
            }
            let local_dir = match &cli.config_dir {
                Some(dir) => Some(dir.clone()),
                None => std::env::current_dir().ok(),
            };
            if let Some(dir) = local_dir {
                output::field("local", &local_config_path(&dir).display());
            }
        }
    }
    Ok(())
}

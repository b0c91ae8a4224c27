//! Command dispatch

use std::cmp::Ordering;
use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::Catalog;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::NodeRef;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::{InfraError, InfraResult};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let cwd = current_dir()?;
    let settings = Settings::load(Some(cwd.as_path()))?;
    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::Config { command }) => return config(&container.settings, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            return Ok(());
        }
        Some(_) => {}
        None => return Err(CliError::Usage("no command given, see --help".into())),
    }

    let catalog = match &cli.catalog {
        Some(path) => container.catalog_service.load(path)?,
        None => container.catalog_service.load_default()?,
    };
    let mark_abstract = container.settings.mark_abstract;

    match &cli.command {
        Some(Commands::Tree { path }) => tree(&catalog, path.as_deref(), mark_abstract),
        Some(Commands::Children { path }) => children(&catalog, path),
        Some(Commands::Descendants { path, include_self }) => descendants(&catalog, path, *include_self),
        Some(Commands::Ancestors {
            path,
            ascending,
            include_self,
        }) => ancestors(&catalog, path, *ascending, *include_self),
        Some(Commands::Family { path }) => family(&catalog, path),
        Some(Commands::Compare { left, right }) => compare(&catalog, left, right),
        Some(Commands::Resolve { tree, name }) => resolve(&catalog, tree, name),
        Some(Commands::Related { item }) => related(&catalog, item),
        _ => Ok(()),
    }
}

fn current_dir() -> InfraResult<PathBuf> {
    std::env::current_dir().map_err(|e| InfraError::io("current directory", e))
}

fn print_nodes<'a>(nodes: impl IntoIterator<Item = NodeRef<'a>>) {
    for node in nodes {
        output::info(&node);
    }
}

#[instrument(skip(catalog))]
fn tree(catalog: &Catalog, path: Option<&str>, mark_abstract: bool) -> CliResult<()> {
    let roots: Vec<NodeRef<'_>> = match path {
        Some(path) => vec![catalog.resolve(path)?],
        None => catalog.trees().collect(),
    };
    debug!("rendering {} trees", roots.len());
    for root in roots {
        let rendered = catalog.registry().to_tree_string(root.id(), mark_abstract)?;
        output::info(&rendered);
    }
    Ok(())
}

#[instrument(skip(catalog))]
fn children(catalog: &Catalog, path: &str) -> CliResult<()> {
    print_nodes(catalog.resolve(path)?);
    Ok(())
}

#[instrument(skip(catalog))]
fn descendants(catalog: &Catalog, path: &str, include_self: bool) -> CliResult<()> {
    print_nodes(catalog.resolve(path)?.descendants(include_self));
    Ok(())
}

#[instrument(skip(catalog))]
fn ancestors(catalog: &Catalog, path: &str, ascending: bool, include_self: bool) -> CliResult<()> {
    print_nodes(catalog.resolve(path)?.ancestors(ascending, include_self)?);
    Ok(())
}

#[instrument(skip(catalog))]
fn family(catalog: &Catalog, path: &str) -> CliResult<()> {
    print_nodes(catalog.resolve(path)?.family()?);
    Ok(())
}

#[instrument(skip(catalog))]
fn compare(catalog: &Catalog, left: &str, right: &str) -> CliResult<()> {
    let l = catalog.resolve(left)?;
    let r = catalog.resolve(right)?;
    let sign = match l.try_cmp(&r)? {
        Ordering::Less => "<",
        Ordering::Equal => "==",
        Ordering::Greater => ">",
    };
    output::info(&format!("{} {} {}", l, sign, r));
    Ok(())
}

#[instrument(skip(catalog))]
fn resolve(catalog: &Catalog, tree: &str, name: &str) -> CliResult<()> {
    let found = catalog.resolve(tree)?.deserialize(name)?;
    output::info(&found.serialize_name());
    Ok(())
}

#[instrument(skip(catalog))]
fn related(catalog: &Catalog, item: &str) -> CliResult<()> {
    let related = catalog.related(item)?;
    if related.is_empty() {
        output::info(&format!("no categories linked onto '{}'", item));
    }
    for (attr, nodes) in related {
        output::header(&format!("{}.{}", item, attr));
        output::detail(&nodes.iter().join(", "));
    }
    Ok(())
}

fn config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            if let Some(global) = global_config_path() {
                output::info(&format!("global: {}", global.display()));
            }
            output::info(&format!("local:  {}", local_config_path(&current_dir()?).display()));
            output::info(&format!("catalog: {}", settings.catalog.display()));
        }
    }
    Ok(())
}

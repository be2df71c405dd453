use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;

use fortios_core::differ::create_plan;
use fortios_core::mapper::describe;
use fortios_core::plan::{Effect, Plan};
use fortios_core::provider::{Provider, ProviderError, ResourceType};
use fortios_core::resource::{Resource, ResourceId, State, Value};
use fortios_core::schema::ResourceSchema;
use fortios_provider::resources::{get_resource_config, resource_types};
use fortios_provider::schemas::{self, ResourceKind};
use fortios_provider::{FortiosProvider, ProviderConfig};
use fortios_state::{BackendConfig, LocalBackend, ResourceState, StateBackend, StateFile};

mod manifest;

#[derive(Parser)]
#[command(name = "fortios")]
#[command(about = "Manage FortiGate configuration objects through the FortiOS REST API", long_about = None)]
struct Cli {
    /// Provider configuration file (JSON). FORTIOS_* variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the state file
    #[arg(long, global = true, default_value = LocalBackend::DEFAULT_STATE_FILE)]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List object types, or show the field descriptors of one type
    Schema {
        /// Object type (e.g., firewall_address)
        resource_type: Option<String>,

        /// Show the data source flavour of the type
        #[arg(long, requires = "resource_type")]
        data_source: bool,
    },
    /// Validate a manifest without contacting the device
    Validate {
        /// Path to manifest
        #[arg(default_value = "fortios.json")]
        file: PathBuf,
    },
    /// Show execution plan without applying changes
    Plan {
        /// Path to manifest
        #[arg(default_value = "fortios.json")]
        file: PathBuf,
    },
    /// Apply changes to reach the desired state
    Apply {
        /// Path to manifest
        #[arg(default_value = "fortios.json")]
        file: PathBuf,
    },
    /// Delete every managed object of the manifest
    Destroy {
        /// Path to manifest
        #[arg(default_value = "fortios.json")]
        file: PathBuf,

        /// Skip confirmation prompt (auto-approve)
        #[arg(long)]
        auto_approve: bool,
    },
    /// Read one object from the device and print it
    Read {
        /// Object type (e.g., firewall_address)
        resource_type: String,
        /// Object key (mkey). Ignored for singleton types.
        mkey: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Schema {
            resource_type,
            data_source,
        } => run_schema(resource_type.as_deref(), data_source),
        Commands::Validate { file } => run_validate(&file),
        Commands::Plan { file } => run_plan(&file, config, &cli.state).await,
        Commands::Apply { file } => run_apply(&file, config, &cli.state).await,
        Commands::Destroy { file, auto_approve } => {
            run_destroy(&file, config, &cli.state, auto_approve).await
        }
        Commands::Read {
            resource_type,
            mkey,
        } => run_read(&resource_type, &mkey, config).await,
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn schema_map(types: Vec<Box<dyn ResourceType>>) -> HashMap<String, ResourceSchema> {
    types
        .into_iter()
        .map(|t| (t.name().to_string(), t.schema()))
        .collect()
}

fn get_provider(config: Option<&Path>) -> Result<Box<dyn Provider>> {
    let config = ProviderConfig::load(config).context("Invalid provider configuration")?;
    log::info!("using FortiGate at {}", config.hostname);
    let provider = FortiosProvider::new(&config)?;
    Ok(Box::new(provider))
}

async fn open_state(path: &Path) -> Result<(Box<dyn StateBackend>, StateFile)> {
    let backend =
        fortios_state::create_backend(&BackendConfig::local(path.display().to_string())).await?;
    let state = backend.read_state().await?.unwrap_or_default();
    Ok((backend, state))
}

fn run_schema(resource_type: Option<&str>, data_source: bool) -> Result<()> {
    let Some(resource_type) = resource_type else {
        println!("{}", "Object types:".cyan().bold());
        for config in schemas::configs() {
            let kind = match config.kind {
                ResourceKind::Collection { mkey } => format!("collection, key {}", mkey),
                ResourceKind::Singleton => "singleton".to_string(),
            };
            let data_source = if config.data_source {
                ", data source"
            } else {
                ""
            };
            println!(
                "  • {} ({}{}) {}",
                config.resource_type().bold(),
                kind,
                data_source,
                config.path.dimmed()
            );
        }
        return Ok(());
    };

    let config = get_resource_config(resource_type)
        .ok_or_else(|| anyhow!("Unknown resource type: {}", resource_type))?;
    let schema = if data_source {
        config
            .data_source_schema()
            .ok_or_else(|| anyhow!("{} is not available as a data source", resource_type))?
    } else {
        config.schema
    };
    println!("{}", serde_json::to_string_pretty(&describe(&schema))?);
    Ok(())
}

fn run_validate(file: &Path) -> Result<()> {
    let schemas = schema_map(resource_types());
    let resources = manifest::load(file, &schemas)?;

    println!("{}", "Validating...".cyan());
    manifest::validate(&resources, &schemas)?;

    println!(
        "{}",
        format!("✓ {} resources validated successfully.", resources.len())
            .green()
            .bold()
    );
    for resource in &resources {
        println!("  • {}", resource.id);
    }
    Ok(())
}

async fn run_plan(file: &Path, config: Option<&Path>, state_path: &Path) -> Result<()> {
    let provider = get_provider(config)?;
    let schemas = schema_map(provider.resource_types());
    let resources = manifest::load(file, &schemas)?;
    manifest::validate(&resources, &schemas)?;

    let (_, state_file) = open_state(state_path).await?;

    let current = refresh(provider.as_ref(), &resources, &state_file).await?;
    let plan = build_plan(&resources, &current, &state_file, &schemas);
    print_plan(&plan);
    Ok(())
}

async fn run_apply(file: &Path, config: Option<&Path>, state_path: &Path) -> Result<()> {
    let provider = get_provider(config)?;
    let schemas = schema_map(provider.resource_types());
    let resources = manifest::load(file, &schemas)?;
    manifest::validate(&resources, &schemas)?;

    let (backend, mut state_file) = open_state(state_path).await?;

    let current = refresh(provider.as_ref(), &resources, &state_file).await?;
    let plan = build_plan(&resources, &current, &state_file, &schemas);

    if plan.is_empty() {
        println!("{}", "No changes needed.".green());
        return Ok(());
    }

    print_plan(&plan);
    println!();
    println!("{}", "Applying changes...".cyan().bold());
    println!();

    let mut success_count = 0;
    let mut failure_count = 0;

    for effect in plan.effects() {
        let result = match effect {
            Effect::Create(resource) => provider
                .create(resource)
                .await
                .map(|state| state_file.upsert_resource(ResourceState::from_state(&state))),
            Effect::Update { id, from, to, .. } => match from.identifier.as_deref() {
                Some(identifier) => provider
                    .update(id, identifier, from, to)
                    .await
                    .map(|state| state_file.upsert_resource(ResourceState::from_state(&state))),
                None => Err(ProviderError::new("no device identifier known")
                    .for_resource(id.clone())),
            },
            Effect::Delete {
                id,
                identifier,
                vdom,
            } => provider
                .delete(id, identifier, vdom.as_deref())
                .await
                .map(|()| {
                    state_file.remove_resource(&id.resource_type, &id.name);
                }),
        };

        match result {
            Ok(()) => {
                println!("  {} {}", "✓".green(), format_effect(effect));
                success_count += 1;
            }
            Err(e) => {
                println!("  {} {} - {}", "✗".red(), format_effect(effect), e);
                failure_count += 1;
            }
        }
    }

    state_file.increment_serial();
    backend.write_state(&state_file).await?;

    println!();
    if failure_count == 0 {
        println!(
            "{}",
            format!("Apply complete! {} changes applied.", success_count)
                .green()
                .bold()
        );
        Ok(())
    } else {
        bail!(
            "Apply failed. {} succeeded, {} failed.",
            success_count,
            failure_count
        )
    }
}

async fn run_destroy(
    file: &Path,
    config: Option<&Path>,
    state_path: &Path,
    auto_approve: bool,
) -> Result<()> {
    let schemas = schema_map(resource_types());
    let resources = manifest::load(file, &schemas)?;

    if resources.is_empty() {
        println!("{}", "No resources defined in configuration.".yellow());
        return Ok(());
    }

    let (backend, mut state_file) = open_state(state_path).await?;

    // Reverse declaration order: groups before the addresses they contain
    let mut plan = Plan::new();
    for resource in resources.iter().rev() {
        let Some(stored) = state_file.find_resource(&resource.id.resource_type, &resource.id.name)
        else {
            continue;
        };
        let Some(identifier) = stored.identifier.clone() else {
            continue;
        };
        plan.add(Effect::Delete {
            id: resource.id.clone(),
            identifier,
            vdom: stored.vdom().map(|v| v.to_string()),
        });
    }

    if plan.is_empty() {
        println!("{}", "No resources to destroy.".green());
        return Ok(());
    }

    println!("{}", "Destroy Plan:".red().bold());
    println!();
    for effect in plan.effects() {
        println!("  {} {}", "-".red().bold(), format_effect(effect));
    }
    println!();
    println!(
        "Plan: {} to destroy.",
        plan.effects().len().to_string().red()
    );
    println!();

    if !auto_approve && !confirm()? {
        println!();
        println!("{}", "Destroy cancelled.".yellow());
        return Ok(());
    }

    let provider = get_provider(config)?;

    println!("{}", "Destroying resources...".red().bold());
    println!();

    let mut success_count = 0;
    let mut failure_count = 0;
    for effect in plan.effects() {
        let Effect::Delete {
            id,
            identifier,
            vdom,
        } = effect
        else {
            continue;
        };
        match provider.delete(id, identifier, vdom.as_deref()).await {
            Ok(()) => {
                println!("  {} {}", "✓".green(), format_effect(effect));
                state_file.remove_resource(&id.resource_type, &id.name);
                success_count += 1;
            }
            Err(e) => {
                println!("  {} {} - {}", "✗".red(), format_effect(effect), e);
                failure_count += 1;
            }
        }
    }

    state_file.increment_serial();
    backend.write_state(&state_file).await?;

    println!();
    if failure_count == 0 {
        println!(
            "{}",
            format!("Destroy complete! {} resources destroyed.", success_count)
                .green()
                .bold()
        );
        Ok(())
    } else {
        bail!(
            "Destroy failed. {} succeeded, {} failed.",
            success_count,
            failure_count
        )
    }
}

async fn run_read(resource_type: &str, mkey: &str, config: Option<&Path>) -> Result<()> {
    check_data_source(resource_type)?;
    let provider = get_provider(config)?;

    let id = ResourceId::new(resource_type, mkey);
    let state = provider.read_data_source(&id, mkey).await?;

    println!(
        "{} {}",
        resource_type.cyan().bold(),
        state.identifier.as_deref().unwrap_or(mkey)
    );
    let attributes = Value::Map(state.attributes).to_json();
    println!("{}", serde_json::to_string_pretty(&attributes)?);
    Ok(())
}

fn check_data_source(resource_type: &str) -> Result<()> {
    match resource_types()
        .into_iter()
        .find(|t| t.name() == resource_type)
    {
        Some(t) if t.is_data_source() => Ok(()),
        Some(_) => bail!("{} is not available as a data source", resource_type),
        None => bail!("Unknown resource type: {}", resource_type),
    }
}

fn confirm() -> Result<bool> {
    println!(
        "{}",
        "Do you really want to destroy all resources?".yellow().bold()
    );
    println!(
        "  {}",
        "This action cannot be undone. Type 'yes' to confirm.".yellow()
    );
    print!("\n  Enter a value: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim() == "yes")
}

/// Read the current device state of every manifest resource
async fn refresh(
    provider: &dyn Provider,
    resources: &[Resource],
    state_file: &StateFile,
) -> Result<HashMap<ResourceId, State>> {
    let mut current = HashMap::new();
    for resource in resources {
        let stored = state_file.find_resource(&resource.id.resource_type, &resource.id.name);
        let identifier = stored.and_then(|s| s.identifier.as_deref());
        let vdom = resource
            .attributes
            .get("vdomparam")
            .and_then(|v| v.as_str())
            .or_else(|| stored.and_then(|s| s.vdom()));

        let state = provider
            .read(&resource.id, identifier, vdom)
            .await
            .with_context(|| format!("Failed to refresh {}", resource.id))?;
        current.insert(resource.id.clone(), state);
    }
    Ok(current)
}

/// Plan changes for the manifest. Objects in state that the manifest no
/// longer declares are deleted.
fn build_plan(
    resources: &[Resource],
    current: &HashMap<ResourceId, State>,
    state_file: &StateFile,
    schemas: &HashMap<String, ResourceSchema>,
) -> Plan {
    let mut plan = create_plan(resources, current, schemas);

    let declared: HashSet<&ResourceId> = resources.iter().map(|r| &r.id).collect();
    for stored in state_file.resources.iter().rev() {
        let id = ResourceId::new(&stored.resource_type, &stored.name);
        if declared.contains(&id) {
            continue;
        }
        if let Some(identifier) = &stored.identifier {
            plan.add(Effect::Delete {
                id,
                identifier: identifier.clone(),
                vdom: stored.vdom().map(|v| v.to_string()),
            });
        }
    }
    plan
}

fn print_plan(plan: &Plan) {
    if plan.is_empty() {
        println!("{}", "No changes. Configuration is up-to-date.".green());
        return;
    }

    println!("{}", "Execution Plan:".cyan().bold());
    println!();

    for effect in plan.effects() {
        match effect {
            Effect::Create(r) => {
                println!("  {} {}", "+".green().bold(), r.id.to_string().cyan().bold());
                let mut keys: Vec<_> = r.attributes.keys().collect();
                keys.sort_by(|a, b| match (a.as_str(), b.as_str()) {
                    ("name", _) => std::cmp::Ordering::Less,
                    (_, "name") => std::cmp::Ordering::Greater,
                    _ => a.cmp(b),
                });
                for key in keys {
                    println!(
                        "      {}: {}",
                        key,
                        format_value(&r.attributes[key]).green()
                    );
                }
            }
            Effect::Update {
                id,
                from,
                to,
                changed_attributes,
            } => {
                println!("  {} {}", "~".yellow().bold(), id.to_string().cyan().bold());
                for key in changed_attributes {
                    let old = from
                        .attributes
                        .get(key)
                        .map(format_value)
                        .unwrap_or_else(|| "(none)".to_string());
                    let new = to.attributes.get(key).map(format_value).unwrap_or_default();
                    println!("      {}: {} → {}", key, old.red(), new.green());
                }
            }
            Effect::Delete { id, identifier, .. } => {
                println!(
                    "  {} {} {}",
                    "-".red().bold(),
                    id.to_string().cyan().bold(),
                    format!("({})", identifier).dimmed()
                );
            }
        }
    }

    println!();
    println!("{}", plan.summary().to_string().bold());
}

fn format_effect(effect: &Effect) -> String {
    let id = effect.resource_id();
    match effect {
        Effect::Create(_) => format!("Create {}", id),
        Effect::Update { .. } => format!("Update {}", id),
        Effect::Delete { identifier, .. } => format!("Delete {} ({})", id, identifier),
    }
}

fn format_value(value: &Value) -> String {
    value.to_json().to_string()
}

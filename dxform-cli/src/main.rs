mod config;
mod output;

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use dxform_core::differ::{create_destroy_plan, create_plan, sort_by_dependencies};
use dxform_core::effect::Effect;
use dxform_core::interpreter::{EffectOutcome, Interpreter, resolve_references};
use dxform_core::plan::Plan;
use dxform_core::provider::Provider;
use dxform_core::resource::{ResourceId, State};
use dxform_provider_aws::DirectConnectProvider;
use dxform_provider_aws::resources::ResourceKind;
use dxform_state::{LockInfo, StateBackend, StateFile, create_backend};

use crate::config::{Config, resource_schemas};
use crate::output::{format_effect, print_plan, print_state};

#[derive(Parser)]
#[command(name = "dxform")]
#[command(about = "Declarative management of AWS Direct Connect", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "dxform.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration file
    Validate,
    /// Show execution plan without applying changes
    Plan,
    /// Apply changes to reach the desired state
    Apply {
        /// Skip confirmation prompt
        #[arg(long)]
        auto_approve: bool,
    },
    /// Destroy all resources defined in the configuration file
    Destroy {
        /// Skip confirmation prompt
        #[arg(long)]
        auto_approve: bool,
    },
    /// Print the recorded state
    Show,
    /// Bring an existing Direct Connect object under management
    Import {
        /// Resource address, e.g. dx_connection.primary
        address: String,
        /// AWS identifier of the object
        id: String,
    },
    /// Remove a lock left behind by an interrupted run
    ForceUnlock {
        lock_id: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate => run_validate(&cli.config),
        Commands::Plan => run_plan(&cli.config).await,
        Commands::Apply { auto_approve } => run_apply(&cli.config, auto_approve).await,
        Commands::Destroy { auto_approve } => run_destroy(&cli.config, auto_approve).await,
        Commands::Show => run_show(&cli.config).await,
        Commands::Import { address, id } => run_import(&cli.config, &address, &id).await,
        Commands::ForceUnlock { lock_id } => run_force_unlock(&cli.config, &lock_id).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn load(file: &PathBuf) -> Result<Config, String> {
    let config = Config::load(file)?;
    config.validate()?;
    Ok(config)
}

async fn connect(config: &Config) -> Result<DirectConnectProvider, String> {
    DirectConnectProvider::new(&config.provider)
        .await
        .map_err(|e| format!("Failed to configure AWS provider: {}", e))
}

fn open_backend(config: &Config) -> Result<Box<dyn StateBackend>, String> {
    create_backend(&config.backend).map_err(|e| e.to_string())
}

async fn read_state(backend: &dyn StateBackend) -> Result<StateFile, String> {
    Ok(backend
        .read_state()
        .await
        .map_err(|e| e.to_string())?
        .unwrap_or_default())
}

async fn write_state(backend: &dyn StateBackend, state: &mut StateFile) -> Result<(), String> {
    state.increment_serial();
    backend.write_state(state).await.map_err(|e| e.to_string())
}

async fn acquire(backend: &dyn StateBackend, operation: &str) -> Result<LockInfo, String> {
    backend
        .acquire_lock(operation)
        .await
        .map_err(|e| e.to_string())
}

/// Release `lock` whether or not the locked work succeeded. The work's own
/// error wins over a release failure.
async fn unlock<T>(
    backend: &dyn StateBackend,
    lock: LockInfo,
    result: Result<T, String>,
) -> Result<T, String> {
    if let Err(e) = backend.release_lock(&lock).await {
        log::error!("failed to release lock {}: {}", lock.id, e);
        if result.is_ok() {
            return Err(e.to_string());
        }
    }
    result
}

/// Re-read every recorded resource and every declared data source.
///
/// Recorded resources that no longer exist come back with `exists == false`.
/// Data sources whose arguments still reference unknown values are skipped.
async fn refresh(
    provider: &DirectConnectProvider,
    config: &Config,
    state: &StateFile,
) -> Result<HashMap<ResourceId, State>, String> {
    let mut current = HashMap::new();
    for prior in state.states().into_values() {
        let refreshed = provider.read(&prior).await.map_err(|e| e.to_string())?;
        if !refreshed.exists {
            log::warn!("{} no longer exists and will be recreated", prior.id);
        }
        current.insert(prior.id.clone(), refreshed);
    }

    for resource in sort_by_dependencies(&config.resources) {
        if !resource.is_data_source() {
            continue;
        }
        let bindings: HashMap<String, State> = current
            .values()
            .filter(|s| s.exists)
            .map(|s| (s.id.name.clone(), s.clone()))
            .collect();
        let resolved = resolve_references(&resource, &bindings);
        if resolved.attributes.values().any(|v| v.has_refs()) {
            log::debug!("{} depends on values known after apply", resource.id);
            continue;
        }
        let state = provider
            .read_data_source(&resolved)
            .await
            .map_err(|e| e.to_string())?;
        current.insert(resource.id.clone(), state);
    }

    Ok(current)
}

/// Record the refreshed copies of resources already in `state`; vanished
/// ones are dropped
fn record_refresh(state: &mut StateFile, current: &HashMap<ResourceId, State>, provider: &str) {
    for refreshed in current.values() {
        if state.find_resource(&refreshed.id).is_some() {
            state.record(refreshed, provider);
        }
    }
}

fn confirm(question: &str) -> Result<bool, String> {
    println!("{}", question.yellow().bold());
    println!("  {}", "Only 'yes' will be accepted to confirm.".yellow());
    print!("\n  Enter a value: ");
    std::io::stdout().flush().map_err(|e| e.to_string())?;

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .map_err(|e| e.to_string())?;
    println!();
    Ok(input.trim() == "yes")
}

/// Execute `plan` and record every outcome into `state`.
/// Returns the number of failed effects.
async fn execute(
    provider: DirectConnectProvider,
    plan: &Plan,
    current: &HashMap<ResourceId, State>,
    state: &mut StateFile,
) -> usize {
    let provider_name = provider.name();
    let mut interpreter = Interpreter::new(provider).with_states(current.values());
    let result = interpreter.apply(plan).await;

    for (effect, outcome) in plan.effects().iter().zip(&result.outcomes) {
        match outcome {
            Ok(EffectOutcome::Deleted { id }) => {
                state.remove_resource(id);
                println!("  {} {}", "✓".green(), format_effect(effect));
            }
            Ok(outcome) => {
                if let Some(new_state) = outcome.state()
                    && !matches!(effect, Effect::Read(_))
                {
                    state.record(new_state, provider_name);
                }
                if effect.is_mutating() {
                    println!("  {} {}", "✓".green(), format_effect(effect));
                }
            }
            Err(e) => println!("  {} {} - {}", "✗".red(), format_effect(effect), e),
        }
    }

    let skipped = plan.effects().len() - result.outcomes.len();
    if skipped > 0 {
        println!(
            "  {}",
            format!("{} remaining changes were not attempted", skipped).yellow()
        );
    }
    result.failure_count
}

fn run_validate(file: &PathBuf) -> Result<(), String> {
    println!("{}", "Validating...".cyan());
    let config = load(file)?;

    println!(
        "{}",
        format!(
            "✓ {} resources validated successfully.",
            config.resources.len()
        )
        .green()
        .bold()
    );
    for resource in &config.resources {
        let kind = if resource.is_data_source() { " (data)" } else { "" };
        println!("  • {}{}", resource.id, kind);
    }
    Ok(())
}

async fn run_plan(file: &PathBuf) -> Result<(), String> {
    let config = load(file)?;
    let backend = open_backend(&config)?;
    let state = read_state(backend.as_ref()).await?;
    let provider = connect(&config).await?;

    let current = refresh(&provider, &config, &state).await?;
    let schemas = resource_schemas();
    let plan = create_plan(&config.resources, &current, &schemas);
    print_plan(&plan, &schemas);
    Ok(())
}

async fn run_apply(file: &PathBuf, auto_approve: bool) -> Result<(), String> {
    let config = load(file)?;
    let backend = open_backend(&config)?;
    let provider = connect(&config).await?;

    let lock = acquire(backend.as_ref(), "apply").await?;
    let result = apply_locked(backend.as_ref(), provider, &config, auto_approve).await;
    unlock(backend.as_ref(), lock, result).await
}

async fn apply_locked(
    backend: &dyn StateBackend,
    provider: DirectConnectProvider,
    config: &Config,
    auto_approve: bool,
) -> Result<(), String> {
    let mut state = read_state(backend).await?;
    let current = refresh(&provider, config, &state).await?;
    record_refresh(&mut state, &current, provider.name());

    let schemas = resource_schemas();
    let plan = create_plan(&config.resources, &current, &schemas);
    if plan.mutation_count() == 0 {
        write_state(backend, &mut state).await?;
        println!("{}", "No changes needed.".green());
        return Ok(());
    }

    print_plan(&plan, &schemas);
    println!();
    if !auto_approve && !confirm("Do you want to perform these actions?")? {
        println!("{}", "Apply cancelled.".yellow());
        return Ok(());
    }

    println!("{}", "Applying changes...".cyan().bold());
    println!();
    let failures = execute(provider, &plan, &current, &mut state).await;
    write_state(backend, &mut state).await?;

    println!();
    if failures == 0 {
        println!(
            "{}",
            format!("Apply complete! {}", plan.summary()).green().bold()
        );
        Ok(())
    } else {
        Err(format!("Apply failed with {} errors", failures))
    }
}

async fn run_destroy(file: &PathBuf, auto_approve: bool) -> Result<(), String> {
    let config = load(file)?;
    let backend = open_backend(&config)?;
    let provider = connect(&config).await?;

    let lock = acquire(backend.as_ref(), "destroy").await?;
    let result = destroy_locked(backend.as_ref(), provider, &config, auto_approve).await;
    unlock(backend.as_ref(), lock, result).await
}

async fn destroy_locked(
    backend: &dyn StateBackend,
    provider: DirectConnectProvider,
    config: &Config,
    auto_approve: bool,
) -> Result<(), String> {
    let mut state = read_state(backend).await?;
    let current = refresh(&provider, config, &state).await?;
    record_refresh(&mut state, &current, provider.name());

    let plan = create_destroy_plan(&config.resources, &current);
    if plan.is_empty() {
        write_state(backend, &mut state).await?;
        println!("{}", "No resources to destroy.".green());
        return Ok(());
    }

    println!("{}", "Destroy Plan:".red().bold());
    println!();
    print_plan(&plan, &resource_schemas());
    println!();
    if !auto_approve
        && !confirm("Do you really want to destroy all resources? This cannot be undone.")?
    {
        println!("{}", "Destroy cancelled.".yellow());
        return Ok(());
    }

    println!("{}", "Destroying resources...".red().bold());
    println!();
    let failures = execute(provider, &plan, &current, &mut state).await;
    write_state(backend, &mut state).await?;

    println!();
    if failures == 0 {
        println!(
            "{}",
            format!("Destroy complete! {} resources destroyed.", plan.effects().len())
                .green()
                .bold()
        );
        Ok(())
    } else {
        Err(format!("Destroy failed with {} errors", failures))
    }
}

async fn run_show(file: &PathBuf) -> Result<(), String> {
    let config = Config::load(file)?;
    let backend = open_backend(&config)?;
    match backend.read_state().await.map_err(|e| e.to_string())? {
        Some(state) => print_state(&state),
        None => println!("{}", "No state recorded yet.".yellow()),
    }
    Ok(())
}

fn parse_address(address: &str) -> Result<ResourceId, String> {
    let (resource_type, name) = address
        .split_once('.')
        .filter(|(t, n)| !t.is_empty() && !n.is_empty())
        .ok_or_else(|| format!("Invalid address '{}', expected TYPE.NAME", address))?;
    if ResourceKind::from_name(resource_type).is_none() {
        return Err(format!("Unknown resource type '{}'", resource_type));
    }
    Ok(ResourceId::new(resource_type, name))
}

async fn run_import(file: &PathBuf, address: &str, import_id: &str) -> Result<(), String> {
    let id = parse_address(address)?;
    let config = load(file)?;
    if !config.managed().any(|r| r.id == id) {
        log::warn!("{} is not declared in {}", id, file.display());
    }
    let backend = open_backend(&config)?;
    let provider = connect(&config).await?;

    let lock = acquire(backend.as_ref(), "import").await?;
    let result = import_locked(backend.as_ref(), &provider, &id, import_id).await;
    unlock(backend.as_ref(), lock, result).await
}

async fn import_locked(
    backend: &dyn StateBackend,
    provider: &DirectConnectProvider,
    id: &ResourceId,
    import_id: &str,
) -> Result<(), String> {
    let mut state = read_state(backend).await?;
    if let Some(existing) = state.find_resource(id) {
        return Err(format!(
            "{} is already managed as {}",
            id,
            existing.identifier.as_deref().unwrap_or("(unknown)")
        ));
    }

    let imported = provider
        .import(id, import_id)
        .await
        .map_err(|e| e.to_string())?;
    state.record(&imported, provider.name());
    write_state(backend, &mut state).await?;

    println!(
        "{}",
        format!("✓ Imported {} as {}", import_id, id).green().bold()
    );
    Ok(())
}

async fn run_force_unlock(file: &PathBuf, lock_id: &str) -> Result<(), String> {
    let config = Config::load(file)?;
    let backend = open_backend(&config)?;
    backend
        .force_unlock(lock_id)
        .await
        .map_err(|e| e.to_string())?;
    println!("{}", format!("✓ Lock {} removed.", lock_id).green());
    Ok(())
}

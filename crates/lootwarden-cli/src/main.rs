mod scenario;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use lootwarden_core::domain::{ItemInfo, LootItem};
use lootwarden_core::impls::{
    ConfirmMode, FixedAuthority, InMemoryRuleStore, RecordingHandler, SimulatedClient,
    TracingEventHandler,
};
use lootwarden_core::ports::{ItemSource, MetadataProvider};
use lootwarden_core::{EngineBuilder, EngineConfig, EngineLoop, LootEngine};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "lootwarden",
    about = "Drive a simulated loot window through the lootwarden engine",
    version
)]
struct Cli {
    /// Engine config (JSON). Missing fields use defaults.
    #[arg(long, env = "LOOTWARDEN_CONFIG")]
    config: Option<PathBuf>,

    /// Seed rules (JSON object: item name -> rule string)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Record commands as completed without sending them
    #[arg(long)]
    dry_run: bool,

    /// How long to run the engine loop
    #[arg(long, default_value = "15")]
    seconds: u64,

    /// Simulated client latency before each confirmation
    #[arg(long, default_value = "250")]
    latency_ms: u64,

    /// Confirm without command ids (positional correlation)
    #[arg(long)]
    positional: bool,

    /// This instance may not act on shared loot
    #[arg(long)]
    not_primary: bool,

    /// Print the decision for every listed item and exit without sending
    /// commands. The cascade still runs: heuristic rules are written and
    /// waterfall passes are used up in the rule store
    #[arg(long)]
    explain: bool,
}

#[derive(Serialize)]
struct Explained {
    item: String,
    shared: bool,
    info: ItemInfo,
    decision: lootwarden_core::domain::Decision,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if cli.dry_run {
        config.dry_run = true;
    }

    let rules = match &cli.rules {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading rules {}", path.display()))?;
            let map: HashMap<String, String> =
                serde_json::from_str(&raw).context("rules file must be a JSON object")?;
            InMemoryRuleStore::with_rules(map)
        }
        None => InMemoryRuleStore::with_rules(scenario::default_rules()),
    };
    let rules = Arc::new(rules);

    let world = scenario::build().await;
    let mode = if cli.positional {
        ConfirmMode::Positional
    } else {
        ConfirmMode::WithId
    };
    let (client, driver) = SimulatedClient::new(Duration::from_millis(cli.latency_ms), mode);
    let recorder = Arc::new(RecordingHandler::new());
    let tick_interval = config.tick_interval();

    let engine = EngineBuilder::new(config)
        .item_source(world.window.clone())
        .metadata(world.metadata.clone())
        .rule_store(rules.clone())
        .filter_probe(world.probe.clone())
        .inventory(world.inventory.clone())
        .dispatcher(Arc::new(client.clone()))
        .authority(Arc::new(FixedAuthority::new(!cli.not_primary)))
        .register_handler("log", Arc::new(TracingEventHandler))?
        .register_handler("recorder", recorder.clone())?
        .build()?;
    let engine = Arc::new(engine);

    if cli.explain {
        return explain(&engine, &world).await;
    }

    let client_task = driver
        .with_window(world.window.clone())
        .with_inventory(world.inventory.clone())
        .spawn(engine.executor().clone());

    let engine_loop = EngineLoop::spawn(engine.clone(), tick_interval);
    tokio::time::sleep(Duration::from_secs(cli.seconds)).await;
    let ticks = engine_loop.shutdown_and_join().await;
    client_task.abort();

    let report = serde_json::json!({
        "ticks": ticks,
        "status": engine.status().await,
        "events": recorder.events().await,
        "rules": rules.snapshot().await,
        "commands": client.issued().await.len(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn explain(engine: &LootEngine, world: &scenario::Scenario) -> anyhow::Result<()> {
    let mut out = Vec::new();
    for shared in [false, true] {
        for listed in world.window.list_items(shared).await? {
            let info = world.metadata.item_info(&listed.name).await;
            let item = LootItem::new(listed, shared, info.clone());
            let decision = engine
                .preview(&item)
                .await
                .with_context(|| format!("resolving {}", item.name))?;
            out.push(Explained {
                item: item.name,
                shared,
                info,
                decision,
            });
        }
    }
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

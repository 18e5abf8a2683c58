mod catalog;
mod script;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::{domain::EntityId, protocol::PanelEvent};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wires::{load_settings_from, LayoutPrototypes, PanelConfig, WiresSettings, WiresSystem};

use crate::script::{Script, ScriptHost, StepEffect};

#[derive(Parser, Debug)]
#[command(name = "wirectl", about = "Inspect wire layouts and replay panel interactions")]
struct Cli {
    #[arg(long, default_value = wires::config::SETTINGS_FILE)]
    settings: PathBuf,
    /// Layout prototypes; falls back to `layouts_path` from the settings.
    #[arg(long)]
    layouts: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    pretty: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Spawn panels from one layout and print what their clients would see.
    Layout {
        layout_id: String,
        #[arg(long, default_value_t = 1)]
        count: usize,
        #[arg(long)]
        randomize: bool,
    },
    /// Replay a TOML script of panel interactions.
    Simulate {
        script: PathBuf,
        #[arg(long, default_value_t = 100)]
        tick_ms: u64,
        /// Pace ticks against the wall clock instead of running flat out.
        #[arg(long)]
        realtime: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings_from(&cli.settings);
    if cli.seed.is_some() {
        settings.rng_seed = cli.seed;
    }
    let mut system = build_system(settings, cli.layouts.as_ref())?;

    match cli.command {
        Command::Layout {
            layout_id,
            count,
            randomize,
        } => {
            for index in 0..count {
                let entity = EntityId(index as i64 + 1);
                let config = PanelConfig {
                    always_randomize: randomize,
                    ..PanelConfig::with_layout(layout_id.clone())
                };
                if !system.spawn_panel(entity, config) {
                    anyhow::bail!("layout '{layout_id}' produced no wires");
                }
                if let Some(panel) = system.panel(entity) {
                    println!("# {entity}: {}", script::describe_wires(panel));
                }
            }
            print_events(&mut system, cli.pretty)?;
        }
        Command::Simulate {
            script,
            tick_ms,
            realtime,
        } => {
            let raw = fs::read_to_string(&script)
                .with_context(|| format!("failed to read {}", script.display()))?;
            let script = Script::parse(&raw)?;
            let tick = Duration::from_millis(tick_ms.max(1));
            simulate(&mut system, &script, tick, realtime, cli.pretty).await?;
        }
    }

    Ok(())
}

fn build_system(settings: WiresSettings, layouts: Option<&PathBuf>) -> Result<WiresSystem> {
    let path = layouts
        .cloned()
        .or_else(|| settings.layouts_path.as_ref().map(PathBuf::from))
        .context("no layout prototypes given; pass --layouts or set layouts_path")?;
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read layouts from {}", path.display()))?;
    let prototypes = LayoutPrototypes::from_toml_str(&raw)
        .with_context(|| format!("invalid layouts in {}", path.display()))?;
    info!(path = %path.display(), layouts = prototypes.len(), "layout prototypes loaded");

    let catalog = catalog::demo_catalog(&settings)?;
    Ok(WiresSystem::new(settings, catalog, prototypes))
}

async fn simulate(
    system: &mut WiresSystem,
    script: &Script,
    tick: Duration,
    realtime: bool,
    pretty: bool,
) -> Result<()> {
    let mut host = ScriptHost::default();
    let mut interval = tokio::time::interval(tick);

    script::spawn_panels(system, &script.panels);
    print_events(system, pretty)?;

    for step in &script.steps {
        match script::apply_step(system, &mut host, step)? {
            StepEffect::Done => {}
            StepEffect::Report(text) => println!("# {text}"),
            StepEffect::Advance(total) => {
                let mut elapsed = Duration::ZERO;
                while elapsed < total {
                    if realtime {
                        interval.tick().await;
                    }
                    let dt = tick.min(total - elapsed);
                    system.update(&host, dt);
                    elapsed += dt;
                }
            }
        }
        print_events(system, pretty)?;
    }

    info!(panels = system.panel_count(), "simulation finished");
    Ok(())
}

fn print_events(system: &mut WiresSystem, pretty: bool) -> Result<()> {
    for event in system.drain_events() {
        println!("{}", render(&event, pretty)?);
    }
    Ok(())
}

fn render(event: &PanelEvent, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(event)?
    } else {
        serde_json::to_string(event)?
    };
    Ok(text)
}

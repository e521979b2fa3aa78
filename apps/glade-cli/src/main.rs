use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use glade_input::InputState;
use glade_kernel::{AudioCue, AudioSink, SceneConfig, SceneEvent, WorldState, drive_audio};
use glade_render::{DebugTextRenderer, RenderView, Renderer};
use glade_tools::SceneInspector;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glade-cli", about = "Headless driver for the glade scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Play a key script against a fresh scene and print the final frame
    Run {
        /// Idle ticks to run after the script
        #[arg(short, long, default_value = "60")]
        ticks: u64,
        /// RNG seed for scatter and fauna
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Scene config (YAML); built-in defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// One key press per tick, `.` for an idle tick. A count repeats the
        /// previous step, so `d15w9e` walks east 15, north 9, then interacts.
        #[arg(long, default_value = "")]
        script: String,
        /// Dump the final snapshot as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print where the scatterer put every tree
    Scatter {
        #[arg(short, long, default_value = "42")]
        seed: u64,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Print the default scene config as YAML
    Config,
}

/// Audio sink that just logs what a real backend would play.
#[derive(Debug, Default)]
struct LogSink {
    volume: f32,
}

impl AudioSink for LogSink {
    fn play(&mut self, cue: AudioCue) {
        tracing::info!(?cue, "audio");
    }

    fn set_ambient_volume(&mut self, volume: f32) {
        if volume != self.volume {
            tracing::debug!(volume, "ambient volume");
            self.volume = volume;
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SceneConfig> {
    let Some(path) = path else {
        return Ok(SceneConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading scene config {}", path.display()))?;
    parse_config(&text).with_context(|| format!("loading scene config {}", path.display()))
}

fn parse_config(text: &str) -> anyhow::Result<SceneConfig> {
    let config: SceneConfig = serde_yaml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Expand a key script into one entry per tick; `None` is an idle tick.
fn parse_script(script: &str) -> anyhow::Result<Vec<Option<char>>> {
    let mut steps = Vec::new();
    let mut chars = script.chars().filter(|c| !c.is_whitespace()).peekable();
    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            bail!("count `{c}` has no step before it");
        }
        let step = (c != '.').then_some(c);
        let mut count = String::new();
        while let Some(d) = chars.next_if(char::is_ascii_digit) {
            count.push(d);
        }
        let repeat = if count.is_empty() {
            1
        } else {
            count.parse::<usize>().context("repeat count out of range")?
        };
        steps.extend(std::iter::repeat_n(step, repeat));
    }
    Ok(steps)
}

/// Press and release each scripted key on its own tick.
fn play(
    world: &mut WorldState,
    input: &mut InputState,
    steps: &[Option<char>],
    sink: &mut LogSink,
) -> Vec<SceneEvent> {
    let mut log = Vec::new();
    for step in steps {
        let action = step.and_then(|key| input.key_down(key));
        if let (Some(key), None) = (step, action) {
            tracing::warn!(%key, "key is not bound, idling");
        }
        world.tick(action.as_slice());
        if let Some(key) = step {
            input.key_up(*key);
        }
        flush_events(world, sink, &mut log);
    }
    log
}

fn flush_events(world: &mut WorldState, sink: &mut LogSink, log: &mut Vec<SceneEvent>) {
    let events = world.drain_events();
    let volume = world.snapshot().ambient_volume;
    drive_audio(sink, &events, volume);
    log.extend(events);
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("glade-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("kernel: {}", glade_kernel::crate_info());
            println!("input: {}", glade_input::crate_info());
            println!("render: {}", glade_render::crate_info());
            println!("tools: {}", glade_tools::crate_info());
        }
        Commands::Run {
            ticks,
            seed,
            config,
            script,
            json,
        } => {
            let config = load_config(config.as_deref())?;
            let mut steps = parse_script(&script)?;
            steps.extend(std::iter::repeat_n(None, ticks as usize));

            let mut world = WorldState::with_seed(&config, seed)?;
            let mut input = InputState::default();
            let mut sink = LogSink::default();
            let mut log = Vec::new();
            flush_events(&mut world, &mut sink, &mut log);
            log.extend(play(&mut world, &mut input, &steps, &mut sink));
            world.end_session();
            let mut tail = Vec::new();
            flush_events(&mut world, &mut sink, &mut tail);

            if json {
                println!("{}", serde_json::to_string_pretty(&world.snapshot())?);
            } else {
                let frame = DebugTextRenderer::new().render(&world.snapshot(), &RenderView::default());
                print!("{frame}");
                println!("{}", SceneInspector::summary(&world));
                for id in SceneInspector::list_followers(&world) {
                    if let Some(info) = SceneInspector::inspect_follower(&world, &id) {
                        println!("{info}");
                    }
                }
                println!("Events: {}", log.len() + tail.len());
                for event in log.iter().chain(&tail) {
                    println!("  {}", serde_json::to_string(event)?);
                }
            }
        }
        Commands::Scatter { seed, config, json } => {
            let config = load_config(config.as_deref())?;
            let world = WorldState::with_seed(&config, seed)?;
            if json {
                println!("{}", serde_json::to_string_pretty(world.scatter())?);
            } else {
                println!(
                    "Scatter: seed={seed} placed={} shortfall={}",
                    world.scatter().len(),
                    world.scatter_shortfall()
                );
                for tree in world.scatter() {
                    let p = tree.position;
                    println!(
                        "  pos=({:.2}, {:.2}) scale={:.2} sway={:.2}@{:.2}",
                        p.x, p.z, tree.scale, tree.sway.amount, tree.sway.speed
                    );
                }
            }
        }
        Commands::Config => {
            print!("{}", serde_yaml::to_string(&SceneConfig::default())?);
        }
    }

    Ok(())
}

// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::{Block, Borders};
use ratatui::{Terminal, TerminalOptions, Viewport};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[cfg(feature = "live")]
use walkseq::audio::LiveSynth;
use walkseq::audio::{write_wav, Synthesizer, ToneSynth};
use walkseq::config::SessionConfig;
use walkseq::music::ScaleRegistry;
use walkseq::ui::{grid_rows, PatternView, PatternWidget};
use walkseq::{Pattern, PatternGenerator, PlaybackScheduler};

/// Offline render resolution
const RENDER_STEP: Duration = Duration::from_millis(10);

/// Longest sleep between realtime transport updates
const PLAY_TICK: Duration = Duration::from_millis(5);

fn print_usage() {
    println!("walkseq - Random-walk melody generator");
    println!();
    println!("Usage: walkseq [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --generate [SCALE] [LENGTH]  Generate a pattern (default: c_major 16)");
    println!("  --scale <NAME>               Scale to walk over");
    println!("  --length <N>                 Number of notes");
    println!("  --tempo <BPM>                Playback tempo, 60-180 (default 120)");
    println!("  --seed <N>                   Seed for a reproducible pattern");
    println!("  --config <FILE>              Load session settings (.yaml or .toml)");
    println!("  --json                       Print the pattern as JSON");
    println!("  --play                       Play the pattern with a live playhead");
    println!("                               (sound needs a build with --features live)");
    println!("  --render <FILE>              Render the pattern to a WAV file");
    println!("  --list-scales                List available scales");
    println!("  --help                       Show this help message");
}

/// Parsed command line
#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    scale: Option<String>,
    length: Option<i64>,
    tempo: Option<f64>,
    seed: Option<u64>,
    json: bool,
    play: bool,
    render: Option<PathBuf>,
    list_scales: bool,
    help: bool,
}

fn flag_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{} requires a value", flag))
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow!("Invalid {}: {}", what, value))
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut opts = Options::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--generate" => {
                // Optional positional scale and length
                let mut positional = args[i + 1..]
                    .iter()
                    .take_while(|a| !a.starts_with("--"))
                    .take(2);
                if let Some(scale) = positional.next() {
                    opts.scale = Some(scale.clone());
                    i += 1;
                }
                if let Some(length) = positional.next() {
                    opts.length = Some(parse_number(length, "length")?);
                    i += 1;
                }
            }
            "--scale" => opts.scale = Some(flag_value(args, &mut i, "--scale")?.to_string()),
            "--length" => {
                opts.length = Some(parse_number(flag_value(args, &mut i, "--length")?, "length")?)
            }
            "--tempo" => {
                opts.tempo = Some(parse_number(flag_value(args, &mut i, "--tempo")?, "tempo")?)
            }
            "--seed" => opts.seed = Some(parse_number(flag_value(args, &mut i, "--seed")?, "seed")?),
            "--config" => opts.config = Some(flag_value(args, &mut i, "--config")?.into()),
            "--render" => opts.render = Some(flag_value(args, &mut i, "--render")?.into()),
            "--json" => opts.json = true,
            "--play" => opts.play = true,
            "--list-scales" => opts.list_scales = true,
            "--help" | "-h" => opts.help = true,
            other => bail!("Unknown option: {}", other),
        }
        i += 1;
    }

    Ok(opts)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("walkseq=info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Synthesizers that keep a renderable copy of what they played
trait Recorded: Synthesizer {
    fn recorded(&self) -> &ToneSynth;
}

impl Recorded for ToneSynth {
    fn recorded(&self) -> &ToneSynth {
        self
    }
}

#[cfg(feature = "live")]
impl Recorded for LiveSynth {
    fn recorded(&self) -> &ToneSynth {
        self.recording()
    }
}

#[cfg(feature = "live")]
fn playback_synth(sample_rate: u32) -> LiveSynth {
    LiveSynth::new(sample_rate)
}

#[cfg(not(feature = "live"))]
fn playback_synth(sample_rate: u32) -> ToneSynth {
    tracing::warn!("Built without the `live` feature; playback is silent (use --render to hear it)");
    ToneSynth::new(sample_rate)
}

/// Inline viewport height: the grid plus the block border
fn viewport_height(notes: usize) -> u16 {
    grid_rows(notes).saturating_add(2)
}

fn print_pattern(pattern: &Pattern) {
    println!(
        "{} notes in {}",
        pattern.len(),
        pattern.scale_name().replace('_', " ")
    );
    for (i, note) in pattern.notes().iter().enumerate() {
        println!(
            "{:>3}  {:<4} {:<4} t={:.1}",
            i,
            note.pitch.to_string(),
            note.duration.notation(),
            note.start_offset
        );
    }
}

async fn play_realtime<S: Recorded>(
    config: &SessionConfig,
    pattern: Pattern,
    synth: S,
    wav: Option<&Path>,
) -> Result<()> {
    let mut scheduler = PlaybackScheduler::new(synth);
    scheduler.set_tempo(config.tempo)?;
    let mut events = scheduler
        .take_events()
        .ok_or_else(|| anyhow!("Playback events already taken"))?;

    let height = viewport_height(pattern.len());
    let viewer = tokio::spawn(async move {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::with_options(
            backend,
            TerminalOptions {
                viewport: Viewport::Inline(height),
            },
        )?;

        let mut view = PatternView::new();
        while let Some(event) = events.recv().await {
            view.apply(&event);
            terminal.draw(|frame| {
                let block = Block::default()
                    .borders(Borders::ALL)
                    .title(view.summary());
                frame.render_widget(PatternWidget::new(&view).block(block), frame.area());
            })?;
        }
        Ok::<_, io::Error>(())
    });

    scheduler.set_pattern(pattern);
    scheduler.play().await?;
    scheduler.run(PLAY_TICK).await;

    if let Some(path) = wav {
        write_wav(path, &scheduler.synth().recorded().render(), config.sample_rate)?;
        info!(path = %path.display(), "Wrote playback audio");
    }

    // Dropping the scheduler closes the event queue and ends the viewer
    drop(scheduler);
    viewer.await.context("Visualizer task failed")??;
    println!();
    Ok(())
}

async fn render_offline(config: &SessionConfig, pattern: Pattern, path: &Path) -> Result<()> {
    let mut scheduler = PlaybackScheduler::new(ToneSynth::new(config.sample_rate));
    scheduler.set_tempo(config.tempo)?;
    scheduler.set_pattern(pattern);
    scheduler.play().await?;
    scheduler.run_offline(RENDER_STEP);

    let samples = scheduler.synth().render();
    write_wav(path, &samples, config.sample_rate)?;
    info!(
        path = %path.display(),
        seconds = samples.len() as f64 / config.sample_rate as f64,
        "Rendered pattern"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    let opts = parse_args(&args)?;

    if opts.help {
        print_usage();
        return Ok(());
    }

    let registry = ScaleRegistry::builtin();
    if opts.list_scales {
        for scale in registry.iter() {
            println!("{:<10} {}", scale.name(), scale);
        }
        return Ok(());
    }

    let mut config = match &opts.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(scale) = opts.scale {
        config.scale = scale;
    }
    if let Some(length) = opts.length {
        config.length = length;
    }
    if let Some(tempo) = opts.tempo {
        config.tempo = tempo;
    }
    if opts.seed.is_some() {
        config.seed = opts.seed;
    }
    config.validate(&registry)?;

    let generator = PatternGenerator::with_registry(registry);
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let pattern = generator.generate(&config.scale, config.length, &mut rng)?;
    info!(
        notes = pattern.len(),
        scale = %config.scale,
        "New pattern generated"
    );

    if opts.json {
        println!("{}", pattern.to_json()?);
    } else if !opts.play {
        print_pattern(&pattern);
    }

    if opts.play {
        let synth = playback_synth(config.sample_rate);
        play_realtime(&config, pattern, synth, opts.render.as_deref()).await?;
    } else if let Some(path) = &opts.render {
        render_offline(&config, pattern, path).await?;
    }

    Ok(())
}

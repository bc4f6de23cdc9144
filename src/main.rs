mod audio;
mod audio_api;
mod config;
mod middle;
mod pipeline;
mod shared;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossterm::{cursor, queue, style, terminal};

use config::{Config, note_name};
use middle::{Middle, draw_curve};
use pipeline::persistence;
use shared::{CurvePoint, InputEvent};

#[derive(Subcommand)]
enum Command {
    /// Bake a curve (JSON array of {x, y} canvas points) into a WAV file
    Render {
        curve: PathBuf,
        #[arg(short, long, default_value = "drawscillator_clip.wav")]
        out: PathBuf,
    },
    /// Commit a curve as a new clip in the project
    Add {
        curve: PathBuf,
        #[arg(long, default_value = "")]
        image: String,
    },
    /// Drop one saved clip
    Discard { clip: usize },
    /// Drop every saved clip
    Clear,
    /// Write every saved clip out as a WAV
    Export {
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// List the playable keys
    Keys,
    /// Hold one key on a saved clip
    Play {
        #[arg(short, long, default_value_t = 0)]
        clip: usize,
        #[arg(short, long, default_value_t = 45)]
        key: i32,
        #[arg(short, long, default_value_t = 1.0)]
        gain: f32,
        #[arg(short, long, default_value_t = 2.0)]
        seconds: f64,
    },
}

#[derive(Parser)]
#[command(name = "drawscillator")]
#[command(about = "Turn a hand-drawn cycle into a WAV clip or a playable tone")]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Directory holding .drawscillator/ (config and saved clips)
    #[arg(short, long)]
    project: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let project_dir = match cli.project {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let config = config::load_config(&project_dir)?;

    match cli.command {
        Command::Render { curve, out } => {
            let mut middle = Middle::new(config.clone(), config.sample_rate);
            commit_curve_file(&mut middle, &curve, String::new())?;
            let clip = middle
                .clips()
                .get(0)
                .ok_or_else(|| anyhow::anyhow!("curve produced no clip"))?;
            std::fs::write(&out, clip.audio())?;
            log::info!("wrote {}", out.display());
        }
        Command::Add { curve, image } => {
            let clips = load_clips(&project_dir, &config);
            let mut middle = Middle::with_clips(config.clone(), config.sample_rate, clips);
            commit_curve_file(&mut middle, &curve, image)?;
            persistence::save_clips(&project_dir, middle.clips())?;
            println!("{} clip(s) saved", middle.clips().len());
        }
        Command::Discard { clip } => {
            let clips = load_clips(&project_dir, &config);
            let mut middle = Middle::with_clips(config.clone(), config.sample_rate, clips);
            if clip >= middle.clips().len() {
                anyhow::bail!("no clip {clip} ({} saved)", middle.clips().len());
            }
            middle.handle_input(InputEvent::DiscardClip(clip));
            persistence::save_clips(&project_dir, middle.clips())?;
            println!("{} clip(s) left", middle.clips().len());
        }
        Command::Clear => {
            let clips = load_clips(&project_dir, &config);
            let mut middle = Middle::with_clips(config.clone(), config.sample_rate, clips);
            middle.handle_input(InputEvent::ClearClips);
            persistence::save_clips(&project_dir, middle.clips())?;
            println!("cleared");
        }
        Command::Export { out } => {
            let clips = load_clips(&project_dir, &config);
            if clips.is_empty() {
                println!("no saved clips");
                return Ok(());
            }
            let written = pipeline::export_clips(&clips, &out)?;
            println!("exported {} clip(s) to {}", written.len(), out.display());
        }
        Command::Keys => {
            for key in config.keys.keys() {
                println!("{key:>4}  {:<2}  {:>9.3} Hz", note_name(key), config.keys.frequency(key));
            }
        }
        Command::Play {
            clip,
            key,
            gain,
            seconds,
        } => play(&project_dir, config, clip, key, gain, seconds)?,
    }
    Ok(())
}

fn load_clips(project_dir: &Path, config: &Config) -> pipeline::ClipCollection {
    persistence::load_clips(project_dir, config.sample_rate, config.repeat_count).unwrap_or_default()
}

fn commit_curve_file(middle: &mut Middle, path: &Path, image: String) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(path)?;
    let points: Vec<CurvePoint> = serde_json::from_str(&data)?;
    let before = middle.clips().len();
    middle.handle_input(InputEvent::ClearCanvas);
    draw_curve(middle, &points);
    middle.handle_input(InputEvent::Commit { image });
    if middle.clips().len() == before {
        anyhow::bail!("failed to commit curve from {}", path.display());
    }
    Ok(())
}

const SCOPE_COLS: usize = 72;
const SCOPE_ROWS: usize = 12;
const SCOPE_HEIGHT: f32 = 64.0;

struct HiddenCursorGuard;
impl Drop for HiddenCursorGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(std::io::stdout(), cursor::Show);
    }
}

// redraw in place: the header line plus SCOPE_ROWS rows of trace
fn draw_scope(out: &mut impl Write, middle: &Middle, redraw: bool) -> anyhow::Result<bool> {
    let Some(trace) = middle.scope_trace(SCOPE_HEIGHT) else {
        return Ok(false);
    };
    if redraw {
        queue!(out, cursor::MoveUp(SCOPE_ROWS as u16 + 1))?;
    }
    let hz = middle.tone().frequency().unwrap_or(0.0);
    queue!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(terminal::ClearType::FromCursorDown),
        style::Print(format!("{hz:.2} Hz\n"))
    )?;
    for line in audio::render_ascii(&trace, SCOPE_HEIGHT, SCOPE_COLS, SCOPE_ROWS) {
        queue!(out, style::Print(line), style::Print("\n"))?;
    }
    out.flush()?;
    Ok(true)
}

fn play(project_dir: &Path, config: Config, clip: usize, key: i32, gain: f32, seconds: f64) -> anyhow::Result<()> {
    let clips = load_clips(project_dir, &config);
    if clips.get(clip).is_none() {
        anyhow::bail!("no clip {clip} ({} saved)", clips.len());
    }
    let audio = audio::start_audio()?;
    let mut middle = Middle::with_clips(config, audio.sample_rate(), clips);

    let send_all = |cmds: Vec<audio_api::AudioCommand>| {
        for cmd in cmds {
            audio.send(cmd);
        }
    };
    send_all(middle.handle_input(InputEvent::SelectClip(clip)));
    send_all(middle.handle_input(InputEvent::KeyDown { key, gain }));

    let mut out = std::io::stdout();
    crossterm::execute!(out, cursor::Hide)?;
    let _cursor = HiddenCursorGuard;

    let tick_rate = Duration::from_millis(16); // ~60fps
    let start = Instant::now();
    let mut last_tick = Instant::now();
    let mut drawn = false;
    while start.elapsed().as_secs_f64() < seconds {
        drawn |= draw_scope(&mut out, &middle, drawn)?;

        std::thread::sleep(tick_rate);
        let elapsed = last_tick.elapsed().as_secs_f64();
        last_tick = Instant::now();
        middle.tick(elapsed);
        audio.collect_retired();
    }

    send_all(middle.handle_input(InputEvent::KeyUp));
    // give the callback a block or two to pick up the stop
    std::thread::sleep(Duration::from_millis(50));
    audio.collect_retired();
    Ok(())
}

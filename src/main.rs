mod tui;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use crossterm::terminal;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use psybox::audio::{self, AudioHandle, AudioOutput};
use psybox::audio_api::{AudioSink, NullSink};
use psybox::clock::SequencerClock;
use psybox::config::{Config, FallbackPolicy};
use psybox::dispatcher::Dispatcher;
use psybox::kit::TRACKS;
use psybox::loader;
use psybox::pattern::PatternStore;
use psybox::shared::{BPM_MAX, BPM_MIN, DisplayState, InputEvent, SAMPLE_RATE, UiEvent};

use tui::Cursor;

const LOG_FILE: &str = "psybox.log";

enum Mode {
    /// Interactive sequencer over the given project directory.
    Play(PathBuf),
    /// Render every lane's recipe to WAV files and exit.
    Render(PathBuf),
}

fn parse_args() -> Mode {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("--render") => Mode::Render(
            args.next()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("kit")),
        ),
        Some(dir) => Mode::Play(PathBuf::from(dir)),
        None => Mode::Play(std::env::current_dir().unwrap_or_default()),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    match parse_args() {
        Mode::Render(dir) => {
            init_stderr_logging();
            render_kit(&dir)
        }
        Mode::Play(dir) => {
            init_file_logging(&dir);
            run_sequencer(&dir)
        }
    }
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Interactive runs own the terminal, so logs go to a file in the project
/// directory. If that file can't be created, logging stays off; stderr
/// would tear the raw-mode display.
fn init_file_logging(dir: &Path) {
    let Ok(file) = fs::File::create(dir.join(LOG_FILE)) else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
}

fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Render every lane's built-in recipe to `<dir>/<key>.wav`.
fn render_kit(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;
    for track in &TRACKS {
        let samples = track
            .timbre
            .synthesize(SAMPLE_RATE)
            .with_context(|| format!("synthesizing {}", track.key))?;
        let path = dir.join(format!("{}.wav", track.key));
        audio::write_wav_i16(&path, &samples, SAMPLE_RATE)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(track = track.key, path = %path.display(), "rendered");
    }
    Ok(())
}

fn run_sequencer(project_dir: &Path) -> anyhow::Result<()> {
    let config = Config::load(project_dir);

    // keep running without a device: the grid still edits, lanes just
    // render dimmed
    // the output must stay alive for the duration of the session; only the
    // clonable handle crosses threads
    let audio = match audio::start_audio() {
        Ok(output) => Some(output),
        Err(err) => {
            warn!(%err, "audio unavailable, running silent");
            None
        }
    };
    let handle = audio.as_ref().map(AudioOutput::handle);
    let sink: Arc<dyn AudioSink> = match &handle {
        Some(handle) => Arc::new(handle.clone()),
        None => Arc::new(NullSink),
    };

    let pattern = Arc::new(PatternStore::new());
    let dispatcher = Arc::new(Dispatcher::new(sink));
    dispatcher.set_master_volume(config.master_volume);
    load_kit(project_dir, handle.as_ref(), &dispatcher, config.fallback);

    let (ui_tx, ui_rx) = crossbeam_channel::bounded::<UiEvent>(64);
    let clock = Arc::new(SequencerClock::new(
        pattern.clone(),
        dispatcher.clone(),
        ui_tx,
        config.bpm,
    ));
    let clock_thread = clock.clone().spawn()?;

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let tick_rate = Duration::from_millis(16); // ~60fps
    let mut cursor = Cursor::default();
    let mut playhead: Option<u8> = None;

    loop {
        while let Ok(event) = ui_rx.try_recv() {
            match event {
                UiEvent::StepAdvance(step) => playhead = Some(step),
                UiEvent::Stopped => playhead = None,
            }
        }

        let ds = DisplayState {
            grid: pattern.snapshot(),
            playhead,
            playing: clock.is_playing(),
            bpm: clock.bpm(),
            master_volume: dispatcher.master_volume(),
            loaded: dispatcher.loaded_lanes(),
        };
        term.draw(|frame| tui::view::render(frame, &ds, cursor))?;

        for event in tui::input::poll_input(tick_rate, &mut cursor)? {
            match event {
                InputEvent::Quit => {
                    clock.shutdown();
                    let _ = clock_thread.join();
                    drop(term);
                    return Ok(());
                }
                InputEvent::PlayToggle => {
                    clock.toggle();
                }
                InputEvent::Clear => clock.reset(),
                InputEvent::ToggleCell { step, track } => {
                    if let Err(err) = pattern.toggle(step, track) {
                        warn!(%err, "cell toggle rejected");
                    }
                }
                InputEvent::TempoNudge(delta) => {
                    let bpm = clock
                        .bpm()
                        .saturating_add_signed(delta)
                        .clamp(BPM_MIN, BPM_MAX);
                    let _ = clock.set_tempo(bpm);
                }
                InputEvent::VolumeNudge(delta) => {
                    dispatcher.set_master_volume(dispatcher.master_volume() + delta);
                }
            }
        }
    }
}

/// Register a sound for every lane: a WAV override from the project
/// directory when present, otherwise the lane's recipe per the fallback
/// policy.
fn load_kit(
    kit_dir: &Path,
    audio: Option<&AudioHandle>,
    dispatcher: &Dispatcher,
    fallback: FallbackPolicy,
) {
    let Some(audio) = audio else {
        return; // no device; every lane stays unloaded
    };
    for (track_id, track) in TRACKS.iter().enumerate() {
        if let Some(path) = loader::resolve(kit_dir, track.key) {
            match audio.load_file(track_id, &path) {
                Ok(()) => {
                    dispatcher.mark_loaded(track_id);
                    info!(track = track.key, path = %path.display(), "loaded override");
                    continue;
                }
                Err(err) => warn!(track = track.key, %err, "override failed to load"),
            }
        }
        match fallback {
            FallbackPolicy::Silent => {}
            FallbackPolicy::Synthesize => match track.timbre.synthesize(audio.device_rate()) {
                Ok(samples) => {
                    audio.load_buffer(track_id, &samples, audio.device_rate());
                    dispatcher.mark_loaded(track_id);
                    info!(track = track.key, "synthesized lane voice");
                }
                Err(err) => warn!(track = track.key, %err, "recipe failed, lane stays silent"),
            },
        }
    }
}

struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

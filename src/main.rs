use anyhow::Context as _;
use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write, stdout};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{Level, debug, info, warn};

use skywriter::config::{Cli, ShowConfig};
use skywriter::effect::Effect;
use skywriter::error::ShowResult;
use skywriter::show::FireworkShow;

const FIXED_DT: f32 = 1.0 / 60.0;

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    // stdout belongs to the animation, so logs only go to a file
    let Some(path) = &cli.log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(())
}

fn is_quit(event: &Event) -> bool {
    let Event::Key(key) = event else {
        return false;
    };
    key.code == KeyCode::Char('q')
        || key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

fn run_effect<E, F>(build: F) -> ShowResult<()>
where
    E: Effect,
    F: FnOnce(usize, usize) -> ShowResult<E>,
{
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout());

    terminal::enable_raw_mode()?;
    let result = match execute!(
        stdout,
        EnterAlternateScreen,
        Hide,
        Clear(ClearType::All),
        EnableMouseCapture
    ) {
        Ok(()) => play(build, &mut stdout),
        Err(err) => Err(err.into()),
    };

    settle(result, restore_terminal(&mut stdout))
}

/// Leaves the alternate screen and raw mode. Raw mode is dropped even when
/// the terminal can no longer be written to.
fn restore_terminal<W: Write>(out: &mut W) -> io::Result<()> {
    let screen = execute!(out, Show, LeaveAlternateScreen, DisableMouseCapture);
    let raw = terminal::disable_raw_mode();
    screen.and(raw)
}

// The show's own error wins over a teardown failure
fn settle(played: ShowResult<()>, restored: io::Result<()>) -> ShowResult<()> {
    if let Err(err) = &restored {
        warn!(error = %err, "terminal restore failed");
    }
    played?;
    restored?;
    Ok(())
}

fn play<E, F>(build: F, stdout: &mut BufWriter<Stdout>) -> ShowResult<()>
where
    E: Effect,
    F: FnOnce(usize, usize) -> ShowResult<E>,
{
    let (cols, rows) = terminal::size()?;
    let mut effect = build(cols as usize, rows as usize)?;

    let mut last_frame = Instant::now();
    let mut accumulator = 0.0f32;

    loop {
        if event::poll(Duration::from_millis(1))? {
            let event = event::read()?;
            if is_quit(&event) {
                break;
            }
            if let Event::Resize(cols, rows) = event {
                // The canvas keeps its startup size
                debug!(cols, rows, "terminal resized, ignoring");
                execute!(stdout, Clear(ClearType::All))?;
            }
            effect.handle_event(&event);
        }

        let now = Instant::now();
        accumulator += now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        if accumulator > FIXED_DT * 3.0 {
            accumulator = FIXED_DT * 3.0;
        }

        while accumulator >= FIXED_DT {
            effect.update(FIXED_DT);
            accumulator -= FIXED_DT;
        }

        effect.render(stdout)?;
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = ShowConfig::from_cli(&cli)?;
    info!(text = %cli.message, seed = ?config.seed, bell = config.bell, "starting show");

    run_effect(|cols, rows| FireworkShow::new(cols, rows, &config)).context("show aborted")?;

    info!("show finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyEventKind, KeyEventState};
    use skywriter::error::ShowError;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn quit_keys() {
        assert!(is_quit(&key(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit(&key(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit(&key(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit(&key(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(!is_quit(&Event::Resize(80, 24)));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn restore_reports_a_dead_terminal() {
        let err = restore_terminal(&mut BrokenPipe).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn show_error_wins_over_restore_error() {
        let played = Err(ShowError::config("bad colour"));
        let restored = Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        let err = settle(played, restored).unwrap_err();
        assert!(matches!(err, ShowError::Config(_)));
    }

    #[test]
    fn restore_error_surfaces_after_a_clean_show() {
        let restored = Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        let err = settle(Ok(()), restored).unwrap_err();
        assert!(matches!(err, ShowError::Terminal(_)));
        assert!(settle(Ok(()), Ok(())).is_ok());
    }
}

//! Hot-seat versus runner (default binary).
//!
//! Two players share one keyboard: player one on `WASD` + `Q`/`E`, player two
//! on the arrows + `N`/`M`. Uses crossterm for input and the framebuffer
//! renderer from `duel_tetris::term`.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

use duel_tetris::core::{RulesConfig, Versus};
use duel_tetris::input::{should_quit, InputHandler, KeyMap};
use duel_tetris::term::{BoardPanel, FrameBuffer, GameView, TerminalRenderer, Viewport};
use duel_tetris::types::{PlayerSide, TICK_MS};

/// Local two-player Tetris
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed both players' piece sequences with this value
    #[arg(long)]
    seed: Option<i64>,

    /// Board width in cells
    #[arg(long, default_value_t = duel_tetris::types::BOARD_WIDTH)]
    width: u8,

    /// Board height in cells
    #[arg(long, default_value_t = duel_tetris::types::BOARD_HEIGHT)]
    height: u8,

    /// Append logs to this file (the terminal is busy drawing the game)
    #[arg(long)]
    log: Option<PathBuf>,
}

const SIDES: [PlayerSide; 2] = [PlayerSide::One, PlayerSide::Two];

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_ref())?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &args);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_logging(path: Option<&PathBuf>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// Held keys end on real release events when the terminal sends them; the
/// timeout only matters for terminals that do not.
fn release_timeout_ms(term: &TerminalRenderer) -> u32 {
    if term.has_release_events() {
        info!("terminal reports key release events");
        u32::MAX
    } else {
        InputHandler::default().key_release_timeout_ms()
    }
}

fn new_match(args: &Args) -> Versus {
    let rules = RulesConfig::default().with_size(args.width, args.height);
    match args.seed {
        Some(seed) => Versus::with_seeds(rules, seed, seed),
        None => Versus::new(rules),
    }
}

fn run(term: &mut TerminalRenderer, args: &Args) -> Result<()> {
    let mut versus = new_match(args);
    info!("hot-seat match started");

    let view = GameView::default();
    let release_timeout = release_timeout_ms(term);
    let mut inputs = [
        InputHandler::new(KeyMap::PlayerOne).with_key_release_timeout_ms(release_timeout),
        InputHandler::new(KeyMap::PlayerTwo).with_key_release_timeout_ms(release_timeout),
    ];
    let mut fb = FrameBuffer::new(0, 0);
    let mut snaps = [
        versus.player(PlayerSide::One).snapshot(),
        versus.player(PlayerSide::Two).snapshot(),
    ];
    let mut announced = false;

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        // Render.
        for (snap, side) in snaps.iter_mut().zip(SIDES) {
            versus.player(side).snapshot_into(snap);
        }
        let winner = versus.winner();
        let banner = match winner {
            Some(PlayerSide::One) => "PLAYER 1 WINS!  R: rematch  Esc: quit",
            Some(PlayerSide::Two) => "PLAYER 2 WINS!  R: rematch  Esc: quit",
            None => "Esc: quit",
        };
        let overlay = |side: PlayerSide| match winner {
            Some(w) if w == side => Some("WINNER"),
            Some(_) => Some("GAME OVER"),
            None => None,
        };
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_versus_into(
            BoardPanel::new("PLAYER 1", &snaps[0]).with_overlay(overlay(PlayerSide::One)),
            BoardPanel::new("PLAYER 2", &snaps[1]).with_overlay(overlay(PlayerSide::Two)),
            Some(banner),
            Viewport::new(w, h),
            &mut fb,
        );
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => match key.kind {
                    KeyEventKind::Press => {
                        if should_quit(key) {
                            return Ok(());
                        }
                        if versus.is_finished()
                            && matches!(key.code, KeyCode::Char('r') | KeyCode::Char('R'))
                        {
                            versus = new_match(args);
                            inputs.iter_mut().for_each(InputHandler::reset);
                            announced = false;
                            info!("rematch started");
                            continue;
                        }
                        for (handler, side) in inputs.iter_mut().zip(SIDES) {
                            if let Some(action) = handler.handle_key_press(key.code) {
                                versus.apply(side, action);
                            }
                        }
                    }
                    KeyEventKind::Repeat => {
                        // Ignore terminal auto-repeat; DAS/ARR handles repeats internally.
                    }
                    KeyEventKind::Release => {
                        for handler in inputs.iter_mut() {
                            handler.handle_key_release(key.code);
                        }
                    }
                },
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            let elapsed_ms = last_tick.elapsed().as_millis().min(u32::MAX as u128) as u32;
            last_tick = Instant::now();

            for (handler, side) in inputs.iter_mut().zip(SIDES) {
                for action in handler.update(elapsed_ms) {
                    versus.apply(side, action);
                }
            }

            if let Some(winner) = versus.step(elapsed_ms) {
                if !announced {
                    announced = true;
                    info!(
                        "match over: {:?} wins ({} vs {})",
                        winner,
                        versus.player(PlayerSide::One).score(),
                        versus.player(PlayerSide::Two).score()
                    );
                }
            }
        }
    }
}

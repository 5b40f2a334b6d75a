//! # slide2048 CLI
//!
//! Command-line session controller: play interactively in the terminal or
//! run headless simulations with simple policies.

mod highscore;

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use slide2048_core::{Direction, GameError, MoveResult, Session, SessionConfig, Status};

#[derive(Parser, Debug)]
#[command(name = "slide2048")]
#[command(author, version, about = "Play the sliding-tile puzzle in the terminal or run simulations")]
struct Args {
    /// Number of episodes to run in headless mode (interactive if omitted)
    #[arg(short, long)]
    episodes: Option<u32>,

    /// Random seed for deterministic runs
    #[arg(short, long)]
    seed: Option<u64>,

    /// Grid rows
    #[arg(long)]
    rows: Option<usize>,

    /// Grid columns
    #[arg(long)]
    cols: Option<usize>,

    /// JSON file with session settings; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File holding the best score across runs
    #[arg(long)]
    high_score_file: Option<PathBuf>,

    /// Maximum steps per episode (0 = unlimited)
    #[arg(short, long, default_value = "10000")]
    max_steps: u32,

    /// Policy for headless mode
    #[arg(short, long, value_enum, default_value = "random")]
    policy: Policy,

    /// Show the grid after each move in headless mode
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Random legal moves
    Random,
    /// Cycle through moves: Left, Down, Right, Up
    Cycle,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let config = build_config(&args)?;
    debug!("session config: {config:?}");

    if let Some(episodes) = args.episodes {
        run_headless(&args, config, episodes)
    } else {
        run_interactive(&args, config)
    }
}

/// Merge the optional config file with command-line overrides.
fn build_config(args: &Args) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SessionConfig::default(),
    };
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(cols) = args.cols {
        config.cols = cols;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate().context("invalid session settings")?;
    Ok(config)
}

fn load_config(path: &Path) -> Result<SessionConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn load_high_score(args: &Args) -> Result<u64> {
    match &args.high_score_file {
        Some(path) => highscore::load(path),
        None => Ok(0),
    }
}

fn save_high_score(args: &Args, session: &Session) -> Result<()> {
    if let Some(path) = &args.high_score_file {
        highscore::save_if_higher(path, session.high_score())?;
    }
    Ok(())
}

const HEADER: &str = "Controls: WASD or Arrow Keys | Q to quit | R to restart";

/// Run interactive mode where the user plays with the keyboard.
fn run_interactive(args: &Args, config: SessionConfig) -> Result<()> {
    let seed = config.seed;
    let mut session = Session::start(config)?.with_high_score(load_high_score(args)?);

    // Set terminal to raw mode for single-key input
    enable_raw_mode();
    let outcome = interactive_loop(args, &mut session, seed);
    disable_raw_mode();

    save_high_score(args, &session)?;
    outcome
}

fn interactive_loop(args: &Args, session: &mut Session, mut seed: u64) -> Result<()> {
    let mut stdin = io::stdin();
    let mut buffer = [0u8; 3];

    redraw(session, None)?;

    loop {
        let bytes_read = stdin.read(&mut buffer).unwrap_or(0);
        if bytes_read == 0 {
            continue;
        }

        match parse_input(&buffer[..bytes_read]) {
            InputAction::Move(dir) => match session.apply_move(dir) {
                Ok(result) => {
                    redraw(session, Some(&result))?;
                    if result.over {
                        save_high_score(args, session)?;
                    }
                }
                // Late keypresses after the game ended.
                Err(GameError::SessionTerminated) => {}
                Err(err) => return Err(err.into()),
            },
            InputAction::Continue => {
                if session.status() == Status::Cleared {
                    session.continue_after_win()?;
                    redraw(session, None)?;
                }
            }
            InputAction::Restart => {
                save_high_score(args, session)?;
                seed = seed.wrapping_add(1);
                *session = session.replay(seed)?;
                redraw(session, None)?;
            }
            InputAction::Quit => {
                println!("\nGoodbye!");
                return Ok(());
            }
            InputAction::None => {}
        }
    }
}

fn redraw(session: &Session, result: Option<&MoveResult>) -> Result<()> {
    print!("\x1b[2J\x1b[H"); // Clear screen
    println!("=== 2048 ===");
    println!("{HEADER}\n");
    print_game(session)?;

    if let Some(result) = result {
        if result.points > 0 {
            println!("  +{} points!", result.points);
        }
    }

    match session.status() {
        Status::Cleared => {
            println!("\n  *** {} REACHED ***", session.config().win_value);
            println!("  Press C to keep going, R to restart or Q to quit");
        }
        Status::Over => {
            if result.is_some_and(|r| r.cleared) {
                println!("\n  *** {} REACHED ***", session.config().win_value);
            }
            println!("\n  *** GAME OVER ***");
            println!("  Final Score: {}", session.score());
            println!("  Max Tile: {}", session.grid().max_tile());
            println!("\n  Press R to restart or Q to quit");
        }
        Status::Playing => {}
    }
    io::stdout().flush()?;
    Ok(())
}

#[derive(Debug, Default)]
struct Summary {
    scores: Vec<u64>,
    max_tiles: Vec<u32>,
    wins: u32,
}

/// Run headless simulation mode.
fn run_headless(args: &Args, config: SessionConfig, episodes: u32) -> Result<()> {
    let mut summary = Summary::default();
    let mut high_score = load_high_score(args)?;

    // Use a separate RNG for move selection
    let mut policy_rng = SmallRng::seed_from_u64(config.seed.wrapping_add(1000));

    for episode in 0..episodes {
        let episode_config = SessionConfig {
            seed: config.seed.wrapping_add(episode as u64),
            ..config.clone()
        };
        let mut session = Session::start(episode_config)?.with_high_score(high_score);
        let mut steps = 0;
        let mut cycle = 0;
        let mut won = false;

        while !session.is_over() && (args.max_steps == 0 || steps < args.max_steps) {
            let Some(dir) = (match args.policy {
                Policy::Random => select_random_move(&session, &mut policy_rng),
                Policy::Cycle => select_cycle_move(&session, &mut cycle),
            }) else {
                break;
            };

            let result = session.apply_move(dir)?;
            steps += 1;
            if result.cleared {
                won = true;
                if !result.over {
                    session.continue_after_win()?;
                }
            }

            if args.verbose {
                println!("Episode {} Step {}: {}", episode + 1, steps, dir);
                print_game(&session)?;
            }
        }

        high_score = session.high_score();
        summary.scores.push(session.score());
        summary.max_tiles.push(session.grid().max_tile());
        summary.wins += u32::from(won);
        info!(
            "episode {} finished: score={} max_tile={} steps={}",
            episode + 1,
            session.score(),
            session.grid().max_tile(),
            steps
        );

        if args.verbose {
            println!(
                "Episode {}: Score={}, MaxTile={}, Steps={}",
                episode + 1,
                session.score(),
                session.grid().max_tile(),
                steps
            );
        }
    }

    if let Some(path) = &args.high_score_file {
        highscore::save_if_higher(path, high_score)?;
    }
    print_summary(args, &config, summary);
    Ok(())
}

fn print_summary(args: &Args, config: &SessionConfig, mut summary: Summary) {
    let episodes = summary.scores.len();
    if episodes == 0 {
        println!("=== Simulation Results ===");
        println!("episodes=0");
        return;
    }

    let total: u64 = summary.scores.iter().sum();
    let avg_score = total as f64 / episodes as f64;
    summary.scores.sort_unstable();
    let median_score = if episodes % 2 == 0 {
        (summary.scores[episodes / 2 - 1] + summary.scores[episodes / 2]) as f64 / 2.0
    } else {
        summary.scores[episodes / 2] as f64
    };

    let mut tile_counts: HashMap<u32, u32> = HashMap::new();
    for tile in &summary.max_tiles {
        *tile_counts.entry(*tile).or_insert(0) += 1;
    }

    // Output results in parseable format
    println!("=== Simulation Results ===");
    println!("episodes={}", episodes);
    println!("grid={}x{}", config.rows, config.cols);
    println!("policy={:?}", args.policy);
    println!("seed={}", config.seed);
    println!("max_steps={}", args.max_steps);
    println!("avg_score={:.2}", avg_score);
    println!("median_score={:.2}", median_score);
    println!("min_score={}", summary.scores.first().unwrap_or(&0));
    println!("max_score={}", summary.scores.last().unwrap_or(&0));
    println!("wins={}", summary.wins);
    println!(
        "max_tile_overall={}",
        summary.max_tiles.iter().max().unwrap_or(&0)
    );

    let mut tile_list: Vec<_> = tile_counts.into_iter().collect();
    tile_list.sort_unstable();
    let distribution: Vec<String> = tile_list
        .iter()
        .map(|(tile, count)| format!("{tile}:{count}"))
        .collect();
    println!("tile_distribution={}", distribution.join(","));
}

fn legal_directions(session: &Session) -> Vec<Direction> {
    let legal = session.legal_moves();
    Direction::all()
        .into_iter()
        .filter(|dir| legal[*dir as usize])
        .collect()
}

/// Select a random legal move.
fn select_random_move(session: &Session, rng: &mut SmallRng) -> Option<Direction> {
    legal_directions(session).choose(rng).copied()
}

/// Select moves in a cycle: Left, Down, Right, Up.
fn select_cycle_move(session: &Session, cycle: &mut usize) -> Option<Direction> {
    const ORDER: [Direction; 4] = [Direction::Left, Direction::Down, Direction::Right, Direction::Up];
    let legal = session.legal_moves();

    // Try moves in cycle order, starting from current position
    for _ in 0..ORDER.len() {
        let dir = ORDER[*cycle % ORDER.len()];
        *cycle += 1;
        if legal[dir as usize] {
            return Some(dir);
        }
    }

    None
}

#[derive(Debug, PartialEq, Eq)]
enum InputAction {
    Move(Direction),
    Continue,
    Restart,
    Quit,
    None,
}

fn parse_input(bytes: &[u8]) -> InputAction {
    match bytes {
        // Arrow keys (escape sequences)
        [27, 91, 65] => InputAction::Move(Direction::Up),
        [27, 91, 66] => InputAction::Move(Direction::Down),
        [27, 91, 67] => InputAction::Move(Direction::Right),
        [27, 91, 68] => InputAction::Move(Direction::Left),

        // Control keys
        [b'q'] | [b'Q'] | [3] | [27] => InputAction::Quit, // q, Q, Ctrl+C, Esc
        [b'r'] | [b'R'] => InputAction::Restart,
        [b'c'] | [b'C'] => InputAction::Continue,

        // WASD keys
        [key] => match (*key as char).to_string().parse::<Direction>() {
            Ok(dir) => InputAction::Move(dir),
            Err(_) => InputAction::None,
        },

        _ => InputAction::None,
    }
}

fn print_game(session: &Session) -> Result<()> {
    print!("{}", session);
    io::stdout().flush()?;
    Ok(())
}

// Platform-specific terminal raw mode handling
#[cfg(unix)]
fn enable_raw_mode() {
    use std::os::unix::io::AsRawFd;
    unsafe {
        let fd = io::stdin().as_raw_fd();
        let mut termios: libc::termios = std::mem::zeroed();
        libc::tcgetattr(fd, &mut termios);
        termios.c_lflag &= !(libc::ICANON | libc::ECHO);
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;
        libc::tcsetattr(fd, libc::TCSANOW, &termios);
    }
}

#[cfg(unix)]
fn disable_raw_mode() {
    use std::os::unix::io::AsRawFd;
    unsafe {
        let fd = io::stdin().as_raw_fd();
        let mut termios: libc::termios = std::mem::zeroed();
        libc::tcgetattr(fd, &mut termios);
        termios.c_lflag |= libc::ICANON | libc::ECHO;
        libc::tcsetattr(fd, libc::TCSANOW, &termios);
    }
}

#[cfg(not(unix))]
fn enable_raw_mode() {
    // On non-Unix systems, just continue without raw mode
    // Interactive mode will require Enter after each key
}

#[cfg(not(unix))]
fn disable_raw_mode() {}

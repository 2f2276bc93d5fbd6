mod config;
mod debug;
mod game;
mod game_modes;
mod menu;
mod network;
mod ui;

use std::io;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use config::Config;
use menu::{GameMode, MenuAction, MenuState};

struct CliOptions {
    /// Jump straight into a mode instead of showing the menu
    mode: Option<GameMode>,
    debug: bool,
}

fn main() -> Result<(), io::Error> {
    let args: Vec<String> = std::env::args().collect();
    let cli = parse_args(&args);

    // File-based diagnostics; stderr is useless once the TUI owns the screen
    debug::init(cli.debug)?;
    debug::log("SESSION_START", "P2PFour starting");

    let config = config::load_config()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = match cli.mode {
        Some(ref mode) => run_mode(&mut terminal, &config, mode),
        None => run_menu(&mut terminal, &config),
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main menu loop; finished games return here
fn run_menu<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    config: &Config,
) -> Result<(), io::Error> {
    let mut menu_state = MenuState::new();

    loop {
        terminal.draw(|f| menu::render_menu(f, &menu_state))?;

        match menu::handle_menu_input(&mut menu_state)? {
            MenuAction::None => {}
            MenuAction::Quit => return Ok(()),
            MenuAction::StartGame(mode) => {
                run_mode(terminal, config, &mode)?;
                menu_state = MenuState::new();
            }
        }
    }
}

fn run_mode<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    config: &Config,
    mode: &GameMode,
) -> Result<(), io::Error> {
    match mode {
        GameMode::NetworkHost => game_modes::run_game_network_host(terminal, config),
        GameMode::NetworkJoin(code) => game_modes::run_game_network_join(terminal, config, code),
        GameMode::LocalTwoPlayer => game_modes::run_game_local(terminal, config),
    }
}

/// Parse command line arguments
fn parse_args(args: &[String]) -> CliOptions {
    let mut mode = None;
    let mut debug = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--host" => mode = Some(GameMode::NetworkHost),
            "--join" | "-j" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --join requires a room code");
                    eprintln!("Usage: {} --join <room-code>", args[0]);
                    std::process::exit(1);
                }
                i += 1;
                mode = Some(GameMode::NetworkJoin(args[i].clone()));
            }
            "--local" => mode = Some(GameMode::LocalTwoPlayer),
            "--debug" => debug = true,
            "--help" | "-h" => {
                print_usage(&args[0]);
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage(&args[0]);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    CliOptions { mode, debug }
}

fn print_usage(program: &str) {
    println!("P2PFour - Peer-to-Peer Terminal Connect Four");
    println!();
    println!("Usage:");
    println!("  {}                    # Interactive menu", program);
    println!("  {} --host             # Host a game (displays a room code)", program);
    println!("  {} --join <code>      # Join a hosted game", program);
    println!("  {} --local            # Two players on this keyboard", program);
    println!();
    println!("Options:");
    println!("  --debug               Write diagnostics to /tmp/p2pfour-debug.log");
    println!();
    println!("Example:");
    println!("  # Player one hosts and reads the code aloud:");
    println!("  {} --host", program);
    println!();
    println!("  # Player two joins with that code:");
    println!("  {} --join C4-7K9QWM", program);
}

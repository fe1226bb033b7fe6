use std::io;
use std::sync::Arc;

use baduk::{GameConfig, MoveTree, Player};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use kibitz_tui::{App, Preferences, ReviewController};
use ratatui::{backend::CrosstermBackend, Terminal};
use review_client::{RestBackend, UserContext};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "kibitz-tui", about = "Terminal AI review panel for go games")]
struct Args {
    /// Review server base URL.
    #[arg(long, default_value = "http://localhost:8080")]
    server: String,

    /// Game to review.
    #[arg(long)]
    game_id: u64,

    /// Game record as an encoded move string ("pddp..."), black first.
    #[arg(long)]
    moves: Option<String>,

    /// Board size.
    #[arg(long, default_value_t = 19)]
    size: u8,

    /// Signed-in user id; omit to browse anonymously.
    #[arg(long)]
    user_id: Option<u64>,

    /// Whether the signed-in user is a site supporter.
    #[arg(long, default_value_t = false)]
    supporter: bool,
}

fn build_tree(encoded: &str) -> anyhow::Result<MoveTree> {
    let moves = baduk::decode_moves(encoded)?;
    let mut tree = MoveTree::new();
    let mut cur = tree.root();
    let mut player = Player::Black;
    for mv in moves {
        cur = tree.play_trunk(cur, player, mv);
        player = player.opponent();
    }
    Ok(tree)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_dir = "logs";
    std::fs::create_dir_all(log_dir).ok();
    let file_appender = tracing_appender::rolling::daily(log_dir, "kibitz-tui");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    tracing::info!(game_id = args.game_id, server = %args.server, "kibitz starting up");

    let tree = match args.moves.as_deref() {
        Some(encoded) => build_tree(encoded)?,
        None => MoveTree::new(),
    };

    let user = match args.user_id {
        Some(id) => UserContext {
            id: Some(id),
            supporter: args.supporter,
            ..Default::default()
        },
        None => UserContext::default(),
    };

    let backend = RestBackend::new(&args.server)?;
    let controller = ReviewController::new(
        Arc::new(backend),
        args.game_id,
        user,
        GameConfig::new(args.size, args.size),
    );

    let prefs = kibitz_tui::load_preferences().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load preferences, using defaults");
        Preferences::default()
    });

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = App::new(controller, prefs, tree).run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    tracing::info!("kibitz shutting down");
    result
}

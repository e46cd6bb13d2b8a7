mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{AddArgs, ListArgs, Workspace};
use tasktide::persistence::init_local_tide;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tide")]
#[command(about = "A mood-adaptive task manager with daily check-ins and evening reflection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .tide directory in the current directory
    Init,
    /// Record how you're feeling today (1 = overwhelmed, 5 = great)
    Checkin {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        mood: u8,
        /// What's going on (asked for on low-energy days)
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Up to three tasks suited to today's mood
    Focus,
    /// Priority, today and overdue tasks
    Today,
    /// Tomorrow, this week and later
    Upcoming,
    /// Completed tasks by day
    Done,
    /// Search, filter and sort every task
    List(ListArgs),
    /// Add a task
    Add(AddArgs),
    /// Mark a task as done (id or unique id prefix)
    Complete { id: String },
    /// Show or advance the focus timer for a task
    Timer {
        id: String,
        /// Minutes already worked
        #[arg(short, long, default_value_t = 0)]
        elapsed: u32,
        /// Micro-steps finished (1-based, repeatable)
        #[arg(short, long = "step")]
        steps: Vec<usize>,
        /// Mark the task complete when done
        #[arg(short, long)]
        finish: bool,
    },
    /// Task counts and completion rate
    Stats,
    /// Evening reflection
    Reflect,
    /// First-run setup
    Onboard,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("TIDE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(Commands::Init) = cli.command {
        let cwd = std::env::current_dir()?;
        let tide_dir = init_local_tide(&cwd)?;
        println!("Initialized tide directory: {}", tide_dir.display());
        println!();
        println!("Tide will now use this local directory for task storage.");
        println!("Run 'tide onboard' to get started.");
        return Ok(());
    }

    let mut ws = Workspace::open()?;
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();

    match cli.command {
        None => ws.dashboard(),
        Some(Commands::Init) => Ok(()),
        Some(Commands::Checkin { mood, note }) => ws.check_in(mood, note.as_deref()),
        Some(Commands::Focus) => ws.focus(),
        Some(Commands::Today) => ws.today(),
        Some(Commands::Upcoming) => ws.upcoming(),
        Some(Commands::Done) => ws.done(),
        Some(Commands::List(args)) => ws.list(&args),
        Some(Commands::Add(args)) => ws.add(args),
        Some(Commands::Complete { id }) => ws.complete(&id),
        Some(Commands::Timer { id, elapsed, steps, finish }) => ws.timer(&id, elapsed, &steps, finish),
        Some(Commands::Stats) => ws.stats(),
        Some(Commands::Reflect) => ws.reflect(&mut input, &mut output),
        Some(Commands::Onboard) => ws.onboard(&mut input, &mut output),
    }
}

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use futures::StreamExt;
use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use maze_race::config::{MazeConfig, TraversalConfig, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use maze_race::records::RecordsTable;
use maze_race::renderer;
use maze_race::{
    generate, ChannelObserver, Completion, Coordinate, Grid, PendingSteps, SolverKind,
    TokioScheduler, TraversalEngine, TraversalEvent,
};

#[derive(Parser, Debug)]
#[command(name = "maze-race")]
#[command(about = "Generate a random maze and watch BFS and DFS explore it")]
struct Args {
    /// Maze width, even values shrink by one
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Maze height, even values shrink by one
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,

    /// Which traversal to run
    #[arg(short, long, value_enum, default_value_t = Algorithm::Both)]
    algorithm: Algorithm,

    /// Pause between traversal steps
    #[arg(long, default_value_t = 100)]
    delay_ms: u64,

    /// Seed for a reproducible maze and DFS order
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the step animation and only print the results
    #[arg(long)]
    no_animate: bool,

    /// Number of mazes to race on, a fresh one is generated for each round
    #[arg(long, default_value_t = 1)]
    rounds: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    Bfs,
    Dfs,
    Both,
}

impl Algorithm {
    fn solvers(self) -> Vec<SolverKind> {
        match self {
            Algorithm::Bfs => vec![SolverKind::BFS],
            Algorithm::Dfs => vec![SolverKind::DFS],
            Algorithm::Both => vec![SolverKind::BFS, SolverKind::DFS],
        }
    }
}

struct Host {
    displayed: Grid,
    animate: bool,
    pending: PendingSteps,
}

impl Host {
    fn new(displayed: Grid, animate: bool) -> Self {
        Self {
            displayed,
            animate,
            pending: PendingSteps::new(),
        }
    }

    fn draw(&self, elapsed: Duration, running: Option<SolverKind>) -> io::Result<()> {
        if !self.animate {
            return Ok(());
        }
        let mut stdout = io::stdout().lock();
        write!(
            stdout,
            "{}",
            renderer::frame(&self.displayed, elapsed.as_millis(), running)
        )?;
        stdout.flush()
    }

    /// Drops every outstanding step, then shows `maze` in place of the old one.
    fn refresh(&mut self, maze: Grid) -> usize {
        let cancelled = self.pending.cancel_all();
        self.displayed = maze;
        cancelled
    }

    // returns None when interrupted
    async fn race<R>(
        &mut self,
        engine: &TraversalEngine<TokioScheduler>,
        start: Coordinate,
        rng: R,
    ) -> anyhow::Result<Option<Completion>>
    where
        R: Rng + Send + 'static,
    {
        let solver = engine.solver();
        let (observer, mut events) = ChannelObserver::channel();
        let started = Instant::now();

        self.displayed.clear_visited();
        engine.run(start, &self.displayed, rng, observer)?;

        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(interrupt);

        loop {
            tokio::select! {
                event = events.next() => match event {
                    Some(TraversalEvent::Update(grid)) => {
                        self.displayed = grid;
                        self.draw(started.elapsed(), Some(solver))?;
                    }
                    Some(TraversalEvent::Scheduled(handle)) => self.pending.push(handle),
                    Some(TraversalEvent::Complete(completion)) => {
                        self.draw(completion.elapsed, None)?;
                        // the finished run's handles are spent
                        self.pending.cancel_all();
                        return Ok(Some(completion));
                    }
                    None => bail!("{} stopped without completing", solver),
                },
                _ = &mut interrupt => {
                    let cancelled = self.pending.cancel_all();
                    warn!("interrupted, cancelled {} pending steps", cancelled);
                    return Ok(None);
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let maze_config = MazeConfig {
        width: args.width,
        height: args.height,
        seed: args.seed,
    };
    let traversal_config = TraversalConfig {
        step_delay: if args.no_animate {
            Duration::ZERO
        } else {
            Duration::from_millis(args.delay_ms)
        },
    };

    let mut rng = maze_config.rng();
    let scheduler = TokioScheduler::current().context("no tokio runtime")?;
    let mut host = Host::new(Grid::with_dims(0, 0), !args.no_animate);
    let mut records = RecordsTable::new();

    'rounds: for round in 1..=args.rounds {
        let maze = generate(maze_config.width, maze_config.height, &mut rng)?;
        let start = maze.start().context("maze is too small to hold a start cell")?;
        info!(
            "round {}: start at {}, end at {:?}",
            round,
            start,
            maze.end()
        );

        host.refresh(maze);
        host.draw(Duration::ZERO, None)?;

        for solver in args.algorithm.solvers() {
            let engine = TraversalEngine::new(solver, scheduler.clone(), traversal_config);
            let dfs_rng = ChaCha8Rng::seed_from_u64(rng.gen());

            match host.race(&engine, start, dfs_rng).await? {
                Some(completion) => {
                    records.record(&completion);
                }
                None => break 'rounds,
            }
        }
    }

    if args.no_animate {
        print!("{}", renderer::render(&host.displayed));
    } else {
        println!();
    }
    print!("{}", records.render());

    Ok(())
}

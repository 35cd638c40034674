use std::time::Duration;

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use log::{debug, info};
use rand::Rng;

use crate::config::TraversalConfig;
use crate::error::TraversalError;
use crate::grids::{Coordinate, Grid};
use crate::solvers::scheduler::{Scheduler, TaskHandle};
use crate::solvers::{Completion, Search, SolverKind, Step};

/// Receives everything an animated traversal reports.
pub trait TraversalObserver: Send + 'static {
    /// A cell turned `visited`; `grid` is a fresh snapshot owned by the receiver.
    fn on_update(&mut self, grid: Grid);
    /// Fired exactly once per run, nothing follows it.
    fn on_complete(&mut self, completion: Completion);
    /// A further step is pending behind `handle`.
    fn on_schedule_step(&mut self, handle: TaskHandle);
}

/// Adapts three closures into a [`TraversalObserver`].
pub struct Callbacks<U, C, H> {
    pub on_update: U,
    pub on_complete: C,
    pub on_schedule_step: H,
}

impl<U, C, H> Callbacks<U, C, H>
where
    U: FnMut(Grid) + Send + 'static,
    C: FnMut(Completion) + Send + 'static,
    H: FnMut(TaskHandle) + Send + 'static,
{
    pub fn new(on_update: U, on_complete: C, on_schedule_step: H) -> Self {
        Self {
            on_update,
            on_complete,
            on_schedule_step,
        }
    }
}

impl<U, C, H> TraversalObserver for Callbacks<U, C, H>
where
    U: FnMut(Grid) + Send + 'static,
    C: FnMut(Completion) + Send + 'static,
    H: FnMut(TaskHandle) + Send + 'static,
{
    fn on_update(&mut self, grid: Grid) {
        (self.on_update)(grid)
    }

    fn on_complete(&mut self, completion: Completion) {
        (self.on_complete)(completion)
    }

    fn on_schedule_step(&mut self, handle: TaskHandle) {
        (self.on_schedule_step)(handle)
    }
}

#[derive(Debug, Clone)]
pub enum TraversalEvent {
    Update(Grid),
    Scheduled(TaskHandle),
    Complete(Completion),
}

/// Forwards observations into a channel so an async host can consume them as a stream.
pub struct ChannelObserver {
    tx: UnboundedSender<TraversalEvent>,
}

impl ChannelObserver {
    pub fn channel() -> (Self, UnboundedReceiver<TraversalEvent>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }

    fn send(&mut self, event: TraversalEvent) {
        if self.tx.unbounded_send(event).is_err() {
            debug!("traversal event dropped, receiver is gone");
        }
    }
}

impl TraversalObserver for ChannelObserver {
    fn on_update(&mut self, grid: Grid) {
        self.send(TraversalEvent::Update(grid));
    }

    fn on_complete(&mut self, completion: Completion) {
        self.send(TraversalEvent::Complete(completion));
    }

    fn on_schedule_step(&mut self, handle: TaskHandle) {
        self.send(TraversalEvent::Scheduled(handle));
    }
}

/// Animates a BFS or DFS by running one search step per scheduled continuation.
#[derive(Debug, Clone)]
pub struct TraversalEngine<S> {
    solver: SolverKind,
    scheduler: S,
    config: TraversalConfig,
}

impl<S: Scheduler> TraversalEngine<S> {
    pub fn new(solver: SolverKind, scheduler: S, config: TraversalConfig) -> Self {
        Self {
            solver,
            scheduler,
            config,
        }
    }

    pub fn bfs(scheduler: S, config: TraversalConfig) -> Self {
        Self::new(SolverKind::BFS, scheduler, config)
    }

    pub fn dfs(scheduler: S, config: TraversalConfig) -> Self {
        Self::new(SolverKind::DFS, scheduler, config)
    }

    pub fn solver(&self) -> SolverKind {
        self.solver
    }

    /// Starts a traversal of a private copy of `grid`.
    ///
    /// The first step runs before this returns; each later one is deferred by
    /// the configured step delay and announced through `on_schedule_step`.
    /// `rng` only matters for DFS, which shuffles its expansion order per step.
    pub fn run<R, O>(
        &self,
        start: Coordinate,
        grid: &Grid,
        rng: R,
        observer: O,
    ) -> Result<(), TraversalError>
    where
        R: Rng + Send + 'static,
        O: TraversalObserver,
    {
        let search = Search::new(self.solver, start, grid, rng)?;
        info!(
            "{} starting at {} on a {}x{} grid",
            self.solver,
            start,
            grid.width(),
            grid.height()
        );

        drive(
            search,
            observer,
            self.scheduler.clone(),
            self.config.step_delay,
        );
        Ok(())
    }
}

fn drive<R, O, S>(mut search: Search<R>, mut observer: O, scheduler: S, delay: Duration)
where
    R: Rng + Send + 'static,
    O: TraversalObserver,
    S: Scheduler,
{
    match search.step() {
        Step::Finished(completion) => observer.on_complete(completion),
        Step::Explored { update, .. } => {
            if let Some(grid) = update {
                observer.on_update(grid);
            }

            let handle = TaskHandle::new();
            observer.on_schedule_step(handle.clone());

            let next = scheduler.clone();
            scheduler.schedule(
                delay,
                handle,
                Box::new(move || drive(search, observer, next, delay)),
            );
        }
    }
}

#[cfg(test)]
mod test_engine {
    use super::*;
    use crate::generators::generate;
    use crate::grids::CellKind::{self, *};
    use crate::solvers::scheduler::{ManualScheduler, PendingSteps, TokioScheduler};
    use futures::StreamExt;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorded {
        updates: Vec<Grid>,
        completions: Vec<Completion>,
        handles: PendingSteps,
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Recorded>>);

    impl Recorder {
        fn with<T>(&self, f: impl FnOnce(&mut Recorded) -> T) -> T {
            f(&mut self.0.lock().unwrap())
        }
    }

    impl TraversalObserver for Recorder {
        fn on_update(&mut self, grid: Grid) {
            self.with(|r| r.updates.push(grid));
        }

        fn on_complete(&mut self, completion: Completion) {
            self.with(|r| r.completions.push(completion));
        }

        fn on_schedule_step(&mut self, handle: TaskHandle) {
            self.with(|r| r.handles.push(handle));
        }
    }

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    fn engines(scheduler: &ManualScheduler) -> Vec<TraversalEngine<ManualScheduler>> {
        let config = TraversalConfig::default();
        vec![
            TraversalEngine::bfs(scheduler.clone(), config),
            TraversalEngine::dfs(scheduler.clone(), config),
        ]
    }

    fn grid(rows: Vec<Vec<CellKind>>) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    #[test]
    fn reaches_end_one_step_per_continuation() {
        let maze = grid(vec![
            vec![Start, Path, End],
            vec![Wall, Wall, Wall],
            vec![Wall, Wall, Wall],
        ]);

        for engine in engines(&ManualScheduler::new()) {
            let scheduler = engine.scheduler.clone();
            let recorder = Recorder::default();

            engine
                .run(Coordinate::new(0, 0), &maze, rng(0), recorder.clone())
                .unwrap();
            // the first step ran synchronously and queued the second
            assert_eq!(scheduler.pending(), 1);
            assert_eq!(scheduler.next_delay(), Some(Duration::from_millis(100)));

            assert_eq!(scheduler.run_until_idle(), 2);
            recorder.with(|r| {
                assert_eq!(r.updates.len(), 1);
                assert_eq!(r.updates[0].to_rows()[0], vec![Start, Visited, End]);
                assert_eq!(r.handles.len(), 2);
                assert_eq!(r.completions.len(), 1);
                assert!(r.completions[0].found);
                assert_eq!(r.completions[0].label(), engine.solver().label());
            });
        }
    }

    #[test]
    fn walled_off_end_exhausts_and_completes_once() {
        let mut maze = generate(15, 15, rng(21)).unwrap();
        let end = maze.end().unwrap();
        for (dx, dy) in [(0, 1), (1, 0), (0, -1), (-1, 0)] {
            let x = (end.x as isize + dx) as usize;
            let y = (end.y as isize + dy) as usize;
            maze.set_cell(x, y, Wall);
        }
        let start = maze.start().unwrap();

        for engine in engines(&ManualScheduler::new()) {
            let scheduler = engine.scheduler.clone();
            let recorder = Recorder::default();

            engine.run(start, &maze, rng(2), recorder.clone()).unwrap();
            scheduler.run_until_idle();

            recorder.with(|r| {
                assert_eq!(r.completions.len(), 1);
                assert!(!r.completions[0].found);
                let last = r.updates.last().unwrap();
                assert_eq!(last.count(Visited), r.updates.len());
                assert_eq!(last.count(End), 1);
            });
        }
    }

    #[test]
    fn each_update_marks_exactly_one_cell() {
        let maze = generate(21, 15, rng(5)).unwrap();
        let start = maze.start().unwrap();

        for engine in engines(&ManualScheduler::new()) {
            let scheduler = engine.scheduler.clone();
            let recorder = Recorder::default();

            engine.run(start, &maze, rng(6), recorder.clone()).unwrap();

            let mut steps = 1;
            loop {
                let before = recorder.with(|r| r.updates.len());
                if !scheduler.run_next() {
                    break;
                }
                steps += 1;
                let after = recorder.with(|r| r.updates.len());
                assert!(after - before <= 1);
            }

            recorder.with(|r| {
                assert!(r.updates.len() <= steps);
                let mut previous = maze.clone();
                for update in &r.updates {
                    let changed: Vec<(CellKind, CellKind)> = previous
                        .rows()
                        .flatten()
                        .zip(update.rows().flatten())
                        .filter(|(a, b)| a != b)
                        .map(|(a, b)| (*a, *b))
                        .collect();
                    assert_eq!(changed, vec![(Path, Visited)]);
                    previous = update.clone();
                }
                assert!(r.completions[0].found);
            });
        }
    }

    #[test]
    fn callers_grid_is_never_touched() {
        let maze = generate(11, 11, rng(9)).unwrap();
        let original = maze.clone();
        let scheduler = ManualScheduler::new();
        let updates = Arc::new(Mutex::new(0));

        let counted = Arc::clone(&updates);
        let callbacks = Callbacks::new(
            move |_grid: Grid| *counted.lock().unwrap() += 1,
            |_completion: Completion| {},
            |_handle: TaskHandle| {},
        );
        TraversalEngine::bfs(scheduler.clone(), TraversalConfig::default())
            .run(maze.start().unwrap(), &maze, rng(0), callbacks)
            .unwrap();
        scheduler.run_until_idle();

        assert!(*updates.lock().unwrap() > 0);
        assert_eq!(maze, original);
    }

    #[test]
    fn cancelling_handles_stops_the_run() {
        let maze = generate(31, 31, rng(3)).unwrap();
        let scheduler = ManualScheduler::new();
        let recorder = Recorder::default();

        TraversalEngine::dfs(scheduler.clone(), TraversalConfig::default())
            .run(maze.start().unwrap(), &maze, rng(3), recorder.clone())
            .unwrap();
        for _ in 0..5 {
            assert!(scheduler.run_next());
        }

        let cancelled = recorder.with(|r| r.handles.cancel_all());
        assert_eq!(cancelled, 6);
        let updates = recorder.with(|r| r.updates.len());

        assert_eq!(scheduler.run_until_idle(), 0);
        recorder.with(|r| {
            assert!(r.completions.is_empty());
            assert_eq!(r.updates.len(), updates);
        });
    }

    #[test]
    fn out_of_bounds_start_fails_fast() {
        let maze = grid(vec![vec![Start, End]]);
        let scheduler = ManualScheduler::new();
        let recorder = Recorder::default();

        let result = TraversalEngine::bfs(scheduler.clone(), TraversalConfig::default()).run(
            Coordinate::new(0, 3),
            &maze,
            rng(0),
            recorder.clone(),
        );

        assert!(matches!(
            result,
            Err(TraversalError::StartOutOfBounds { .. })
        ));
        assert_eq!(scheduler.pending(), 0);
        recorder.with(|r| assert!(r.completions.is_empty()));
    }

    #[test]
    fn start_on_end_completes_without_scheduling() {
        let maze = grid(vec![vec![End]]);
        let scheduler = ManualScheduler::new();
        let recorder = Recorder::default();

        TraversalEngine::dfs(scheduler.clone(), TraversalConfig::default())
            .run(Coordinate::new(0, 0), &maze, rng(0), recorder.clone())
            .unwrap();

        assert_eq!(scheduler.pending(), 0);
        recorder.with(|r| {
            assert_eq!(r.completions.len(), 1);
            assert!(r.completions[0].found);
            assert!(r.handles.is_empty());
        });
    }

    #[tokio::test]
    async fn animates_on_tokio_timer() {
        let maze = generate(9, 9, rng(12)).unwrap();
        let config = TraversalConfig {
            step_delay: Duration::from_millis(1),
        };
        let engine = TraversalEngine::bfs(TokioScheduler::current().unwrap(), config);
        let (observer, mut events) = ChannelObserver::channel();

        engine
            .run(maze.start().unwrap(), &maze, rng(0), observer)
            .unwrap();

        let mut updates = 0;
        let completion = loop {
            match events.next().await {
                Some(TraversalEvent::Update(_)) => updates += 1,
                Some(TraversalEvent::Scheduled(_)) => {}
                Some(TraversalEvent::Complete(completion)) => break completion,
                None => panic!("traversal ended without completing"),
            }
        };

        assert!(completion.found);
        assert!(updates > 0);
        assert!(completion.elapsed >= Duration::from_millis(updates));
    }
}

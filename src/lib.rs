pub mod config;
pub mod error;
pub mod generators;
pub mod grids;
pub mod records;
pub mod renderer;
pub mod solvers;

pub use error::{MazeError, TraversalError};
pub use generators::{generate, Generator, RecursiveBacktracker};
pub use grids::{CellKind, Coordinate, Grid};
pub use solvers::engine::{
    Callbacks, ChannelObserver, TraversalEngine, TraversalEvent, TraversalObserver,
};
pub use solvers::scheduler::{
    ManualScheduler, PendingSteps, Scheduler, TaskHandle, TokioScheduler,
};
pub use solvers::{solve, Completion, Search, SolverKind};

//! Report scheduling: clocks, next-run math, and the polling engine

pub mod clock;
pub mod engine;
pub mod next_run;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{
    DataSource, DirectorySink, MemorySink, ReportEngine, ReportSink, StaticDataSource,
    StoreDataSource,
};
pub use next_run::{calculate_next_run, parse_time_of_day, weekday_from_index, Frequency};

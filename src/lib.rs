//! Pairwise genome matrix view.
//!
//! Interval records pair a proximal and a distal genomic range with a colour
//! category. They are bucketed by chromosome pair, summarized as a coloured
//! chromosome-by-chromosome grid, and shown record by record when zoomed into
//! a single pair. [`App`] holds the view state and reacts to interaction
//! events; [`App::scene`] describes the current frame for the PNG and SVG
//! writers in [`render`].

pub mod app;
pub mod color;
pub mod config;
pub mod coords;
pub mod error;
pub mod genome;
pub mod geom;
pub mod gesture;
pub mod io;
pub mod layers;
pub mod partition;
pub mod reconcile;
pub mod record;
pub mod render;

pub use app::{App, Event, SourceMode, ViewMode};
pub use config::Config;
pub use error::{PairGenomeError, Result};
pub use genome::Genome;
pub use partition::{Partition, Strategy};
pub use record::{DataSource, IntervalRecord};

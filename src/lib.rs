//! Training-plan periodization: non-overlapping week ranges ("periods")
//! over a bounded timeline, each carrying the exercises scheduled inside it,
//! kept in sync with the planning backend.

pub mod editor;
pub mod error;
pub mod export;
pub mod filter;
pub mod gateway;
pub mod mapping;
pub mod model;
pub mod resolver;
pub mod settings;
pub mod store;
pub mod timeline;

pub use editor::{PeriodEditor, Selection, SelectionState, WeekStatus};
pub use error::{BoundaryError, OverlapError, PeriodError};
pub use filter::{Category, CategoryFlags, filter_exercises};
pub use gateway::{AuthContext, GatewayError, HttpGateway, InMemoryGateway, PeriodGateway};
pub use model::{Exercise, ExerciseAssignment, Period, ScheduledExercise, Variant};
pub use resolver::resolve_exercises;
pub use settings::Settings;
pub use store::{DeleteOutcome, Direction, Endpoint, PeriodStore};
pub use timeline::{Timeline, WeekRange};

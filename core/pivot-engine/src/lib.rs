//! FILENAME: core/pivot-engine/src/lib.rs
//! Pivot reporting engine.
//!
//! Turns a sheet of sales records into grouped, aggregated text reports.
//! It depends on `engine` only for shared types (CellValue, Grid, GridLayout).
//!
//! Layers:
//! - `table`: typed records built from a grid (WHAT the data is)
//! - `definition`: grouping/stats/custom specs (WHAT to compute)
//! - `modeler` + `analyzer`: the aggregation tree (HOW we compute)
//! - `layout` + `reporter`: sized, styled lines (WHAT we display)

pub mod analyzer;
pub mod calculations;
pub mod definition;
pub mod dictionary;
pub mod error;
pub mod followup;
pub mod format;
pub mod inference;
pub mod layout;
pub mod lookup;
pub mod modeler;
pub mod reporter;
pub mod styled;
pub mod table;
pub mod types;

pub use analyzer::{Analyzer, Stats};
pub use calculations::{Calculation, CalculationSpec};
pub use definition::{
    coerce_value, CustomSpec, GroupingSpec, Rollup, ScalarValue, StatsSpec, Thresholds, Transform,
};
pub use dictionary::{Dictionary, DictionaryEntry, EntryProp};
pub use error::{PivotError, PivotResult};
pub use followup::{parse_display_number, Leaderboard, LeaderboardEntry, LeaderboardSpec};
pub use format::{Formatter, BLANK_LABEL, NOT_AVAILABLE};
pub use inference::guess_type;
pub use layout::{Layout, LayoutOptions, TOTAL_LABEL};
pub use lookup::Lookup;
pub use modeler::{Axis, AxisValue, Found, Modeler, Node, NodeId, PathSegment, Tree};
pub use reporter::{RenderedReport, ReportOptions, Reporter};
pub use styled::{Align, Emphasis, Line, Styled, Traffic, Trend};
pub use table::{Record, RecordId, Table, TableOptions};
pub use types::{MissingPolicy, SemanticType, StatKind};

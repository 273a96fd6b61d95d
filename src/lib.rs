#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dump;
pub mod error;
pub mod ir;
pub mod layout;
pub mod parser;
pub mod scale;
pub mod text_metrics;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, DeclutterConfig, LayoutMode, TickStyle};
pub use error::{ConfigWarning, DeclutterError};
pub use ir::{Label, LabelId, TimeAnchor};
pub use layout::{
    RowId, TickLevel, TickVisibility, VisibilityInterval, VisibilityTable,
    compute_tick_visibility, compute_visibility,
};
pub use parser::parse_timeline;
pub use scale::{LinearTimeScale, TimeMapping};

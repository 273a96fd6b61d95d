use thiserror::Error;

pub type Result<T, E = DeclutterError> = std::result::Result<T, E>;

/// Fatal failures of one visibility computation.
///
/// Every variant is deterministic: recomputing with the same labels, mapping
/// and configuration fails the same way. Callers keep rendering with the last
/// table that was computed successfully.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeclutterError {
    #[error("invariant violated during {stage}: {detail}")]
    InvariantViolation { stage: &'static str, detail: String },

    #[error("label `{label}` uses unsupported feature: {feature}")]
    UnsupportedFeature { label: String, feature: &'static str },

    #[error("invalid zoom range [{k_min}, {k_max}]")]
    InvalidRange { k_min: f64, k_max: f64 },

    #[error("label id `{label}` is used by more than one label")]
    DuplicateLabel { label: String },

    #[error("label `{label}` has invalid weight {weight}")]
    InvalidWeight { label: String, weight: f64 },

    #[error("degenerate time mapping: {0}")]
    InvalidMapping(String),
}

impl DeclutterError {
    pub(crate) fn invariant(stage: &'static str, detail: impl Into<String>) -> Self {
        Self::InvariantViolation {
            stage,
            detail: detail.into(),
        }
    }
}

/// Non-fatal configuration problems. The computation recovers and records
/// them on the resulting table.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    /// The label asked for a row that the layout mode does not have. It is
    /// placed automatically instead.
    RowPinOutOfRange {
        mode: String,
        label: String,
        pin: usize,
        rows: usize,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::RowPinOutOfRange {
                mode,
                label,
                pin,
                rows,
            } => write!(
                f,
                "mode `{mode}`: label `{label}` pinned to row {pin} but only {rows} rows exist"
            ),
        }
    }
}

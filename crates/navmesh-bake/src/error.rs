//! Error types for bake operations.
//!
//! Only fatal conditions become errors. Degraded results (unmatched islands,
//! region overflow, an exhausted Delaunay pass budget) and per-item failures
//! (links that cannot be resolved) are recorded in the
//! [`BakeReport`](crate::report::BakeReport) instead.
//!
//! # Error Codes
//!
//! Each error has a unique code in the format `NAV-XXXX`:
//! - `NAV-1xxx`: input errors (missing or malformed authoring data, file I/O)
//! - `NAV-2xxx`: configuration errors
//! - `NAV-3xxx`: pipeline errors (cancellation)

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::pipeline::BakeStage;
use crate::report::BakeReport;

/// Result type alias for bake operations.
pub type NavResult<T> = Result<T, BakeError>;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Input errors (1xxx)
    /// NAV-1001: No triangulation supplied
    EmptyInput = 1001,
    /// NAV-1002: Triangle references a vertex that does not exist
    InvalidVertexIndex = 1002,
    /// NAV-1003: Vertex has a NaN or infinite coordinate
    InvalidCoordinate = 1003,
    /// NAV-1004: Failed to read an input file
    IoRead = 1004,
    /// NAV-1005: Failed to write an output file
    IoWrite = 1005,
    /// NAV-1006: Failed to parse an input file
    ParseError = 1006,
    /// NAV-1007: Flat input arrays have the wrong shape
    MalformedInput = 1007,

    // Configuration errors (2xxx)
    /// NAV-2001: Region cap outside the supported range
    InvalidRegionCap = 2001,
    /// NAV-2002: Other invalid configuration value
    InvalidConfig = 2002,

    // Pipeline errors (3xxx)
    /// NAV-3001: Caller cancelled the bake
    Cancelled = 3001,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `NAV-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EmptyInput => "NAV-1001",
            ErrorCode::InvalidVertexIndex => "NAV-1002",
            ErrorCode::InvalidCoordinate => "NAV-1003",
            ErrorCode::IoRead => "NAV-1004",
            ErrorCode::IoWrite => "NAV-1005",
            ErrorCode::ParseError => "NAV-1006",
            ErrorCode::MalformedInput => "NAV-1007",
            ErrorCode::InvalidRegionCap => "NAV-2001",
            ErrorCode::InvalidConfig => "NAV-2002",
            ErrorCode::Cancelled => "NAV-3001",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fatal errors that abort a bake.
#[derive(Debug, Error, Diagnostic)]
pub enum BakeError {
    /// No triangles were supplied.
    #[error("no input triangulation: {details}")]
    #[diagnostic(
        code(navmesh::input::empty),
        help("Check that the walkable surface was exported with at least one triangle.")
    )]
    EmptyInput { details: String },

    /// A triangle references a vertex outside the vertex array.
    #[error(
        "invalid vertex index: triangle {triangle_index} references vertex {vertex_index}, but input only has {vertex_count} vertices"
    )]
    #[diagnostic(
        code(navmesh::input::vertex_index),
        help("The exporter produced a dangling index. Re-export the walkable surface.")
    )]
    InvalidVertexIndex {
        triangle_index: usize,
        vertex_index: usize,
        vertex_count: usize,
    },

    /// A vertex coordinate is NaN or infinite.
    #[error("invalid coordinate at vertex {vertex_index}: {axis} is {value}")]
    #[diagnostic(
        code(navmesh::input::coordinate),
        help("Check the source geometry for collapsed or unapplied transforms.")
    )]
    InvalidCoordinate {
        vertex_index: usize,
        axis: &'static str,
        value: f64,
    },

    /// Error reading an input file.
    #[error("failed to read {path}")]
    #[diagnostic(code(navmesh::io::read), help("Check that the file exists and is readable."))]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing an output file.
    #[error("failed to write {path}")]
    #[diagnostic(code(navmesh::io::write), help("Check that the directory exists and is writable."))]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing an input file.
    #[error("failed to parse {path}: {details}")]
    #[diagnostic(code(navmesh::io::parse))]
    ParseError { path: PathBuf, details: String },

    /// Flat input arrays do not divide into whole records.
    #[error("malformed input: {details}")]
    #[diagnostic(code(navmesh::input::malformed))]
    MalformedInput { details: String },

    /// Region cap is zero or larger than the runtime supports.
    #[error("invalid region cap {cap}: must be between 1 and {max}")]
    #[diagnostic(
        code(navmesh::config::region_cap),
        help("Set `max_regions` to a value between 1 and {}.", max)
    )]
    InvalidRegionCap { cap: usize, max: usize },

    /// Any other configuration value out of range.
    #[error("invalid configuration: {field} {details}")]
    #[diagnostic(code(navmesh::config::invalid))]
    InvalidConfig { field: &'static str, details: String },

    /// The progress callback asked the bake to stop.
    #[error("bake cancelled after stage {stage}")]
    #[diagnostic(code(navmesh::pipeline::cancelled))]
    Cancelled { stage: BakeStage },
}

impl BakeError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            BakeError::EmptyInput { .. } => ErrorCode::EmptyInput,
            BakeError::InvalidVertexIndex { .. } => ErrorCode::InvalidVertexIndex,
            BakeError::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
            BakeError::IoRead { .. } => ErrorCode::IoRead,
            BakeError::IoWrite { .. } => ErrorCode::IoWrite,
            BakeError::ParseError { .. } => ErrorCode::ParseError,
            BakeError::MalformedInput { .. } => ErrorCode::MalformedInput,
            BakeError::InvalidRegionCap { .. } => ErrorCode::InvalidRegionCap,
            BakeError::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            BakeError::Cancelled { .. } => ErrorCode::Cancelled,
        }
    }

    /// Whether this error came from the caller cancelling the bake.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BakeError::Cancelled { .. })
    }

    /// Create an EmptyInput error.
    pub fn empty_input(details: impl Into<String>) -> Self {
        BakeError::EmptyInput {
            details: details.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(field: &'static str, details: impl Into<String>) -> Self {
        BakeError::InvalidConfig {
            field,
            details: details.into(),
        }
    }

    /// Create a MalformedInput error.
    pub fn malformed_input(details: impl Into<String>) -> Self {
        BakeError::MalformedInput {
            details: details.into(),
        }
    }

    /// Create a ParseError.
    pub fn parse_error(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        BakeError::ParseError {
            path: path.into(),
            details: details.into(),
        }
    }
}

/// A failed bake: the fatal error plus everything reported before it.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct BakeFailure {
    /// The fatal error.
    #[source]
    pub error: BakeError,

    /// Last stage that completed before the failure.
    pub stage: BakeStage,

    /// Diagnostics collected up to the failure.
    pub report: BakeReport,
}

impl BakeFailure {
    /// Whether the caller cancelled the bake.
    pub fn is_cancelled(&self) -> bool {
        self.error.is_cancelled()
    }
}

/// Errors loading or saving a [`BakeConfig`](crate::config::BakeConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading or writing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

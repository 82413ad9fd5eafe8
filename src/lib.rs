// src/lib.rs
//! Structural repository modeling.
//!
//! Given a source tree, `repograph` produces a directed graph of
//! inter-file references, a normalized importance score per node, and
//! deterministic 2-D coordinates for visualization. The two entry
//! points are [`scan`] (walk, extract, resolve, build, score) and
//! [`layout`] (seeded force-directed simulation over a finished graph).
//!
//! The core understands import/reference syntax only: it never executes
//! scanned code, and dynamic or computed references resolve best-effort
//! or surface as external nodes.

pub mod error;
pub mod extract;
pub mod graph;
pub mod lang;
pub mod layout;
pub mod options;
pub mod scan;
pub mod score;
pub mod serialize;
pub mod walker;

pub use error::{ConfigError, Diagnostic, DiagnosticKind};
pub use extract::{RawReference, ReferenceKind, Resolution};
pub use graph::{Edge, Graph, Node, NodeKind, EXTERNAL_PREFIX};
pub use lang::Lang;
pub use layout::{layout, LayoutResult};
pub use options::{ResolutionPolicy, ScanBudget, ScanOptions, ScoreWeights, SimParams};
pub use scan::{scan, ScanResult};
pub use serialize::{build_records, write_graph_document, write_node_records, NodeRecord};
pub use walker::FileDescriptor;

//! Engine configuration, validation, and error types.
//!
//! [`EngineConfig`] pairs a flow graph with a [`KernelSpec`].
//! [`validate()`](EngineConfig::validate) compiles the spec once at
//! startup; nothing is checked per node.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use rivulet_core::{CompileError, OrderError};
use rivulet_graph::{FlowGraph, FlowGraphParts, GraphError};
use rivulet_kernel::{KernelLayout, KernelSpec};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while configuring an engine.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The kernel specification is invalid.
    Compile(CompileError),
    /// The flow graph arrays are invalid.
    Graph(GraphError),
    /// A raw application order code is not supported.
    Order(OrderError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile(e) => write!(f, "kernel: {e}"),
            Self::Graph(e) => write!(f, "graph: {e}"),
            Self::Order(e) => write!(f, "order: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Compile(e) => Some(e),
            Self::Graph(e) => Some(e),
            Self::Order(e) => Some(e),
        }
    }
}

impl From<CompileError> for ConfigError {
    fn from(e: CompileError) -> Self {
        Self::Compile(e)
    }
}

impl From<GraphError> for ConfigError {
    fn from(e: GraphError) -> Self {
        Self::Graph(e)
    }
}

impl From<OrderError> for ConfigError {
    fn from(e: OrderError) -> Self {
        Self::Order(e)
    }
}

// ── EngineConfig ───────────────────────────────────────────────────

/// Complete configuration for constructing a [`KernelEngine`](crate::KernelEngine).
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Flow graph the kernel is applied over.
    pub graph: Arc<FlowGraph>,
    /// Kernel fields, outputs and run settings.
    pub spec: KernelSpec,
}

impl EngineConfig {
    /// Configuration over an already built graph.
    pub fn new(graph: impl Into<Arc<FlowGraph>>, spec: KernelSpec) -> Self {
        Self {
            graph: graph.into(),
            spec,
        }
    }

    /// Configuration over raw router output, validated here.
    pub fn from_parts(parts: FlowGraphParts, spec: KernelSpec) -> Result<Self, ConfigError> {
        Ok(Self::new(FlowGraph::from_parts(parts)?, spec))
    }

    /// Compile the kernel specification.
    pub fn validate(&self) -> Result<KernelLayout, ConfigError> {
        Ok(self.spec.compile()?)
    }
}

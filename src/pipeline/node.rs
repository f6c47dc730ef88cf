// src/pipeline/node.rs

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ExecError;
use crate::exec::{CommandSpec, Launcher, ProcessRunner};
use crate::types::OperationType;

use super::Executable;

/// A single command together with the launcher that starts it.
#[derive(Debug, Clone)]
pub struct Leaf {
    spec: Arc<CommandSpec>,
    launcher: Arc<dyn Launcher>,
    pub(crate) shutdown_timeout: Duration,
}

impl Leaf {
    pub(crate) fn new(spec: CommandSpec, launcher: Arc<dyn Launcher>, shutdown_timeout: Duration) -> Self {
        Self {
            spec: Arc::new(spec),
            launcher,
            shutdown_timeout,
        }
    }

    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    pub(crate) fn start(&self) -> Result<ProcessRunner, ExecError> {
        self.launcher.start(&self.spec)
    }
}

/// Composite operator node. `Background` has no right operand.
#[derive(Debug)]
pub enum Node {
    Pipe(Executable, Executable),
    And(Executable, Executable),
    Or(Executable, Executable),
    Background(Executable),
}

impl Node {
    pub fn operation(&self) -> OperationType {
        match self {
            Node::Pipe(..) => OperationType::Pipe,
            Node::And(..) => OperationType::And,
            Node::Or(..) => OperationType::Or,
            Node::Background(_) => OperationType::Background,
        }
    }
}

/// Handle to a shared composite node plus the shutdown timeout its own
/// `run` uses.
#[derive(Debug, Clone)]
pub struct Pipeline {
    node: Arc<Node>,
    pub(crate) shutdown_timeout: Duration,
}

impl Pipeline {
    pub(crate) fn new(node: Node, shutdown_timeout: Duration) -> Self {
        Self {
            node: Arc::new(node),
            shutdown_timeout,
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Pipe(l, r) => {
                write_operand(f, l, true)?;
                f.write_str(" | ")?;
                write_operand(f, r, false)
            }
            Node::And(l, r) => {
                write_operand(f, l, false)?;
                f.write_str(" && ")?;
                write_operand(f, r, false)
            }
            Node::Or(l, r) => {
                write_operand(f, l, false)?;
                f.write_str(" || ")?;
                write_operand(f, r, false)
            }
            Node::Background(e) => {
                write_operand(f, e, false)?;
                f.write_str(" &")
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, exec: &Executable, bare_pipe: bool) -> fmt::Result {
    match exec {
        Executable::Leaf(leaf) => write!(f, "{}", leaf.spec()),
        Executable::Pipeline(p) if bare_pipe && p.node().operation() == OperationType::Pipe => {
            write!(f, "{p}")
        }
        Executable::Pipeline(p) => write!(f, "({p})"),
    }
}

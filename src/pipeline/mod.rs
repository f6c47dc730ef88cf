// src/pipeline/mod.rs

//! Composition of processes into pipelines.
//!
//! An [`Executable`] is either a single command ([`Leaf`]) or a composite
//! ([`Pipeline`]) built with the `|`, `&&`, `||` and `&` combinators. Building
//! a tree never starts anything; processes are only spawned by
//! [`Executable::run`].
//!
//! ```no_run
//! # async fn demo() {
//! use shellpipe::cmd;
//! use tokio_util::sync::CancellationToken;
//!
//! let tree = cmd("printf", ["a\nb\na\n"])
//!     .pipe(cmd("grep", ["a"]))
//!     .pipe(cmd("wc", ["-l"]));
//!
//! let result = tree.run(&CancellationToken::new()).await;
//! assert_eq!(result.stdout_lossy().trim(), "2");
//! # }
//! ```

pub mod node;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::engine::ExecutionVisitor;
use crate::exec::{CommandSpec, Launcher, SystemLauncher};
use crate::result::RunResult;
use crate::types::OperationType;

pub use node::{Leaf, Node, Pipeline};

/// Grace period used when nothing else was configured.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Boxed future returned by [`Executable::run`].
pub type RunFuture<'a> = Pin<Box<dyn Future<Output = RunResult> + Send + 'a>>;

/// Anything that can be composed with the pipeline operators and run.
///
/// Cloning is cheap: operands are shared behind `Arc`, so the same subtree
/// may appear in several trees.
#[derive(Debug, Clone)]
pub enum Executable {
    Leaf(Leaf),
    Pipeline(Pipeline),
}

impl Executable {
    /// A single command started through `launcher`.
    pub fn with_launcher(spec: CommandSpec, launcher: Arc<dyn Launcher>) -> Self {
        Executable::Leaf(Leaf::new(spec, launcher, DEFAULT_SHUTDOWN_TIMEOUT))
    }

    pub fn operation(&self) -> OperationType {
        match self {
            Executable::Leaf(_) => OperationType::Single,
            Executable::Pipeline(p) => p.node().operation(),
        }
    }

    pub fn shutdown_timeout(&self) -> Duration {
        match self {
            Executable::Leaf(leaf) => leaf.shutdown_timeout,
            Executable::Pipeline(p) => p.shutdown_timeout,
        }
    }

    /// `self | next`
    pub fn pipe(self, next: Executable) -> Executable {
        self.compose(|left| Node::Pipe(left, next))
    }

    /// `self && next`
    pub fn and(self, next: Executable) -> Executable {
        self.compose(|left| Node::And(left, next))
    }

    /// `self || next`
    pub fn or(self, next: Executable) -> Executable {
        self.compose(|left| Node::Or(left, next))
    }

    /// `self &`
    pub fn background(self) -> Executable {
        self.compose(Node::Background)
    }

    /// Set the grace period this node's own `run` gives cancelled work
    /// before abandoning or force-killing it.
    ///
    /// Returns a new handle; other handles to the same subtree keep their
    /// timeout.
    pub fn with_shutdown_timeout(self, timeout: Duration) -> Executable {
        match self {
            Executable::Leaf(mut leaf) => {
                leaf.shutdown_timeout = timeout;
                Executable::Leaf(leaf)
            }
            Executable::Pipeline(mut p) => {
                p.shutdown_timeout = timeout;
                Executable::Pipeline(p)
            }
        }
    }

    fn compose(self, build: impl FnOnce(Executable) -> Node) -> Executable {
        let timeout = self.shutdown_timeout();
        Executable::Pipeline(Pipeline::new(build(self), timeout))
    }

    /// Execute the tree under `token`.
    ///
    /// A fresh visitor is created for this call. Background jobs started by
    /// this node are drained before the returned future resolves, unless the
    /// root result itself failed.
    pub fn run<'a>(&'a self, token: &'a CancellationToken) -> RunFuture<'a> {
        Box::pin(async move {
            let mut visitor = ExecutionVisitor::new(token.clone(), self.shutdown_timeout());

            let result = match self {
                Executable::Leaf(leaf) => visitor.visit_process(leaf).await,
                Executable::Pipeline(p) => match p.node() {
                    Node::Pipe(left, right) => visitor.visit_pipe(left, right).await,
                    Node::And(left, right) => visitor.visit_and(left, right).await,
                    Node::Or(left, right) => visitor.visit_or(left, right).await,
                    Node::Background(exec) => visitor.visit_background(exec),
                },
            };

            visitor.finish(result).await
        })
    }
}

impl From<CommandSpec> for Executable {
    fn from(spec: CommandSpec) -> Self {
        Executable::with_launcher(spec, Arc::new(SystemLauncher))
    }
}

impl fmt::Display for Executable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Executable::Leaf(leaf) => write!(f, "{}", leaf.spec()),
            Executable::Pipeline(p) => write!(f, "{p}"),
        }
    }
}

/// Shorthand for a single command spawned by the [`SystemLauncher`].
pub fn cmd<I, S>(program: impl Into<String>, args: I) -> Executable
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    CommandSpec::new(program).args(args).into()
}

//! Rule type for caller-registered node renderers.

use crate::converter::Renderer;
use crate::node::NodeRef;
use crate::Result;

/// Type alias for render functions
pub type RenderFn = Box<dyn Fn(NodeRef<'_>, &Renderer<'_>) -> Result<String> + Send + Sync>;

/// A rule renders every node of the type it is registered under.
///
/// Its output is used verbatim and the dispatcher does not descend into the node on
/// its behalf: a rule that wants its children rendered asks the [`Renderer`] for
/// them. An `Err` is contained like any other node failure.
pub struct Rule {
    render: RenderFn,
}

impl Rule {
    /// Create a new rule
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(NodeRef<'_>, &Renderer<'_>) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            render: Box::new(render),
        }
    }

    /// Create a rule that cannot fail
    pub fn infallible<F>(render: F) -> Self
    where
        F: Fn(NodeRef<'_>, &Renderer<'_>) -> String + Send + Sync + 'static,
    {
        Self::new(move |node, renderer| Ok(render(node, renderer)))
    }

    /// Create a rule that always emits the same text
    pub fn constant(output: impl Into<String>) -> Self {
        let output = output.into();
        Self::new(move |_, _| Ok(output.clone()))
    }

    /// Apply this rule
    pub fn render(&self, node: NodeRef<'_>, renderer: &Renderer<'_>) -> Result<String> {
        (self.render)(node, renderer)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").finish_non_exhaustive()
    }
}

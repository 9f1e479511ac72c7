use std::collections::BTreeSet;

use crate::foundation::error::{XvsError, XvsResult};
use crate::graph::core::Core;
use crate::graph::node::{Node, NodeId};

/// Serializable slice of a [`Core`] needed to produce `output`.
///
/// Nodes appear in build order, so every node's inputs precede it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GraphPlan {
    pub nodes: Vec<Node>,
    pub output: NodeId,
}

impl Core {
    /// Collect the nodes `output` depends on, dropping calls that were built but never used.
    pub fn plan(&self, output: NodeId) -> XvsResult<GraphPlan> {
        self.node(output)?;

        let mut live = BTreeSet::new();
        let mut pending = vec![output];
        while let Some(id) = pending.pop() {
            if live.insert(id) {
                pending.extend(self.node(id)?.inputs.iter().copied());
            }
        }

        let nodes = live
            .into_iter()
            .map(|id| self.node(id).cloned())
            .collect::<XvsResult<Vec<_>>>()?;
        Ok(GraphPlan { nodes, output })
    }
}

impl GraphPlan {
    pub fn output_node(&self) -> XvsResult<&Node> {
        self.nodes
            .iter()
            .find(|n| n.id == self.output)
            .ok_or_else(|| XvsError::validation("plan output node is missing"))
    }

    /// Number of recorded calls to `plugin.function`.
    pub fn count(&self, plugin: &str, function: &str) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.plugin == plugin && n.function == function)
            .count()
    }

    pub fn to_json_pretty(&self) -> XvsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> XvsResult<Self> {
        let plan: Self = serde_json::from_str(s)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Every input must be defined earlier in the plan.
    pub fn validate(&self) -> XvsResult<()> {
        let mut seen = BTreeSet::new();
        for n in &self.nodes {
            if let Some(missing) = n.inputs.iter().find(|i| !seen.contains(*i)) {
                return Err(XvsError::validation(format!(
                    "node {} ({}) reads node {} before it is defined",
                    n.id.0,
                    n.call_name(),
                    missing.0
                )));
            }
            n.format.depth.check()?;
            seen.insert(n.id);
        }
        if !seen.contains(&self.output) {
            return Err(XvsError::validation("plan output node is missing"));
        }
        Ok(())
    }
}

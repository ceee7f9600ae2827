//! Acyclicity check over declared sources (DFS colouring).
//!
//! Source ids that resolve to nothing are skipped here; they surface later,
//! as dangling references, when a query actually walks them.

use super::SpaceGraph;
use crate::error::GraphError;
use std::collections::HashMap;

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mark {
    Temp,
    Perm,
}

pub(super) fn ensure_acyclic(graph: &SpaceGraph) -> Result<(), GraphError> {
    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut stack: Vec<&str> = Vec::new();

    for id in graph.node_ids().keys() {
        stack.clear();
        dfs(graph, id, &mut marks, &mut stack)?;
    }

    Ok(())
}

fn dfs<'g>(
    graph: &'g SpaceGraph,
    id: &'g str,
    marks: &mut HashMap<&'g str, Mark>,
    stack: &mut Vec<&'g str>,
) -> Result<(), GraphError> {
    match marks.get(id) {
        Some(Mark::Perm) => return Ok(()),
        Some(Mark::Temp) => {
            // id is on the current recursion stack => cycle
            let start = stack.iter().position(|s| *s == id).unwrap_or(0);
            let mut path: Vec<String> = stack[start..].iter().map(|s| s.to_string()).collect();
            path.push(id.to_string());
            return Err(GraphError::CycleDetected { path });
        }
        None => {}
    }

    let Some(element) = graph.node(id) else {
        return Ok(());
    };

    marks.insert(id, Mark::Temp);
    stack.push(id);

    for source in element.source_feed_ids().unwrap_or_default() {
        dfs(graph, source, marks, stack)?;
    }

    stack.pop();
    marks.insert(id, Mark::Perm);
    Ok(())
}

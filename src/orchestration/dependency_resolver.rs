use crate::orchestration::error::CoordinationError;
use crate::orchestration::request::{WorkflowConfiguration, WorkflowDependency};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Gray,
    Black,
}

/// Declared edges keyed by workflow token. Repeated entries for the same
/// token are concatenated in declaration order.
pub fn dependency_edges(dependencies: &[WorkflowDependency]) -> BTreeMap<&str, Vec<&str>> {
    let mut edges: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for dependency in dependencies {
        let entry = edges.entry(dependency.workflow.as_str()).or_default();
        for token in &dependency.depends_on {
            if !entry.contains(&token.as_str()) {
                entry.push(token.as_str());
            }
        }
    }
    edges
}

/// Tokens that list `token` in their `depends_on`, in declaration order.
pub fn dependents_of(token: &str, dependencies: &[WorkflowDependency]) -> Vec<String> {
    let mut dependents = Vec::new();
    for dependency in dependencies {
        if dependency.depends_on.iter().any(|dep| dep == token)
            && !dependents.contains(&dependency.workflow)
        {
            dependents.push(dependency.workflow.clone());
        }
    }
    dependents
}

pub fn validate_dependencies(dependencies: &[WorkflowDependency]) -> Result<(), CoordinationError> {
    let declared = dependencies
        .iter()
        .map(|dependency| dependency.workflow.as_str())
        .collect::<BTreeSet<_>>();
    for dependency in dependencies {
        for token in &dependency.depends_on {
            if !declared.contains(token.as_str()) {
                return Err(CoordinationError::DanglingDependency {
                    token: token.clone(),
                    workflow: dependency.workflow.clone(),
                });
            }
        }
    }
    detect_cycle(dependencies)
}

fn detect_cycle(dependencies: &[WorkflowDependency]) -> Result<(), CoordinationError> {
    let edges = dependency_edges(dependencies);
    let mut marks: BTreeMap<&str, Mark> = edges.keys().map(|token| (*token, Mark::White)).collect();

    for dependency in dependencies {
        let root = dependency.workflow.as_str();
        if marks.get(root) != Some(&Mark::White) {
            continue;
        }
        marks.insert(root, Mark::Gray);
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];

        while let Some((node, next_child)) = stack.last_mut() {
            let children = edges.get(*node).map(Vec::as_slice).unwrap_or(&[]);
            if let Some(child) = children.get(*next_child).copied() {
                *next_child += 1;
                match marks.get(child).copied().unwrap_or(Mark::White) {
                    Mark::Gray => {
                        return Err(CoordinationError::CyclicDependency {
                            workflow: child.to_string(),
                        });
                    }
                    Mark::White => {
                        marks.insert(child, Mark::Gray);
                        stack.push((child, 0));
                    }
                    Mark::Black => {}
                }
            } else {
                marks.insert(*node, Mark::Black);
                stack.pop();
            }
        }
    }
    Ok(())
}

/// Post-order walk over the configurations in input order, dependencies
/// first. Only tokens that own a configuration are emitted.
pub fn execution_order(
    workflows: &[WorkflowConfiguration],
    dependencies: &[WorkflowDependency],
) -> Vec<String> {
    let edges = dependency_edges(dependencies);
    let configured = workflows
        .iter()
        .filter_map(WorkflowConfiguration::identity_token)
        .collect::<BTreeSet<_>>();
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut order = Vec::new();

    for root in workflows.iter().filter_map(WorkflowConfiguration::identity_token) {
        if !visited.insert(root) {
            continue;
        }
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
        while let Some((node, next_child)) = stack.last_mut() {
            let children = edges.get(*node).map(Vec::as_slice).unwrap_or(&[]);
            if let Some(child) = children.get(*next_child).copied() {
                *next_child += 1;
                if visited.insert(child) {
                    stack.push((child, 0));
                }
            } else {
                if configured.contains(*node) {
                    order.push(node.to_string());
                }
                stack.pop();
            }
        }
    }
    order
}

/// Depth of every token reachable from `roots`: zero without dependencies,
/// else one past the deepest dependency. Expects an acyclic graph.
fn dependency_levels<'a>(
    roots: impl IntoIterator<Item = &'a str>,
    edges: &BTreeMap<&'a str, Vec<&'a str>>,
) -> BTreeMap<&'a str, usize> {
    let mut levels: BTreeMap<&str, usize> = BTreeMap::new();
    for root in roots {
        if levels.contains_key(root) {
            continue;
        }
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
        while let Some((node, next_child)) = stack.last_mut() {
            let children = edges.get(*node).map(Vec::as_slice).unwrap_or(&[]);
            if let Some(child) = children.get(*next_child).copied() {
                *next_child += 1;
                if !levels.contains_key(child) && !stack.iter().any(|(open, _)| *open == child) {
                    stack.push((child, 0));
                }
            } else {
                let level = children
                    .iter()
                    .filter_map(|child| levels.get(child))
                    .map(|level| level + 1)
                    .max()
                    .unwrap_or(0);
                levels.insert(*node, level);
                stack.pop();
            }
        }
    }
    levels
}

/// Groups `order` into waves; every workflow's dependencies, direct or
/// through tokens without a configuration, sit in an earlier wave.
pub fn execution_waves(order: &[String], dependencies: &[WorkflowDependency]) -> Vec<Vec<String>> {
    let edges = dependency_edges(dependencies);
    let levels = dependency_levels(order.iter().map(String::as_str), &edges);
    let mut by_level: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for token in order {
        let level = levels.get(token.as_str()).copied().unwrap_or(0);
        by_level.entry(level).or_default().push(token.clone());
    }
    by_level.into_values().collect()
}

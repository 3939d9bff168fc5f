//! Consistency checks on the scene graph, run after decoding when requested.

use std::collections::HashSet;

use itertools::Itertools as _;

use crate::diagnostic::Diagnostic;
use crate::model::VoxModel;

/// Checks the scene node ids of `model`, returning findings in this order:
///
/// 1. each id used by more than one transform, group, or shape node;
/// 2. each id listed as a child by more than one group entry;
/// 3. each nonzero transform node id which no group lists as a child.
///
/// Within each category, findings are in order of the occurrence that made them findings.
pub(crate) fn check(model: &VoxModel) -> Vec<Diagnostic> {
    let node_ids = (model.group_nodes.iter().map(|node| node.id))
        .chain(model.transform_nodes.iter().map(|node| node.id))
        .chain(model.shape_nodes.iter().map(|node| node.id));
    let child_ids = || {
        model
            .group_nodes
            .iter()
            .flat_map(|group| group.child_ids.iter().copied())
    };
    let all_children: HashSet<i32> = child_ids().collect();

    let mut findings = Vec::new();
    findings.extend(node_ids.duplicates().map(Diagnostic::DuplicateId));
    findings.extend(child_ids().duplicates().map(Diagnostic::DuplicateChildId));
    findings.extend(
        model
            .transform_nodes
            .iter()
            .map(|node| node.id)
            .filter(|&id| id != 0 && !all_children.contains(&id))
            .map(Diagnostic::OrphanTransform),
    );
    findings
}

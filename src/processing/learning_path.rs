//! Ordering missing skills into a learning plan

use crate::config::LearningConfig;
use crate::processing::skill_gap::{compare_importance, LearningPathStep, SkillGap};
use crate::processing::taxonomy::SkillTaxonomy;
use log::warn;
use std::cmp::Ordering;
use std::collections::BTreeSet;

pub struct LearningPathPlanner<'c> {
    config: &'c LearningConfig,
}

struct Node<'g, 't> {
    gap: &'g SkillGap<'t>,
    weeks: u32,
    /// Indices of missing prerequisites still constraining this node.
    prerequisites: BTreeSet<usize>,
}

impl<'c> LearningPathPlanner<'c> {
    pub fn new(config: &'c LearningConfig) -> Self {
        Self { config }
    }

    /// Weeks to learn a skill, shortened by the best transferable skill.
    pub fn estimate_weeks(&self, gap: &SkillGap) -> u32 {
        let base = gap.skill.difficulty() * self.config.weeks_per_difficulty_unit;
        let discount = 1.0 - self.config.max_transfer_discount * gap.best_similarity();
        let weeks = (base * discount).max(f64::from(self.config.min_weeks)).ceil();
        if weeks >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            weeks as u32
        }
    }

    /// Topological order over the missing skills: prerequisites first, ties
    /// broken by importance, then time, then name. Prerequisite cycles in the
    /// taxonomy are broken by dropping the edge from the lowest-priority skill.
    pub fn plan(&self, gaps: &[SkillGap], taxonomy: &SkillTaxonomy) -> Vec<LearningPathStep> {
        let mut nodes: Vec<Node> = gaps
            .iter()
            .map(|gap| Node {
                gap,
                weeks: self.estimate_weeks(gap),
                prerequisites: BTreeSet::new(),
            })
            .collect();

        for idx in 0..nodes.len() {
            let declared = taxonomy.prerequisites(nodes[idx].gap.skill.id());
            let missing: BTreeSet<usize> = declared
                .iter()
                .filter_map(|prereq| gaps.iter().position(|g| g.skill.id() == prereq))
                .filter(|p| *p != idx)
                .collect();
            nodes[idx].prerequisites = missing;
        }

        let mut placed = vec![false; nodes.len()];
        let mut order: Vec<usize> = Vec::with_capacity(nodes.len());

        while order.len() < nodes.len() {
            let ready = (0..nodes.len())
                .filter(|&i| !placed[i])
                .filter(|&i| nodes[i].prerequisites.iter().all(|p| placed[*p]))
                .min_by(|&a, &b| priority(&nodes[a], &nodes[b]));

            match ready {
                Some(next) => {
                    placed[next] = true;
                    order.push(next);
                }
                None => self.break_cycle(&mut nodes, &placed),
            }
        }

        order
            .into_iter()
            .map(|idx| {
                let node = &nodes[idx];
                let name = node.gap.skill.display_name().to_string();
                let resources = match node.gap.skill.identity() {
                    Some(identity) if !identity.resources.is_empty() => identity.resources.clone(),
                    _ => vec![
                        format!("Official {} documentation", name),
                        format!("Build a small project using {}", name),
                    ],
                };
                LearningPathStep {
                    prerequisites: node
                        .prerequisites
                        .iter()
                        .map(|p| nodes[*p].gap.skill.display_name().to_string())
                        .collect(),
                    skill_name: name,
                    estimated_time_weeks: node.weeks,
                    resources,
                }
            })
            .collect()
    }

    /// Every unplaced node waits on another unplaced node, so walking
    /// prerequisites from any of them must revisit a node.
    fn break_cycle(&self, nodes: &mut [Node], placed: &[bool]) {
        let Some(start) = (0..nodes.len())
            .filter(|&i| !placed[i])
            .min_by(|&a, &b| priority(&nodes[a], &nodes[b]))
        else {
            return;
        };

        let mut path = vec![start];
        let mut current = start;
        let cycle_start = loop {
            let Some(next) = nodes[current]
                .prerequisites
                .iter()
                .copied()
                .find(|p| !placed[*p])
            else {
                return;
            };
            if let Some(pos) = path.iter().position(|n| *n == next) {
                break pos;
            }
            path.push(next);
            current = next;
        };

        // path[k + 1] is a prerequisite of path[k]; the cycle closes back to path[cycle_start].
        let cycle = &path[cycle_start..];
        let edges: Vec<(usize, usize)> = (0..cycle.len())
            .map(|k| {
                let dependent = cycle[k];
                let prerequisite = cycle[(k + 1) % cycle.len()];
                (dependent, prerequisite)
            })
            .collect();

        let weakest = edges
            .iter()
            .copied()
            .max_by(|a, b| priority(&nodes[a.1], &nodes[b.1]));

        if let Some((dependent, prerequisite)) = weakest {
            warn!(
                "Prerequisite cycle in taxonomy; dropping '{}' as a prerequisite of '{}'",
                nodes[prerequisite].gap.skill.display_name(),
                nodes[dependent].gap.skill.display_name()
            );
            nodes[dependent].prerequisites.remove(&prerequisite);
        }
    }
}

/// `Less` means `a` should be learned earlier.
fn priority(a: &Node, b: &Node) -> Ordering {
    compare_importance(a.gap, b.gap)
        .then_with(|| a.weeks.cmp(&b.weeks))
        .then_with(|| a.gap.skill.display_name().cmp(b.gap.skill.display_name()))
        .then_with(|| a.gap.skill.id().cmp(b.gap.skill.id()))
}

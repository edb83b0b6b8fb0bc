//! Character-level voting over aligned line groups.
//!
//! Once lines are grouped, the members of each group vote column by column
//! on the fused text. The cascade runs strict majority first, then engine
//! confidence, then agreement between the closest pair of member lines, and
//! finally falls back to the longest member line. Every stage resolves
//! remaining ties through the configured engine priority order, so the
//! whole cascade is a pure function of its inputs.

use crate::core::config::FusionConfig;
use crate::domain::{BoundingBox, EngineId, LineResult};
use crate::processors::char_alignment::star_align;
use crate::processors::line_alignment::AlignedLineGroup;
use crate::processors::text_distance::edit_distance;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// The consensus estimate for one source line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedLine {
    /// The fused text.
    pub text: String,
    /// Engines whose lines were members of this line's group, including
    /// members that lost every vote.
    pub contributing_engines: BTreeSet<EngineId>,
    /// Fraction of contributing engines whose full line text equals the
    /// fused text. A line backed by a single engine has ratio 1.0.
    pub agreement_ratio: f32,
    /// Union of the members' bounding boxes, when any member carried one.
    pub bbox: Option<BoundingBox>,
}

/// Votes every group of a page into fused lines, in group order.
pub fn vote_lines(groups: &[AlignedLineGroup], config: &FusionConfig) -> Vec<FusedLine> {
    groups.iter().map(|group| vote_line(group, config)).collect()
}

/// Produces the consensus line for one aligned group.
///
/// The member with the longest text anchors the character alignment (ties
/// fall to the priority order), all members are expanded to a shared column
/// count, and each column is decided by [`vote_column`]. Gaps that win a
/// column simply emit nothing.
///
/// # Panics
///
/// Panics if the group has no members.
pub fn vote_line(group: &AlignedLineGroup, config: &FusionConfig) -> FusedLine {
    let mut members: Vec<&LineResult> = group.members().collect();
    assert!(!members.is_empty(), "aligned line group has no members");
    members.sort_by_key(|line| config.priority_rank(line.engine));

    let mut anchor_position = 0;
    for (position, line) in members.iter().enumerate() {
        if line.text.chars().count() > members[anchor_position].text.chars().count() {
            anchor_position = position;
        }
    }
    let anchor = members.remove(anchor_position);
    let mut ordered: Vec<&LineResult> = Vec::with_capacity(members.len() + 1);
    ordered.push(anchor);
    ordered.extend(members);

    let other_texts: Vec<&str> = ordered[1..]
        .iter()
        .map(|line| line.text.as_str())
        .collect();
    let rows = star_align(&anchor.text, &other_texts);

    let pair_distances: Vec<(usize, usize, usize)> = (0..ordered.len())
        .tuple_combinations()
        .map(|(i, j)| (i, j, edit_distance(&ordered[i].text, &ordered[j].text)))
        .collect();

    let width = rows[0].len();
    let mut text = String::new();
    let mut agreement_sum = 0.0_f32;
    for column in 0..width {
        let values: Vec<Option<char>> = rows.iter().map(|row| row[column]).collect();
        let chosen = vote_column(&values, &ordered, &pair_distances);
        if let Some(character) = chosen {
            text.push(character);
        }
        let agreeing = values.iter().filter(|value| **value == chosen).count();
        agreement_sum += agreeing as f32 / values.len() as f32;
    }
    if width > 0 {
        debug!(
            "voted group {} across {width} columns, mean column agreement {:.2}",
            group.group_index,
            agreement_sum / width as f32
        );
    }

    let matching = ordered
        .iter()
        .filter(|line| line.text == text)
        .count();
    let agreement_ratio = matching as f32 / ordered.len() as f32;

    FusedLine {
        text,
        contributing_engines: ordered.iter().map(|line| line.engine).collect(),
        agreement_ratio,
        bbox: BoundingBox::union_all(ordered.iter().filter_map(|line| line.bbox)),
    }
}

/// Decides one column of a group's character alignment.
///
/// `values` and `members` run in parallel, anchor first and the rest in
/// priority order; `pair_distances` holds the whole-line edit distance for
/// every member pair, indexed into that same order. A gap is a legitimate
/// vote: a winning gap means the column contributes no character.
fn vote_column(
    values: &[Option<char>],
    members: &[&LineResult],
    pair_distances: &[(usize, usize, usize)],
) -> Option<char> {
    let total = values.len();

    // Strict majority.
    let mut counts: Vec<(Option<char>, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(candidate, _)| candidate == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((*value, 1)),
        }
    }
    for (value, count) in &counts {
        if count * 2 > total {
            return *value;
        }
    }

    // Highest engine confidence, among engines that report one. A tie only
    // stands when the tied engines agree on the value.
    let best_confidence = members
        .iter()
        .filter_map(|line| line.confidence)
        .fold(None::<f32>, |best, confidence| match best {
            Some(current) if current >= confidence => Some(current),
            _ => Some(confidence),
        });
    if let Some(best) = best_confidence {
        let mut candidates = members
            .iter()
            .zip(values)
            .filter(|(line, _)| line.confidence == Some(best))
            .map(|(_, value)| *value);
        if let Some(first) = candidates.next() {
            if candidates.all(|value| value == first) {
                return first;
            }
        }
    }

    // Agreement between the closest pair of member lines.
    if let Some(min_distance) = pair_distances
        .iter()
        .map(|(_, _, distance)| *distance)
        .min()
    {
        let mut votes: Vec<(Option<char>, usize)> = Vec::new();
        for (i, j, distance) in pair_distances {
            if *distance == min_distance && values[*i] == values[*j] {
                match votes
                    .iter_mut()
                    .find(|(candidate, _)| *candidate == values[*i])
                {
                    Some((_, count)) => *count += 1,
                    None => votes.push((values[*i], 1)),
                }
            }
        }
        if let Some(top) = votes.iter().map(|(_, count)| *count).max() {
            let mut leaders = votes.iter().filter(|(_, count)| *count == top);
            if let (Some((value, _)), None) = (leaders.next(), leaders.next()) {
                return *value;
            }
        }
    }

    // Longest member line; the anchor is exactly that member.
    values[0]
}

//! Whole-line alignment of engine outputs into per-line groups.
//!
//! Engines disagree not only about characters but about line structure: one
//! merges two physical lines, another drops a faint one, a third finds a
//! stamp the rest missed. Before characters can be voted on, each engine's
//! line sequence is aligned against a reference engine so that lines
//! believed to be the same source line end up in the same group.

use crate::core::config::FusionConfig;
use crate::domain::{EngineId, LineResult, PageInput};
use crate::processors::text_distance::text_similarity;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use tracing::debug;

/// Lines from different engines judged to be the same source line.
///
/// A group holds at most one line per engine. Groups are produced in final
/// reading order, and every line of every surviving engine lands in exactly
/// one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedLineGroup {
    /// Position of this group in the fused page's reading order.
    pub group_index: usize,
    members: BTreeMap<EngineId, LineResult>,
}

impl AlignedLineGroup {
    /// Builds a group from its member lines. The map already enforces the
    /// one-line-per-engine bound.
    pub fn new(group_index: usize, members: BTreeMap<EngineId, LineResult>) -> Self {
        Self {
            group_index,
            members,
        }
    }

    /// Returns the engine's member line, if it contributed to this group.
    pub fn member(&self, engine: EngineId) -> Option<&LineResult> {
        self.members.get(&engine)
    }

    /// Returns the engines contributing to this group, in ordinal order.
    pub fn engines(&self) -> impl Iterator<Item = EngineId> + '_ {
        self.members.keys().copied()
    }

    /// Returns the member lines, in engine ordinal order.
    pub fn members(&self) -> impl Iterator<Item = &LineResult> + '_ {
        self.members.values()
    }

    /// Returns the number of engines contributing to this group.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// Picks the engine whose line sequence anchors alignment for a page.
///
/// The reference is the surviving engine with the most lines; ties fall to
/// the configured priority order. Returns `None` when no engine survived
/// screening.
pub fn select_reference_engine(
    page: &PageInput,
    surviving: &[EngineId],
    config: &FusionConfig,
) -> Option<EngineId> {
    surviving.iter().copied().min_by_key(|engine| {
        let line_count = page.lines(*engine).map_or(0, |lines| lines.len());
        (Reverse(line_count), config.priority_rank(*engine))
    })
}

/// Aligns the surviving engines' lines into reading-order groups.
///
/// Every other engine's line sequence is aligned against the reference
/// sequence with a dynamic program over whole lines, where matching a pair
/// of lines is worth their text similarity minus the configured floor and
/// gaps are free. Matched lines join the group at their reference position.
/// Lines with no reference counterpart become their own groups, anchored
/// after the reference line they follow; when several engines insert
/// mutually similar lines at the same anchor, those merge into one group.
pub fn align_lines(
    page: &PageInput,
    surviving: &[EngineId],
    config: &FusionConfig,
) -> Vec<AlignedLineGroup> {
    let Some(reference) = select_reference_engine(page, surviving, config) else {
        return Vec::new();
    };
    let ref_lines = page.lines(reference).unwrap_or(&[]);

    let mut ref_groups: Vec<BTreeMap<EngineId, LineResult>> = ref_lines
        .iter()
        .map(|line| BTreeMap::from([(reference, line.clone())]))
        .collect();

    let mut others: Vec<EngineId> = surviving
        .iter()
        .copied()
        .filter(|engine| *engine != reference)
        .collect();
    others.sort_by_key(|engine| config.priority_rank(*engine));

    struct Insertion {
        anchor: usize,
        engine: EngineId,
        line: LineResult,
    }
    let mut pending: Vec<Insertion> = Vec::new();

    for engine in others {
        let lines = page.lines(engine).unwrap_or(&[]);
        let ops = align_sequences(ref_lines, lines, config.min_line_similarity);
        let mut ref_consumed = 0;
        for op in ops {
            match op {
                AlignOp::Match {
                    reference_index,
                    other_index,
                } => {
                    ref_groups[reference_index].insert(engine, lines[other_index].clone());
                    ref_consumed = reference_index + 1;
                }
                AlignOp::ReferenceGap { reference_index } => {
                    ref_consumed = reference_index + 1;
                }
                AlignOp::OtherGap { other_index } => {
                    pending.push(Insertion {
                        anchor: ref_consumed,
                        engine,
                        line: lines[other_index].clone(),
                    });
                }
            }
        }
    }

    // Cluster pending insertions per anchor. The founding member's text is
    // the yardstick for whether a later engine's insertion is the same line.
    pending.sort_by_key(|insertion| {
        (
            insertion.anchor,
            config.priority_rank(insertion.engine),
            insertion.line.line_index,
        )
    });
    let mut insertion_groups: Vec<Vec<(String, BTreeMap<EngineId, LineResult>)>> =
        (0..=ref_lines.len()).map(|_| Vec::new()).collect();
    for insertion in pending {
        let groups_at_anchor = &mut insertion_groups[insertion.anchor];
        let position = groups_at_anchor.iter().position(|(founder_text, members)| {
            !members.contains_key(&insertion.engine)
                && text_similarity(founder_text, &insertion.line.text) >= config.min_line_similarity
        });
        match position {
            Some(index) => {
                groups_at_anchor[index]
                    .1
                    .insert(insertion.engine, insertion.line);
            }
            None => {
                let founder_text = insertion.line.text.clone();
                groups_at_anchor.push((
                    founder_text,
                    BTreeMap::from([(insertion.engine, insertion.line)]),
                ));
            }
        }
    }

    let mut groups: Vec<AlignedLineGroup> = Vec::new();
    let mut ref_groups = ref_groups.into_iter();
    for anchor_groups in insertion_groups {
        for (_, members) in anchor_groups {
            groups.push(AlignedLineGroup::new(groups.len(), members));
        }
        if let Some(members) = ref_groups.next() {
            groups.push(AlignedLineGroup::new(groups.len(), members));
        }
    }

    debug!(
        "aligned {} engines into {} line groups (reference '{reference}')",
        surviving.len(),
        groups.len()
    );
    groups
}

enum AlignOp {
    Match {
        reference_index: usize,
        other_index: usize,
    },
    ReferenceGap {
        reference_index: usize,
    },
    OtherGap {
        other_index: usize,
    },
}

/// Aligns one engine's lines against the reference lines.
///
/// Needleman-Wunsch over whole lines: matching a pair scores its similarity
/// minus `min_similarity`, gaps score zero, so a pair below the floor never
/// matches. Ties prefer matches, then keeping unmatched lines after the
/// reference content they follow.
fn align_sequences(
    reference: &[LineResult],
    other: &[LineResult],
    min_similarity: f32,
) -> Vec<AlignOp> {
    let n = reference.len();
    let m = other.len();

    let mut similarities = vec![vec![0.0_f32; m]; n];
    for i in 0..n {
        for j in 0..m {
            similarities[i][j] = text_similarity(&reference[i].text, &other[j].text);
        }
    }

    const DIAGONAL: u8 = 1;
    const OTHER_GAP: u8 = 2;
    const REFERENCE_GAP: u8 = 3;

    let mut scores = vec![vec![0.0_f32; m + 1]; n + 1];
    let mut directions = vec![vec![0_u8; m + 1]; n + 1];
    for row in directions.iter_mut().skip(1) {
        row[0] = REFERENCE_GAP;
    }
    for j in 1..=m {
        directions[0][j] = OTHER_GAP;
    }

    for i in 1..=n {
        for j in 1..=m {
            let benefit = similarities[i - 1][j - 1] - min_similarity;
            let mut best = scores[i][j - 1];
            let mut direction = OTHER_GAP;
            if scores[i - 1][j] > best {
                best = scores[i - 1][j];
                direction = REFERENCE_GAP;
            }
            if benefit >= 0.0 && scores[i - 1][j - 1] + benefit >= best {
                best = scores[i - 1][j - 1] + benefit;
                direction = DIAGONAL;
            }
            scores[i][j] = best;
            directions[i][j] = direction;
        }
    }

    let mut ops = Vec::with_capacity(n + m);
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        match directions[i][j] {
            DIAGONAL => {
                ops.push(AlignOp::Match {
                    reference_index: i - 1,
                    other_index: j - 1,
                });
                i -= 1;
                j -= 1;
            }
            OTHER_GAP => {
                ops.push(AlignOp::OtherGap { other_index: j - 1 });
                j -= 1;
            }
            _ => {
                ops.push(AlignOp::ReferenceGap {
                    reference_index: i - 1,
                });
                i -= 1;
            }
        }
    }
    ops.reverse();
    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with(texts: &[(EngineId, &[&str])]) -> PageInput {
        let mut page = PageInput::new();
        for (engine, lines) in texts {
            let lines = lines
                .iter()
                .enumerate()
                .map(|(index, text)| LineResult::new(*engine, index as u32, *text))
                .collect();
            page.insert_engine(*engine, lines);
        }
        page
    }

    fn survivors(page: &PageInput) -> Vec<EngineId> {
        page.engines().collect()
    }

    #[test]
    fn identical_engines_produce_one_group_per_line() {
        let page = page_with(&[
            (EngineId::Classical, &["alpha beta", "gamma delta"]),
            (EngineId::Neural, &["alpha beta", "gamma delta"]),
            (EngineId::PlatformVision, &["alpha beta", "gamma delta"]),
        ]);
        let groups = align_lines(&page, &survivors(&page), &FusionConfig::default());
        assert_eq!(groups.len(), 2);
        for group in &groups {
            assert_eq!(group.member_count(), 3);
        }
    }

    #[test]
    fn reference_is_engine_with_most_lines() {
        let page = page_with(&[
            (EngineId::Classical, &["one line"]),
            (EngineId::Neural, &["first line", "second line"]),
        ]);
        let reference =
            select_reference_engine(&page, &survivors(&page), &FusionConfig::default());
        assert_eq!(reference, Some(EngineId::Neural));
    }

    #[test]
    fn reference_tie_falls_to_priority_order() {
        let page = page_with(&[
            (EngineId::Classical, &["a", "b"]),
            (EngineId::Neural, &["a", "b"]),
        ]);
        let default_reference =
            select_reference_engine(&page, &survivors(&page), &FusionConfig::default());
        assert_eq!(default_reference, Some(EngineId::Classical));

        let config = FusionConfig::default()
            .with_engine_priority_order(vec![EngineId::Neural, EngineId::Classical]);
        let reference = select_reference_engine(&page, &survivors(&page), &config);
        assert_eq!(reference, Some(EngineId::Neural));
    }

    #[test]
    fn missing_line_leaves_partial_group() {
        let page = page_with(&[
            (
                EngineId::Classical,
                &["alpha beta", "gamma delta", "epsilon zeta"],
            ),
            (EngineId::Neural, &["alpha beta", "epsilon zeta"]),
        ]);
        let groups = align_lines(&page, &survivors(&page), &FusionConfig::default());
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].member_count(), 2);
        assert_eq!(groups[1].member_count(), 1);
        assert_eq!(groups[1].member(EngineId::Classical).unwrap().text, "gamma delta");
        assert_eq!(groups[2].member_count(), 2);
    }

    #[test]
    fn near_matches_still_group_despite_character_errors() {
        let page = page_with(&[
            (EngineId::Classical, &["Total: 40.00", "Thank you"]),
            (EngineId::Neural, &["Tota1: 40.0O", "Thank y0u"]),
        ]);
        let groups = align_lines(&page, &survivors(&page), &FusionConfig::default());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].member_count(), 2);
        assert_eq!(groups[1].member_count(), 2);
    }

    #[test]
    fn extra_line_becomes_own_group_at_its_anchor() {
        let page = page_with(&[
            (
                EngineId::Classical,
                &["alpha beta", "gamma delta", "epsilon zeta"],
            ),
            (
                EngineId::Neural,
                &["alpha beta", "INSERTED ROW 99", "gamma delta"],
            ),
        ]);
        let groups = align_lines(&page, &survivors(&page), &FusionConfig::default());
        assert_eq!(groups.len(), 4);
        assert_eq!(groups[0].member(EngineId::Classical).unwrap().text, "alpha beta");
        assert_eq!(groups[1].member_count(), 1);
        assert_eq!(groups[1].member(EngineId::Neural).unwrap().text, "INSERTED ROW 99");
        assert_eq!(groups[2].member(EngineId::Classical).unwrap().text, "gamma delta");
        assert_eq!(groups[3].member(EngineId::Classical).unwrap().text, "epsilon zeta");
    }

    #[test]
    fn similar_insertions_from_two_engines_merge() {
        let page = page_with(&[
            (
                EngineId::Classical,
                &["alpha beta", "gamma delta", "epsilon zeta"],
            ),
            (
                EngineId::Neural,
                &["alpha beta", "INSERTED ROW 99", "gamma delta"],
            ),
            (
                EngineId::PlatformVision,
                &["alpha beta", "INSERTED R0W 99", "gamma delta"],
            ),
        ]);
        let groups = align_lines(&page, &survivors(&page), &FusionConfig::default());
        assert_eq!(groups.len(), 4);
        let inserted = &groups[1];
        assert_eq!(inserted.member_count(), 2);
        assert_eq!(inserted.member(EngineId::Neural).unwrap().text, "INSERTED ROW 99");
        assert_eq!(
            inserted.member(EngineId::PlatformVision).unwrap().text,
            "INSERTED R0W 99"
        );
    }

    #[test]
    fn dissimilar_lines_never_share_a_group() {
        let page = page_with(&[
            (EngineId::Classical, &["alpha beta gamma"]),
            (EngineId::Neural, &["zzzz qqqq xxxx"]),
        ]);
        let groups = align_lines(&page, &survivors(&page), &FusionConfig::default());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].member(EngineId::Classical).unwrap().text, "alpha beta gamma");
        assert_eq!(groups[1].member(EngineId::Neural).unwrap().text, "zzzz qqqq xxxx");
    }

    #[test]
    fn every_surviving_line_lands_in_exactly_one_group() {
        let page = page_with(&[
            (EngineId::Classical, &["one", "two", "three", "four"]),
            (EngineId::Neural, &["one", "twa", "EXTRA", "three"]),
            (EngineId::PlatformVision, &["one", "three", "four"]),
        ]);
        let surviving = survivors(&page);
        let groups = align_lines(&page, &surviving, &FusionConfig::default());

        let mut seen: Vec<(EngineId, u32)> = Vec::new();
        for group in &groups {
            for line in group.members() {
                seen.push((line.engine, line.line_index));
            }
        }
        seen.sort();
        let mut expected: Vec<(EngineId, u32)> = Vec::new();
        for engine in &surviving {
            for line in page.lines(*engine).unwrap() {
                expected.push((line.engine, line.line_index));
            }
        }
        expected.sort();
        assert_eq!(seen, expected);
        seen.dedup();
        assert_eq!(seen.len(), expected.len());
    }

    #[test]
    fn group_indices_are_sequential() {
        let page = page_with(&[
            (EngineId::Classical, &["a b c", "d e f"]),
            (EngineId::Neural, &["a b c", "NEW CONTENT HERE", "d e f"]),
        ]);
        let groups = align_lines(&page, &survivors(&page), &FusionConfig::default());
        for (position, group) in groups.iter().enumerate() {
            assert_eq!(group.group_index, position);
        }
    }

    #[test]
    fn single_engine_yields_one_group_per_line() {
        let page = page_with(&[(EngineId::EmbeddedText, &["only line", "another"])]);
        let groups = align_lines(&page, &survivors(&page), &FusionConfig::default());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].member_count(), 1);
        assert_eq!(groups[0].member(EngineId::EmbeddedText).unwrap().text, "only line");
    }

    #[test]
    fn no_survivors_yields_no_groups() {
        let page = page_with(&[(EngineId::Classical, &["text"])]);
        let groups = align_lines(&page, &[], &FusionConfig::default());
        assert!(groups.is_empty());
    }
}

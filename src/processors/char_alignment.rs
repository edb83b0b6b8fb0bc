//! Character-level star alignment of one group's member texts.
//!
//! Voting needs every member of a line group expanded to one shared column
//! count. Each member is aligned pairwise against an anchor text with a
//! minimum edit distance dynamic program; characters the anchor lacks occupy
//! insertion slots between anchor positions, sized for the widest run any
//! member inserts there.

/// One text expanded to the shared column count, `None` marking gaps.
pub type AlignedChars = Vec<Option<char>>;

const PAIR: u8 = 1;
const INSERTION: u8 = 2;
const ANCHOR_GAP: u8 = 3;

/// Aligns member texts against an anchor so that all share one column count.
///
/// Row 0 is the anchor's expansion; row `k + 1` belongs to `others[k]`.
/// Every row has the same length. With no other texts the anchor comes back
/// unpadded, one column per character.
pub fn star_align(anchor: &str, others: &[&str]) -> Vec<AlignedChars> {
    let anchor_chars: Vec<char> = anchor.chars().collect();
    let n = anchor_chars.len();

    struct PairAlignment {
        matched: Vec<Option<char>>,
        runs: Vec<Vec<char>>,
    }

    let pair_alignments: Vec<PairAlignment> = others
        .iter()
        .map(|other| {
            let other_chars: Vec<char> = other.chars().collect();
            let ops = align_chars(&anchor_chars, &other_chars);
            let mut matched: Vec<Option<char>> = vec![None; n];
            let mut runs: Vec<Vec<char>> = vec![Vec::new(); n + 1];
            let mut anchor_consumed = 0;
            for op in ops {
                match op {
                    CharOp::Pair {
                        anchor_index,
                        other_index,
                    } => {
                        matched[anchor_index] = Some(other_chars[other_index]);
                        anchor_consumed = anchor_index + 1;
                    }
                    CharOp::AnchorGap { anchor_index } => {
                        anchor_consumed = anchor_index + 1;
                    }
                    CharOp::OtherInsertion { other_index } => {
                        runs[anchor_consumed].push(other_chars[other_index]);
                    }
                }
            }
            PairAlignment { matched, runs }
        })
        .collect();

    let mut slot_widths = vec![0_usize; n + 1];
    for alignment in &pair_alignments {
        for (slot, run) in alignment.runs.iter().enumerate() {
            slot_widths[slot] = slot_widths[slot].max(run.len());
        }
    }

    let width: usize = slot_widths.iter().sum::<usize>() + n;
    let mut rows: Vec<AlignedChars> = Vec::with_capacity(1 + others.len());

    let mut anchor_row: AlignedChars = Vec::with_capacity(width);
    for position in 0..=n {
        anchor_row.extend(std::iter::repeat(None).take(slot_widths[position]));
        if position < n {
            anchor_row.push(Some(anchor_chars[position]));
        }
    }
    rows.push(anchor_row);

    for alignment in &pair_alignments {
        let mut row: AlignedChars = Vec::with_capacity(width);
        for position in 0..=n {
            let run = &alignment.runs[position];
            row.extend(run.iter().copied().map(Some));
            row.extend(std::iter::repeat(None).take(slot_widths[position] - run.len()));
            if position < n {
                row.push(alignment.matched[position]);
            }
        }
        rows.push(row);
    }

    rows
}

enum CharOp {
    Pair {
        anchor_index: usize,
        other_index: usize,
    },
    AnchorGap {
        anchor_index: usize,
    },
    OtherInsertion {
        other_index: usize,
    },
}

/// Minimum edit distance alignment of one text against the anchor.
///
/// Ties prefer pairing characters over gaps, so a substitution stays in its
/// column instead of splitting into a deletion and an insertion.
fn align_chars(anchor: &[char], other: &[char]) -> Vec<CharOp> {
    let n = anchor.len();
    let m = other.len();

    let mut costs = vec![vec![0_usize; m + 1]; n + 1];
    let mut directions = vec![vec![0_u8; m + 1]; n + 1];
    for i in 1..=n {
        costs[i][0] = i;
        directions[i][0] = ANCHOR_GAP;
    }
    for j in 1..=m {
        costs[0][j] = j;
        directions[0][j] = INSERTION;
    }

    for i in 1..=n {
        for j in 1..=m {
            let substitution =
                costs[i - 1][j - 1] + usize::from(anchor[i - 1] != other[j - 1]);
            let deletion = costs[i - 1][j] + 1;
            let insertion = costs[i][j - 1] + 1;

            let mut best = insertion;
            let mut direction = INSERTION;
            if deletion < best {
                best = deletion;
                direction = ANCHOR_GAP;
            }
            if substitution <= best {
                best = substitution;
                direction = PAIR;
            }
            costs[i][j] = best;
            directions[i][j] = direction;
        }
    }

    let mut ops = Vec::with_capacity(n + m);
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        match directions[i][j] {
            PAIR => {
                ops.push(CharOp::Pair {
                    anchor_index: i - 1,
                    other_index: j - 1,
                });
                i -= 1;
                j -= 1;
            }
            INSERTION => {
                ops.push(CharOp::OtherInsertion { other_index: j - 1 });
                j -= 1;
            }
            _ => {
                ops.push(CharOp::AnchorGap { anchor_index: i - 1 });
                i -= 1;
            }
        }
    }
    ops.reverse();
    ops
}

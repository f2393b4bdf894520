//! Minimum-cost bipartite assignment between tracks and detections.
//!
//! The solver consumes a rectangular cost matrix with one row per track and
//! one column per detection. Rectangular inputs are padded to a square with
//! the forbidden sentinel, so the shorter dimension is covered by virtual
//! dummies of equal high cost. The square core runs shortest augmenting
//! paths over reduced costs with track/detection potentials, O(n³) overall.

/// Sentinel cost for pairs that must never match (category mismatch,
/// padding). Any optimal assignment that lands on a sentinel entry is
/// reported as unmatched.
pub const FORBIDDEN_COST: f64 = 1.0e7;

/// Rectangular row-major cost matrix: `rows` tracks × `cols` detections.
/// Every entry starts forbidden.
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    costs: Vec<f64>,
}

impl CostMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            costs: vec![FORBIDDEN_COST; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn set(&mut self, row: usize, col: usize, cost: f64) {
        self.costs[row * self.cols + col] = cost;
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.costs[row * self.cols + col]
    }
}

/// Solve the minimum-cost assignment. `result[row]` is the chosen column,
/// or `None` when the row stays unmatched.
///
/// Degenerate inputs — no rows, no columns, or nothing below the forbidden
/// sentinel — yield no matches, which downstream turns into track misses
/// and detection births.
pub fn solve(matrix: &CostMatrix) -> Vec<Option<usize>> {
    if matrix.rows == 0 || matrix.cols == 0 {
        return vec![None; matrix.rows];
    }

    let n = matrix.rows.max(matrix.cols);
    let mut padded = vec![FORBIDDEN_COST; n * n];
    for r in 0..matrix.rows {
        padded[r * n..r * n + matrix.cols]
            .copy_from_slice(&matrix.costs[r * matrix.cols..(r + 1) * matrix.cols]);
    }

    let chosen = assign_square(&padded, n);

    (0..matrix.rows)
        .map(|r| {
            let c = chosen[r];
            (c < matrix.cols && matrix.get(r, c) < FORBIDDEN_COST).then_some(c)
        })
        .collect()
}

/// Square assignment core on an n×n row-major matrix: tracks enter one at a
/// time and claim a detection via the cheapest augmenting path.
///
/// `track_pot`/`det_pot` are the dual potentials; a settled matching keeps
/// every reduced cost `cost − track_pot − det_pot` non-negative, so each
/// search is a Dijkstra sweep over reduced costs. Returns the detection
/// column chosen for each track row.
fn assign_square(costs: &[f64], n: usize) -> Vec<usize> {
    let mut track_pot = vec![0.0_f64; n];
    let mut det_pot = vec![0.0_f64; n];
    // holder[d] = track currently matched to detection d
    let mut holder: Vec<Option<usize>> = vec![None; n];

    for entering in 0..n {
        // bound[d]: cheapest reduced path cost known into detection d.
        // came_from[d]: the detection scanned when that bound was set
        // (None = reached straight from the entering track).
        let mut bound = vec![f64::INFINITY; n];
        let mut came_from: Vec<Option<usize>> = vec![None; n];
        let mut scanned = vec![false; n];

        let mut active_track = entering;
        let mut current: Option<usize> = None;

        let free_det = loop {
            if let Some(d) = current {
                scanned[d] = true;
            }

            // Relax every unscanned detection from the active track, then
            // step to the one with the lowest bound.
            let mut step = f64::INFINITY;
            let mut next_det = 0;
            for (d, b) in bound.iter_mut().enumerate() {
                if scanned[d] {
                    continue;
                }
                let reduced = costs[active_track * n + d] - track_pot[active_track] - det_pot[d];
                if reduced < *b {
                    *b = reduced;
                    came_from[d] = current;
                }
                if *b < step {
                    step = *b;
                    next_det = d;
                }
            }

            // Shift potentials so the chosen step becomes tight; detections
            // off the search tree keep their remaining slack in `bound`.
            track_pot[entering] += step;
            for d in 0..n {
                if scanned[d] {
                    if let Some(t) = holder[d] {
                        track_pot[t] += step;
                    }
                    det_pot[d] -= step;
                } else {
                    bound[d] -= step;
                }
            }

            current = Some(next_det);
            match holder[next_det] {
                Some(t) => active_track = t,
                None => break next_det,
            }
        };

        // Flip the path backwards: every detection on it takes over the
        // track of the link before it; the path head takes the entrant.
        let mut d = free_det;
        loop {
            match came_from[d] {
                Some(prev) => {
                    holder[d] = holder[prev];
                    d = prev;
                }
                None => {
                    holder[d] = Some(entering);
                    break;
                }
            }
        }
    }

    let mut chosen = vec![0_usize; n];
    for (d, h) in holder.iter().enumerate() {
        if let Some(t) = h {
            chosen[*t] = d;
        }
    }
    chosen
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn from_rows(rows: &[&[f64]]) -> CostMatrix {
        let mut m = CostMatrix::new(rows.len(), rows[0].len());
        for (r, row) in rows.iter().enumerate() {
            for (c, &cost) in row.iter().enumerate() {
                m.set(r, c, cost);
            }
        }
        m
    }

    fn total_cost(m: &CostMatrix, assign: &[Option<usize>]) -> f64 {
        assign
            .iter()
            .enumerate()
            .filter_map(|(r, c)| c.map(|c| m.get(r, c)))
            .sum()
    }

    #[test]
    fn square_matrix_reaches_known_optimum() {
        // Checked by hand over all six permutations:
        // row0→col1 (3) + row1→col0 (2) + row2→col2 (1) = 6 is minimal.
        let m = from_rows(&[&[7.0, 3.0, 6.0], &[2.0, 9.0, 4.0], &[5.0, 8.0, 1.0]]);
        let assign = solve(&m);
        assert_eq!(assign, vec![Some(1), Some(0), Some(2)]);
        assert!((total_cost(&m, &assign) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn greedy_choice_is_overridden_for_global_optimum() {
        // Row 0's cheapest column (0) must go to row 1, or row 1 is stuck
        // with 40: greedy gives 1 + 40 = 41, optimal is 5 + 2 = 7.
        let m = from_rows(&[&[1.0, 5.0], &[2.0, 40.0]]);
        let assign = solve(&m);
        assert_eq!(assign, vec![Some(1), Some(0)]);
    }

    #[test]
    fn no_column_chosen_twice() {
        let m = from_rows(&[&[1.0, 1.0], &[1.0, 1.0]]);
        let assign = solve(&m);
        let (a, b) = (assign[0].unwrap(), assign[1].unwrap());
        assert_ne!(a, b);
    }

    #[test]
    fn wide_matrix_leaves_extra_columns_unmatched() {
        // 2 tracks, 3 detections: one detection must stay unmatched.
        let m = from_rows(&[&[1.0, 9.0, 9.0], &[9.0, 1.0, 9.0]]);
        let assign = solve(&m);
        assert_eq!(assign, vec![Some(0), Some(1)]);
    }

    #[test]
    fn tall_matrix_leaves_extra_rows_unmatched() {
        // 3 tracks, 1 detection: only the cheapest row matches.
        let m = from_rows(&[&[5.0], &[1.0], &[7.0]]);
        let assign = solve(&m);
        assert_eq!(assign, vec![None, Some(0), None]);
    }

    #[test]
    fn empty_inputs_are_degenerate() {
        assert!(solve(&CostMatrix::new(0, 4)).is_empty());
        assert_eq!(solve(&CostMatrix::new(3, 0)), vec![None, None, None]);
    }

    #[test]
    fn all_forbidden_matrix_yields_no_matches() {
        let m = CostMatrix::new(2, 2);
        assert_eq!(solve(&m), vec![None, None]);
    }

    #[test]
    fn forbidden_pairs_not_reported_even_when_cheapest() {
        // Row 1 has only forbidden entries left after row 0 takes col 0.
        let mut m = CostMatrix::new(2, 2);
        m.set(0, 0, 1.0);
        m.set(0, 1, 2.0);
        let assign = solve(&m);
        assert_eq!(assign[1], None);
        assert!(assign[0].is_some());
    }
}

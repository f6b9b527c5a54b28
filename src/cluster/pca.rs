// Principal-component projection via power iteration with deflation.
//
// Good enough for visualization: we only ever need the top 2 or 3
// components, and the corpora are small. The 2D and 3D projections are
// independent fits — each call centers and decomposes afresh.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MAX_ITER: usize = 200;
const TOLERANCE: f64 = 1e-10;

/// Project rows onto their top `n_components` principal axes.
///
/// Returns one row of coordinates per input row. Components beyond the
/// data's rank come out as zeros.
pub fn project(rows: &[Vec<f64>], n_components: usize) -> Vec<Vec<f64>> {
    let n = rows.len();
    let dim = rows.first().map(Vec::len).unwrap_or(0);
    if n == 0 || dim == 0 || n_components == 0 {
        return vec![vec![0.0; n_components]; n];
    }

    // Center columns.
    let mut centered: Vec<Vec<f64>> = rows.to_vec();
    for d in 0..dim {
        let mean = centered.iter().map(|r| r[d]).sum::<f64>() / n as f64;
        for row in centered.iter_mut() {
            row[d] -= mean;
        }
    }

    let mut coords = vec![vec![0.0; n_components]; n];

    for comp in 0..n_components {
        let axis = dominant_axis(&centered, comp as u64);

        let scores: Vec<f64> = centered.iter().map(|r| dot(r, &axis)).collect();
        for (i, &s) in scores.iter().enumerate() {
            coords[i][comp] = s;
        }

        // Deflate: remove this component's contribution.
        for (row, &s) in centered.iter_mut().zip(&scores) {
            for (d, a) in axis.iter().enumerate() {
                row[d] -= s * a;
            }
        }
    }

    coords
}

/// Power iteration for the current dominant axis of the centered matrix.
/// The starting vector is seeded per component, so output is deterministic.
fn dominant_axis(centered: &[Vec<f64>], component: u64) -> Vec<f64> {
    let dim = centered[0].len();
    let mut rng = StdRng::seed_from_u64(7 + component);
    let mut v: Vec<f64> = (0..dim).map(|_| rng.random::<f64>() - 0.5).collect();
    normalize(&mut v);

    for _ in 0..MAX_ITER {
        // w = Xᵀ (X v), without materializing the covariance matrix.
        let mut w = vec![0.0; dim];
        for row in centered {
            let s = dot(row, &v);
            for (d, r) in row.iter().enumerate() {
                w[d] += s * r;
            }
        }

        let norm = normalize(&mut w);
        if norm <= TOLERANCE {
            // No variance left along any direction.
            return vec![0.0; dim];
        }

        let alignment = dot(&w, &v).abs();
        v = w;
        if (1.0 - alignment).abs() < TOLERANCE {
            break;
        }
    }

    v
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn normalize(v: &mut [f64]) -> f64 {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    norm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_match_requested_components() {
        let rows: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64, 0.0, 1.0]).collect();
        let p2 = project(&rows, 2);
        let p3 = project(&rows, 3);
        assert_eq!(p2.len(), 6);
        assert!(p2.iter().all(|r| r.len() == 2));
        assert!(p3.iter().all(|r| r.len() == 3));
    }

    #[test]
    fn first_component_captures_the_dominant_direction() {
        // Points spread along x with small y noise: component 0 variance
        // must dominate component 1.
        let rows: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![i as f64, (i % 3) as f64 * 0.1, 0.0])
            .collect();
        let p = project(&rows, 2);

        let var = |c: usize| {
            let mean = p.iter().map(|r| r[c]).sum::<f64>() / p.len() as f64;
            p.iter().map(|r| (r[c] - mean).powi(2)).sum::<f64>()
        };
        assert!(var(0) > 10.0 * var(1));
    }

    #[test]
    fn projection_is_deterministic() {
        let rows: Vec<Vec<f64>> = (0..10)
            .map(|i| vec![i as f64, (10 - i) as f64, i as f64 * 0.5])
            .collect();
        assert_eq!(project(&rows, 3), project(&rows, 3));
    }

    #[test]
    fn rank_deficient_data_pads_with_zeros() {
        // All points on a single line — only one direction of variance.
        let rows: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64, 2.0 * i as f64]).collect();
        let p = project(&rows, 3);
        for row in &p {
            assert!(row[2].abs() < 1e-6, "third component should be ~0");
        }
    }
}

// Density-based clustering over cosine distance.
//
// HDBSCAN-style pipeline: core distances (k-th nearest neighbor), mutual
// reachability graph, Prim minimum spanning tree, then cluster extraction
// with union-find. The merge cutoff is data-driven: the largest gap in
// sorted MST edge weights marks the boundary between intra-cluster and
// inter-cluster edges. Components smaller than `min_cluster_size` become
// noise. Deterministic — there is no stochastic seed anywhere.

use std::collections::HashMap;

use tracing::debug;

/// Reserved label for points not assigned to any dense region.
pub const NOISE: i32 = -1;

/// Parameters for the density-based clustering.
#[derive(Debug, Clone)]
pub struct HdbscanParams {
    /// Minimum number of points to form a cluster.
    pub min_cluster_size: usize,
    /// Neighbor count used for core distances.
    pub min_samples: usize,
}

impl Default for HdbscanParams {
    fn default() -> Self {
        Self {
            min_cluster_size: 8,
            min_samples: 3,
        }
    }
}

/// Assign a label to every row: `0..n_clusters` or [`NOISE`].
pub fn fit_predict(rows: &[Vec<f64>], params: &HdbscanParams) -> Vec<i32> {
    let n = rows.len();
    if n == 0 {
        return Vec::new();
    }
    if n < params.min_cluster_size {
        return vec![NOISE; n];
    }

    let core = core_distances(rows, params.min_samples);
    let reach = mutual_reachability(rows, &core);
    let mst = prim_mst(&reach);
    extract_labels(&mst, n, params.min_cluster_size)
}

/// Cosine distance; zero vectors are maximally distant from everything.
fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|v| v * v).sum::<f64>().sqrt();
    let nb = b.iter().map(|v| v * v).sum::<f64>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 1.0;
    }
    (1.0 - dot / (na * nb)).max(0.0)
}

/// Distance to each point's k-th nearest neighbor.
fn core_distances(rows: &[Vec<f64>], k: usize) -> Vec<f64> {
    let n = rows.len();
    (0..n)
        .map(|i| {
            let mut dists: Vec<f64> = (0..n)
                .filter(|&j| j != i)
                .map(|j| cosine_distance(&rows[i], &rows[j]))
                .collect();
            dists.sort_by(|a, b| a.total_cmp(b));
            if k <= dists.len() {
                dists[k - 1]
            } else {
                dists.last().copied().unwrap_or(f64::MAX)
            }
        })
        .collect()
}

/// MR(a, b) = max(core(a), core(b), dist(a, b)).
fn mutual_reachability(rows: &[Vec<f64>], core: &[f64]) -> Vec<Vec<f64>> {
    let n = rows.len();
    let mut reach = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = cosine_distance(&rows[i], &rows[j]);
            let mr = d.max(core[i]).max(core[j]);
            reach[i][j] = mr;
            reach[j][i] = mr;
        }
    }
    reach
}

/// Prim's algorithm; returns edges sorted ascending by weight.
fn prim_mst(distances: &[Vec<f64>]) -> Vec<(usize, usize, f64)> {
    let n = distances.len();
    let mut in_tree = vec![false; n];
    let mut min_dist = vec![f64::MAX; n];
    let mut min_edge = vec![0usize; n];
    let mut edges = Vec::with_capacity(n.saturating_sub(1));

    in_tree[0] = true;
    for j in 1..n {
        min_dist[j] = distances[0][j];
    }

    for _ in 1..n {
        let mut best = f64::MAX;
        let mut idx = 0;
        for j in 0..n {
            if !in_tree[j] && min_dist[j] < best {
                best = min_dist[j];
                idx = j;
            }
        }

        in_tree[idx] = true;
        edges.push((min_edge[idx], idx, best));

        for j in 0..n {
            if !in_tree[j] && distances[idx][j] < min_dist[j] {
                min_dist[j] = distances[idx][j];
                min_edge[j] = idx;
            }
        }
    }

    edges.sort_by(|a, b| a.2.total_cmp(&b.2));
    edges
}

/// Merge MST edges below the gap threshold with union-find, then label
/// components of at least `min_cluster_size`; everything else is noise.
fn extract_labels(mst: &[(usize, usize, f64)], n: usize, min_cluster_size: usize) -> Vec<i32> {
    let threshold = gap_threshold(mst);

    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut [usize], i: usize) -> usize {
        if parent[i] != i {
            parent[i] = find(parent, parent[i]);
        }
        parent[i]
    }

    for &(i, j, weight) in mst {
        if weight > threshold {
            break;
        }
        let pi = find(&mut parent, i);
        let pj = find(&mut parent, j);
        if pi != pj {
            parent[pj] = pi;
        }
    }

    let mut component_sizes: HashMap<usize, usize> = HashMap::new();
    for i in 0..n {
        let root = find(&mut parent, i);
        *component_sizes.entry(root).or_insert(0) += 1;
    }

    let mut labels = vec![NOISE; n];
    let mut cluster_ids: HashMap<usize, i32> = HashMap::new();
    let mut next = 0i32;

    for i in 0..n {
        let root = find(&mut parent, i);
        if component_sizes[&root] >= min_cluster_size {
            let id = *cluster_ids.entry(root).or_insert_with(|| {
                let id = next;
                next += 1;
                id
            });
            labels[i] = id;
        }
    }

    debug!(clusters = next, noise = labels.iter().filter(|&&l| l == NOISE).count(), "HDBSCAN extraction");
    labels
}

/// Merge cutoff: the edge weight just before the largest gap in the sorted
/// MST edge weights. Falls back to the 75th percentile when no gap stands
/// out, with a small floor so tight clusters don't get shredded.
fn gap_threshold(mst: &[(usize, usize, f64)]) -> f64 {
    if mst.is_empty() {
        return f64::MAX;
    }

    let weights: Vec<f64> = mst.iter().map(|&(_, _, w)| w).collect();
    let n = weights.len();

    let mut max_gap = 0.0f64;
    let mut gap_idx = 0;
    for i in 1..n {
        let gap = weights[i] - weights[i - 1];
        if gap > max_gap {
            max_gap = gap;
            gap_idx = i;
        }
    }

    // Cosine distances live in [0, 2]; a gap under 0.02 is noise.
    const MIN_SIGNIFICANT_GAP: f64 = 0.02;
    const FLOOR: f64 = 0.03;

    let threshold = if max_gap >= MIN_SIGNIFICANT_GAP && gap_idx >= 1 {
        weights[gap_idx - 1]
    } else {
        let p75 = ((n as f64) * 0.75) as usize;
        weights[p75.min(n - 1)]
    };

    threshold.max(FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(direction: (f64, f64, f64), count: usize, jitter: f64) -> Vec<Vec<f64>> {
        (0..count)
            .map(|i| {
                let t = jitter * (i as f64 + 1.0) / count as f64;
                vec![direction.0 + t, direction.1 + t / 2.0, direction.2]
            })
            .collect()
    }

    #[test]
    fn fewer_points_than_min_cluster_size_is_all_noise() {
        let rows = blob((1.0, 0.0, 0.0), 5, 0.01);
        let labels = fit_predict(&rows, &HdbscanParams::default());
        assert!(labels.iter().all(|&l| l == NOISE));
    }

    #[test]
    fn two_directional_blobs_form_clusters_and_outliers_become_noise() {
        let mut rows = blob((1.0, 0.0, 0.0), 10, 0.02);
        rows.extend(blob((0.0, 1.0, 0.0), 10, 0.02));
        // Two points in a third direction — too few to form a cluster.
        rows.push(vec![0.0, 0.0, 1.0]);
        rows.push(vec![0.01, 0.0, 1.0]);

        let labels = fit_predict(&rows, &HdbscanParams::default());

        assert!(labels.iter().all(|&l| l >= NOISE));
        // Both blobs are internally consistent.
        assert!(labels[..10].iter().all(|&l| l == labels[0]));
        assert!(labels[10..20].iter().all(|&l| l == labels[10]));
        // The two stragglers are noise.
        assert_eq!(labels[20], NOISE);
        assert_eq!(labels[21], NOISE);
    }

    #[test]
    fn deterministic_without_a_seed() {
        let mut rows = blob((1.0, 0.0, 0.0), 12, 0.05);
        rows.extend(blob((0.0, 0.0, 1.0), 9, 0.05));
        let a = fit_predict(&rows, &HdbscanParams::default());
        let b = fit_predict(&rows, &HdbscanParams::default());
        assert_eq!(a, b);
    }
}

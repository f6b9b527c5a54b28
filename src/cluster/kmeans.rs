// Partitional clustering: k-means with k-means++ seeding.
//
// Input rows are cosine-normalized before fitting, so squared euclidean
// distance orders points the same way cosine distance does. Seeding is
// deterministic: a fixed seed plus the restart index, so identical input
// always produces identical labels — not just the same partition.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Parameters for the partitional clustering.
#[derive(Debug, Clone)]
pub struct KMeansParams {
    /// Number of clusters. Fixed at 2 by default; kept configurable because
    /// nothing in the data model depends on the exact count.
    pub k: usize,
    /// Independent restarts; the run with the lowest inertia wins.
    pub n_init: usize,
    pub max_iter: usize,
    pub seed: u64,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            k: 2,
            n_init: 10,
            max_iter: 100,
            seed: 42,
        }
    }
}

/// Assign a cluster label in `0..k` to every row.
pub fn fit_predict(rows: &[Vec<f64>], params: &KMeansParams) -> Vec<i32> {
    let n = rows.len();
    if n == 0 {
        return Vec::new();
    }
    let k = params.k.min(n).max(1);

    let data: Vec<Vec<f64>> = rows.iter().map(|r| normalized(r)).collect();

    let mut best_labels: Vec<usize> = vec![0; n];
    let mut best_inertia = f64::INFINITY;

    for restart in 0..params.n_init.max(1) {
        let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(restart as u64));
        let (labels, inertia) = lloyd(&data, k, params.max_iter, &mut rng);
        if inertia < best_inertia {
            best_inertia = inertia;
            best_labels = labels;
        }
    }

    debug!(k, inertia = best_inertia, "k-means converged");
    best_labels.into_iter().map(|l| l as i32).collect()
}

/// One seeded k-means run: k-means++ init then Lloyd iterations.
fn lloyd(data: &[Vec<f64>], k: usize, max_iter: usize, rng: &mut StdRng) -> (Vec<usize>, f64) {
    let n = data.len();
    let mut centroids = plus_plus_init(data, k, rng);
    let mut labels = vec![0usize; n];

    for _ in 0..max_iter {
        let mut changed = false;
        for (i, row) in data.iter().enumerate() {
            let nearest = nearest_centroid(row, &centroids);
            if nearest != labels[i] {
                labels[i] = nearest;
                changed = true;
            }
        }

        recompute_centroids(data, &labels, &mut centroids);

        // An empty cluster steals the point farthest from its centroid.
        for c in 0..k {
            if !labels.contains(&c) {
                let (far, _) = data
                    .iter()
                    .enumerate()
                    .map(|(i, row)| (i, dist_sq(row, &centroids[labels[i]])))
                    .max_by(|a, b| a.1.total_cmp(&b.1))
                    .unwrap_or((0, 0.0));
                labels[far] = c;
                centroids[c] = data[far].clone();
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    let inertia = data
        .iter()
        .zip(&labels)
        .map(|(row, &l)| dist_sq(row, &centroids[l]))
        .sum();

    (labels, inertia)
}

/// k-means++ seeding: first centroid uniform, the rest weighted by squared
/// distance to the nearest already-chosen centroid.
fn plus_plus_init(data: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = data.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(data[rng.random_range(0..n)].clone());

    let mut min_d2 = vec![f64::MAX; n];
    while centroids.len() < k {
        let last = centroids.last().unwrap_or(&data[0]);
        for (i, row) in data.iter().enumerate() {
            min_d2[i] = min_d2[i].min(dist_sq(row, last));
        }

        let total: f64 = min_d2.iter().sum();
        let idx = if total <= f64::EPSILON {
            rng.random_range(0..n)
        } else {
            let mut target = rng.random::<f64>() * total;
            let mut chosen = n - 1;
            for (i, &d) in min_d2.iter().enumerate() {
                target -= d;
                if target <= 0.0 {
                    chosen = i;
                    break;
                }
            }
            chosen
        };
        centroids.push(data[idx].clone());
    }

    centroids
}

fn nearest_centroid(row: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_d = f64::MAX;
    for (c, centroid) in centroids.iter().enumerate() {
        let d = dist_sq(row, centroid);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

fn recompute_centroids(data: &[Vec<f64>], labels: &[usize], centroids: &mut [Vec<f64>]) {
    let dim = data.first().map(Vec::len).unwrap_or(0);
    let mut counts = vec![0usize; centroids.len()];
    let mut sums = vec![vec![0.0; dim]; centroids.len()];

    for (row, &l) in data.iter().zip(labels) {
        counts[l] += 1;
        for (d, v) in row.iter().enumerate() {
            sums[l][d] += v;
        }
    }

    for (c, sum) in sums.into_iter().enumerate() {
        if counts[c] > 0 {
            centroids[c] = sum.into_iter().map(|v| v / counts[c] as f64).collect();
        }
        // Empty clusters keep their previous centroid; the caller reseeds them.
    }
}

fn dist_sq(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn normalized(row: &[f64]) -> Vec<f64> {
    let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        row.iter().map(|v| v / norm).collect()
    } else {
        row.to_vec()
    }
}

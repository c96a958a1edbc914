use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Result of one k-means fit: a label per point, k centroids, and the total
/// within-cluster sum of squared distances.
#[derive(Debug, Clone)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    pub inertia: f64,
}

pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}

pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    squared_distance(a, b).sqrt()
}

/// Lloyd's algorithm with k-means++ seeding and multi-restart selection.
///
/// Restart `r` draws from a `StdRng` seeded with `seed + r`, so the whole
/// sweep is reproducible from one seed; the restart with the lowest inertia
/// wins. Callers must pass a non-empty point set and `k >= 1`.
pub fn fit(
    points: &[Vec<f64>],
    k: usize,
    restarts: usize,
    max_iterations: usize,
    seed: u64,
) -> KMeansFit {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut best = run_lloyd(points, k, max_iterations, &mut rng);

    for restart in 1..restarts.max(1) {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(restart as u64));
        let candidate = run_lloyd(points, k, max_iterations, &mut rng);
        if candidate.inertia < best.inertia {
            best = candidate;
        }
    }
    best
}

fn run_lloyd(
    points: &[Vec<f64>],
    k: usize,
    max_iterations: usize,
    rng: &mut StdRng,
) -> KMeansFit {
    let mut centroids = plus_plus_init(points, k, rng);
    let mut labels = assign(points, &centroids);

    for _ in 0..max_iterations {
        centroids = update_centroids(points, &labels, k, &centroids);
        let new_labels = assign(points, &centroids);
        if new_labels == labels {
            break;
        }
        labels = new_labels;
    }

    let inertia = points
        .iter()
        .zip(&labels)
        .map(|(point, &label)| squared_distance(point, &centroids[label]))
        .sum();

    KMeansFit {
        labels,
        centroids,
        inertia,
    }
}

/// K-means++ seeding: the first centroid is uniform, each further centroid is
/// drawn with probability proportional to the squared distance from the
/// nearest centroid chosen so far.
fn plus_plus_init(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids: Vec<Vec<f64>> = Vec::with_capacity(k);
    let first = rng.gen_range(0..points.len());
    centroids.push(points[first].clone());

    let mut nearest_sq: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = nearest_sq.iter().sum();
        let chosen = if total <= f64::EPSILON {
            // All remaining mass is zero (duplicate points); any index works
            rng.gen_range(0..points.len())
        } else {
            let mut target = rng.gen_range(0.0..total);
            let mut index = points.len() - 1;
            for (i, weight) in nearest_sq.iter().enumerate() {
                if target <= *weight {
                    index = i;
                    break;
                }
                target -= weight;
            }
            index
        };

        let centroid = points[chosen].clone();
        for (i, point) in points.iter().enumerate() {
            let d = squared_distance(point, &centroid);
            if d < nearest_sq[i] {
                nearest_sq[i] = d;
            }
        }
        centroids.push(centroid);
    }
    centroids
}

fn assign(points: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<usize> {
    points
        .iter()
        .map(|point| {
            let mut best = 0;
            let mut best_sq = f64::INFINITY;
            for (label, centroid) in centroids.iter().enumerate() {
                let d = squared_distance(point, centroid);
                if d < best_sq {
                    best_sq = d;
                    best = label;
                }
            }
            best
        })
        .collect()
}

/// Mean of each cluster's members. An emptied cluster is re-seeded with the
/// point farthest from its current centroid so every cluster stays populated.
fn update_centroids(
    points: &[Vec<f64>],
    labels: &[usize],
    k: usize,
    previous: &[Vec<f64>],
) -> Vec<Vec<f64>> {
    let dims = points.first().map_or(0, |p| p.len());
    let mut sums = vec![vec![0.0; dims]; k];
    let mut counts = vec![0usize; k];

    for (point, &label) in points.iter().zip(labels) {
        counts[label] += 1;
        for (j, value) in point.iter().enumerate() {
            sums[label][j] += value;
        }
    }

    let mut centroids = Vec::with_capacity(k);
    for cluster in 0..k {
        if counts[cluster] > 0 {
            let n = counts[cluster] as f64;
            centroids.push(sums[cluster].iter().map(|s| s / n).collect());
        } else {
            centroids.push(farthest_point(points, labels, previous));
        }
    }
    centroids
}

fn farthest_point(points: &[Vec<f64>], labels: &[usize], centroids: &[Vec<f64>]) -> Vec<f64> {
    let mut best = 0;
    let mut best_sq = -1.0;
    for (i, (point, &label)) in points.iter().zip(labels).enumerate() {
        let d = squared_distance(point, &centroids[label]);
        if d > best_sq {
            best_sq = d;
            best = i;
        }
    }
    points[best].clone()
}

//! 2-D point-set statistics shared by the embedding fitness metrics.

pub type Point = [f64; 2];

pub fn centroid(points: &[Point]) -> Point {
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|p| p[0]).sum();
    let sum_y: f64 = points.iter().map(|p| p[1]).sum();
    [sum_x / n, sum_y / n]
}

pub fn std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Standard deviation of point distances from the centroid.
pub fn spread(points: &[Point]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let center = centroid(points);
    let distances: Vec<f64> = points
        .iter()
        .map(|p| ((p[0] - center[0]).powi(2) + (p[1] - center[1]).powi(2)).sqrt())
        .collect();
    std_dev(&distances)
}

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

/// Graham scan. Returns the hull vertices in counter-clockwise order;
/// fewer than 3 input points come back unchanged.
fn graham_scan(points: &[Point]) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut lowest = 0;
    for (i, p) in points.iter().enumerate().skip(1) {
        let low = points[lowest];
        if p[1] < low[1] || (p[1] == low[1] && p[0] < low[0]) {
            lowest = i;
        }
    }
    let p0 = points[lowest];

    let mut sorted: Vec<Point> = points
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != lowest)
        .map(|(_, p)| *p)
        .collect();
    sorted.sort_by(|a, b| {
        let angle_a = (a[1] - p0[1]).atan2(a[0] - p0[0]);
        let angle_b = (b[1] - p0[1]).atan2(b[0] - p0[0]);
        angle_a.partial_cmp(&angle_b).unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut hull = vec![p0, sorted[0]];
    for &p in &sorted[1..] {
        while hull.len() > 1 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull
}

/// Convex hull area via the shoelace formula. Degenerate sets score 0.
pub fn hull_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let hull = graham_scan(points);
    if hull.len() < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..hull.len() {
        let j = (i + 1) % hull.len();
        area += hull[i][0] * hull[j][1];
        area -= hull[j][0] * hull[i][1];
    }
    area.abs() / 2.0
}

/// Eigenvalues of the 2x2 covariance matrix, largest first.
pub fn covariance_eigenvalues(points: &[Point]) -> (f64, f64) {
    let center = centroid(points);
    let n = points.len() as f64;
    let mut cov_xx = 0.0;
    let mut cov_yy = 0.0;
    let mut cov_xy = 0.0;
    for p in points {
        let dx = p[0] - center[0];
        let dy = p[1] - center[1];
        cov_xx += dx * dx;
        cov_yy += dy * dy;
        cov_xy += dx * dy;
    }
    cov_xx /= n;
    cov_yy /= n;
    cov_xy /= n;

    let trace = cov_xx + cov_yy;
    let det = cov_xx * cov_yy - cov_xy * cov_xy;
    let discriminant = (trace * trace - 4.0 * det).max(0.0).sqrt();
    ((trace + discriminant) / 2.0, (trace - discriminant) / 2.0)
}

fn sigmoid(x: f64, steepness: f64, midpoint: f64) -> f64 {
    1.0 / (1.0 + (-steepness * (x - midpoint)).exp())
}

/// Eigenvalue ratio pushed through a sigmoid: near 1 for round clouds,
/// near 0 for line-like ones.
pub fn isotropy_score(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let (eigen1, eigen2) = covariance_eigenvalues(points);
    if eigen1 <= 1e-9 {
        return 0.0;
    }
    sigmoid(eigen2 / eigen1, 5.0, 0.2)
}

/// Ratio of the raw x and y ranges pushed through a sigmoid, penalizing
/// embeddings whose axes live on wildly different scales.
pub fn scale_balance_score(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let (x_min, x_max) = min_max(points.iter().map(|p| p[0]));
    let (y_min, y_max) = min_max(points.iter().map(|p| p[1]));
    let x_range = x_max - x_min;
    let y_range = y_max - y_min;
    let max_range = x_range.max(y_range);
    if max_range == 0.0 {
        return 0.0;
    }
    sigmoid(x_range.min(y_range) / max_range, 5.0, 0.3)
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Min-max normalize both sets jointly into `[-1, 1]^2`.
pub fn normalize_coords(primes: &[Point], composites: &[Point]) -> (Vec<Point>, Vec<Point>) {
    if primes.is_empty() && composites.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let all = primes.iter().chain(composites.iter());
    let (x_min, x_max) = min_max(all.clone().map(|p| p[0]));
    let (y_min, y_max) = min_max(all.map(|p| p[1]));
    let x_range = if x_max - x_min == 0.0 { 1.0 } else { x_max - x_min };
    let y_range = if y_max - y_min == 0.0 { 1.0 } else { y_max - y_min };

    let map = |p: &Point| -> Point {
        [
            (p[0] - x_min) / x_range * 2.0 - 1.0,
            (p[1] - y_min) / y_range * 2.0 - 1.0,
        ]
    };
    (primes.iter().map(map).collect(), composites.iter().map(map).collect())
}

/// Mean distance from each point in `from` to its nearest neighbor in `to`.
/// `to` is truncated to `limit` points.
pub fn mean_nearest_distance(from: &[Point], to: &[Point], limit: usize) -> f64 {
    let to = &to[..to.len().min(limit)];
    let mut total = 0.0;
    let mut count = 0usize;
    for p in from {
        let mut best = f64::INFINITY;
        for q in to {
            let d2 = (p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2);
            best = best.min(d2);
        }
        if best.is_finite() {
            total += best.sqrt();
            count += 1;
        }
    }
    if count > 0 {
        total / count as f64
    } else {
        0.0
    }
}

/// Coefficient of variation of per-point neighbor counts within `radius`.
pub fn local_density_cv(points: &[Point], radius: f64, limit: usize) -> f64 {
    if points.len() < 5 {
        return 0.0;
    }
    let radius_squared = radius * radius;
    let sample = &points[..points.len().min(limit)];

    let densities: Vec<f64> = sample
        .iter()
        .map(|p| {
            points
                .iter()
                .filter(|q| {
                    let d2 = (p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2);
                    d2 <= radius_squared && d2 > 0.0
                })
                .count() as f64
        })
        .collect();

    let mean = densities.iter().sum::<f64>() / densities.len() as f64;
    if mean > 0.0 {
        std_dev(&densities) / mean
    } else {
        0.0
    }
}

/// Nearest-neighbor compactness in `[0, 1]`: 1 when points sit on top of
/// each other, falling off as the average gap approaches 1.
pub fn clustering_quality(points: &[Point], limit: usize) -> f64 {
    if points.len() < 10 {
        return 0.0;
    }
    let sample = &points[..points.len().min(limit)];
    let mut distances = Vec::with_capacity(sample.len());
    for (i, p) in sample.iter().enumerate() {
        let mut best = f64::INFINITY;
        for (j, q) in points.iter().enumerate() {
            if i == j {
                continue;
            }
            let d2 = (p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2);
            best = best.min(d2);
        }
        if best.is_finite() {
            distances.push(best.sqrt());
        }
    }
    if distances.is_empty() {
        return 0.0;
    }
    let avg = distances.iter().sum::<f64>() / distances.len() as f64;
    (1.0 - avg).max(0.0)
}

const HISTOGRAM_GRID: usize = 25;

fn histogram_2d(
    points: &[Point],
    x_min: f64,
    x_range: f64,
    y_min: f64,
    y_range: f64,
) -> Vec<Vec<f64>> {
    let mut histogram = vec![vec![0.0; HISTOGRAM_GRID]; HISTOGRAM_GRID];
    for p in points {
        let x_bin = ((p[0] - x_min) / x_range * HISTOGRAM_GRID as f64).floor() as isize;
        let y_bin = ((p[1] - y_min) / y_range * HISTOGRAM_GRID as f64).floor() as isize;
        // The maximum lands exactly on the upper edge; fold it into the
        // last bin.
        let x_bin = x_bin.clamp(0, HISTOGRAM_GRID as isize - 1) as usize;
        let y_bin = y_bin.clamp(0, HISTOGRAM_GRID as isize - 1) as usize;
        histogram[y_bin][x_bin] += 1.0;
    }
    histogram
}

fn kl_divergence(p: &[Vec<f64>], q: &[Vec<f64>]) -> f64 {
    let mut divergence = 0.0;
    for (row_p, row_q) in p.iter().zip(q) {
        for (&a, &b) in row_p.iter().zip(row_q) {
            if a > 0.0 && b > 0.0 {
                divergence += a * (a / b).ln();
            }
        }
    }
    divergence
}

/// Jensen-Shannon divergence over a shared 25x25 histogram, normalized to
/// `[0, 1]`.
pub fn js_divergence(a: &[Point], b: &[Point]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let all = a.iter().chain(b.iter());
    let (x_min, x_max) = min_max(all.clone().map(|p| p[0]));
    let (y_min, y_max) = min_max(all.map(|p| p[1]));
    let x_range = if x_max - x_min == 0.0 { 1.0 } else { x_max - x_min };
    let y_range = if y_max - y_min == 0.0 { 1.0 } else { y_max - y_min };

    let hist_a = histogram_2d(a, x_min, x_range, y_min, y_range);
    let hist_b = histogram_2d(b, x_min, x_range, y_min, y_range);

    let sum_a: f64 = hist_a.iter().flatten().sum();
    let sum_b: f64 = hist_b.iter().flatten().sum();
    if sum_a == 0.0 || sum_b == 0.0 {
        return 0.0;
    }

    let p: Vec<Vec<f64>> = hist_a
        .iter()
        .map(|row| row.iter().map(|v| v / sum_a).collect())
        .collect();
    let q: Vec<Vec<f64>> = hist_b
        .iter()
        .map(|row| row.iter().map(|v| v / sum_b).collect())
        .collect();
    let m: Vec<Vec<f64>> = p
        .iter()
        .zip(&q)
        .map(|(row_p, row_q)| {
            row_p
                .iter()
                .zip(row_q)
                .map(|(&a, &b)| 0.5 * (a + b))
                .collect()
        })
        .collect();

    let js = 0.5 * (kl_divergence(&p, &m) + kl_divergence(&q, &m));
    js / std::f64::consts::LN_2
}

const HOUGH_IMAGE_SIZE: usize = 32;
const HOUGH_ANGLES: usize = 90;
const HOUGH_PEAKS: usize = 5;

/// Hough-transform line strength: rasterize onto a 32x32 grid, accumulate
/// over (angle, offset) cells, and compare the top peaks against the
/// accumulator mean. Values near 1 mean no dominant line.
pub fn hough_line_strength(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let (x_min, x_max) = min_max(points.iter().map(|p| p[0]));
    let (y_min, y_max) = min_max(points.iter().map(|p| p[1]));
    let x_range = if x_max - x_min == 0.0 { 1.0 } else { x_max - x_min };
    let y_range = if y_max - y_min == 0.0 { 1.0 } else { y_max - y_min };

    let mut image = [[false; HOUGH_IMAGE_SIZE]; HOUGH_IMAGE_SIZE];
    for p in points {
        let x = ((p[0] - x_min) / x_range * (HOUGH_IMAGE_SIZE - 1) as f64).round() as usize;
        let y = ((p[1] - y_min) / y_range * (HOUGH_IMAGE_SIZE - 1) as f64).round() as usize;
        image[y.min(HOUGH_IMAGE_SIZE - 1)][x.min(HOUGH_IMAGE_SIZE - 1)] = true;
    }

    // Angles span half the circle, so r covers [-d, d] with d the image
    // diagonal; map that interval across the offset bins.
    let diagonal = (HOUGH_IMAGE_SIZE as f64) * std::f64::consts::SQRT_2;
    let mut accumulator = [[0.0_f64; HOUGH_IMAGE_SIZE]; HOUGH_ANGLES];
    for (step, row) in accumulator.iter_mut().enumerate() {
        let rad = step as f64 * std::f64::consts::PI / HOUGH_ANGLES as f64;
        let (sin, cos) = rad.sin_cos();
        for (y, image_row) in image.iter().enumerate() {
            for (x, &set) in image_row.iter().enumerate() {
                if set {
                    let r = x as f64 * cos + y as f64 * sin;
                    let index = ((r + diagonal) / (2.0 * diagonal)
                        * (HOUGH_IMAGE_SIZE - 1) as f64)
                        .round() as isize;
                    let index = index.clamp(0, HOUGH_IMAGE_SIZE as isize - 1) as usize;
                    row[index] += 1.0;
                }
            }
        }
    }

    let mut cells: Vec<f64> = accumulator.iter().flatten().copied().collect();
    cells.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let avg_peak = cells[..HOUGH_PEAKS].iter().sum::<f64>() / HOUGH_PEAKS as f64;
    let avg_cell = cells.iter().sum::<f64>() / cells.len() as f64;

    if avg_cell <= 1e-12 {
        if avg_peak > 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        avg_peak / avg_cell
    }
}

/// Eigenvalue ratio, large when the cloud concentrates along one axis.
pub fn pca_linearity(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let (eigen1, eigen2) = covariance_eigenvalues(points);
    if eigen2 > 1e-9 {
        eigen1 / eigen2
    } else {
        0.0
    }
}

/// Shannon entropy of the quadrant occupancy counts.
pub fn quadrant_entropy(points: &[Point]) -> f64 {
    if points.len() < 5 {
        return 0.0;
    }
    let mut quadrants = [0usize; 4];
    for p in points {
        let index = match (p[0] >= 0.0, p[1] >= 0.0) {
            (true, true) => 0,
            (false, true) => 1,
            (false, false) => 2,
            (true, false) => 3,
        };
        quadrants[index] += 1;
    }
    let total = points.len() as f64;
    quadrants
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.ln()
        })
        .sum()
}

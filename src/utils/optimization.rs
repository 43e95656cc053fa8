//! Derivative-free minimisation used for parameter estimation.

use std::cmp::Ordering;

/// Result of Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// The optimal point found.
    pub optimal_point: Vec<f64>,
    /// The objective function value at the optimal point.
    pub optimal_value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the algorithm converged.
    pub converged: bool,
}

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence tolerance on both objective spread and simplex size.
    pub tolerance: f64,
    /// Reflection coefficient (default: 1.0).
    pub reflection: f64,
    /// Expansion coefficient (default: 2.0).
    pub expansion: f64,
    /// Contraction coefficient (default: 0.5).
    pub contraction: f64,
    /// Shrinkage coefficient (default: 0.5).
    pub shrink: f64,
    /// Initial simplex step, relative to the magnitude of each coordinate.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
            initial_step: 0.05,
        }
    }
}

struct Simplex {
    vertices: Vec<Vec<f64>>,
    values: Vec<f64>,
}

impl Simplex {
    /// Vertex indices from best to worst.
    fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.vertices.len()).collect();
        order.sort_by(|&a, &b| {
            self.values[a]
                .partial_cmp(&self.values[b])
                .unwrap_or(Ordering::Equal)
        });
        order
    }

    fn centroid_without(&self, excluded: usize) -> Vec<f64> {
        let dims = self.vertices[0].len();
        let count = (self.vertices.len() - 1) as f64;
        let mut centroid = vec![0.0; dims];
        for (_, vertex) in self
            .vertices
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != excluded)
        {
            for (c, v) in centroid.iter_mut().zip(vertex) {
                *c += v;
            }
        }
        centroid.iter_mut().for_each(|c| *c /= count);
        centroid
    }

    fn replace(&mut self, index: usize, vertex: Vec<f64>, value: f64) {
        self.vertices[index] = vertex;
        self.values[index] = value;
    }
}

/// Minimise `objective` with the Nelder-Mead simplex method.
///
/// Non-finite objective values are treated as `f64::MAX`, so an objective
/// may reject a point by returning `f64::INFINITY` or NaN.
///
/// # Example
/// ```
/// use arima_forecast::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// // Minimize (x-2)^2 + (y-3)^2
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
///     &[0.0, 0.0],
///     None,
///     NelderMeadConfig::default(),
/// );
///
/// assert!(result.converged);
/// assert!((result.optimal_point[0] - 2.0).abs() < 0.01);
/// assert!((result.optimal_point[1] - 3.0).abs() < 0.01);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let evaluate = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() {
            v
        } else {
            f64::MAX
        }
    };

    let start = clamp_to_bounds(initial.to_vec(), bounds);
    let mut vertices = Vec::with_capacity(n + 1);
    vertices.push(start.clone());
    for i in 0..n {
        let mut vertex = start.clone();
        vertex[i] += if start[i].abs() > 1e-10 {
            config.initial_step * start[i].abs()
        } else {
            config.initial_step
        };
        vertices.push(clamp_to_bounds(vertex, bounds));
    }
    let values = vertices.iter().map(|v| evaluate(v)).collect();
    let mut simplex = Simplex { vertices, values };

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let ranking = simplex.ranking();
        let best = ranking[0];
        let worst = ranking[n];
        let second_worst = ranking[n - 1];

        if simplex.values[worst] - simplex.values[best] < config.tolerance {
            converged = true;
            break;
        }

        let centroid = simplex.centroid_without(worst);
        let spread = simplex
            .vertices
            .iter()
            .map(|v| distance(v, &centroid))
            .fold(0.0, f64::max);
        if spread < config.tolerance {
            converged = true;
            break;
        }

        let reflected = clamp_to_bounds(
            towards(&centroid, &simplex.vertices[worst], -config.reflection),
            bounds,
        );
        let reflected_value = evaluate(&reflected);

        if reflected_value < simplex.values[best] {
            let expanded = clamp_to_bounds(
                towards(&centroid, &reflected, config.expansion),
                bounds,
            );
            let expanded_value = evaluate(&expanded);
            if expanded_value < reflected_value {
                simplex.replace(worst, expanded, expanded_value);
            } else {
                simplex.replace(worst, reflected, reflected_value);
            }
            continue;
        }

        if reflected_value < simplex.values[second_worst] {
            simplex.replace(worst, reflected, reflected_value);
            continue;
        }

        // Contract towards the better of the reflected and worst vertex.
        let (anchor, anchor_value) = if reflected_value < simplex.values[worst] {
            (reflected, reflected_value)
        } else {
            (simplex.vertices[worst].clone(), simplex.values[worst])
        };
        let contracted = clamp_to_bounds(towards(&centroid, &anchor, config.contraction), bounds);
        let contracted_value = evaluate(&contracted);
        if contracted_value < anchor_value {
            simplex.replace(worst, contracted, contracted_value);
            continue;
        }

        let best_vertex = simplex.vertices[best].clone();
        for i in (0..=n).filter(|&i| i != best) {
            let shrunk = clamp_to_bounds(
                towards(&best_vertex, &simplex.vertices[i], config.shrink),
                bounds,
            );
            let value = evaluate(&shrunk);
            simplex.replace(i, shrunk, value);
        }
    }

    let best = simplex.ranking()[0];
    NelderMeadResult {
        optimal_point: simplex.vertices[best].clone(),
        optimal_value: simplex.values[best],
        iterations,
        converged,
    }
}

/// `origin + t * (point - origin)`.
fn towards(origin: &[f64], point: &[f64], t: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(point)
        .map(|(o, p)| o + t * (p - o))
        .collect()
}

fn clamp_to_bounds(mut point: Vec<f64>, bounds: Option<&[(f64, f64)]>) -> Vec<f64> {
    if let Some(bounds) = bounds {
        for (x, &(lo, hi)) in point.iter_mut().zip(bounds) {
            *x = x.clamp(lo, hi);
        }
    }
    point
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn nelder_mead_quadratic_2d() {
        let result = nelder_mead(
            |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
            &[0.0, 0.0],
            None,
            NelderMeadConfig::default(),
        );

        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 2.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_point[1], 3.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_value, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn nelder_mead_with_bounds() {
        // Unconstrained optimum at 5, box is [0, 3].
        let result = nelder_mead(
            |x| (x[0] - 5.0).powi(2),
            &[1.0],
            Some(&[(0.0, 3.0)]),
            NelderMeadConfig::default(),
        );

        assert_relative_eq!(result.optimal_point[0], 3.0, epsilon = 1e-4);
    }

    #[test]
    fn nelder_mead_treats_infinite_as_rejected() {
        // Feasible region is x < 1; optimum of the parabola at 2 is infeasible.
        let result = nelder_mead(
            |x| {
                if x[0] >= 1.0 {
                    f64::INFINITY
                } else {
                    (x[0] - 2.0).powi(2)
                }
            },
            &[0.0],
            None,
            NelderMeadConfig::default(),
        );

        assert!(result.optimal_point[0] < 1.0);
        assert!(result.optimal_point[0] > 0.9);
        assert!(result.optimal_value.is_finite());
    }

    #[test]
    fn nelder_mead_smoothing_alpha() {
        let data: [f64; 8] = [10.0, 12.0, 11.0, 13.0, 14.0, 13.0, 15.0, 16.0];

        let sse = |params: &[f64]| {
            let alpha = params[0];
            let mut level = data[0];
            let mut total = 0.0;
            for &y in &data[1..] {
                total += (y - level).powi(2);
                level = alpha * y + (1.0 - alpha) * level;
            }
            total
        };

        let result = nelder_mead(sse, &[0.5], Some(&[(0.01, 0.99)]), NelderMeadConfig::default());

        assert!(result.converged);
        assert!(result.optimal_point[0] > 0.01 && result.optimal_point[0] < 0.99);
    }

    #[test]
    fn nelder_mead_empty_initial() {
        let result = nelder_mead(|_| 0.0, &[], None, NelderMeadConfig::default());

        assert!(!result.converged);
        assert!(result.optimal_value.is_nan());
    }

    #[test]
    fn nelder_mead_3d() {
        let result = nelder_mead(
            |x| x[0].powi(2) + x[1].powi(2) + x[2].powi(2),
            &[1.0, 2.0, 3.0],
            None,
            NelderMeadConfig::default(),
        );

        assert!(result.converged);
        for coord in &result.optimal_point {
            assert_relative_eq!(*coord, 0.0, epsilon = 1e-3);
        }
    }
}

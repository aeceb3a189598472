use argminmax::ArgMinMax;
use statrs::statistics::Statistics;

/// Result of an ordinary least-squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination (0.0 ..= 1.0)
    pub r_squared: f64,
}

impl LinearFit {
    #[inline]
    pub fn project(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least squares over `(x, y)` points.
///
/// Returns `None` with fewer than two points or when every x is identical
/// (vertical line). Two distinct points give an exact fit with r² = 1.0.
/// A perfectly horizontal set (all y equal) also reports r² = 1.0.
pub fn linear_regression(points: &[(f64, f64)]) -> Option<LinearFit> {
    if points.len() < 2 {
        return None;
    }

    let mean_x = points.iter().map(|p| p.0).mean();
    let mean_y = points.iter().map(|p| p.1).mean();

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for &(x, y) in points {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    if sxx <= f64::EPSILON {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let r_squared = if syy <= f64::EPSILON {
        1.0
    } else {
        let ss_res: f64 = points
            .iter()
            .map(|&(x, y)| {
                let resid = y - (slope * x + intercept);
                resid * resid
            })
            .sum();
        (1.0 - ss_res / syy).clamp(0.0, 1.0)
    };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}

/// Relative distance of `price` from `reference`, measured against |reference|.
#[inline]
pub fn relative_distance(price: f64, reference: f64) -> f64 {
    (price - reference).abs() / reference.abs().max(f64::EPSILON)
}

pub fn get_max(vec: &[f64]) -> f64 {
    debug_assert!(!vec.is_empty());
    let max_index: usize = vec.argmax();
    vec[max_index]
}

pub fn get_min(vec: &[f64]) -> f64 {
    debug_assert!(!vec.is_empty());
    let min_index: usize = vec.argmin();
    vec[min_index]
}

// Rescales values to 0.0..=1.0 (min-max normalization).
// A constant input maps to all 1.0 so the single level still reads as "top".
pub fn normalize_min_max(vec: &[f64]) -> Vec<f64> {
    if vec.is_empty() {
        return Vec::new();
    }
    let min_value = get_min(vec);
    let max_value = get_max(vec);
    let span = max_value - min_value;

    if span <= f64::EPSILON {
        return vec![1.0; vec.len()];
    }
    vec.iter().map(|&x| (x - min_value) / span).collect()
}

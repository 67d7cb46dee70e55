//! 2D histogram with NumPy `histogram2d` binning.

/// Equal-width bins over `[min, max]` on each axis. The last bin on each
/// axis is closed, so the maximum lands inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram2d {
    pub bins: usize,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    /// `counts[x_bin][y_bin]`
    pub counts: Vec<Vec<u64>>,
}

impl Histogram2d {
    /// Bin paired points, ignoring pairs with a non-finite coordinate.
    /// `None` when there is nothing to bin.
    pub fn compute(xs: &[f64], ys: &[f64], bins: usize) -> Option<Self> {
        let points: Vec<(f64, f64)> = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| (x, y))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        if points.is_empty() || bins == 0 {
            return None;
        }

        let x_range = axis_range(points.iter().map(|p| p.0));
        let y_range = axis_range(points.iter().map(|p| p.1));
        let mut counts = vec![vec![0u64; bins]; bins];
        for (x, y) in points {
            counts[bin_index(x, x_range, bins)][bin_index(y, y_range, bins)] += 1;
        }

        Some(Self {
            bins,
            x_range,
            y_range,
            counts,
        })
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

/// Data range of one axis, widened by 0.5 on each side when degenerate.
fn axis_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo == hi {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

fn bin_index(value: f64, (lo, hi): (f64, f64), bins: usize) -> usize {
    let scaled = (value - lo) / (hi - lo) * bins as f64;
    (scaled as usize).min(bins - 1)
}

//! Small statistics over trailing rows: change, trend slope, realized volatility.

use nalgebra::{DMatrix, DVector};

/// Trading days per year used to annualise daily volatility.
const TRADING_DAYS: f64 = 252.0;

/// Percentage change from the previous value to the last.
pub fn pct_change(values: &[f64]) -> Option<f64> {
    let [.., prev, last] = values else {
        return None;
    };
    if *prev == 0.0 {
        return None;
    }
    let pct = (last - prev) / prev * 100.0;
    pct.is_finite().then_some(pct)
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }
    None
}

/// Least-squares slope of the last `window` values against their row offset,
/// expressed as a fraction of the window mean per row.
///
/// Positive means the series is trending up.
pub fn trend_slope(values: &[f64], window: usize) -> Option<f64> {
    if window < 2 || values.len() < window {
        return None;
    }
    let tail = &values[values.len() - window..];
    if tail.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let x = DMatrix::from_fn(window, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
    let y = DVector::from_column_slice(tail);
    let beta = solve_least_squares(&x, &y)?;

    let mean = tail.iter().sum::<f64>() / window as f64;
    if mean == 0.0 {
        return None;
    }
    Some(beta[1] / mean.abs())
}

/// Sample standard deviation of daily log-returns.
pub fn log_return_std(series: &[f64]) -> Option<f64> {
    if series.len() < 3 {
        return None;
    }

    let mut log_returns = Vec::with_capacity(series.len() - 1);
    for pair in series.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        if prev > 0.0 && curr > 0.0 {
            log_returns.push((curr / prev).ln());
        }
    }

    if log_returns.len() < 2 {
        return None;
    }

    let n = log_returns.len() as f64;
    let mean = log_returns.iter().sum::<f64>() / n;
    let variance = log_returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);

    Some(variance.sqrt())
}

/// Annualised realized volatility of the last `window` rows, in percent.
pub fn realized_vol_pct(values: &[f64], window: usize) -> Option<f64> {
    let start = values.len().saturating_sub(window + 1);
    log_return_std(&values[start..]).map(|sd| sd * TRADING_DAYS.sqrt() * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pct_change_of_last_two() {
        let pct = pct_change(&[1.0, 2000.0, 2010.0]).unwrap();
        assert!((pct - 0.5).abs() < 1e-12);
        assert_eq!(pct_change(&[1.0]), None);
        assert_eq!(pct_change(&[0.0, 1.0]), None);
    }

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn slope_sign_follows_trend() {
        let up = [100.0, 101.0, 102.0, 103.0, 104.0];
        let down = [104.0, 103.0, 102.0, 101.0, 100.0];
        let s = trend_slope(&up, 5).unwrap();
        assert!((s - 1.0 / 102.0).abs() < 1e-9);
        assert!(trend_slope(&down, 5).unwrap() < 0.0);
        assert!(trend_slope(&up, 6).is_none());
    }

    #[test]
    fn log_return_std_computes_correctly() {
        let constant = [100.0, 100.0, 100.0];
        assert!(log_return_std(&constant).unwrap().abs() < 1e-10);

        // ln(1.1) and ln(100/110): mean 0, std ≈ 0.1348.
        let varying = [100.0, 110.0, 100.0];
        let vol = log_return_std(&varying).unwrap();
        assert!(vol > 0.13 && vol < 0.14, "Expected vol around 0.135, got {vol}");
    }

    #[test]
    fn realized_vol_uses_trailing_window() {
        let mut values = vec![100.0, 150.0, 80.0];
        values.extend(std::iter::repeat_n(100.0, 10));
        assert!(realized_vol_pct(&values, 5).unwrap().abs() < 1e-9);
        assert!(realized_vol_pct(&values, 20).unwrap() > 1.0);
    }
}

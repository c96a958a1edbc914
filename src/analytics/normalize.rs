/// Per-dimension standardization (zero mean, unit variance) fitted over one
/// batch of feature vectors. The fit is per-run; no scaler state persists
/// between pipeline invocations.
#[derive(Debug, Clone)]
pub struct FeatureScaler {
    means: Vec<f64>,
    std_devs: Vec<f64>,
}

impl FeatureScaler {
    /// Fit a scaler over `rows` and return the scaled rows alongside it.
    ///
    /// Uses the population standard deviation. A zero-variance dimension gets
    /// a scale factor of 1, which leaves that dimension at its centered value
    /// instead of dividing by zero.
    pub fn fit(rows: &[Vec<f64>]) -> (Vec<Vec<f64>>, FeatureScaler) {
        let dims = rows.first().map_or(0, |row| row.len());
        let n = rows.len() as f64;

        let mut means = vec![0.0; dims];
        for row in rows {
            for (j, value) in row.iter().enumerate() {
                means[j] += value;
            }
        }
        if n > 0.0 {
            for mean in &mut means {
                *mean /= n;
            }
        }

        let mut std_devs = vec![0.0; dims];
        for row in rows {
            for (j, value) in row.iter().enumerate() {
                let diff = value - means[j];
                std_devs[j] += diff * diff;
            }
        }
        for std_dev in &mut std_devs {
            if n > 0.0 {
                *std_dev = (*std_dev / n).sqrt();
            }
            if *std_dev < f64::EPSILON {
                *std_dev = 1.0;
            }
        }

        let scaler = FeatureScaler { means, std_devs };
        let scaled = rows.iter().map(|row| scaler.transform(row)).collect();
        (scaled, scaler)
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.std_devs))
            .map(|(value, (mean, std_dev))| (value - mean) / std_dev)
            .collect()
    }

    /// Map a vector in normalized space back to original feature units.
    pub fn inverse_transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.std_devs))
            .map(|(value, (mean, std_dev))| value * std_dev + mean)
            .collect()
    }
}

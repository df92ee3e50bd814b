//! Ordinary least squares with an intercept.
//!
//! One-hot groups are always collinear with the intercept (and a single-day
//! window makes `WeekStatus` constant), so the normal equations are singular
//! by construction. The solver returns the minimum-norm solution in
//! standardized column space: centered columns are scaled to unit norm, the
//! Gram matrix is diagonalised with cyclic Jacobi rotations, and directions
//! with negligible eigenvalues are dropped.

/// Sweeps before Jacobi gives up converging
const MAX_SWEEPS: usize = 100;

/// Eigenvalues below `RANK_TOLERANCE * max_eigenvalue` are treated as zero
const RANK_TOLERANCE: f64 = 1e-10;

/// Fitted intercept and one coefficient per design column
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

/// Fit `y ≈ intercept + X·β`. Rows of `x` must all have the same width.
pub fn fit(x: &[Vec<f64>], y: &[f64]) -> OlsFit {
    let n = y.len();
    let p = x.first().map(|row| row.len()).unwrap_or(0);
    if n == 0 {
        return OlsFit {
            intercept: 0.0,
            coefficients: vec![0.0; p],
        };
    }
    let nf = n as f64;

    let y_mean = y.iter().sum::<f64>() / nf;
    let x_mean: Vec<f64> = (0..p)
        .map(|j| x.iter().map(|row| row[j]).sum::<f64>() / nf)
        .collect();

    // Centered column norms; zero-variance columns get scale 0 and coefficient 0
    let scale: Vec<f64> = (0..p)
        .map(|j| {
            x.iter()
                .map(|row| (row[j] - x_mean[j]).powi(2))
                .sum::<f64>()
                .sqrt()
        })
        .collect();

    let z = |i: usize, j: usize| -> f64 {
        if scale[j] > 0.0 {
            (x[i][j] - x_mean[j]) / scale[j]
        } else {
            0.0
        }
    };

    let mut gram = vec![vec![0.0; p]; p];
    let mut rhs = vec![0.0; p];
    for i in 0..n {
        let yc = y[i] - y_mean;
        for a in 0..p {
            let za = z(i, a);
            if za == 0.0 {
                continue;
            }
            rhs[a] += za * yc;
            for b in a..p {
                gram[a][b] += za * z(i, b);
            }
        }
    }
    for a in 0..p {
        for b in 0..a {
            gram[a][b] = gram[b][a];
        }
    }

    let standardized = solve_min_norm(gram, &rhs);

    let coefficients: Vec<f64> = standardized
        .iter()
        .zip(&scale)
        .map(|(beta, s)| if *s > 0.0 { beta / s } else { 0.0 })
        .collect();
    let intercept = y_mean
        - coefficients
            .iter()
            .zip(&x_mean)
            .map(|(b, m)| b * m)
            .sum::<f64>();

    OlsFit {
        intercept,
        coefficients,
    }
}

/// Pseudo-inverse solve of a symmetric positive semi-definite system
fn solve_min_norm(gram: Vec<Vec<f64>>, rhs: &[f64]) -> Vec<f64> {
    let p = rhs.len();
    let (eigenvalues, eigenvectors) = symmetric_eigen(gram);
    let max_eigen = eigenvalues.iter().cloned().fold(0.0_f64, f64::max);

    let mut solution = vec![0.0; p];
    if max_eigen <= 0.0 {
        return solution;
    }

    for (k, &lambda) in eigenvalues.iter().enumerate() {
        if lambda <= max_eigen * RANK_TOLERANCE {
            continue;
        }
        let projection: f64 = (0..p).map(|i| eigenvectors[i][k] * rhs[i]).sum();
        let weight = projection / lambda;
        for (i, value) in solution.iter_mut().enumerate() {
            *value += weight * eigenvectors[i][k];
        }
    }
    solution
}

/// Cyclic Jacobi eigen-decomposition. Eigenvectors are the columns of the
/// returned matrix.
fn symmetric_eigen(mut a: Vec<Vec<f64>>) -> (Vec<f64>, Vec<Vec<f64>>) {
    let n = a.len();
    let mut v: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    let frobenius: f64 = a.iter().flatten().map(|x| x * x).sum::<f64>().sqrt();
    if frobenius == 0.0 {
        return (vec![0.0; n], v);
    }

    for _ in 0..MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|p| (p + 1..n).map(move |q| (p, q)))
            .map(|(p, q)| a[p][q] * a[p][q])
            .sum::<f64>()
            .sqrt();
        if off <= frobenius * 1e-15 {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[p][q];
                if apq.abs() <= f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for row in a.iter_mut() {
                    let (akp, akq) = (row[p], row[q]);
                    row[p] = c * akp - s * akq;
                    row[q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[p][k], a[q][k]);
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in v.iter_mut() {
                    let (vkp, vkq) = (row[p], row[q]);
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let eigenvalues = (0..n).map(|i| a[i][i]).collect();
    (eigenvalues, v)
}

/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use super::DriverScalar;
use crate::{FailResult, Settings};

use ::densemat_matrix::{Backend, Gemm, Matrix};
use ::rand::Rng;
use ::std::fmt;
use ::std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Timing {
    pub size: usize,
    pub scalar: &'static str,
    pub backend: &'static str,
    pub repeats: u32,
    pub elapsed: Duration,
}

impl Timing {
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs() as f64 + self.elapsed.subsec_nanos() as f64 * 1e-9
    }

    /// One multiply-add per (i, k, j), counted as two operations.
    pub fn gflops(&self) -> f64 {
        let n = self.size as f64;
        2.0 * n * n * n * self.repeats as f64 / self.seconds() / 1e9
    }
}

impl Timing {
    fn header() -> String {
        format!("{:>6} {:>6} {:>10} {:>12} {:>10}", "size", "scalar", "backend", "seconds", "GFLOP/s")
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "{:>6} {:>6} {:>10} {:>12.6} {:>10.3}",
            self.size, self.scalar, self.backend, self.seconds(), self.gflops(),
        )
    }
}

pub(crate) fn run(settings: &Settings) -> FailResult<()> {
    println!("{}", Timing::header());
    for &size in &settings.bench.sizes {
        for timing in time_size(size, settings)? {
            info!("{}x{} {} product ({}): {:.3} GFLOP/s", size, size, timing.scalar, timing.backend, timing.gflops());
            println!("{}", timing);
        }
    }
    Ok(())
}

fn time_size(size: usize, settings: &Settings) -> FailResult<Vec<Timing>> {
    let mut out = vec![];
    out.extend(time_scalar::<f32>(size, settings)?);
    out.extend(time_scalar::<f64>(size, settings)?);
    out.extend(time_scalar::<u32>(size, settings)?);
    out.extend(time_scalar::<u64>(size, settings)?);
    Ok(out)
}

fn time_scalar<T: DriverScalar>(size: usize, settings: &Settings) -> FailResult<Vec<Timing>> {
    let mut rng = ::rand::thread_rng();
    let mut random = || -> FailResult<Matrix<T>> {
        let data = (0..size * size)
            .map(|_| T::from_f64(rng.gen_range(0.0, 4.0)).ok_or_else(|| format_err!("bad {}", T::NAME)))
            .collect::<FailResult<Vec<T>>>()?;
        Ok(Matrix::new_values(size, size, &data)?)
    };
    let a = random()?;
    let b = random()?;
    let mut c = Matrix::new(size, size)?;

    let mut backends = vec![Backend::Portable];
    if settings.backend.is_accelerated::<T>() {
        backends.push(settings.backend);
    }

    let mut out = vec![];
    for backend in backends {
        // one untimed product to fault in pages and spin up the pool
        a.dot_matrix_with(&backend, &b, &mut c)?;

        let start = Instant::now();
        for _ in 0..settings.bench.repeats {
            a.dot_matrix_with(&backend, &b, &mut c)?;
        }
        out.push(Timing {
            size,
            scalar: T::NAME,
            backend: Gemm::<T>::name(&backend),
            repeats: settings.bench.repeats,
            elapsed: start.elapsed(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Bench;

    #[test]
    fn gflops() {
        let timing = Timing {
            size: 100,
            scalar: "f64",
            backend: "portable",
            repeats: 2,
            elapsed: Duration::from_millis(4),
        };
        // 2 * 100^3 * 2 flop in 4 ms
        assert!((timing.gflops() - 1.0).abs() < 1e-9);
        assert!(timing.to_string().contains("portable"));
    }

    #[test]
    fn times_every_scalar() {
        let settings = Settings {
            bench: Bench { sizes: vec![3], repeats: 1 },
            ..Settings::default()
        };
        let timings = time_size(3, &settings).unwrap();
        let scalars: Vec<_> = timings.iter().map(|t| t.scalar).collect();
        assert!(scalars.contains(&"f32"));
        assert!(scalars.contains(&"u64"));
        assert!(timings.iter().all(|t| t.size == 3 && t.repeats == 1));
    }
}

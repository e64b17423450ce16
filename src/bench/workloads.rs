// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The built-in CPU workloads: integer arithmetic, floating point, prime
//! search and matrix multiplication.

use std::f64::consts::PI;
use std::hint::black_box;

use anyhow::Result;
use anyhow::ensure;

use crate::bench::Workload;

const LCG_MULTIPLIER: i64 = 1_103_515_245;
const LCG_INCREMENT: i64 = 12_345;
const LCG_MASK: i64 = 0x7fff_ffff;
/// LCG steps chained per parallel iteration.
const LCG_STEPS_PER_ITERATION: u64 = 1_000;

const MATRIX_DIM: usize = 16;
/// One matrix iteration is a full `MATRIX_DIM` x `MATRIX_DIM` product, so
/// the shared iteration count is scaled down by this factor.
const MATRIX_ITERATION_DIVISOR: u64 = 1_000;

/// All built-in workloads, configured for `iterations`.
pub fn all(iterations: u64) -> Vec<Box<dyn Workload>> {
    vec![
        Box::new(IntegerArithmetic::new(iterations)),
        Box::new(FloatingPoint::new(iterations)),
        Box::new(Prime::new(iterations)),
        Box::new(MatrixMultiplication::new(iterations)),
    ]
}

/// Looks up a workload by the short key or full display name used in
/// config files. Matching ignores case.
pub fn find(name: &str, iterations: u64) -> Option<Box<dyn Workload>> {
    let key = name.trim().to_ascii_lowercase();
    match key.as_str() {
        "integer" | "integer arithmetic test" => {
            Some(Box::new(IntegerArithmetic::new(iterations)))
        }
        "float" | "floating point test" => Some(Box::new(FloatingPoint::new(iterations))),
        "prime" | "prime test" => Some(Box::new(Prime::new(iterations))),
        "matrix" | "matrix multiplication test" => {
            Some(Box::new(MatrixMultiplication::new(iterations)))
        }
        _ => None,
    }
}

/// Chained multiply-add-mask steps over 64-bit integers.
pub struct IntegerArithmetic {
    iterations: u64,
}

impl IntegerArithmetic {
    pub fn new(iterations: u64) -> IntegerArithmetic {
        IntegerArithmetic { iterations }
    }
}

fn lcg_step(value: i64) -> i64 {
    value.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT) & LCG_MASK
}

impl Workload for IntegerArithmetic {
    fn name(&self) -> &str {
        "Integer Arithmetic Test"
    }

    fn iterations(&self) -> u64 {
        self.iterations
    }

    fn run(&self) -> Result<()> {
        let mut value: i64 = 1;
        for index in 0..self.iterations {
            value = black_box(lcg_step(value ^ index as i64));
        }
        ensure!(value >= 0, "integer arithmetic escaped its mask");
        Ok(())
    }

    fn run_iteration(&self, index: u64) {
        let mut value = index as i64;
        for _ in 0..LCG_STEPS_PER_ITERATION {
            value = lcg_step(value);
        }
        black_box(value);
    }
}

/// Four passes of floating point stress: plain arithmetic, transcendental
/// functions, magnitude extremes, and compensated summation.
pub struct FloatingPoint {
    iterations: u64,
}

impl FloatingPoint {
    pub fn new(iterations: u64) -> FloatingPoint {
        FloatingPoint { iterations }
    }
}

impl Workload for FloatingPoint {
    fn name(&self) -> &str {
        "Floating Point Test"
    }

    fn iterations(&self) -> u64 {
        self.iterations
    }

    fn run(&self) -> Result<()> {
        let per_pass = (self.iterations / 4).max(1);
        let mut total = 0.0;
        total += basic_arithmetic(per_pass);
        total += transcendental(per_pass);
        total += magnitude_extremes(per_pass);
        total += compensated_summation(per_pass);
        ensure!(
            total.is_finite(),
            "floating point passes produced {total}"
        );
        Ok(())
    }

    fn run_iteration(&self, index: u64) {
        black_box((index as f64 * PI).sqrt());
    }
}

fn basic_arithmetic(iterations: u64) -> f64 {
    let mut acc = 1.0f64;
    for index in 0..iterations {
        let x = index as f64 + 1.0;
        acc = acc * 1.000_000_1 + x / (x + 1.0) - 1.0 / x;
    }
    acc
}

fn transcendental(iterations: u64) -> f64 {
    let mut acc = 0.0f64;
    for index in 0..iterations {
        let x = index as f64 * 0.001 + 1.0;
        acc += x.sqrt() + x.ln() + x.sin();
    }
    acc
}

fn magnitude_extremes(iterations: u64) -> f64 {
    let mut acc = 0.0f64;
    let mut tiny = f64::MIN_POSITIVE;
    let mut huge = f64::MAX / 2.0;
    for _ in 0..iterations {
        tiny = (tiny * 2.0).min(1.0);
        huge = (huge / 2.0).max(1.0);
        acc = (acc + tiny + huge).min(f64::MAX / 4.0);
    }
    acc
}

// Kahan summation across mixed magnitudes.
fn compensated_summation(iterations: u64) -> f64 {
    let mut sum = 0.0f64;
    let mut compensation = 0.0f64;
    for index in 0..iterations {
        let value = if index % 2 == 0 { 1.0e10 } else { 1.0e-10 };
        let y = value - compensation;
        let t = sum + y;
        compensation = (t - sum) - y;
        sum = t;
    }
    sum
}

/// Trial-division prime search over the odd numbers.
pub struct Prime {
    iterations: u64,
}

impl Prime {
    pub fn new(iterations: u64) -> Prime {
        Prime { iterations }
    }
}

fn is_prime(candidate: u64) -> bool {
    if candidate < 2 {
        return false;
    }
    if candidate < 4 {
        return true;
    }
    if candidate % 2 == 0 || candidate % 3 == 0 {
        return false;
    }
    let mut divisor = 5;
    while divisor * divisor <= candidate {
        if candidate % divisor == 0 || candidate % (divisor + 2) == 0 {
            return false;
        }
        divisor += 6;
    }
    true
}

impl Workload for Prime {
    fn name(&self) -> &str {
        "Prime Test"
    }

    fn iterations(&self) -> u64 {
        self.iterations
    }

    fn run(&self) -> Result<()> {
        let mut found = 0u64;
        for candidate in 2..self.iterations.max(3) {
            if is_prime(candidate) {
                found += 1;
            }
        }
        ensure!(found > 0, "no primes found below {}", self.iterations);
        Ok(())
    }

    fn run_iteration(&self, index: u64) {
        // Walk the odd numbers so even indexes are not trivial rejects.
        black_box(is_prime(index * 2 + 1));
    }
}

type Matrix = [[f64; MATRIX_DIM]; MATRIX_DIM];

/// Dense products of seeded square matrices.
pub struct MatrixMultiplication {
    iterations: u64,
}

impl MatrixMultiplication {
    /// The configured iteration count is divided by
    /// [`MATRIX_ITERATION_DIVISOR`] (keeping at least one iteration).
    pub fn new(iterations: u64) -> MatrixMultiplication {
        MatrixMultiplication {
            iterations: (iterations / MATRIX_ITERATION_DIVISOR).max(1),
        }
    }
}

fn seeded(seed: u64) -> Matrix {
    let mut matrix = [[0.0; MATRIX_DIM]; MATRIX_DIM];
    for (i, row) in matrix.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = ((seed as usize + i * MATRIX_DIM + j) % 97) as f64 * 0.25 + 0.5;
        }
    }
    matrix
}

fn multiply(a: &Matrix, b: &Matrix) -> Matrix {
    let mut out = [[0.0; MATRIX_DIM]; MATRIX_DIM];
    for i in 0..MATRIX_DIM {
        for k in 0..MATRIX_DIM {
            let a_ik = a[i][k];
            for j in 0..MATRIX_DIM {
                out[i][j] += a_ik * b[k][j];
            }
        }
    }
    out
}

impl Workload for MatrixMultiplication {
    fn name(&self) -> &str {
        "Matrix Multiplication Test"
    }

    fn iterations(&self) -> u64 {
        self.iterations
    }

    fn run(&self) -> Result<()> {
        let mut checksum = 0.0;
        for index in 0..self.iterations {
            let product = multiply(&seeded(index), &seeded(index + 1));
            checksum += product[0][0];
        }
        ensure!(checksum.is_finite(), "matrix product checksum diverged");
        Ok(())
    }

    fn run_iteration(&self, index: u64) {
        black_box(multiply(&seeded(index), &seeded(index + 1)));
    }
}

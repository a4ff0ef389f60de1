//! Statevector simulation engine.

use num_complex::Complex64;
use std::f64::consts::PI;

use qunroll_ir::{IrError, ParameterExpression, StandardGate};

use crate::error::{SimError, SimResult};
use crate::matrix::{self, Matrix2};

/// A pure state of `n` qubits as `2^n` complex amplitudes.
///
/// Little endian: qubit `k` is bit `k` of the amplitude index.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Create the computational basis state `|index⟩`.
    pub fn basis_state(num_qubits: usize, index: usize) -> Self {
        let mut state = Self::new(num_qubits);
        state.amplitudes[0] = Complex64::new(0.0, 0.0);
        state.amplitudes[index] = Complex64::new(1.0, 0.0);
        state
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The amplitudes, indexed little endian.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Probability of each basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// ⟨self|other⟩.
    pub fn inner(&self, other: &Statevector) -> Complex64 {
        self.amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum()
    }

    /// Check the two states are equal up to a global phase.
    ///
    /// Both states are normalized, so this holds exactly when
    /// `|⟨self|other⟩| = 1`.
    pub fn equiv_up_to_global_phase(&self, other: &Statevector, tolerance: f64) -> bool {
        self.num_qubits == other.num_qubits && (self.inner(other).norm() - 1.0).abs() <= tolerance
    }

    /// Apply a standard gate to the given qubit positions.
    pub fn apply_gate(&mut self, gate: &StandardGate, qubits: &[usize]) -> SimResult<()> {
        if qubits.len() != gate.num_qubits() as usize {
            return Err(SimError::Ir(IrError::QubitCountMismatch {
                gate_name: gate.name().to_string(),
                expected: gate.num_qubits(),
                got: u32::try_from(qubits.len()).unwrap_or(u32::MAX),
            }));
        }
        let angle = |p: &ParameterExpression| {
            p.as_f64().ok_or_else(|| SimError::SymbolicParameter {
                gate: gate.name().to_string(),
                parameter: p.to_string(),
            })
        };

        match gate {
            StandardGate::I => {}
            StandardGate::X => self.apply_matrix(&[], qubits[0], &matrix::x()),
            StandardGate::Y => self.apply_matrix(&[], qubits[0], &matrix::y()),
            StandardGate::Z => self.apply_matrix(&[], qubits[0], &matrix::z()),
            StandardGate::H => self.apply_matrix(&[], qubits[0], &matrix::h()),
            StandardGate::S => self.apply_matrix(&[], qubits[0], &matrix::phase(PI / 2.0)),
            StandardGate::Sdg => self.apply_matrix(&[], qubits[0], &matrix::phase(-PI / 2.0)),
            StandardGate::T => self.apply_matrix(&[], qubits[0], &matrix::phase(PI / 4.0)),
            StandardGate::Tdg => self.apply_matrix(&[], qubits[0], &matrix::phase(-PI / 4.0)),
            StandardGate::SX => self.apply_matrix(&[], qubits[0], &matrix::sx()),
            StandardGate::SXdg => self.apply_matrix(&[], qubits[0], &matrix::sxdg()),
            StandardGate::Rx(theta) => self.apply_matrix(&[], qubits[0], &matrix::rx(angle(theta)?)),
            StandardGate::Ry(theta) => self.apply_matrix(&[], qubits[0], &matrix::ry(angle(theta)?)),
            StandardGate::Rz(phi) => self.apply_matrix(&[], qubits[0], &matrix::rz(angle(phi)?)),
            StandardGate::P(lambda) | StandardGate::U1(lambda) => {
                self.apply_matrix(&[], qubits[0], &matrix::phase(angle(lambda)?));
            }
            StandardGate::U2(phi, lambda) => {
                let m = matrix::u3(PI / 2.0, angle(phi)?, angle(lambda)?);
                self.apply_matrix(&[], qubits[0], &m);
            }
            StandardGate::U3(theta, phi, lambda) => {
                let m = matrix::u3(angle(theta)?, angle(phi)?, angle(lambda)?);
                self.apply_matrix(&[], qubits[0], &m);
            }

            StandardGate::CX => self.apply_matrix(&qubits[..1], qubits[1], &matrix::x()),
            StandardGate::CY => self.apply_matrix(&qubits[..1], qubits[1], &matrix::y()),
            StandardGate::CZ => self.apply_matrix(&qubits[..1], qubits[1], &matrix::z()),
            StandardGate::CH => self.apply_matrix(&qubits[..1], qubits[1], &matrix::h()),
            StandardGate::Swap => self.apply_swap(&[], qubits[0], qubits[1]),
            StandardGate::CRz(lambda) => {
                self.apply_matrix(&qubits[..1], qubits[1], &matrix::rz(angle(lambda)?));
            }
            StandardGate::CU1(lambda) => {
                self.apply_matrix(&qubits[..1], qubits[1], &matrix::phase(angle(lambda)?));
            }
            StandardGate::CU3(theta, phi, lambda) => {
                let m = matrix::u3(angle(theta)?, angle(phi)?, angle(lambda)?);
                self.apply_matrix(&qubits[..1], qubits[1], &m);
            }
            StandardGate::RZZ(theta) => self.apply_rzz(qubits[0], qubits[1], angle(theta)?),

            StandardGate::CCX => self.apply_matrix(&qubits[..2], qubits[2], &matrix::x()),
            StandardGate::CSwap => self.apply_swap(&qubits[..1], qubits[1], qubits[2]),
        }
        Ok(())
    }

    /// Apply `m` to `target` on the subspace where every control is |1⟩.
    pub fn apply_matrix(&mut self, controls: &[usize], target: usize, m: &Matrix2) {
        let ctrl_mask = controls.iter().fold(0usize, |acc, &c| acc | (1 << c));
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if i & ctrl_mask == ctrl_mask && i & tgt_mask == 0 {
                let j = i | tgt_mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    fn apply_swap(&mut self, controls: &[usize], q1: usize, q2: usize) {
        let ctrl_mask = controls.iter().fold(0usize, |acc, &c| acc | (1 << c));
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..self.amplitudes.len() {
            // Visit each |..1..0..⟩ / |..0..1..⟩ pair once, from the q1 = 1 side.
            if i & ctrl_mask == ctrl_mask && i & mask1 != 0 && i & mask2 == 0 {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_rzz(&mut self, q1: usize, q2: usize, theta: f64) {
        let same = Complex64::from_polar(1.0, -theta / 2.0);
        let differ = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            let parity = ((i >> q1) ^ (i >> q2)) & 1;
            *amp *= if parity == 0 { same } else { differ };
        }
    }

    /// Probability that measuring `qubit` yields 1.
    pub fn probability_one(&self, qubit: usize) -> f64 {
        let mask = 1 << qubit;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum()
    }

    /// Project `qubit` onto `outcome` and renormalize.
    ///
    /// Returns the probability of the outcome. A zero-probability outcome
    /// leaves the zero vector.
    pub fn collapse(&mut self, qubit: usize, outcome: bool) -> f64 {
        let mask = 1 << qubit;
        let mut probability = 0.0;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & mask != 0) == outcome {
                probability += amp.norm_sqr();
            } else {
                *amp = Complex64::new(0.0, 0.0);
            }
        }
        if probability > 0.0 {
            let scale = 1.0 / probability.sqrt();
            for amp in &mut self.amplitudes {
                *amp *= scale;
            }
        }
        probability
    }
}

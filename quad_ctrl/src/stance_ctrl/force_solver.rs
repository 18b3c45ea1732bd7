//! # Stance force solver
//!
//! Distributes the desired body acceleration over the stance legs as ground
//! reaction forces.
//!
//! The body is treated as a single rigid body. With `f` the stacked forces of
//! the solved legs the achieved acceleration is `M f`, where for leg `i`
//!
//! ```text
//!        | I / m        |
//! M_i =  |              |   (6 x 3)
//!        | I_b^-1 [r_i]x|
//! ```
//!
//! The forces minimise
//!
//! ```text
//! (M f - t)^T W (M f - t) + reg * sum_i |f_i - ratio_i m g n|^2
//! ```
//!
//! subject to each force lying in its friction cone and below the maximum
//! normal force. The problem is solved with Clarabel. Targets which `M` can't
//! reach are first moved onto the reachable set by changing only their
//! angular part where possible, so the axes the contacts can't act on get no
//! correction.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettings, DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus,
    SupportedConeT::{self, NonnegativeConeT, SecondOrderConeT},
};
use log::trace;
use nalgebra::{DMatrix, DVector, Matrix3, UnitQuaternion, Vector3, Vector6};
use serde::Serialize;

use super::{BodyAccelerationTarget, LoadRatio, Params, StanceCtrlError, NUM_ACC_AXES};
use quad_if::{plan::GroundEstimate, GRAVITY_MSS, NUM_LEGS};
use util::maths::skew_symmetric;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Eigenvalues of `M M^T` below this fraction of the largest one belong to
/// unreachable acceleration directions.
const NULL_SPACE_REL_TOL: f64 = 1e-10;

/// Smallest eigenvalue of the angular part of the null space basis for which
/// the target is corrected along its angular axes only.
const ANGULAR_CORRECTION_MIN_EIG: f64 = 1e-6;

/// Cone violation above which a solved force is reported as clamped.
const CLAMP_REPORT_TOL_N: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Ground reaction force of each leg, zero for legs which were not solved.
///
/// Units: newtons,
/// Frame: Control
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroundReactionForce {
    pub per_leg: [Vector3<f64>; NUM_LEGS],
}

/// Result of a single solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForceSolution {
    pub forces: GroundReactionForce,

    pub status: SolveStatus,

    /// Number of acceleration axes the contacts can't act on.
    pub degenerate_axes: usize,

    /// The target after removing its unreachable part, `[lin + g, ang]`.
    pub reachable_target: Vector6<f64>,

    /// The acceleration produced by `forces`, `[lin + g, ang]`.
    pub achieved: Vector6<f64>,

    /// Norm of `achieved - reachable_target`.
    pub residual: f64,

    /// True if the solver failed or the residual exceeds its tolerance.
    pub infeasible: bool,

    /// Legs whose solved force had to be moved back inside its cone.
    pub clamped_legs: [bool; NUM_LEGS],
}

/// Outcome of the optimisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolveStatus {
    /// No legs to solve for, all forces are zero.
    NoStance,

    /// The optimisation converged.
    Solved,

    /// The optimisation failed, the fallback forces were used.
    NotConverged,
}

/// Solver for the stance leg ground reaction forces.
#[derive(Debug, Clone)]
pub struct StanceForceSolver {
    mass_kg: f64,
    inertia_inv: Matrix3<f64>,
    acc_weight: Vector6<f64>,
    friction_coeff: f64,
    max_normal_force_n: f64,
    reg_weight: f64,
    infeasible_residual_tol: f64,
    settings: DefaultSettings<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GroundReactionForce {
    pub fn zero() -> Self {
        Self {
            per_leg: [Vector3::zeros(); NUM_LEGS],
        }
    }
}

impl Default for GroundReactionForce {
    fn default() -> Self {
        Self::zero()
    }
}

impl StanceForceSolver {
    pub fn new(params: &Params) -> Result<Self, StanceCtrlError> {
        let inertia_inv = params
            .body_inertia()
            .try_inverse()
            .ok_or_else(|| StanceCtrlError::InvalidParams(
                "body_inertia_kgm2 is not invertible".into()
            ))?;

        let settings = DefaultSettingsBuilder::default()
            .max_iter(params.solver_max_iter)
            .verbose(false)
            .build()
            .map_err(|e| StanceCtrlError::InvalidParams(
                format!("invalid solver settings: {:?}", e)
            ))?;

        Ok(Self {
            mass_kg: params.body_mass_kg,
            inertia_inv,
            acc_weight: Vector6::from_row_slice(&params.acc_weight),
            friction_coeff: params.friction_coeff,
            max_normal_force_n: params.max_normal_force_n,
            reg_weight: params.reg_weight,
            infeasible_residual_tol: params.infeasible_residual_tol,
            settings,
        })
    }

    /// Solve for the ground reaction forces.
    ///
    /// - `target`: desired body acceleration, excluding gravity.
    /// - `ground`: estimated ground plane, defining the friction cones.
    /// - `ratio`: nominal load share of each leg.
    /// - `foot_pos_m`: foot positions relative to the COM in the control
    ///   frame.
    /// - `solve_legs`: legs to solve for. All other legs get zero force.
    pub fn solve(
        &self,
        target: &BodyAccelerationTarget,
        ground: &GroundEstimate,
        ratio: &LoadRatio,
        foot_pos_m: &[Vector3<f64>; NUM_LEGS],
        solve_legs: &[bool; NUM_LEGS],
    ) -> ForceSolution {
        let legs: Vec<usize> = (0..NUM_LEGS).filter(|i| solve_legs[*i]).collect();

        let mut t = target.to_vector();
        t[2] += GRAVITY_MSS;

        if legs.is_empty() {
            return ForceSolution {
                forces: GroundReactionForce::zero(),
                status: SolveStatus::NoStance,
                degenerate_axes: NUM_ACC_AXES,
                reachable_target: Vector6::zeros(),
                achieved: Vector6::zeros(),
                residual: 0.0,
                infeasible: false,
                clamped_legs: [false; NUM_LEGS],
            };
        }

        let normal = ground.normal();
        let tangent_x = ground.attitude_q * Vector3::x();
        let tangent_y = ground.attitude_q * Vector3::y();

        let m_mat = self.acc_map(&legs, foot_pos_m);
        let (reachable_target, degenerate_axes) = project_reachable(&m_mat, &t);

        // Reference forces, the load share of each leg along the ground normal
        let f_ref: Vec<Vector3<f64>> = legs
            .iter()
            .map(|i| normal * (ratio.per_leg[*i] * self.mass_kg * GRAVITY_MSS))
            .collect();

        let solved = self.solve_qp(
            &m_mat,
            &reachable_target,
            &f_ref,
            &normal,
            &tangent_x,
            &tangent_y,
        );

        let status = match solved {
            Some(_) => SolveStatus::Solved,
            None => SolveStatus::NotConverged,
        };

        // Use the solution where there is one, the clamped reference forces
        // otherwise
        let raw: Vec<Vector3<f64>> = match solved {
            Some(x) => (0..legs.len())
                .map(|k| Vector3::new(x[3 * k], x[3 * k + 1], x[3 * k + 2]))
                .collect(),
            None => f_ref,
        };

        let mut forces = GroundReactionForce::zero();
        let mut clamped_legs = [false; NUM_LEGS];
        let mut f_vec = DVector::zeros(3 * legs.len());

        for (k, leg) in legs.iter().enumerate() {
            let (f, clamped) = self.clamp_to_cone(&raw[k], &normal);

            forces.per_leg[*leg] = f;
            clamped_legs[*leg] = clamped;
            f_vec.fixed_rows_mut::<3>(3 * k).copy_from(&f);
        }

        let achieved_dyn = &m_mat * f_vec;
        let achieved = Vector6::from_iterator(achieved_dyn.iter().copied());
        let residual = (achieved - reachable_target).norm();

        let infeasible = status != SolveStatus::Solved
            || !(residual <= self.infeasible_residual_tol);

        trace!(
            "Force solve: status {:?}, {} degenerate axes, residual {:.5}",
            status, degenerate_axes, residual
        );

        ForceSolution {
            forces,
            status,
            degenerate_axes,
            reachable_target,
            achieved,
            residual,
            infeasible,
            clamped_legs,
        }
    }

    /// Friction coefficient used for the cones.
    pub fn friction_coeff(&self) -> f64 {
        self.friction_coeff
    }

    /// Largest normal force allowed on one foot.
    pub fn max_normal_force_n(&self) -> f64 {
        self.max_normal_force_n
    }

    /// Build the acceleration map `M` for the given legs.
    fn acc_map(&self, legs: &[usize], foot_pos_m: &[Vector3<f64>; NUM_LEGS]) -> DMatrix<f64> {
        let mut m_mat = DMatrix::<f64>::zeros(NUM_ACC_AXES, 3 * legs.len());
        let lin = Matrix3::identity() / self.mass_kg;

        for (k, leg) in legs.iter().enumerate() {
            let ang = self.inertia_inv * skew_symmetric(&foot_pos_m[*leg]);

            m_mat.fixed_view_mut::<3, 3>(0, 3 * k).copy_from(&lin);
            m_mat.fixed_view_mut::<3, 3>(3, 3 * k).copy_from(&ang);
        }

        m_mat
    }

    /// Set up and solve the QP, returning the stacked forces if it
    /// converged.
    fn solve_qp(
        &self,
        m_mat: &DMatrix<f64>,
        target: &Vector6<f64>,
        f_ref: &[Vector3<f64>],
        normal: &Vector3<f64>,
        tangent_x: &Vector3<f64>,
        tangent_y: &Vector3<f64>,
    ) -> Option<Vec<f64>> {
        let n = f_ref.len();
        let nv = 3 * n;

        // ---- COST ----

        let w = DMatrix::from_diagonal(&DVector::from_column_slice(self.acc_weight.as_slice()));
        let t = DVector::from_column_slice(target.as_slice());
        let mt_w = m_mat.transpose() * w;

        let p_mat = &mt_w * m_mat + DMatrix::<f64>::identity(nv, nv) * self.reg_weight;

        let mut q_vec = -(&mt_w * t);
        for (k, f) in f_ref.iter().enumerate() {
            for j in 0..3 {
                q_vec[3 * k + j] -= self.reg_weight * f[j];
            }
        }

        // ---- CONSTRAINTS ----

        // Normal force limits first, then one friction cone per leg. For
        // Clarabel `A x + s = b` with `s` in the cone.
        let mut a_mat = DMatrix::<f64>::zeros(4 * n, nv);
        let mut b_vec = DVector::<f64>::zeros(4 * n);

        for k in 0..n {
            a_mat.fixed_view_mut::<1, 3>(k, 3 * k).copy_from(&normal.transpose());
            b_vec[k] = self.max_normal_force_n;

            let row = n + 3 * k;
            a_mat
                .fixed_view_mut::<1, 3>(row, 3 * k)
                .copy_from(&(-self.friction_coeff * normal.transpose()));
            a_mat
                .fixed_view_mut::<1, 3>(row + 1, 3 * k)
                .copy_from(&(-tangent_x.transpose()));
            a_mat
                .fixed_view_mut::<1, 3>(row + 2, 3 * k)
                .copy_from(&(-tangent_y.transpose()));
        }

        let mut cones: Vec<SupportedConeT<f64>> = vec![NonnegativeConeT(n)];
        cones.extend((0..n).map(|_| SecondOrderConeT(3)));

        // ---- SOLVE ----

        let p_csc = dmatrix_to_csc_upper_tri(&p_mat);
        let a_csc = dmatrix_to_csc(&a_mat);
        let q_slice: Vec<f64> = q_vec.iter().copied().collect();
        let b_slice: Vec<f64> = b_vec.iter().copied().collect();

        match DefaultSolver::new(
            &p_csc,
            &q_slice,
            &a_csc,
            &b_slice,
            &cones,
            self.settings.clone()
        ) {
            Ok(mut solver) => {
                solver.solve();
                let sol = &solver.solution;

                let converged = matches!(
                    sol.status,
                    SolverStatus::Solved | SolverStatus::AlmostSolved
                );

                if converged && sol.x.iter().all(|v| v.is_finite()) {
                    Some(sol.x.clone())
                } else {
                    trace!("QP did not converge: {:?}", sol.status);
                    None
                }
            }
            Err(e) => {
                trace!("QP setup failed: {:?}", e);
                None
            }
        }
    }

    /// Move a force inside its friction cone and below the normal force
    /// limit.
    ///
    /// Returns the force and whether it had to be moved by more than the
    /// solver's tolerance.
    fn clamp_to_cone(&self, f: &Vector3<f64>, normal: &Vector3<f64>) -> (Vector3<f64>, bool) {
        let f_n = f.dot(normal);

        if !(f_n > 0.0) {
            return (Vector3::zeros(), f.norm() > CLAMP_REPORT_TOL_N);
        }

        let f_n_clamped = f_n.min(self.max_normal_force_n);
        let lateral = f - normal * f_n;
        let lateral_norm = lateral.norm();
        let lateral_max = self.friction_coeff * f_n_clamped;

        let lateral_clamped = if lateral_norm > lateral_max {
            lateral * (lateral_max / lateral_norm)
        } else {
            lateral
        };

        let out = normal * f_n_clamped + lateral_clamped;

        (out, (out - f).norm() > CLAMP_REPORT_TOL_N)
    }
}

/// Remove the part of the target which `m_mat` can't reach.
///
/// The unreachable directions span the left null space of `M`. Where it can
/// be done the target's angular part alone is changed, so the linear
/// acceleration is kept. Otherwise the target is projected onto the column
/// space of `M`.
///
/// Returns the reachable target and the number of unreachable directions.
fn project_reachable(m_mat: &DMatrix<f64>, t: &Vector6<f64>) -> (Vector6<f64>, usize) {
    let eig = (m_mat * m_mat.transpose()).symmetric_eigen();
    let lambda_max = eig.eigenvalues.max();

    let null_cols: Vec<DVector<f64>> = (0..NUM_ACC_AXES)
        .filter(|i| eig.eigenvalues[*i] < NULL_SPACE_REL_TOL * lambda_max)
        .map(|i| eig.eigenvectors.column(i).into_owned())
        .collect();

    let k = null_cols.len();
    if k == 0 {
        return (*t, 0);
    }

    let u = DMatrix::from_columns(&null_cols);
    let t_dyn = DVector::from_column_slice(t.as_slice());
    let proj = u.transpose() * &t_dyn;

    // Angular only correction, the smallest change of the angular target
    // which zeroes its null space component
    let u_ang = u.rows(3, 3).into_owned();
    let g = u_ang.transpose() * &u_ang;

    if g.clone().symmetric_eigen().eigenvalues.min() > ANGULAR_CORRECTION_MIN_EIG {
        if let Some(g_inv) = g.try_inverse() {
            let delta = -(&u_ang * (g_inv * &proj));
            let mut out = *t;

            for j in 0..3 {
                out[3 + j] += delta[j];
            }

            return (out, k);
        }
    }

    let t_adj = t_dyn - &u * proj;

    (Vector6::from_iterator(t_adj.iter().copied()), k)
}

/// Joint torques which make each leg exert its ground reaction force.
///
/// - `forces`: ground reaction forces in the control frame.
/// - `base_rp_q`: base roll and pitch, rotating base frame vectors into the
///   control frame.
/// - `foot_jacobian`: foot Jacobians in the base frame.
pub fn leg_torques(
    forces: &GroundReactionForce,
    base_rp_q: &UnitQuaternion<f64>,
    foot_jacobian: &[Matrix3<f64>; NUM_LEGS],
) -> [Vector3<f64>; NUM_LEGS] {
    let mut torques = [Vector3::zeros(); NUM_LEGS];

    for i in 0..NUM_LEGS {
        let f_base = base_rp_q.inverse() * forces.per_leg[i];
        torques[i] = foot_jacobian[i].transpose() * (-f_base);
    }

    torques
}

/// Convert a nalgebra `DMatrix<f64>` to a Clarabel `CscMatrix<f64>` (full
/// matrix).
fn dmatrix_to_csc(m: &DMatrix<f64>) -> CscMatrix<f64> {
    let (nrows, ncols) = m.shape();
    let mut colptr = vec![0usize; ncols + 1];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    for j in 0..ncols {
        for i in 0..nrows {
            let v = m[(i, j)];
            if v.abs() > 1e-15 {
                rowval.push(i);
                nzval.push(v);
            }
        }
        colptr[j + 1] = rowval.len();
    }

    CscMatrix::new(nrows, ncols, colptr, rowval, nzval)
}

/// Convert a symmetric nalgebra `DMatrix<f64>` to an upper triangular
/// `CscMatrix<f64>`.
fn dmatrix_to_csc_upper_tri(m: &DMatrix<f64>) -> CscMatrix<f64> {
    let (nrows, ncols) = m.shape();
    let mut colptr = vec![0usize; ncols + 1];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    for j in 0..ncols {
        for i in 0..=j.min(nrows - 1) {
            let v = m[(i, j)];
            if v.abs() > 1e-15 {
                rowval.push(i);
                nzval.push(v);
            }
        }
        colptr[j + 1] = rowval.len();
    }

    CscMatrix::new(nrows, ncols, colptr, rowval, nzval)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

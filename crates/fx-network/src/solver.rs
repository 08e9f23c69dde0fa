//! Linear system assembly and the per-tick solve.

use nalgebra::linalg::Cholesky;
use nalgebra::{DMatrix, DVector};

use crate::error::{NetError, NetResult};
use crate::node::FluidNode;
use fx_core::NodeId;

/// The admittance matrix and source vector links stamp into.
///
/// Sized over the solved (non-ground) nodes; stamps addressed to the
/// ground node or any out-of-range index fall away silently, which is
/// what lets two-port links connect to ground without special cases.
pub struct SystemAssembly {
    n: usize,
    a: DMatrix<f64>,
    w: DVector<f64>,
}

impl SystemAssembly {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            a: DMatrix::zeros(n, n),
            w: DVector::zeros(n),
        }
    }

    /// Zero all terms, resizing if the node count changed.
    pub fn clear(&mut self) {
        self.a.fill(0.0);
        self.w.fill(0.0);
    }

    pub fn resize(&mut self, n: usize) {
        if n != self.n {
            self.n = n;
            self.a = DMatrix::zeros(n, n);
            self.w = DVector::zeros(n);
        } else {
            self.clear();
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn add_admittance(&mut self, i: NodeId, j: NodeId, value: f64) {
        let (i, j) = (i.idx(), j.idx());
        if i < self.n && j < self.n {
            self.a[(i, j)] += value;
        }
    }

    pub fn add_source(&mut self, i: NodeId, value: f64) {
        let i = i.idx();
        if i < self.n {
            self.w[i] += value;
        }
    }

    pub fn admittance(&self, i: usize, j: usize) -> f64 {
        self.a[(i, j)]
    }

    pub fn source(&self, i: usize) -> f64 {
        self.w[i]
    }
}

/// Solve the assembled system and write potentials back to the nodes,
/// then run the network-capacitance pass for every node that requested
/// a measurement this tick.
///
/// The capacitance pass reuses the factorization: the requesting node's
/// source entry is perturbed by its probe flux, the perturbed system is
/// re-solved, and `capacitance = dt·flux/|Δp|` at that node. The full
/// potential-delta row is stored on the node for links that need
/// cross-node sensitivities.
pub fn solve(sys: &SystemAssembly, nodes: &mut [FluidNode], dt: f64) -> NetResult<()> {
    let n = sys.n;
    if n == 0 {
        return Ok(());
    }
    debug_assert!(nodes.len() >= n);

    let chol = Cholesky::new(sys.a.clone()).ok_or(NetError::SingularSystem {
        what: "admittance matrix is not positive definite",
    })?;
    let p = chol.solve(&sys.w);

    for (i, node) in nodes.iter_mut().enumerate().take(n) {
        node.set_potential_kpa(p[i]);
        node.content_mut().set_pressure_kpa(p[i]);
    }

    let mut delta = DVector::zeros(n);
    for i in 0..n {
        let flux = nodes[i].network_capacitance_request();
        if flux > f64::EPSILON {
            let mut w2 = sys.w.clone();
            w2[i] += flux;
            let p2 = chol.solve(&w2);
            for j in 0..n {
                delta[j] = p2[j] - p[j];
            }
            let dp = delta[i].abs();
            let capacitance = if dp > f64::EPSILON {
                dt * flux / dp
            } else {
                0.0
            };
            nodes[i].set_network_capacitance(capacitance);
            nodes[i].store_netcap_delta_potential(delta.as_slice());
            nodes[i].clear_network_capacitance_request();
        } else {
            nodes[i].set_network_capacitance(0.0);
        }
    }
    Ok(())
}

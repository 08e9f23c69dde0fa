//! Shared state between sibling interfaces in one network.

use std::cell::RefCell;
use std::rc::Rc;

use fx_core::NodeId;

/// What one distributed interface publishes to its siblings: which node
/// it sits on and how much capacitance it is currently injecting there
/// in Demand mode.
///
/// Siblings subtract each other's effective contribution from their own
/// advertised capacitance so two interfaces in one network do not count
/// the same (artificial) capacitance twice. Handles are deduplicated on
/// registration, so one list can be broadcast to every link in a
/// network.
#[derive(Debug)]
pub struct InterfaceShare {
    pub node: NodeId,
    /// Capacitance this link adds to its node in Demand mode [kmol/kPa].
    pub supplied_capacitance: f64,
}

pub type ShareHandle = Rc<RefCell<InterfaceShare>>;

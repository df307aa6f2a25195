//! The map trait and shared master/slave bookkeeping.

use std::sync::Arc;

use medsim_mesh::{read_geometry, GeometryKind, SharedGeometry};
use medsim_types::{MedsimError, MedsimResult};
use tracing::warn;

/// A map that writes slave positions from master positions.
///
/// `compute` is setup-time and reports failures; `apply` runs every frame
/// and degrades to a logged no-op instead of failing.
pub trait GeometryMap: Send + Sync {
    /// Human-readable name for diagnostics.
    fn name(&self) -> &'static str;

    /// Builds the map from the rest configuration of both geometries.
    fn compute(&mut self) -> MedsimResult<()>;

    /// Updates slave positions from current master positions.
    ///
    /// No-op when the map is muted or has not been computed.
    fn apply(&mut self);

    /// Whether `apply` currently has an effect.
    fn is_active(&self) -> bool;

    /// Enables or disables `apply`.
    fn set_active(&mut self, active: bool);

    /// Disables the map without discarding the computed state.
    fn mute(&mut self) {
        self.set_active(false);
    }

    /// Re-enables a muted map.
    fn activate(&mut self) {
        self.set_active(true);
    }
}

/// Type-checked master and slave slots.
///
/// An assignment whose geometry kind is not accepted is rejected with a
/// warning and a `GeometryMismatch` error; the slot keeps its prior value.
#[derive(Debug)]
pub struct MapSlots {
    map_name: &'static str,
    master_kind: Option<GeometryKind>,
    slave_kind: Option<GeometryKind>,
    master: Option<SharedGeometry>,
    slave: Option<SharedGeometry>,
}

impl MapSlots {
    /// Creates empty slots. `None` accepts any geometry kind.
    pub fn new(
        map_name: &'static str,
        master_kind: Option<GeometryKind>,
        slave_kind: Option<GeometryKind>,
    ) -> Self {
        Self {
            map_name,
            master_kind,
            slave_kind,
            master: None,
            slave: None,
        }
    }

    pub fn set_master(&mut self, geometry: SharedGeometry) -> MedsimResult<()> {
        check_kind(self.map_name, "master", &geometry, self.master_kind)?;
        self.warn_if_aliased(&geometry, self.slave.as_ref());
        self.master = Some(geometry);
        Ok(())
    }

    pub fn set_slave(&mut self, geometry: SharedGeometry) -> MedsimResult<()> {
        check_kind(self.map_name, "slave", &geometry, self.slave_kind)?;
        self.warn_if_aliased(&geometry, self.master.as_ref());
        self.slave = Some(geometry);
        Ok(())
    }

    pub fn master(&self) -> Option<&SharedGeometry> {
        self.master.as_ref()
    }

    pub fn slave(&self) -> Option<&SharedGeometry> {
        self.slave.as_ref()
    }

    /// Both geometries, or `MapNotReady` naming what is missing.
    pub fn both(&self) -> MedsimResult<(&SharedGeometry, &SharedGeometry)> {
        match (&self.master, &self.slave) {
            (Some(master), Some(slave)) => Ok((master, slave)),
            (None, _) => Err(MedsimError::MapNotReady(format!(
                "{}: master geometry is not set",
                self.map_name
            ))),
            (_, None) => Err(MedsimError::MapNotReady(format!(
                "{}: slave geometry is not set",
                self.map_name
            ))),
        }
    }

    fn warn_if_aliased(&self, geometry: &SharedGeometry, other: Option<&SharedGeometry>) {
        if other.is_some_and(|other| Arc::ptr_eq(other, geometry)) {
            warn!(map = self.map_name, "Master and slave refer to the same geometry");
        }
    }
}

fn check_kind(
    map_name: &'static str,
    role: &'static str,
    geometry: &SharedGeometry,
    expected: Option<GeometryKind>,
) -> MedsimResult<()> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let found = read_geometry(geometry).kind();
    if found != expected {
        warn!(
            map = map_name,
            role,
            expected = expected.name(),
            found = found.name(),
            "Rejected geometry of the wrong kind"
        );
        return Err(MedsimError::GeometryMismatch {
            expected: expected.name(),
            found: found.name(),
        });
    }
    Ok(())
}

//! Observable orientation and thickness.
//!
//! Setters record a change only when the value actually differs. The host drains
//! the queue through [`SpindleState::dispatch`], which routes angle changes and
//! thickness changes to separate observer callbacks.

/// Orientation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Roll,
    Pitch,
    Yaw,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateChange {
    Angle(Axis, f64),
    Thickness(f64),
}

/// Host-side reactions to state changes.
pub trait StateObserver {
    /// Apply as a live transform.
    fn on_angle_changed(&mut self, axis: Axis, value: f64);
    /// Rebuild the disc model.
    fn on_thickness_changed(&mut self, value: f64);
}

/// Application state
#[derive(Debug, Clone, PartialEq)]
pub struct SpindleState {
    roll: f64,
    pitch: f64,
    yaw: f64,
    thickness: f64,
    pending: Vec<StateChange>,
}

impl Default for SpindleState {
    fn default() -> Self {
        Self::new(0.4)
    }
}

impl SpindleState {
    pub fn new(thickness: f64) -> Self {
        Self {
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            thickness,
            pending: Vec::new(),
        }
    }

    pub fn roll(&self) -> f64 {
        self.roll
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    pub fn angle(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Roll => self.roll,
            Axis::Pitch => self.pitch,
            Axis::Yaw => self.yaw,
        }
    }

    pub fn set_angle(&mut self, axis: Axis, value: f64) {
        let slot = match axis {
            Axis::Roll => &mut self.roll,
            Axis::Pitch => &mut self.pitch,
            Axis::Yaw => &mut self.yaw,
        };
        if *slot != value {
            *slot = value;
            self.pending.push(StateChange::Angle(axis, value));
        }
    }

    pub fn set_roll(&mut self, value: f64) {
        self.set_angle(Axis::Roll, value);
    }

    pub fn set_pitch(&mut self, value: f64) {
        self.set_angle(Axis::Pitch, value);
    }

    pub fn set_yaw(&mut self, value: f64) {
        self.set_angle(Axis::Yaw, value);
    }

    pub fn set_thickness(&mut self, value: f64) {
        if self.thickness != value {
            self.thickness = value;
            self.pending.push(StateChange::Thickness(value));
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Take the queued changes in the order they happened.
    pub fn drain_changes(&mut self) -> Vec<StateChange> {
        std::mem::take(&mut self.pending)
    }

    /// Deliver queued changes to `observer`, returning how many were delivered.
    pub fn dispatch(&mut self, observer: &mut impl StateObserver) -> usize {
        let changes = self.drain_changes();
        for change in &changes {
            match *change {
                StateChange::Angle(axis, value) => observer.on_angle_changed(axis, value),
                StateChange::Thickness(value) => observer.on_thickness_changed(value),
            }
        }
        changes.len()
    }
}

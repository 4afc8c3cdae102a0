use tumbler_geometry::Point3;

/// Tumble centre plus the one-shot "next click places the pivot" latch.
#[derive(Clone, Debug)]
pub struct PivotState {
    position: Point3,
    pick_armed: bool,
}

impl Default for PivotState {
    fn default() -> Self {
        Self::new(Point3::new(0.0, 0.0, 0.0))
    }
}

impl PivotState {
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            pick_armed: false,
        }
    }

    pub fn position(&self) -> Point3 {
        self.position
    }

    pub fn set_position(&mut self, position: Point3) {
        self.position = position;
    }

    pub fn arm_pick(&mut self) {
        self.pick_armed = true;
    }

    pub fn is_pick_armed(&self) -> bool {
        self.pick_armed
    }

    pub fn is_pick_active(&self, modifier_down: bool) -> bool {
        self.pick_armed || modifier_down
    }

    pub fn disarm_pick(&mut self) {
        self.pick_armed = false;
    }
}

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKey {
    Alt,
    Ctrl,
    Shift,
    Meta,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn is_held(&self, key: ModifierKey) -> bool {
        match key {
            ModifierKey::Alt => self.alt,
            ModifierKey::Ctrl => self.ctrl,
            ModifierKey::Shift => self.shift,
            ModifierKey::Meta => self.meta,
        }
    }

    pub fn set(&mut self, key: ModifierKey, down: bool) {
        let slot = match key {
            ModifierKey::Alt => &mut self.alt,
            ModifierKey::Ctrl => &mut self.ctrl,
            ModifierKey::Shift => &mut self.shift,
            ModifierKey::Meta => &mut self.meta,
        };
        *slot = down;
    }
}

/// Pointer buttons in DOM order: primary (left), auxiliary (middle),
/// secondary (right).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    Primary,
    Auxiliary,
    Secondary,
}

/// Raw input as delivered by the host's event loop. Coordinates are client
/// pixels with the origin at the top-left of the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown { button: PointerButton, x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { button: PointerButton },
    Wheel { delta: f64 },
    KeyDown { key: ModifierKey },
    KeyUp { key: ModifierKey },
    Resize { width: f64, height: f64 },
}

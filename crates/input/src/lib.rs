//! Input handling: keyboard bindings, the per-tick control snapshot, and edge detection.
//!
//! The simulation never subscribes to key events. Each tick it receives a [`ControlInput`]
//! snapshot and compares it against the previous one with an [`EdgeDetector`].

use std::collections::HashSet;

/// Logical controls the marble responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Forward,
    Backward,
    Leftward,
    Rightward,
    Jump,
}

/// Control flags for one tick. Any subset may be held at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlInput {
    pub forward: bool,
    pub backward: bool,
    pub leftward: bool,
    pub rightward: bool,
    pub jump: bool,
}

impl ControlInput {
    pub fn is_held(&self, control: Control) -> bool {
        match control {
            Control::Forward => self.forward,
            Control::Backward => self.backward,
            Control::Leftward => self.leftward,
            Control::Rightward => self.rightward,
            Control::Jump => self.jump,
        }
    }

    pub fn set(&mut self, control: Control, held: bool) {
        match control {
            Control::Forward => self.forward = held,
            Control::Backward => self.backward = held,
            Control::Leftward => self.leftward = held,
            Control::Rightward => self.rightward = held,
            Control::Jump => self.jump = held,
        }
    }

    /// Builder-style `set(control, true)`.
    pub fn with(mut self, control: Control) -> Self {
        self.set(control, true);
        self
    }
}

/// Rising edges between two consecutive snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputEdges {
    /// Jump went from released to held.
    pub jump: bool,
    /// Some control (direction or jump) went from released to held.
    pub any: bool,
}

/// Remembers the last snapshot so each tick can report what was just pressed.
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    previous: ControlInput,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `current` with the previous tick and remember it.
    pub fn update(&mut self, current: ControlInput) -> InputEdges {
        let prev = self.previous;
        self.previous = current;

        let rose = |now: bool, before: bool| now && !before;
        let jump = rose(current.jump, prev.jump);
        let any = jump
            || rose(current.forward, prev.forward)
            || rose(current.backward, prev.backward)
            || rose(current.leftward, prev.leftward)
            || rose(current.rightward, prev.rightward);

        InputEdges { jump, any }
    }

    /// Forget history, so anything held next tick counts as freshly pressed.
    pub fn reset(&mut self) {
        self.previous = ControlInput::default();
    }
}

/// Key-to-control map. Physical key codes so non-QWERTY layouts keep WASD in place.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: Vec<(Control, Vec<KeyCode>)>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            bindings: vec![
                (Control::Forward, vec![KeyCode::ArrowUp, KeyCode::KeyW]),
                (Control::Backward, vec![KeyCode::ArrowDown, KeyCode::KeyS]),
                (Control::Leftward, vec![KeyCode::ArrowLeft, KeyCode::KeyA]),
                (Control::Rightward, vec![KeyCode::ArrowRight, KeyCode::KeyD]),
                (Control::Jump, vec![KeyCode::Space]),
            ],
        }
    }
}

impl KeyBindings {
    /// Replace the keys bound to `control`.
    pub fn bind(&mut self, control: Control, keys: Vec<KeyCode>) {
        match self.bindings.iter_mut().find(|(c, _)| *c == control) {
            Some((_, existing)) => *existing = keys,
            None => self.bindings.push((control, keys)),
        }
    }

    /// Controls bound to `key`.
    pub fn controls_for(&self, key: KeyCode) -> impl Iterator<Item = Control> + '_ {
        self.bindings
            .iter()
            .filter(move |(_, keys)| keys.contains(&key))
            .map(|(control, _)| *control)
    }

    /// Resolve a set of held keys to a control snapshot.
    pub fn resolve<'a>(&self, held: impl IntoIterator<Item = &'a KeyCode>) -> ControlInput {
        let mut input = ControlInput::default();
        for key in held {
            for control in self.controls_for(*key) {
                input.set(control, true);
            }
        }
        input
    }
}

/// Keyboard state accumulated from window events.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    bindings: KeyBindings,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bindings(bindings: KeyBindings) -> Self {
        Self {
            keys_held: HashSet::new(),
            bindings,
        }
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Drop every held key (focus lost: release events will never arrive).
    pub fn release_all(&mut self) {
        if !self.keys_held.is_empty() {
            log::debug!("Releasing {} held keys", self.keys_held.len());
        }
        self.keys_held.clear();
    }

    /// Snapshot of the bound controls.
    pub fn controls(&self) -> ControlInput {
        self.bindings.resolve(&self.keys_held)
    }
}

// Re-export for convenience
pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_jump_fires_once() {
        let mut edges = EdgeDetector::new();
        let jump = ControlInput::default().with(Control::Jump);
        assert!(edges.update(jump).jump);
        assert!(!edges.update(jump).jump);
        assert!(!edges.update(ControlInput::default()).jump);
        assert!(edges.update(jump).jump);
    }

    #[test]
    fn releasing_is_not_an_edge() {
        let mut edges = EdgeDetector::new();
        edges.update(ControlInput::default().with(Control::Forward));
        let released = edges.update(ControlInput::default());
        assert_eq!(released, InputEdges::default());
    }

    #[test]
    fn adding_a_direction_while_holding_another_is_an_edge() {
        let mut edges = EdgeDetector::new();
        let fwd = ControlInput::default().with(Control::Forward);
        assert!(edges.update(fwd).any);
        assert!(!edges.update(fwd).any);
        let diag = edges.update(fwd.with(Control::Rightward));
        assert!(diag.any);
        assert!(!diag.jump);
    }

    #[test]
    fn reset_rearms_edges() {
        let mut edges = EdgeDetector::new();
        let jump = ControlInput::default().with(Control::Jump);
        edges.update(jump);
        edges.reset();
        assert!(edges.update(jump).jump);
    }

    #[test]
    fn default_bindings_cover_arrows_and_wasd() {
        let mut state = InputState::new();
        state.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        state.process_keyboard(KeyCode::ArrowRight, ElementState::Pressed);
        state.process_keyboard(KeyCode::Space, ElementState::Pressed);
        let controls = state.controls();
        assert!(controls.forward && controls.rightward && controls.jump);
        assert!(!controls.backward && !controls.leftward);

        state.process_keyboard(KeyCode::KeyW, ElementState::Released);
        assert!(!state.controls().forward);

        state.release_all();
        assert_eq!(state.controls(), ControlInput::default());
    }

    #[test]
    fn rebinding_replaces_keys() {
        let mut bindings = KeyBindings::default();
        bindings.bind(Control::Jump, vec![KeyCode::KeyJ]);
        let held = [KeyCode::Space];
        assert!(!bindings.resolve(&held).jump);
        let held = [KeyCode::KeyJ];
        assert!(bindings.resolve(&held).jump);
    }
}

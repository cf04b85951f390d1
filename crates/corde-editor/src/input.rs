//! Input handler — turns a stream of key events into per-frame key states.
//!
//! The terminal layer produces [`KeyEvent`]s (press, repeat, release). The
//! editor instead asks, once per update, *what state is this key in right
//! now*:
//!
//! ```text
//!            press            next frame
//!   Idle ──────────▶ JustPressed ─────────▶ Held
//!    ▲                   │                   │
//!    │          release  │                   │ release
//!    │                   ▼                   │
//!    └──────────── JustReleased ◀────────────┘
//!      next frame
//! ```
//!
//! # Terminals without release events
//!
//! Only terminals speaking the Kitty keyboard protocol with event types
//! report releases. Until the first release arrives, the handler assumes
//! there will be none and synthesizes one: a key pressed in frame N reads
//! as `JustPressed` in N and `JustReleased` in N+1. Once a real release has
//! been seen, keys are held until their release arrives.
//!
//! # One press per frame
//!
//! [`update`](InputHandler::update) consumes at most one press or repeat per
//! frame, so a burst of typed characters is applied in order over
//! successive frames instead of collapsing into one state. A release for
//! the key pressed in the same frame waits for the next frame, so the press
//! is observable. Likewise a press of a key that is `JustReleased` this
//! frame waits, so every press of a repeated key also shows its release.

use std::collections::{HashMap, VecDeque};

use corde_term::input::{KeyCode, KeyEvent, KeyEventKind, Modifiers};
use tracing::trace;

/// Where a key is in its press/release cycle this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyState {
    #[default]
    Idle,
    JustPressed,
    JustReleased,
    Held,
}

/// Per-frame key state tracker.
#[derive(Debug, Default)]
pub struct InputHandler {
    queue: VecDeque<KeyEvent>,
    states: HashMap<KeyCode, KeyState>,
    modifiers: Modifiers,
    shift: bool,
    releases_reported: bool,
}

impl InputHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue events read from the terminal for the coming updates.
    pub fn feed(&mut self, events: impl IntoIterator<Item = KeyEvent>) {
        self.queue.extend(events);
    }

    /// Events still waiting to be consumed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Advance one frame: age the previous frame's states, then consume
    /// queued events.
    pub fn update(&mut self) {
        let releases = self.releases_reported;
        self.states.retain(|_, state| {
            *state = match *state {
                KeyState::JustPressed if releases => KeyState::Held,
                KeyState::JustPressed => KeyState::JustReleased,
                KeyState::Held => KeyState::Held,
                KeyState::JustReleased | KeyState::Idle => KeyState::Idle,
            };
            *state != KeyState::Idle
        });

        let mut pressed: Option<KeyCode> = None;
        while let Some(event) = self.queue.front().copied() {
            let key = normalize(event.code);
            match event.kind {
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    // A key releasing this frame is pressed again next frame.
                    let releasing = self.states.get(&key) == Some(&KeyState::JustReleased);
                    if pressed.is_some() || releasing {
                        break;
                    }
                    pressed = Some(key);
                    self.modifiers = event.modifiers;
                    self.shift = is_shifted(&event);
                    self.states.insert(key, KeyState::JustPressed);
                }
                KeyEventKind::Release => {
                    if pressed == Some(key) {
                        break;
                    }
                    self.releases_reported = true;
                    if let Some(state) = self.states.get_mut(&key) {
                        if matches!(state, KeyState::JustPressed | KeyState::Held) {
                            *state = KeyState::JustReleased;
                        }
                    }
                }
            }
            self.queue.pop_front();
            trace!(?event, "key event consumed");
        }
    }

    /// State of `key` this frame. Letters are matched case-insensitively.
    #[must_use]
    pub fn key_state(&self, key: KeyCode) -> KeyState {
        self.states
            .get(&normalize(key))
            .copied()
            .unwrap_or_default()
    }

    /// `true` while the key is down (just pressed or held).
    #[must_use]
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        matches!(
            self.key_state(key),
            KeyState::JustPressed | KeyState::Held
        )
    }

    /// Every key that is not idle, in no particular order.
    pub fn key_states(&self) -> impl Iterator<Item = (KeyCode, KeyState)> + '_ {
        self.states.iter().map(|(k, s)| (*k, *s))
    }

    /// Modifiers reported with the most recent press.
    #[must_use]
    pub const fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Whether shift was down for the most recent press.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.shift
    }
}

/// The character `key` types, with case following `shift`.
///
/// Tab types `'\t'`. Keys that type nothing (arrows, Enter, control
/// characters) give `None`.
#[must_use]
pub fn printable(key: KeyCode, shift: bool) -> Option<char> {
    match key {
        KeyCode::Char(c) if c.is_control() => None,
        KeyCode::Char(c) if shift => Some(c.to_uppercase().next().unwrap_or(c)),
        KeyCode::Char(c) => Some(c),
        KeyCode::Tab => Some('\t'),
        _ => None,
    }
}

/// Key identity ignores case: with the Kitty protocol a shifted letter's
/// release reports the unshifted codepoint.
fn normalize(key: KeyCode) -> KeyCode {
    match key {
        KeyCode::Char(c) if c.is_uppercase() => {
            KeyCode::Char(c.to_lowercase().next().unwrap_or(c))
        }
        other => other,
    }
}

fn is_shifted(event: &KeyEvent) -> bool {
    event.modifiers.contains(Modifiers::SHIFT)
        || matches!(event.code, KeyCode::Char(c) if c.is_uppercase())
}

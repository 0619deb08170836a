//! Keyboard bindings
//!
//! ←/→ delay time, ↑/↓ feedback, [/] volume, t tap, 2 ×2,
//! s/x dub siren, a/z air, b/n bens, Esc clear delay,
//! Tab selects a control, -/= nudge it, PgDn/PgUp nudge it by ten.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::control::{ControlEvent, Device, ParamId, Trigger};

/// What a key press asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Event(ControlEvent),
    SelectNext,
    SelectPrev,
    Quit,
}

/// Map a key press to an action. `now` stamps tap events.
pub fn key_action(key: KeyEvent, selected: ParamId, now: f64) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let nudge = |id, steps| Some(Action::Event(ControlEvent::Nudged { id, steps }));
    let trigger = |t| Some(Action::Event(ControlEvent::Triggered(t)));

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('q') => Some(Action::Quit),

        KeyCode::Left => nudge(ParamId::DelayTime, -1),
        KeyCode::Right => nudge(ParamId::DelayTime, 1),
        KeyCode::Down => nudge(ParamId::Feedback, -1),
        KeyCode::Up => nudge(ParamId::Feedback, 1),
        KeyCode::Char('[') => nudge(ParamId::Volume, -1),
        KeyCode::Char(']') => nudge(ParamId::Volume, 1),

        KeyCode::Char('t' | 'T') => Some(Action::Event(ControlEvent::TapRegistered { timestamp: now })),
        KeyCode::Char('2') => Some(Action::Event(ControlEvent::DoubleFlipped)),

        KeyCode::Char('s' | 'S') => trigger(Trigger::Toggle(Device::Siren)),
        KeyCode::Char('x' | 'X') => trigger(Trigger::Stop(Device::Siren)),
        KeyCode::Char('a' | 'A') => trigger(Trigger::Toggle(Device::Air)),
        KeyCode::Char('z' | 'Z') => trigger(Trigger::Stop(Device::Air)),
        KeyCode::Char('b' | 'B') => trigger(Trigger::Toggle(Device::Bens)),
        KeyCode::Char('n' | 'N') => trigger(Trigger::Stop(Device::Bens)),
        KeyCode::Esc => trigger(Trigger::ClearDelay),

        KeyCode::Tab => Some(Action::SelectNext),
        KeyCode::BackTab => Some(Action::SelectPrev),
        KeyCode::Char('-') => nudge(selected, -1),
        KeyCode::Char('=' | '+') => nudge(selected, 1),
        KeyCode::PageDown => nudge(selected, -10),
        KeyCode::PageUp => nudge(selected, 10),

        _ => None,
    }
}

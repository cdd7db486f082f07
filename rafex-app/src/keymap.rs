use rafex_core::Key;
use winit::keyboard::KeyCode;

/// The task key for a physical key, if it is one the task can bind.
pub fn task_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::Space => Key::Space,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::KeyA => Key::Char('a'),
        KeyCode::KeyB => Key::Char('b'),
        KeyCode::KeyC => Key::Char('c'),
        KeyCode::KeyD => Key::Char('d'),
        KeyCode::KeyE => Key::Char('e'),
        KeyCode::KeyF => Key::Char('f'),
        KeyCode::KeyG => Key::Char('g'),
        KeyCode::KeyH => Key::Char('h'),
        KeyCode::KeyI => Key::Char('i'),
        KeyCode::KeyJ => Key::Char('j'),
        KeyCode::KeyK => Key::Char('k'),
        KeyCode::KeyL => Key::Char('l'),
        KeyCode::KeyM => Key::Char('m'),
        KeyCode::KeyN => Key::Char('n'),
        KeyCode::KeyO => Key::Char('o'),
        KeyCode::KeyP => Key::Char('p'),
        KeyCode::KeyQ => Key::Char('q'),
        KeyCode::KeyR => Key::Char('r'),
        KeyCode::KeyS => Key::Char('s'),
        KeyCode::KeyT => Key::Char('t'),
        KeyCode::KeyU => Key::Char('u'),
        KeyCode::KeyV => Key::Char('v'),
        KeyCode::KeyW => Key::Char('w'),
        KeyCode::KeyX => Key::Char('x'),
        KeyCode::KeyY => Key::Char('y'),
        KeyCode::KeyZ => Key::Char('z'),
        KeyCode::Digit0 | KeyCode::Numpad0 => Key::Char('0'),
        KeyCode::Digit1 | KeyCode::Numpad1 => Key::Char('1'),
        KeyCode::Digit2 | KeyCode::Numpad2 => Key::Char('2'),
        KeyCode::Digit3 | KeyCode::Numpad3 => Key::Char('3'),
        KeyCode::Digit4 | KeyCode::Numpad4 => Key::Char('4'),
        KeyCode::Digit5 | KeyCode::Numpad5 => Key::Char('5'),
        KeyCode::Digit6 | KeyCode::Numpad6 => Key::Char('6'),
        KeyCode::Digit7 | KeyCode::Numpad7 => Key::Char('7'),
        KeyCode::Digit8 | KeyCode::Numpad8 => Key::Char('8'),
        KeyCode::Digit9 | KeyCode::Numpad9 => Key::Char('9'),
        _ => return None,
    };
    Some(key)
}

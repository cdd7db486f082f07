//! Keyboard listeners: which keys a trial is waiting for, and since when.

use rafex_core::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct ListenerSpec {
    pub valid_keys: Vec<Key>,
    /// Deliver auto-repeat presses while a key is held.
    pub allow_repeat: bool,
    /// Zero point for response times.
    pub armed_at_ns: u64,
}

/// A raw key-down from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPress {
    pub key: Key,
    pub repeat: bool,
    pub timestamp_ns: u64,
}

/// A key-down accepted by a listener.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyResponse {
    pub listener: ListenerHandle,
    pub key: Key,
    /// Milliseconds since the listener was armed.
    pub elapsed_ms: f64,
}

pub trait Keyboard {
    fn listen(&mut self, spec: ListenerSpec) -> ListenerHandle;
    fn cancel(&mut self, handle: ListenerHandle);
}

/// In-process [`Keyboard`]: the host feeds it every key-down and it routes
/// them to the listeners that asked for them.
#[derive(Debug, Default)]
pub struct KeyDispatcher {
    next_id: u64,
    listeners: Vec<(ListenerHandle, ListenerSpec)>,
}

impl KeyDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Responses for `press`, one per interested listener, oldest listener first.
    pub fn dispatch(&self, press: &KeyPress) -> Vec<KeyResponse> {
        self.listeners
            .iter()
            .filter(|(_, spec)| spec.valid_keys.contains(&press.key))
            .filter(|(_, spec)| spec.allow_repeat || !press.repeat)
            .map(|(handle, spec)| KeyResponse {
                listener: *handle,
                key: press.key,
                elapsed_ms: press.timestamp_ns.saturating_sub(spec.armed_at_ns) as f64 / 1e6,
            })
            .collect()
    }

    pub fn is_listening(&self, handle: ListenerHandle) -> bool {
        self.listeners.iter().any(|(h, _)| *h == handle)
    }

    pub fn active_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Keyboard for KeyDispatcher {
    fn listen(&mut self, spec: ListenerSpec) -> ListenerHandle {
        let handle = ListenerHandle(self.next_id);
        self.next_id += 1;
        log::debug!("listener {:?} armed for {:?}", handle, spec.valid_keys);
        self.listeners.push((handle, spec));
        handle
    }

    fn cancel(&mut self, handle: ListenerHandle) {
        let before = self.listeners.len();
        self.listeners.retain(|(h, _)| *h != handle);
        if self.listeners.len() == before {
            log::warn!("cancel of unknown listener {:?}", handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(key: Key, repeat: bool, ms: u64) -> KeyPress {
        KeyPress {
            key,
            repeat,
            timestamp_ns: ms * 1_000_000,
        }
    }

    #[test]
    fn filters_by_key_and_reports_elapsed_time() {
        let mut kb = KeyDispatcher::new();
        let h = kb.listen(ListenerSpec {
            valid_keys: vec![Key::Char('e'), Key::Space],
            allow_repeat: true,
            armed_at_ns: 100_000_000,
        });

        assert!(kb.dispatch(&press(Key::Char('x'), false, 150)).is_empty());
        let responses = kb.dispatch(&press(Key::Space, false, 350));
        assert_eq!(
            responses,
            vec![KeyResponse {
                listener: h,
                key: Key::Space,
                elapsed_ms: 250.0
            }]
        );
    }

    #[test]
    fn repeats_only_when_allowed() {
        let mut kb = KeyDispatcher::new();
        kb.listen(ListenerSpec {
            valid_keys: vec![Key::Char('e')],
            allow_repeat: false,
            armed_at_ns: 0,
        });
        assert_eq!(kb.dispatch(&press(Key::Char('e'), false, 1)).len(), 1);
        assert!(kb.dispatch(&press(Key::Char('e'), true, 2)).is_empty());
    }

    #[test]
    fn cancelled_listeners_receive_nothing() {
        let mut kb = KeyDispatcher::new();
        let h = kb.listen(ListenerSpec {
            valid_keys: vec![Key::Space],
            allow_repeat: true,
            armed_at_ns: 0,
        });
        kb.cancel(h);
        assert!(!kb.is_listening(h));
        assert!(kb.dispatch(&press(Key::Space, false, 5)).is_empty());
        // second cancel is a logged no-op
        kb.cancel(h);
        assert_eq!(kb.active_count(), 0);
    }

    #[test]
    fn handles_are_unique() {
        let mut kb = KeyDispatcher::new();
        let spec = ListenerSpec {
            valid_keys: vec![Key::Space],
            allow_repeat: true,
            armed_at_ns: 0,
        };
        let a = kb.listen(spec.clone());
        kb.cancel(a);
        let b = kb.listen(spec);
        assert_ne!(a, b);
    }
}

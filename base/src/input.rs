
use smallvec::SmallVec;
use winit::event::{ElementState, VirtualKeyCode, WindowEvent};

use crate::utils::frame::FrameAction;

const SIMULTANEOUS_KEY_COUNT: usize = 12;

/// Collects the window events of a single frame.
pub struct EventController {

    pub key: KeyHeap,

    action: FrameAction,
    is_resized: bool,
}

impl Default for EventController {

    fn default() -> EventController {

        EventController {
            key: Default::default(),

            action: FrameAction::Rendering,
            is_resized: false,
        }
    }
}

impl EventController {

    pub(crate) fn record_event(&mut self, event: &WindowEvent) {

        match event {
            | WindowEvent::KeyboardInput { input, .. } => {
                if let Some(code) = input.virtual_keycode {
                    match input.state {
                        | ElementState::Pressed  => self.key.key_press(code),
                        | ElementState::Released => self.key.key_release(code),
                    }
                }
            },
            | WindowEvent::Resized(size) => {
                log::debug!("Window resized to {}x{}.", size.width, size.height);
                self.is_resized = true;
            },
            | WindowEvent::CloseRequested => {
                self.action = FrameAction::Terminal;
            },
            | _ => (),
        }
    }

    /// Return whether the window has been resized since the last call, and clear the flag.
    pub(crate) fn take_resized(&mut self) -> bool {
        std::mem::replace(&mut self.is_resized, false)
    }

    pub(crate) fn tick_frame(&mut self) {

        if self.action != FrameAction::Terminal {
            self.action = FrameAction::Rendering;
        }
    }

    pub(crate) fn current_action(&self) -> FrameAction {
        self.action
    }
}




pub struct KeyHeap {

    keys: SmallVec<[VirtualKeyCode; SIMULTANEOUS_KEY_COUNT]>,
}

impl Default for KeyHeap {

    fn default() -> KeyHeap {
        KeyHeap { keys: SmallVec::new(), }
    }
}

impl KeyHeap {

    fn key_press(&mut self, code: VirtualKeyCode) {

        // if input key has been existed, just ignore it.
        if self.keys.iter().any(|&key_code| key_code == code) {
            return
        }

        // and the key pool has been full, just ignore the input key.
        if self.keys.len() < SIMULTANEOUS_KEY_COUNT {
            self.keys.push(code);
        }
    }

    fn key_release(&mut self, code: VirtualKeyCode) {

        if let Some(index) = self.keys.iter().position(|&key_code| key_code == code) {
            self.keys.swap_remove(index);
        }
    }

    pub fn is_key_pressed(&self, code: VirtualKeyCode) -> bool {

        self.keys.iter().any(|&key_code| key_code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalSize;

    #[test]
    fn pressed_keys_are_tracked_until_release() {
        let mut keys = KeyHeap::default();

        keys.key_press(VirtualKeyCode::Escape);
        keys.key_press(VirtualKeyCode::Escape);
        assert!(keys.is_key_pressed(VirtualKeyCode::Escape));
        assert_eq!(keys.keys.len(), 1);

        keys.key_release(VirtualKeyCode::Escape);
        assert!(!keys.is_key_pressed(VirtualKeyCode::Escape));
    }

    #[test]
    fn key_pool_is_bounded() {
        let mut keys = KeyHeap::default();
        let codes = [
            VirtualKeyCode::A, VirtualKeyCode::B, VirtualKeyCode::C, VirtualKeyCode::D,
            VirtualKeyCode::E, VirtualKeyCode::F, VirtualKeyCode::G, VirtualKeyCode::H,
            VirtualKeyCode::I, VirtualKeyCode::J, VirtualKeyCode::K, VirtualKeyCode::L,
            VirtualKeyCode::M,
        ];
        for &code in codes.iter() {
            keys.key_press(code);
        }

        assert_eq!(keys.keys.len(), SIMULTANEOUS_KEY_COUNT);
        assert!(!keys.is_key_pressed(VirtualKeyCode::M));
    }

    #[test]
    fn resize_only_raises_a_flag() {
        let mut controller = EventController::default();

        controller.record_event(&WindowEvent::Resized(PhysicalSize::new(1024, 768)));
        assert_eq!(controller.current_action(), FrameAction::Rendering);
        assert!(controller.take_resized());
        assert!(!controller.take_resized());
    }

    #[test]
    fn close_request_terminates_and_sticks() {
        let mut controller = EventController::default();

        controller.record_event(&WindowEvent::CloseRequested);
        assert_eq!(controller.current_action(), FrameAction::Terminal);

        controller.tick_frame();
        assert_eq!(controller.current_action(), FrameAction::Terminal);
    }
}

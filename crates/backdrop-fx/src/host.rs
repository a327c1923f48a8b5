//! Mounting, event dispatch and teardown for effects.
//!
//! The host owns every mounted effect together with the resources scoped to
//! it: its frame callback and its event listeners. Effects never register
//! anything themselves; they declare the listeners they need and the host
//! acquires and releases them.

use std::time::Instant;

use backdrop_engine::coords::{Rect, Vec2, Viewport};
use backdrop_engine::input::InputEvent;
use backdrop_engine::render::{RenderCtx, RenderTarget};
use backdrop_engine::time::FrameTime;

use crate::viewport::{ResizeSource, ViewportManager, ViewportMetrics};

/// Event kinds an effect can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    PointerMove,
    Click,
    PointerLeave,
    Resize,
}

/// Steps run when an effect is unmounted, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownStep {
    CancelFrame,
    RemoveListeners,
    CancelAnimations,
    ReleaseGpu,
}

pub const TEARDOWN_ORDER: [TeardownStep; 4] = [
    TeardownStep::CancelFrame,
    TeardownStep::RemoveListeners,
    TeardownStep::CancelAnimations,
    TeardownStep::ReleaseGpu,
];

/// A pointer-reactive background effect.
///
/// Window-space positions are logical pixels; `container` is the host box at
/// the time of the call.
pub trait Effect {
    fn name(&self) -> &'static str;

    /// Listeners acquired on mount and released on teardown.
    fn listeners(&self) -> &'static [ListenerKind];

    /// Called once when mounted, before the first resize.
    fn on_mount(&mut self) {}

    fn on_resize(&mut self, _metrics: &ViewportMetrics) {}

    fn on_pointer_move(&mut self, _window_pos: Vec2, _container: Rect, _now: Instant) {}

    fn on_click(&mut self, _window_pos: Vec2, _container: Rect) {}

    fn on_pointer_leave(&mut self) {}

    /// Advances simulation state by one frame.
    fn update(&mut self, time: &FrameTime, container: Rect);

    /// Draws into `target`. GPU objects are created on first use.
    fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, container: Rect);

    /// Stops in-flight animations and snaps state to rest.
    fn cancel_animations(&mut self) {}

    /// Drops every GPU object. Must tolerate never having created any.
    fn release_gpu(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(u32);

struct Slot {
    id: EffectId,
    effect: Box<dyn Effect>,
    frame_scheduled: bool,
}

#[derive(Default)]
struct ListenerRegistry {
    entries: Vec<(ListenerKind, EffectId)>,
}

impl ListenerRegistry {
    fn acquire(&mut self, id: EffectId, kinds: &[ListenerKind]) {
        for &kind in kinds {
            if !self.contains(kind, id) {
                self.entries.push((kind, id));
            }
        }
    }

    fn release(&mut self, id: EffectId) {
        self.entries.retain(|(_, owner)| *owner != id);
    }

    fn contains(&self, kind: ListenerKind, id: EffectId) -> bool {
        self.entries.iter().any(|&(k, owner)| k == kind && owner == id)
    }

    fn count_for(&self, id: EffectId) -> usize {
        self.entries.iter().filter(|(_, owner)| *owner == id).count()
    }
}

/// Owns mounted effects and routes window events to them.
#[derive(Default)]
pub struct EffectHost {
    viewport: ViewportManager,
    slots: Vec<Slot>,
    listeners: ListenerRegistry,
    next_id: u32,
}

impl EffectHost {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn viewport(&self) -> &ViewportManager {
        &self.viewport
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_mounted(&self, id: EffectId) -> bool {
        self.slots.iter().any(|s| s.id == id)
    }

    pub fn is_frame_scheduled(&self, id: EffectId) -> bool {
        self.slots.iter().any(|s| s.id == id && s.frame_scheduled)
    }

    pub fn listener_count(&self, id: EffectId) -> usize {
        self.listeners.count_for(id)
    }

    /// Mounts `effect`. It receives the current container size right away if
    /// one is known and is drawn from the next frame on.
    pub fn mount(&mut self, effect: Box<dyn Effect>) -> EffectId {
        let id = EffectId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        let mut slot = Slot {
            id,
            effect,
            frame_scheduled: false,
        };
        log::debug!("mounting effect {} ({:?})", slot.effect.name(), id);

        slot.effect.on_mount();
        self.listeners.acquire(id, slot.effect.listeners());
        if let Some(metrics) = self.viewport.current() {
            if self.listeners.contains(ListenerKind::Resize, id) {
                slot.effect.on_resize(&metrics);
            }
        }
        slot.frame_scheduled = true;

        self.slots.push(slot);
        id
    }

    /// Tears down one effect. Returns `false` if `id` was not mounted.
    pub fn unmount(&mut self, id: EffectId) -> bool {
        let Some(index) = self.slots.iter().position(|s| s.id == id) else {
            return false;
        };
        let mut slot = self.slots.remove(index);
        self.teardown(&mut slot);
        true
    }

    /// Tears down every effect, newest first.
    pub fn unmount_all(&mut self) {
        while let Some(mut slot) = self.slots.pop() {
            self.teardown(&mut slot);
        }
    }

    /// Resize notification from the platform.
    pub fn resize(&mut self, logical: Viewport, scale_factor: f32) {
        if let Some(metrics) = self.viewport.observe(logical, scale_factor, ResizeSource::Notification) {
            self.dispatch_resize(&metrics);
        }
    }

    /// Routes one input event to the effects listening for it.
    pub fn dispatch(&mut self, event: &InputEvent, now: Instant) {
        let Some(container) = self.viewport.container() else { return };

        match event {
            InputEvent::PointerMoved(ev) => {
                let pos = Vec2::new(ev.x, ev.y);
                for slot in &mut self.slots {
                    if self.listeners.contains(ListenerKind::PointerMove, slot.id) {
                        slot.effect.on_pointer_move(pos, container, now);
                    }
                }
            }
            InputEvent::PointerButton(ev) if event.is_click() => {
                let pos = Vec2::new(ev.x, ev.y);
                for slot in &mut self.slots {
                    if self.listeners.contains(ListenerKind::Click, slot.id) {
                        slot.effect.on_click(pos, container);
                    }
                }
            }
            InputEvent::PointerLeft => {
                for slot in &mut self.slots {
                    if self.listeners.contains(ListenerKind::PointerLeave, slot.id) {
                        slot.effect.on_pointer_leave();
                    }
                }
            }
            _ => {}
        }
    }

    /// Per-frame step: polls the live window size, then updates every effect
    /// with a scheduled frame callback.
    pub fn frame(&mut self, time: &FrameTime, live: Viewport, scale_factor: f32) {
        if let Some(metrics) = self.viewport.observe(live, scale_factor, ResizeSource::Polling) {
            self.dispatch_resize(&metrics);
        }

        let Some(container) = self.viewport.container() else { return };
        for slot in self.slots.iter_mut().filter(|s| s.frame_scheduled) {
            slot.effect.update(time, container);
        }
    }

    /// Draws every scheduled effect in mount order.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        let Some(container) = self.viewport.container() else { return };
        for slot in self.slots.iter_mut().filter(|s| s.frame_scheduled) {
            slot.effect.render(ctx, target, container);
        }
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn dispatch_resize(&mut self, metrics: &ViewportMetrics) {
        for slot in &mut self.slots {
            if self.listeners.contains(ListenerKind::Resize, slot.id) {
                slot.effect.on_resize(metrics);
            }
        }
    }

    fn teardown(&mut self, slot: &mut Slot) {
        log::debug!("tearing down effect {} ({:?})", slot.effect.name(), slot.id);
        for step in TEARDOWN_ORDER {
            match step {
                TeardownStep::CancelFrame => slot.frame_scheduled = false,
                TeardownStep::RemoveListeners => self.listeners.release(slot.id),
                TeardownStep::CancelAnimations => slot.effect.cancel_animations(),
                TeardownStep::ReleaseGpu => slot.effect.release_gpu(),
            }
            log::trace!("teardown {:?}: {:?}", slot.id, step);
        }
    }
}

impl Drop for EffectHost {
    fn drop(&mut self) {
        self.unmount_all();
    }
}

use std::time::Instant;

use backdrop_engine::coords::Viewport;
use backdrop_engine::core::{App, AppControl, FrameCtx};
use backdrop_engine::input::{InputEvent, Key, KeyState};
use backdrop_engine::paint::Color;
use backdrop_fx::{DotGrid, EffectHost, GridDistortion};
use winit::window::WindowId;

use crate::settings::{Selection, StudioSettings};

/// Demo application: mounts the selected effects full-window.
///
/// Keys: `1` dots, `2` distortion, `3` both, `Space` remount, `Esc` quit.
pub struct Studio {
    settings: StudioSettings,
    selection: Selection,
    host: EffectHost,
}

impl Studio {
    pub fn new(settings: StudioSettings) -> Self {
        let selection = settings.selection;
        let mut studio = Self {
            settings,
            selection,
            host: EffectHost::new(),
        };
        studio.mount(selection);
        studio
    }

    fn mount(&mut self, selection: Selection) {
        self.host.unmount_all();
        self.selection = selection;

        if matches!(selection, Selection::Distortion | Selection::Both) {
            self.host
                .mount(Box::new(GridDistortion::new(self.settings.distortion.clone())));
        }
        if matches!(selection, Selection::Dots | Selection::Both) {
            self.host
                .mount(Box::new(DotGrid::new(self.settings.dot_grid.clone())));
        }
        log::info!("showing {:?} ({} effect(s))", selection, self.host.len());
    }

    fn handle_key(&mut self, key: Key) -> AppControl {
        match key {
            Key::Escape => return AppControl::Exit,
            Key::Digit1 => self.mount(Selection::Dots),
            Key::Digit2 => self.mount(Selection::Distortion),
            Key::Digit3 => self.mount(Selection::Both),
            Key::Space => self.mount(self.selection),
            Key::Unknown(_) => {}
        }
        AppControl::Continue
    }
}

impl App for Studio {
    fn on_input(&mut self, _window_id: WindowId, event: &InputEvent) -> AppControl {
        if let InputEvent::Key {
            key,
            state: KeyState::Pressed,
            repeat: false,
        } = event
        {
            return self.handle_key(*key);
        }

        self.host.dispatch(event, Instant::now());
        AppControl::Continue
    }

    fn on_resize(&mut self, _window_id: WindowId, viewport: Viewport, scale_factor: f32) -> AppControl {
        self.host.resize(viewport, scale_factor);
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.host
            .frame(&ctx.time, ctx.viewport(), ctx.scale_factor());

        let host = &mut self.host;
        ctx.render(Color::from_srgb_u8(0x06, 0x00, 0x10, 0xff), |rctx, target| {
            host.render(rctx, target);
        })
    }

    fn on_close(&mut self, _window_id: WindowId) {
        self.host.unmount_all();
    }
}

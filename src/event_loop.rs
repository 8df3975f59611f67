//! Fixed-rate frame loop and input dispatch.

use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::backend::Backend;
use crate::compositor::Compositor;
use crate::config::ViewerConfig;
use crate::error::Result;
use crate::geometry::{Size, ZoomFactor};
use crate::input::{Action, InputEvent, WheelDirection};
use crate::viewport::Viewport;

/// Outcome of dispatching one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Continue,
    /// The window should be resized to this size.
    Resize(Size),
    Quit,
}

/// Translates input into viewport transitions.
///
/// Mirrors the viewport zoom so wheel steps and pointer replays know the
/// current level; every viewport action that drops zoom also resets it here.
#[derive(Debug)]
pub struct Dispatcher {
    zoom: ZoomFactor,
    max_zoom: ZoomFactor,
    pointer: (f64, f64),
}

impl Dispatcher {
    pub fn new(max_zoom: ZoomFactor) -> Self {
        Self {
            zoom: ZoomFactor::ONE,
            max_zoom,
            pointer: (0.0, 0.0),
        }
    }

    pub fn zoom(&self) -> ZoomFactor {
        self.zoom
    }

    pub fn dispatch(&mut self, viewport: &mut Viewport, event: InputEvent) -> Dispatch {
        match event {
            InputEvent::Quit => return Dispatch::Quit,
            InputEvent::Resized(size) => {
                viewport.set_dimensions(size);
                self.zoom = ZoomFactor::ONE;
            }
            InputEvent::Wheel(direction) => {
                self.zoom = match direction {
                    WheelDirection::Up => self.zoom.zoomed_in(self.max_zoom),
                    WheelDirection::Down => self.zoom.zoomed_out(),
                };
                let (x, y) = self.pointer;
                viewport.set_zoomed_area(x, y, self.zoom);
            }
            InputEvent::KeyPressed(key) => match Action::for_key(key) {
                Some(Action::ToggleFlip) => {
                    viewport.set_flipping_mode(viewport.flip_mode().next());
                    self.zoom = ZoomFactor::ONE;
                }
                Some(Action::ScaleToFit) => {
                    let fitted = viewport.scale_image();
                    self.zoom = ZoomFactor::ONE;
                    return Dispatch::Resize(fitted);
                }
                Some(Action::Quit) => return Dispatch::Quit,
                None => trace!(?key, "unbound key"),
            },
            InputEvent::PointerMoved { x, y } => {
                self.pointer = (x, y);
                if self.zoom > ZoomFactor::ONE {
                    viewport.pan(x, y, self.zoom);
                }
            }
        }
        Dispatch::Continue
    }
}

/// Fixed frame period; tells the loop how long to sleep after a frame.
#[derive(Debug, Clone, Copy)]
pub struct FramePacer {
    period: Duration,
}

impl FramePacer {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left in the frame that started at `frame_start`, or `None` when
    /// the frame already used its whole period. Overruns are not made up.
    pub fn remaining(&self, frame_start: Instant, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(frame_start);
        self.period
            .checked_sub(elapsed)
            .filter(|rest| !rest.is_zero())
    }
}

/// Runs until a quit event or the quit key. Drains input, draws once, then
/// sleeps out the rest of the frame.
pub fn run<B: Backend>(backend: &mut B, viewport: &mut Viewport, config: &ViewerConfig) -> Result<()> {
    let mut dispatcher = Dispatcher::new(config.max_zoom);
    let pacer = FramePacer::new(config.frame_period);
    let mut compositor = Compositor::new();
    info!(
        max_zoom = %config.max_zoom,
        frame_period = ?pacer.period(),
        "entering event loop"
    );

    loop {
        let frame_start = backend.now();

        while let Some(event) = backend.poll_event() {
            match dispatcher.dispatch(viewport, event) {
                Dispatch::Continue => {}
                Dispatch::Resize(size) => {
                    debug!(%size, "requesting window resize");
                    backend.request_resize(size);
                }
                Dispatch::Quit => {
                    info!("quit requested");
                    return Ok(());
                }
            }
        }

        match viewport.draw_image(&mut compositor) {
            Ok(frame) => {
                if let Err(err) = backend.present(frame) {
                    warn!(error = %err, "failed to present frame");
                }
            }
            Err(err) => warn!(error = %err, "failed to draw frame"),
        }

        match pacer.remaining(frame_start, backend.now()) {
            Some(rest) => backend.sleep(rest),
            None => trace!("frame over budget, skipping sleep"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{FlipMode, Rect};
    use crate::image_source::ImageBuffer;
    use crate::input::KeySymbol;
    use image::{ColorType, RgbaImage};

    fn viewport() -> Viewport {
        let image = ImageBuffer::new(RgbaImage::new(800, 600), ColorType::Rgb8);
        Viewport::new(image, Size::new(800, 600))
    }

    fn max(value: u32) -> ZoomFactor {
        ZoomFactor::new(value).unwrap()
    }

    #[test]
    fn wheel_zoom_stays_within_bounds() {
        let mut vp = viewport();
        let mut dispatcher = Dispatcher::new(max(4));
        for _ in 0..5 {
            dispatcher.dispatch(&mut vp, InputEvent::Wheel(WheelDirection::Up));
        }
        assert_eq!(dispatcher.zoom(), max(4));
        assert_eq!(vp.zoom(), max(4));
        for _ in 0..5 {
            dispatcher.dispatch(&mut vp, InputEvent::Wheel(WheelDirection::Down));
        }
        assert_eq!(dispatcher.zoom(), ZoomFactor::ONE);
        assert_eq!(vp.zoomed_area(), Rect::new(0, 0, 800, 600));
    }

    #[test]
    fn zoom_stays_in_sync_and_bounded_across_mixed_input() {
        use InputEvent::*;
        use WheelDirection::{Down, Up};

        let flip = KeyPressed(KeySymbol::Char('f'));
        let scale = KeyPressed(KeySymbol::Char('s'));
        let other = KeyPressed(KeySymbol::Char('x'));
        let scripts: Vec<(u32, Vec<InputEvent>)> = vec![
            (4, vec![Wheel(Up), Wheel(Down), Wheel(Up), Wheel(Up), Wheel(Up), Wheel(Down), Wheel(Up)]),
            (
                8,
                vec![
                    PointerMoved { x: 700.0, y: 50.0 },
                    Wheel(Up),
                    Wheel(Up),
                    flip,
                    Wheel(Down),
                    Wheel(Up),
                    PointerMoved { x: 10.0, y: 590.0 },
                    Wheel(Up),
                    Wheel(Up),
                    Wheel(Up),
                    Wheel(Up),
                ],
            ),
            (
                16,
                vec![
                    Wheel(Up),
                    Wheel(Up),
                    Resized(Size::new(1024, 300)),
                    Wheel(Down),
                    Wheel(Up),
                    PointerMoved { x: 1000.0, y: 299.0 },
                    scale,
                    Wheel(Up),
                    other,
                    Resized(Size::new(0, 0)),
                    Wheel(Up),
                    Wheel(Up),
                ],
            ),
            (1, vec![Wheel(Up), Wheel(Up), flip, Wheel(Down), Wheel(Up)]),
        ];

        for (cap, script) in scripts {
            let max = max(cap);
            let mut vp = viewport();
            let mut dispatcher = Dispatcher::new(max);
            for (step, event) in script.into_iter().enumerate() {
                dispatcher.dispatch(&mut vp, event);
                let zoom = vp.zoom();
                assert_eq!(dispatcher.zoom(), zoom, "cap {cap}, step {step}: {event:?}");
                assert!(zoom.get().is_power_of_two(), "cap {cap}, step {step}");
                assert!(zoom >= ZoomFactor::ONE && zoom <= max, "cap {cap}, step {step}: {zoom}");
                assert!(vp.zoomed_area().is_within(vp.image().size()));
            }
        }
    }

    #[test]
    fn wheel_uses_last_pointer_position() {
        let mut vp = viewport();
        let mut dispatcher = Dispatcher::new(max(16));
        dispatcher.dispatch(&mut vp, InputEvent::PointerMoved { x: 400.0, y: 300.0 });
        dispatcher.dispatch(&mut vp, InputEvent::Wheel(WheelDirection::Up));
        assert_eq!(vp.zoomed_area(), Rect::new(200, 150, 400, 300));
    }

    #[test]
    fn motion_while_zoomed_replays_every_step() {
        let mut vp = viewport();
        let mut dispatcher = Dispatcher::new(max(16));
        dispatcher.dispatch(&mut vp, InputEvent::PointerMoved { x: 400.0, y: 300.0 });
        dispatcher.dispatch(&mut vp, InputEvent::Wheel(WheelDirection::Up));
        dispatcher.dispatch(&mut vp, InputEvent::Wheel(WheelDirection::Up));
        let zoomed_by_wheel = vp.zoomed_area();

        dispatcher.dispatch(&mut vp, InputEvent::PointerMoved { x: 10.0, y: 10.0 });
        dispatcher.dispatch(&mut vp, InputEvent::PointerMoved { x: 400.0, y: 300.0 });
        assert_eq!(vp.zoom(), max(4));
        assert_eq!(vp.zoomed_area(), zoomed_by_wheel);
    }

    #[test]
    fn motion_while_unzoomed_only_tracks_pointer() {
        let mut vp = viewport();
        let mut dispatcher = Dispatcher::new(max(16));
        dispatcher.dispatch(&mut vp, InputEvent::PointerMoved { x: 5.0, y: 5.0 });
        assert_eq!(vp.zoomed_area(), Rect::new(0, 0, 800, 600));
    }

    #[test]
    fn flip_key_advances_mode_and_resets_zoom() {
        let mut vp = viewport();
        let mut dispatcher = Dispatcher::new(max(16));
        dispatcher.dispatch(&mut vp, InputEvent::Wheel(WheelDirection::Up));
        let flip = InputEvent::KeyPressed(KeySymbol::Char('f'));
        assert_eq!(dispatcher.dispatch(&mut vp, flip), Dispatch::Continue);
        assert_eq!(vp.flip_mode(), FlipMode::Horizontal);
        assert_eq!(dispatcher.zoom(), ZoomFactor::ONE);
        assert_eq!(vp.zoom(), ZoomFactor::ONE);
    }

    #[test]
    fn scale_key_requests_fitted_resize() {
        let mut vp = viewport();
        let mut dispatcher = Dispatcher::new(max(16));
        dispatcher.dispatch(&mut vp, InputEvent::Resized(Size::new(1600, 600)));
        dispatcher.dispatch(&mut vp, InputEvent::Wheel(WheelDirection::Up));
        let outcome = dispatcher.dispatch(&mut vp, InputEvent::KeyPressed(KeySymbol::Char('s')));
        assert_eq!(outcome, Dispatch::Resize(Size::new(800, 600)));
        assert_eq!(dispatcher.zoom(), ZoomFactor::ONE);
    }

    #[test]
    fn quit_sources() {
        let mut vp = viewport();
        let mut dispatcher = Dispatcher::new(max(16));
        assert_eq!(dispatcher.dispatch(&mut vp, InputEvent::Quit), Dispatch::Quit);
        let q = InputEvent::KeyPressed(KeySymbol::Char('q'));
        assert_eq!(dispatcher.dispatch(&mut vp, q), Dispatch::Quit);
        let esc = InputEvent::KeyPressed(KeySymbol::Escape);
        assert_eq!(dispatcher.dispatch(&mut vp, esc), Dispatch::Quit);
    }

    #[test]
    fn pacer_sleeps_only_for_the_remainder() {
        let pacer = FramePacer::new(Duration::from_millis(16));
        let start = Instant::now();
        assert_eq!(
            pacer.remaining(start, start + Duration::from_millis(10)),
            Some(Duration::from_millis(6))
        );
        assert_eq!(pacer.remaining(start, start + Duration::from_millis(16)), None);
        assert_eq!(pacer.remaining(start, start + Duration::from_millis(40)), None);
    }
}

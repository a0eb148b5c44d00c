//! Host event loop: keyboard input, the animation scheduler and repainting.

use crate::anim::{AnimationParams, Scheduler, Sequencer};
use crate::config::SpindleConfig;
use crate::error::Result;
use crate::graphics::FrameBuffer;
use crate::scene::{DiscShape, SceneAssembler};
use crate::state::SpindleState;
use crate::terminal::TerminalSurface;
use crate::texture::DialFace;
use crate::widget::SpindleView;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const THICKNESS_STEP: f64 = 0.05;
const MIN_THICKNESS: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Invoke(&'static str),
    Thicker,
    Thinner,
    ToggleDebug,
    TogglePause,
    Reset,
    Quit,
}

/// Key bindings.
pub fn map_key(key: &KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }
    match key.code {
        KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            's' => Some(Action::Invoke("start")),
            'x' => Some(Action::Invoke("stop")),
            '+' | '=' => Some(Action::Thicker),
            '-' | '_' => Some(Action::Thinner),
            'd' => Some(Action::ToggleDebug),
            'p' => Some(Action::TogglePause),
            'r' => Some(Action::Reset),
            'q' => Some(Action::Quit),
            _ => None,
        },
        _ => None,
    }
}

fn step_thickness(current: f64, delta: f64) -> f64 {
    let next = ((current + delta) * 100.0).round() / 100.0;
    next.max(MIN_THICKNESS)
}

pub struct App {
    state: SpindleState,
    sequencer: Sequencer,
    scheduler: Scheduler,
    view: SpindleView,
    debug: bool,
    paused: bool,
    running: bool,
}

impl App {
    pub fn new(config: &SpindleConfig) -> Result<Self> {
        let thickness = config.geometry.thickness;
        let scene = SceneAssembler::new(
            DiscShape::from(&config.geometry),
            &config.texture,
            Box::new(DialFace::default()),
        );
        let view = SpindleView::new(scene, thickness)?;

        Ok(Self {
            state: SpindleState::new(thickness),
            sequencer: Sequencer::new(AnimationParams::from(&config.animation)),
            scheduler: Scheduler::new(Duration::from_millis(config.animation.tick_interval_ms)),
            view,
            debug: false,
            paused: false,
            running: true,
        })
    }

    pub fn state(&self) -> &SpindleState {
        &self.state
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn view(&self) -> &SpindleView {
        &self.view
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Invoke(command) => {
                self.sequencer.invoke(command);
            }
            Action::Thicker => {
                let t = step_thickness(self.state.thickness(), THICKNESS_STEP);
                self.state.set_thickness(t);
            }
            Action::Thinner => {
                let t = step_thickness(self.state.thickness(), -THICKNESS_STEP);
                self.state.set_thickness(t);
            }
            Action::ToggleDebug => {
                self.debug = !self.debug;
                self.view.request_paint();
            }
            Action::TogglePause => {
                self.paused = !self.paused;
                self.view.request_paint();
            }
            Action::Reset => {
                self.state.set_roll(0.0);
                self.state.set_pitch(0.0);
                self.state.set_yaw(0.0);
            }
            Action::Quit => self.running = false,
        }
        debug!(?action, "key action");
        self.state.dispatch(&mut self.view);
    }

    /// Advance animation by `elapsed` and forward the resulting changes to the view.
    pub fn update(&mut self, elapsed: Duration) -> usize {
        if self.paused {
            return 0;
        }
        let ticks = self
            .scheduler
            .advance(elapsed, &mut self.sequencer, &mut self.state);
        self.state.dispatch(&mut self.view);
        ticks
    }

    fn overlay(&self) -> Vec<String> {
        if !self.debug {
            return Vec::new();
        }
        vec![
            format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            format!(
                "Roll: {:.1}  Pitch: {:.1}  Yaw: {:.1}",
                self.state.roll(),
                self.state.pitch(),
                self.state.yaw()
            ),
            format!(
                "Thickness: {:.2}  Rebuilds: {}",
                self.state.thickness(),
                self.view.rebuilds()
            ),
            format!(
                "Spin: {}  Tilt: {}  Sweep: {:?}",
                self.sequencer.is_rolling(),
                self.sequencer.is_tilting(),
                self.sequencer.sweep()
            ),
            format!("FPS: {:.2}", self.view.fps()),
        ]
    }

    fn status(&self) -> String {
        let mut status =
            String::from(" [s] start  [x] stop  [+/-] thickness  [d] debug  [p] pause  [r] reset  [q] quit");
        if self.paused {
            status.push_str("   PAUSED");
        }
        status
    }

    /// Drive the terminal until the user quits.
    pub fn run(&mut self, surface: &mut TerminalSurface) -> Result<()> {
        let (w, h) = TerminalSurface::frame_size()?;
        let mut frame = FrameBuffer::new(w, h)?;
        info!(width = w, height = h, "starting event loop");

        let mut last = Instant::now();
        while self.running {
            let timeout = self.scheduler.until_next_tick();
            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) => {
                        if let Some(action) = map_key(&key) {
                            self.apply(action);
                        }
                    }
                    Event::Resize(_, _) => {
                        let (w, h) = TerminalSurface::frame_size()?;
                        frame = FrameBuffer::new(w, h)?;
                        self.view.request_paint();
                        debug!(width = w, height = h, "resized");
                    }
                    _ => {}
                }
            }

            let now = Instant::now();
            self.update(now.duration_since(last));
            last = now;

            if self.view.needs_repaint() {
                self.view.paint(&mut frame);
                surface.present(&frame.color, &self.overlay(), &self.status())?;
            }
        }
        info!("event loop finished");
        Ok(())
    }
}

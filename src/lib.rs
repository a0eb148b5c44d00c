//! Rotating 3D spindle disc: procedural geometry, a circularly masked face texture
//! and a two-timer roll/pitch/yaw animation, with a truecolor terminal host.

pub mod anim;
pub mod app;
pub mod config;
pub mod error;
pub mod graphics;
pub mod math;
pub mod mesh;
pub mod scene;
pub mod state;
pub mod terminal;
pub mod texture;
pub mod vertex;
pub mod widget;

pub use anim::{Command, Scheduler, Sequencer, Sweep, TickReport, TiltStep, Transition};
pub use config::SpindleConfig;
pub use error::{ConfigError, Result, SpindleError};
pub use mesh::{disc_cap, ring_side, tick_mark, Mesh};
pub use scene::{build_disc_model, DiscModel, DiscShape, Material, Part, SceneAssembler};
pub use state::{Axis, SpindleState, StateChange, StateObserver};
pub use texture::{render_masked_texture, DialFace, Pixmap, Rgba, Texture, Visual};

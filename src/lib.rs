//! Interactive 3D globe with animated preset camera views.

pub mod config;
pub mod fonts;
pub mod frame;
pub mod i18n;
pub mod mesh;
pub mod renderer;
pub mod rig;
pub mod texture;
pub mod ui;
pub mod view;

// ui.rs — 视角按钮、菜单栏和状态栏

use crate::i18n::{tr, LANGUAGES};
use crate::rig::{CameraRig, OrbitRig};
use crate::view::{ViewController, Viewpoint};
use std::path::PathBuf;
use std::time::Instant;

/// What the user asked for this frame. Applied by the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    RequestView(Viewpoint),
    OpenTexture(PathBuf),
    ToggleFullscreen,
    SetVsync(bool),
    SetLanguage(String),
    Exit,
}

#[derive(Debug)]
pub struct UiState {
    pub show_fps: bool,
    pub vsync_enabled: bool,
    pub is_loading: bool,
    pub is_fullscreen: bool,
    pub current_lang: String,
    pub fps: FpsCounter,
}

impl UiState {
    pub fn new(vsync_enabled: bool, current_lang: String) -> Self {
        Self {
            show_fps: false,
            vsync_enabled,
            is_loading: false,
            is_fullscreen: false,
            current_lang,
            fps: FpsCounter::new(Instant::now()),
        }
    }
}

/// Frames per second, refreshed once a second.
#[derive(Debug)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    pub fps: f32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self { window_start: now, frames: 0, fps: 0.0 }
    }

    pub fn frame(&mut self, now: Instant) {
        self.frames += 1;
        let secs = now.saturating_duration_since(self.window_start).as_secs_f32();
        if secs >= 1.0 {
            self.fps = self.frames as f32 / secs;
            self.frames = 0;
            self.window_start = now;
        }
    }
}

pub fn pick_texture() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter(&tr("file.filter.images"), &crate::texture::IMAGE_EXTENSIONS)
        .pick_file()
}

pub fn draw_ui(ctx: &egui::Context, state: &mut UiState, views: &ViewController<OrbitRig>) -> Vec<UiAction> {
    let mut actions = Vec::new();

    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button(tr("menu.file"), |ui| {
                if ui.button(tr("menu.open_texture")).clicked() {
                    ui.close_menu();
                    if let Some(path) = pick_texture() {
                        actions.push(UiAction::OpenTexture(path));
                    }
                }
                if ui.button(tr("menu.exit")).clicked() {
                    actions.push(UiAction::Exit);
                }
            });

            ui.menu_button(tr("menu.view"), |ui| {
                for v in Viewpoint::ALL {
                    if ui
                        .radio(views.active_viewpoint() == v, tr(v.label_key()))
                        .clicked()
                    {
                        actions.push(UiAction::RequestView(v));
                        ui.close_menu();
                    }
                }

                ui.separator();
                let fullscreen_label = if state.is_fullscreen {
                    tr("view.fullscreen.exit")
                } else {
                    tr("view.fullscreen.enter")
                };
                if ui.button(fullscreen_label).clicked() {
                    actions.push(UiAction::ToggleFullscreen);
                    ui.close_menu();
                }

                ui.separator();
                if ui.checkbox(&mut state.show_fps, tr("view.show_fps")).clicked() {
                    ui.close_menu();
                }
                if ui
                    .checkbox(&mut state.vsync_enabled, tr("view.enable_vsync"))
                    .clicked()
                {
                    actions.push(UiAction::SetVsync(state.vsync_enabled));
                }
            });

            ui.menu_button(tr("menu.language"), |ui| {
                for (code, name) in LANGUAGES {
                    if ui
                        .radio(state.current_lang == code, name)
                        .clicked()
                    {
                        actions.push(UiAction::SetLanguage(code.to_string()));
                        ui.close_menu();
                    }
                }
            });
        });
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if state.is_loading {
                ui.label(egui::RichText::new(tr("status.loading_texture")).color(egui::Color32::YELLOW));
                ui.label("|");
            }

            ui.label(format!(
                "{} {}",
                tr("status.active_view"),
                tr(views.active_viewpoint().label_key())
            ));

            if let Some(rig) = views.rig() {
                ui.label("|");
                let distance = match views.transition() {
                    Some(t) if views.is_animating() => {
                        format!("{:.2} → {:.2}", rig.current_distance(), t.target_distance)
                    }
                    _ => format!("{:.2}", rig.current_distance()),
                };
                ui.label(format!("{} {}", tr("status.distance"), distance));
                ui.label("|");
                ui.label(format!("{} {:.1}°", tr("status.azimuth"), rig.azimuth().to_degrees()));
                ui.label("|");
                ui.label(format!("{} {:.1}°", tr("status.polar"), rig.polar().to_degrees()));
            }

            if state.show_fps {
                ui.label("|");
                ui.label(egui::RichText::new(format!("FPS: {:.1}", state.fps.fps)).color(egui::Color32::GREEN));
            }
        });
    });

    // 相机挂载后才显示视角按钮
    if views.rig().is_some() {
        egui::Window::new("view_buttons")
            .title_bar(false)
            .resizable(false)
            .collapsible(false)
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -12.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    for v in Viewpoint::ALL {
                        let text = format!("{} {}", v.icon(), tr(v.label_key()));
                        if ui
                            .selectable_label(views.active_viewpoint() == v, text)
                            .clicked()
                        {
                            actions.push(UiAction::RequestView(v));
                        }
                    }
                });
            });
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fps_updates_once_per_second() {
        let t0 = Instant::now();
        let mut c = FpsCounter::new(t0);
        for i in 1..=59 {
            c.frame(t0 + Duration::from_millis(i * 16));
        }
        assert_eq!(c.fps, 0.0);
        c.frame(t0 + Duration::from_millis(1000));
        assert!((c.fps - 60.0).abs() < 0.01);
    }

    #[test]
    fn draws_without_attached_rig() {
        let ctx = egui::Context::default();
        let mut state = UiState::new(true, "en".into());
        let views: ViewController<OrbitRig> = ViewController::new();
        let mut actions = Vec::new();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            actions = draw_ui(ctx, &mut state, &views);
        });
        assert!(actions.is_empty());
    }

    #[test]
    fn draws_while_a_view_is_animating() {
        let ctx = egui::Context::default();
        let mut state = UiState::new(true, "en".into());
        let mut views: ViewController<OrbitRig> = ViewController::new();
        views.attach(OrbitRig::new());
        let mut frames = crate::frame::FrameQueue::new();
        views.request_view(Viewpoint::Top, Instant::now(), &mut frames);
        assert!(views.is_animating());

        let mut actions = Vec::new();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            actions = draw_ui(ctx, &mut state, &views);
        });
        assert!(actions.is_empty());
    }
}

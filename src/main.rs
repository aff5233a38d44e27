// main.rs — 窗口、事件循环，以及输入 / 相机 / 渲染器之间的连接

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // Release 模式下隐藏控制台窗口

use anyhow::Context;
use clap::Parser;
use globe_viewer::config::Config;
use globe_viewer::frame::FrameQueue;
use globe_viewer::renderer::Renderer;
use globe_viewer::rig::{CameraRig, OrbitRig};
use globe_viewer::ui::{self, UiAction, UiState};
use globe_viewer::view::{TransitionState, ViewController, Viewpoint};
use globe_viewer::texture::{self, TextureLoader};
use globe_viewer::i18n;

use winit::{
    dpi::{LogicalSize, PhysicalPosition},
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowBuilder},
};

use std::sync::Arc;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    i18n::init(config.lang.clone());

    let event_loop = EventLoop::new();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(i18n::tr("app.title"))
            .with_inner_size(LogicalSize::new(1280, 720))
            .build(&event_loop)
            .context("create window")?,
    );

    // 先显示程序生成的占位地球，真实贴图在后台加载
    let mut renderer = pollster::block_on(Renderer::new(window.clone(), config.vsync()))?;
    renderer.load_texture(texture::placeholder_globe(2048, 1024));

    let mut views: ViewController<OrbitRig> = ViewController::new();
    views.attach(OrbitRig::new());
    let mut frames = FrameQueue::new();

    let mut state = UiState::new(config.vsync(), i18n::current_lang());

    let mut mouse_pressed = false;
    let mut last_mouse_pos: Option<PhysicalPosition<f64>> = None;

    let mut loader = TextureLoader::new();
    if let Some(path) = config.texture.clone() {
        loader.load(path);
    }

    log::info!("{} ready", i18n::tr("app.title"));

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        // 只有最近一次请求的贴图会被应用；失败时保留当前贴图
        if let Some(rgba) = loader.poll() {
            renderer.load_texture(rgba);
        }
        state.is_loading = loader.is_loading();

        match event {
            Event::WindowEvent { event, .. } => {
                // 先让 egui 处理事件
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                    }

                    WindowEvent::KeyboardInput { input, .. } if input.state == ElementState::Pressed => {
                        let action = match input.virtual_keycode {
                            Some(VirtualKeyCode::O) => ui::pick_texture().map(UiAction::OpenTexture),
                            Some(VirtualKeyCode::F11) => Some(UiAction::ToggleFullscreen),
                            Some(VirtualKeyCode::Key1) => Some(UiAction::RequestView(Viewpoint::Front)),
                            Some(VirtualKeyCode::Key2) => Some(UiAction::RequestView(Viewpoint::Top)),
                            Some(VirtualKeyCode::Key3) => Some(UiAction::RequestView(Viewpoint::Bottom)),
                            Some(VirtualKeyCode::Key4) => Some(UiAction::RequestView(Viewpoint::Left)),
                            Some(VirtualKeyCode::Key5) => Some(UiAction::RequestView(Viewpoint::Right)),
                            _ => None,
                        };
                        if let Some(action) = action {
                            apply(action, &window, &mut renderer, &mut views, &mut frames, &mut state, &mut loader, control_flow);
                        }
                    }

                    WindowEvent::MouseInput { state: button_state, button, .. } => {
                        if button == MouseButton::Left {
                            mouse_pressed = button_state == ElementState::Pressed;
                            if !mouse_pressed {
                                last_mouse_pos = None;
                            }
                        }
                    }

                    WindowEvent::CursorMoved { position, .. } => {
                        if mouse_pressed {
                            if let (Some(last), Some(rig)) = (last_mouse_pos, views.rig_mut()) {
                                let dx = (position.x - last.x) as f32;
                                let dy = (position.y - last.y) as f32;
                                rig.rotate(dx, dy, renderer.size.height as f32);
                            }
                            last_mouse_pos = Some(position);
                        }
                    }

                    WindowEvent::MouseWheel { delta, .. } => {
                        let scroll = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y,
                            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 20.0,
                        };
                        if let Some(rig) = views.rig_mut() {
                            rig.zoom(scroll);
                        }
                    }

                    WindowEvent::DroppedFile(path) => {
                        apply(
                            UiAction::OpenTexture(path),
                            &window,
                            &mut renderer,
                            &mut views,
                            &mut frames,
                            &mut state,
                            &mut loader,
                            control_flow,
                        );
                    }

                    _ => {}
                }
            }

            Event::RedrawRequested(_) => {
                let now = Instant::now();
                state.fps.frame(now);

                // 上一帧排队的视角过渡 tick
                if !frames.is_empty() {
                    for token in frames.take_due() {
                        views.tick(token, now, &mut frames);
                    }
                }
                if let Some(rig) = views.rig_mut() {
                    rig.update();
                }
                if let Some(rig) = views.rig() {
                    renderer.update_camera(rig);
                }

                let mut actions = Vec::new();
                let render_result = renderer.render_with_ui(&window, |ctx| {
                    actions = ui::draw_ui(ctx, &mut state, &views);
                });

                for action in actions {
                    apply(action, &window, &mut renderer, &mut views, &mut frames, &mut state, &mut loader, control_flow);
                }

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => *control_flow = ControlFlow::Exit,
                    Err(e) => log::error!(
                        "{}",
                        i18n::tr_with("log.render_error", &[("err", format!("{:?}", e))])
                    ),
                }
            }

            Event::MainEventsCleared => {
                window.request_redraw();
            }

            _ => {}
        }
    })
}

#[allow(clippy::too_many_arguments)]
fn apply(
    action: UiAction,
    window: &Window,
    renderer: &mut Renderer,
    views: &mut ViewController<OrbitRig>,
    frames: &mut FrameQueue,
    state: &mut UiState,
    loader: &mut TextureLoader,
    control_flow: &mut ControlFlow,
) {
    match action {
        UiAction::RequestView(v) => {
            log::info!("switching to {:?}", v);
            views.request_view(v, Instant::now(), frames);
            if let Some(prev) = views.previous_transition() {
                if prev.state() == TransitionState::Superseded {
                    log::debug!("interrupted transition towards {:.2}", prev.target_distance);
                }
            }
        }
        UiAction::OpenTexture(path) => {
            loader.load(path);
            state.is_loading = true;
        }
        UiAction::ToggleFullscreen => {
            state.is_fullscreen = !state.is_fullscreen;
            if state.is_fullscreen {
                window.set_fullscreen(Some(Fullscreen::Borderless(None)));
            } else {
                window.set_fullscreen(None);
            }
        }
        UiAction::SetVsync(on) => {
            state.vsync_enabled = on;
            renderer.set_vsync(on);
        }
        UiAction::SetLanguage(code) => {
            i18n::init(code.clone());
            state.current_lang = code;
            window.set_title(&i18n::tr("app.title"));
        }
        UiAction::Exit => {
            *control_flow = ControlFlow::Exit;
        }
    }
}

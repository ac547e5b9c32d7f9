use std::path::PathBuf;
use std::time;

use cgmath::Point3;
use log::{debug, error, warn};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::{CursorGrabMode, Window, WindowBuilder},
};

use camera::{CameraController, CameraProjection, FlyCamera};
use common::component::PointLight;
use common::object::GameObject;
use input::InputSystem;
use vulkan_renderer::renderer::VulkanRenderer;
use vulkan_renderer::texture::Texture;
use vulkan_renderer_3d::SceneRenderer3D;

use crate::frame_counter::{ExponentialMovingAverage, FPSPrinter, FrameCounter};
use crate::Result;

/// Paths to the diffuse and specular maps shared by every object in the
/// scene.
#[derive(Clone, Debug)]
pub struct MaterialMaps {
    pub diffuse: PathBuf,
    pub specular: PathBuf,
}

#[derive(Default)]
pub struct EngineBuilder {
    app: Option<Box<dyn Application>>,
    wb: Option<WindowBuilder>,
    camera: Option<FlyCamera>,
    material_maps: Option<MaterialMaps>,
}

impl EngineBuilder {
    /// Initializes a new `EngineBuilder` with default values.
    #[inline]
    pub fn new(app: Box<dyn Application>) -> Self {
        let wb = WindowBuilder::new();
        Self {
            app: Some(app),
            wb: Some(wb),
            camera: None,
            material_maps: None,
        }
    }

    #[inline]
    pub fn with_application(mut self, app: Option<Box<dyn Application>>) -> Self {
        self.app = app;
        self
    }

    #[inline]
    pub fn with_window_builder(mut self, wb: Option<WindowBuilder>) -> Self {
        self.wb = wb;
        self
    }

    #[inline]
    pub fn with_camera(mut self, camera: FlyCamera) -> Self {
        self.camera = Some(camera);
        self
    }

    #[inline]
    pub fn with_material_maps(
        mut self,
        diffuse: impl Into<PathBuf>,
        specular: impl Into<PathBuf>,
    ) -> Self {
        self.material_maps = Some(MaterialMaps {
            diffuse: diffuse.into(),
            specular: specular.into(),
        });
        self
    }

    #[inline]
    pub fn build(mut self) -> Result<Engine> {
        let app = self.app.take().ok_or("app is None")?;
        let wb = self.wb.take().ok_or("window builder is None")?;
        let camera = self
            .camera
            .take()
            .unwrap_or_else(|| FlyCamera::new(Point3::new(0.0, 0.0, 3.0)));
        let material_maps = self.material_maps.take().ok_or("material maps are None")?;

        Ok(Engine::new(app, wb, camera, material_maps))
    }
}

pub struct Engine {
    application: Option<Box<dyn Application>>,
    window_builder: Option<WindowBuilder>,
    camera: Option<FlyCamera>,
    material_maps: Option<MaterialMaps>,
}

impl Engine {
    /// Initializes a new `Engine` with provided values.
    #[inline]
    pub fn new(
        app: Box<dyn Application>,
        wb: WindowBuilder,
        camera: FlyCamera,
        material_maps: MaterialMaps,
    ) -> Self {
        Self {
            application: Some(app),
            window_builder: Some(wb),
            camera: Some(camera),
            material_maps: Some(material_maps),
        }
    }

    pub fn run(&mut self) {
        // take ownership of struct attributes
        let mut application = self
            .application
            .take()
            .ok_or("app is None")
            .expect("take app");
        let window_builder = self
            .window_builder
            .take()
            .ok_or("window builder is None")
            .expect("take window builder");
        let camera = self.camera.take().ok_or("camera is None").expect("take camera");
        let material_maps = self
            .material_maps
            .take()
            .ok_or("material maps are None")
            .expect("take material maps");

        // window
        let event_loop = EventLoop::new();
        let window = window_builder
            .build(&event_loop)
            .expect("window builder builds");

        // mouse-look wants raw deltas, so trap and hide the cursor
        grab_cursor(&window);

        // camera system; O/P switches between perspective and isometric
        let mut camera_controller = {
            let PhysicalSize { width, height } = window.inner_size();
            CameraController::new(camera, CameraProjection::new(width, height))
        };

        // input system
        let mut input = InputSystem::new();

        // renderer system
        let mut vulkan_renderer =
            unsafe { VulkanRenderer::new("Engine", &window).expect("create vulkan renderer") };

        // scene renderer with its material textures
        let mut scene_renderer = unsafe {
            let diffuse = load_texture(&vulkan_renderer, &material_maps.diffuse)
                .expect("load diffuse map");
            let specular = load_texture(&vulkan_renderer, &material_maps.specular)
                .expect("load specular map");
            SceneRenderer3D::new(
                vulkan_renderer.device(),
                vulkan_renderer.renderpass(),
                diffuse,
                specular,
            )
            .expect("create scene renderer")
        };

        // frame counter system
        let mut frame_counter = FrameCounter::new();

        // fps printer system
        let mut fps_printer = {
            let moving_average = ExponentialMovingAverage::new().with_alpha(0.95);
            let print_fn = |fps| debug!("fps: {:.2}", fps);
            FPSPrinter::new(moving_average, print_fn).with_throttle_ms(500)
        };

        // scene state
        let mut objects = Vec::new();
        let mut light = PointLight::new(Point3::new(1.2, 1.0, 2.0));
        let start_time = time::Instant::now();

        // run application initialization
        application.on_init(ApplicationContext::new(
            &mut objects,
            &mut light,
            time::Duration::ZERO,
            frame_counter.delta_time(),
        ));

        // run main loop
        event_loop.run(move |event, _, control_flow| {
            *control_flow = ControlFlow::Poll;

            // update input system
            input.on_event(&event);
            // update camera system
            camera_controller.on_event(&event);

            match event {
                // handle close window
                Event::WindowEvent {
                    event: WindowEvent::CloseRequested,
                    ..
                } => *control_flow = ControlFlow::Exit,

                // Escape closes the window, since the cursor is trapped
                Event::WindowEvent {
                    event:
                        WindowEvent::KeyboardInput {
                            input:
                                KeyboardInput {
                                    state: ElementState::Pressed,
                                    virtual_keycode: Some(VirtualKeyCode::Escape),
                                    ..
                                },
                            ..
                        },
                    ..
                } => *control_flow = ControlFlow::Exit,

                // Emitted when new events arrive from the OS to be processed.
                Event::NewEvents(_) => {
                    frame_counter.on_update(time::Instant::now());
                }

                // handle window resize
                Event::WindowEvent {
                    event: WindowEvent::Resized(PhysicalSize { width, height }),
                    ..
                } => vulkan_renderer.resize(width, height),

                // handle shutdown
                Event::LoopDestroyed => unsafe {
                    scene_renderer.destroy(vulkan_renderer.device());
                    vulkan_renderer.destroy();
                },

                // NOTE: the MainEventsCleared event will be emitted when all input events
                //       have been processed and redraw processing is about to begin.
                Event::MainEventsCleared => {
                    let delta_time = frame_counter.delta_time();
                    let elapsed = start_time.elapsed();

                    // print fps
                    fps_printer.on_update(delta_time, frame_counter.fps());

                    // update application state
                    application.on_update(ApplicationContext::new(
                        &mut objects,
                        &mut light,
                        elapsed,
                        delta_time,
                    ));

                    // update camera, then clear the per-frame input accumulators
                    camera_controller.on_update(&input, delta_time);
                    input.reset();

                    // render
                    unsafe {
                        if vulkan_renderer.begin_frame().expect("begin frame succeeds") {
                            if let Err(e) = vulkan_renderer.draw(|_, command_buffer| {
                                scene_renderer
                                    .render(
                                        vulkan_renderer.device(),
                                        command_buffer,
                                        camera_controller.view_matrix(),
                                        camera_controller.projection_matrix(),
                                        camera_controller.position(),
                                        &light,
                                        &objects,
                                    )
                                    .expect("scene renderer render");
                            }) {
                                error!("draw {e:?}");
                            }

                            vulkan_renderer.end_frame().expect("end frame succeeds");
                        }
                    }
                }

                // catch-all
                _ => (),
            }
        });
    }
}

fn grab_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Confined)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
    if let Err(e) = grabbed {
        warn!("cursor grab unavailable: {e:?}");
    }
    window.set_cursor_visible(false);
}

unsafe fn load_texture(renderer: &VulkanRenderer, path: &PathBuf) -> Result<Texture> {
    let decoded =
        image::open(path).map_err(|e| format!("open texture {}: {:?}", path.display(), e))?;
    let rgba = decode_rgba(decoded);
    let texture = Texture::from_rgba8(renderer.device(), renderer.command_pool(), &rgba)
        .map_err(|e| format!("upload texture {}: {:?}", path.display(), e))?;
    Ok(texture)
}

/// The material maps are authored for bottom-left UV origins; Vulkan samples
/// row 0 at v = 0, so flip the rows on load to keep the pictures upright.
fn decode_rgba(decoded: image::DynamicImage) -> image::RgbaImage {
    decoded.flipv().to_rgba8()
}

pub struct ApplicationContext<'a> {
    objects: &'a mut Vec<GameObject>,
    light: &'a mut PointLight,
    elapsed: time::Duration,
    delta_time: time::Duration,
}

impl<'a> ApplicationContext<'a> {
    fn new(
        objects: &'a mut Vec<GameObject>,
        light: &'a mut PointLight,
        elapsed: time::Duration,
        delta_time: time::Duration,
    ) -> Self {
        Self {
            objects,
            light,
            elapsed,
            delta_time,
        }
    }

    /// Time since the previous frame.
    pub fn delta_time(&self) -> time::Duration {
        self.delta_time
    }

    /// Time since the engine started.
    pub fn elapsed(&self) -> time::Duration {
        self.elapsed
    }

    pub fn add_object(&mut self, object: GameObject) {
        self.objects.push(object);
    }

    pub fn objects_mut(&mut self) -> &mut [GameObject] {
        self.objects
    }

    pub fn light_mut(&mut self) -> &mut PointLight {
        self.light
    }
}

pub trait Application {
    fn on_init(&mut self, ctx: ApplicationContext);
    fn on_update(&mut self, ctx: ApplicationContext);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn texture_rows_are_flipped_on_decode() {
        let mut img = RgbaImage::new(1, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, Rgba([0, 0, 255, 255]));

        let rgba = decode_rgba(image::DynamicImage::ImageRgba8(img));
        // the bottom row of the picture must land in row 0
        assert_eq!(rgba.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
        assert_eq!(rgba.get_pixel(0, 1), &Rgba([255, 0, 0, 255]));
    }
}

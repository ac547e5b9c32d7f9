use std::collections::HashMap;

use cgmath::{Deg, Point3, Vector3};
use log::LevelFilter;
use winit::dpi::LogicalSize;
use winit::window::WindowBuilder;

use camera::FlyCamera;
use common::component::Material;
use common::object::GameObject;
use engine::{Application, ApplicationContext, EngineBuilder};

const WINDOW_TITLE: &str = "Camera Demo";
const WINDOW_WIDTH: u32 = 800;
const WINDOW_HEIGHT: u32 = 600;

const DIFFUSE_MAP: &str = "assets/textures/container.png";
const SPECULAR_MAP: &str = "assets/textures/container_specular.png";

/// World positions of the demo cubes.
const CUBE_POSITIONS: [Vector3<f32>; 10] = [
    Vector3::new(0.0, 0.0, 0.0),
    Vector3::new(2.0, 5.0, -15.0),
    Vector3::new(-1.5, -2.2, -2.5),
    Vector3::new(-3.8, -2.0, -12.3),
    Vector3::new(2.4, -0.4, -3.5),
    Vector3::new(-1.7, 3.0, -7.5),
    Vector3::new(1.3, -2.0, -2.5),
    Vector3::new(1.5, 2.0, -2.5),
    Vector3::new(1.5, 0.2, -1.5),
    Vector3::new(-1.3, 1.0, -1.5),
];

/// Axis every cube spins around, deliberately not normalized.
const SPIN_AXIS: Vector3<f32> = Vector3::new(1.0, 0.3, 0.5);

fn main() {
    // initialize logger
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    // setup window
    let window_builder = {
        let logical_window_size: LogicalSize<u32> = (WINDOW_WIDTH, WINDOW_HEIGHT).into();
        WindowBuilder::new()
            .with_title(WINDOW_TITLE)
            .with_inner_size(logical_window_size)
            .with_resizable(true)
    };

    // setup sandbox impl
    let application = Sandbox::default();

    // setup engine
    let mut engine = EngineBuilder::new(Box::new(application))
        .with_window_builder(Some(window_builder))
        .with_camera(FlyCamera::new(Point3::new(0.0, 0.0, 10.0)))
        .with_material_maps(DIFFUSE_MAP, SPECULAR_MAP)
        .build()
        .expect("engine builder builds");

    // start engine
    engine.run()
}

/// Shininess presets, scaled by 128 from the usual 0..1 material tables.
fn material_table() -> HashMap<&'static str, Material> {
    HashMap::from([
        ("tutorial", Material { shininess: 32.0 }),
        ("emerald", Material { shininess: 76.8 }),
        ("pearl", Material { shininess: 11.264 }),
        ("bronze", Material { shininess: 38.4 }),
        ("gold", Material { shininess: 51.2 }),
        ("cyanPlastic", Material { shininess: 32.0 }),
        ("redPlastic", Material { shininess: 32.0 }),
        ("greenRubber", Material { shininess: 10.0 }),
        ("yellowRubber", Material { shininess: 10.0 }),
    ])
}

#[derive(Default)]
struct Sandbox {}

impl Application for Sandbox {
    fn on_init(&mut self, mut ctx: ApplicationContext) {
        let material = material_table()["tutorial"];

        for (i, position) in CUBE_POSITIONS.iter().enumerate() {
            let angle = Deg(20.0 * i as f32);
            ctx.add_object(
                GameObject::new()
                    .with_position(*position)
                    .with_rotation(SPIN_AXIS, angle)
                    .with_material(material),
            );
        }
    }

    fn on_update(&mut self, mut ctx: ApplicationContext) {
        let t = ctx.elapsed().as_secs_f32();

        // spin the cubes, each at its own rate
        for (i, object) in ctx.objects_mut().iter_mut().enumerate() {
            object.transform.rotation_angle = Deg(20.0 * (i + 1) as f32 * t);
        }

        // orbit the light around the scene
        let light = ctx.light_mut();
        light.position = Point3::new(t.sin() * 3.0, 1.0, t.cos() * 2.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_table_carries_the_demo_preset() {
        let table = material_table();
        assert_eq!(table["tutorial"].shininess, 32.0);
        assert_eq!(table["gold"].shininess, 51.2);
        assert_eq!(table.len(), 9);
    }
}

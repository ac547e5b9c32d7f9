pub mod component;
pub mod debug;
pub mod object;

pub use self::component::{Material, PointLight, Transform};
pub use self::object::GameObject;

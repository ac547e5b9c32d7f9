pub mod engine;
mod frame_counter;

use std::{error, result};

pub use self::engine::{Application, ApplicationContext, Engine, EngineBuilder};

type Result<T> = result::Result<T, Box<dyn error::Error>>;

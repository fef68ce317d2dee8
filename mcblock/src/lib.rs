pub mod coords;
pub mod settings;
pub mod world;

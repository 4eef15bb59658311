pub mod config;
pub mod display;
pub mod frame;
pub mod menu;
pub mod platform;
pub mod render;
pub mod signal;

#[cfg(test)]
mod testing;

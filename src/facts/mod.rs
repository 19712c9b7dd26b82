pub mod fallback;
pub mod hosting;

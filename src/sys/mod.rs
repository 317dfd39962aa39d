pub mod desktop;
pub mod exec;
pub mod icon;
pub mod protocol;
pub mod runtime;
pub mod server;
pub mod wm;

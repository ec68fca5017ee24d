pub mod draw;
pub mod gateway;
pub mod gui;
pub mod logging;
pub mod prompts;
pub mod session;
pub mod settings;
pub mod status;

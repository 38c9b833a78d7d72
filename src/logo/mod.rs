//! Logo resolution and display state

pub mod display;
pub mod resolver;

pub use display::{LogoDisplay, LogoView, initials};
pub use resolver::LogoResolver;

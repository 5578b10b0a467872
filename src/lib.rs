//! Client-side behavior layer for the portfolio page: virtual scrollbars
//! synchronised with a smooth-scroll engine, a drag-to-scroll experience
//! panel, and a few small page widgets.
//!
//! Everything outside `frontend` is plain Rust and runs on the host; the
//! `frontend` module binds it to the DOM when compiled for `wasm32`.

pub mod animation;
pub mod collapsible;
pub mod config;
pub mod counter;
pub mod debounce;
pub mod drag;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod marquee;
pub mod panel;
pub mod preloader;
pub mod reveal;
pub mod scroll_top;
pub mod scrollbar;
pub mod source;
pub mod telemetry;
pub mod theme;

#[cfg(target_arch = "wasm32")]
pub mod frontend;

#[cfg(test)]
pub(crate) mod testing;

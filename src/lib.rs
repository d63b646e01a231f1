// src/lib.rs
//! Stagecraft
//!
//! Asset resolution, load-state caching and VR controller selection for
//! interactive 3D scene views. Rendering and the scene-graph itself are left to
//! the host engine.

pub mod assets;
pub mod config;
pub mod error;
pub mod gfx;
pub mod prelude;
pub mod scene;
pub mod stage;

// Re-export main types for convenience
pub use stage::Stage;

/// Install the `env_logger` backend for the `log` facade.
///
/// Defaults to `info`; `RUST_LOG` overrides it. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice() {
        init_logging();
        init_logging();
        log::info!("logger installed");
    }
}

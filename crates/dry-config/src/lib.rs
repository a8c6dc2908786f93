//! Window configuration for dry.
//!
//! The configuration surface is a plain, validated [`WindowConfig`]. It
//! can be built in code with [`WindowConfig::builder`] or loaded from TOML.
//! All fields have defaults, so partial files work.
//!
//! ```rust,no_run
//! use dry_config::WindowConfig;
//!
//! let config = WindowConfig::builder()
//!     .title("Calculator")
//!     .size(640, 480)
//!     .content("<h1>2 + 3</h1>")
//!     .build()
//!     .expect("invalid window config");
//! println!("{}", config.title);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    BridgeConfig, Content, DispatchMode, Size, WindowConfig, WindowConfigBuilder,
};
pub use toml_loader::{load_default, load_from_path};
pub use validation::validate;

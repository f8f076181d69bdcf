//! Config file loading and CLI/file/default resolution.

mod manager;

pub use manager::{
    ArtlConfig, ConfigFile, ConfigManager, DEFAULT_TARGET, EngineConfig, ResolveOptions,
    ResolvedConfig, resolve_config,
};

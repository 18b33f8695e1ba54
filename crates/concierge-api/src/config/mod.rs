pub mod settings;

pub use settings::{
    AssistantsConfig, LimitsConfig, LlmConfig, MemoryConfig, ServerConfig, Settings,
};

// Re-export all items from the submodules
mod options;

pub use options::{
    PluginOptions,
    load_or_default_options,
};

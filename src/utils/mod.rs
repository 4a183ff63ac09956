mod config;
mod format_int;
mod random;

pub use config::{
    get_config, set_gc_load_factor_percent, set_memory_manager_cap_log2,
    set_memory_manager_max_cap_log2, ConfigSnapshot,
};
pub use format_int::NiceInt;
pub use random::random_field;

use std::sync::atomic::{AtomicU32, Ordering};

struct Config {
    memory_manager_cap_log2: AtomicU32,
    memory_manager_max_cap_log2: AtomicU32,
    gc_load_factor_percent: AtomicU32,
}

static CONFIG: Config = Config {
    memory_manager_cap_log2: AtomicU32::new(ConfigSnapshot::DEFAULT.memory_manager_cap_log2),
    memory_manager_max_cap_log2: AtomicU32::new(
        ConfigSnapshot::DEFAULT.memory_manager_max_cap_log2,
    ),
    gc_load_factor_percent: AtomicU32::new(ConfigSnapshot::DEFAULT.gc_load_factor_percent),
};

/// Node store tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfigSnapshot {
    /// initial capacity of the node table
    pub memory_manager_cap_log2: u32,
    /// the capacity doubles after every collection up to this ceiling
    pub memory_manager_max_cap_log2: u32,
    /// collect once the node count passes this share of the capacity
    pub gc_load_factor_percent: u32,
}

impl ConfigSnapshot {
    pub const DEFAULT: Self = Self {
        memory_manager_cap_log2: 16,
        memory_manager_max_cap_log2: 24,
        gc_load_factor_percent: 90,
    };
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub fn get_config() -> ConfigSnapshot {
    ConfigSnapshot {
        memory_manager_cap_log2: CONFIG.memory_manager_cap_log2.load(Ordering::Relaxed),
        memory_manager_max_cap_log2: CONFIG.memory_manager_max_cap_log2.load(Ordering::Relaxed),
        gc_load_factor_percent: CONFIG.gc_load_factor_percent.load(Ordering::Relaxed),
    }
}

pub fn set_memory_manager_cap_log2(cap_log2: u32) {
    CONFIG
        .memory_manager_cap_log2
        .store(cap_log2, Ordering::Relaxed);
}

pub fn set_memory_manager_max_cap_log2(max_cap_log2: u32) {
    CONFIG
        .memory_manager_max_cap_log2
        .store(max_cap_log2, Ordering::Relaxed);
}

pub fn set_gc_load_factor_percent(percent: u32) {
    CONFIG
        .gc_load_factor_percent
        .store(percent, Ordering::Relaxed);
}

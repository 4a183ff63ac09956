//! Hashlife universe for Life-like cellular automata.
//!
//! Patterns live in a hash-consed quadtree: identical subtrees share one
//! node, and each node memoizes its future. The [`Universe`] owns the node
//! store, grows as the pattern expands, and collects unreachable nodes
//! between operations.

mod error;
mod formats;
mod life_naive;
mod quadtree;
mod rule;
mod utils;

pub use error::PatternError;
pub use formats::{
    generate_rle, load_macrocell, parse_comments, parse_life106, parse_pattern, parse_plaintext,
    parse_rle, save_macrocell, Pattern,
};
pub use life_naive::NaiveLife;
pub use quadtree::{
    get_bounds, get_level_from_bounds, make_center, move_field, pow2, Bounds, FieldTree,
    MemoryManager, NodeIdx, QuadTreeNode, Universe, MAX_FIELD_LEVEL, MAX_LEVEL,
};
pub use rule::Rule;
pub use utils::{
    get_config, random_field, set_gc_load_factor_percent, set_memory_manager_cap_log2,
    set_memory_manager_max_cap_log2, ConfigSnapshot, NiceInt,
};

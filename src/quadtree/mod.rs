mod bounds;
mod field;
mod hashlife;
mod memory;
mod node;
mod universe;

pub use bounds::Bounds;
pub use field::{get_bounds, get_level_from_bounds, make_center, move_field, FieldTree};
pub use memory::MemoryManager;
pub use node::{NodeIdx, QuadTreeNode};
pub use universe::Universe;

/// Largest root level the universe may grow to.
pub const MAX_LEVEL: u32 = 100;
/// Largest level a coordinate field may require when it is built.
pub const MAX_FIELD_LEVEL: u32 = 62;

/// `2^n`, saturating at `u64::MAX`.
#[inline]
pub fn pow2(n: u32) -> u64 {
    1u64.checked_shl(n).unwrap_or(u64::MAX)
}

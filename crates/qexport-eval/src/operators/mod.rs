//! Operators applied while evaluating conditions
//!
//! - `comparison`: one answer value against one condition value under an operand
//! - `link`: combination of all pairwise comparisons under `AND`/`OR`/`XOR`

pub mod comparison;
pub mod link;

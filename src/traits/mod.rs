pub mod active_ops;
pub mod dual_ops;

pub mod fs_atomic;
pub mod sandbox;
pub mod text;

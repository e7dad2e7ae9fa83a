pub mod pod;

pub use pod::Pod;

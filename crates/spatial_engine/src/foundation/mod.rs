//! Foundation layer: math types and small helpers shared by every module

pub mod math;

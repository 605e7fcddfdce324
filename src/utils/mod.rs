//! 通用工具模块

pub mod time;

pub use time::*;

//! 工具函数

pub mod domain_name;

//! DNS 解析实现

mod hickory;

pub use hickory::HickoryDnsResolver;

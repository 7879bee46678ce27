//! Infrastructure Layer - XML parsing and persistence gateways

pub mod storage;
pub mod xml;

/*
[INPUT]:  Rate-limit configuration and delegatee sets
[OUTPUT]: Capacity credits and delegation authorizations
[POS]:    Capacity layer - usage-capped signing channel
[UPDATE]: When capacity or delegation semantics change
*/

pub mod manager;

pub use manager::CapacityManager;

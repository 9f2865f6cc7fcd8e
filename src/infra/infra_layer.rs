// The infra module contains implementations of core traits.

#[path = "google/mod.rs"]
pub mod google;

#[path = "storage/mod.rs"]
pub mod storage;

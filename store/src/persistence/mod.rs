pub mod journal;
pub mod snapshot;
pub mod storage;

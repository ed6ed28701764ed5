pub mod notifier;
pub mod storage;
pub mod webhook;

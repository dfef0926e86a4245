//! Realtime core tests, driven through `ChatGateway`

pub mod failure_test;
pub mod ordering_test;
pub mod presence_test;

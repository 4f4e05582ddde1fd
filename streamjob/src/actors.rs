pub mod relay;
pub mod supervisor;
pub mod worker;

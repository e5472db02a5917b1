pub mod attribution;
pub mod identity;
pub mod ltv;
pub mod reengagement;

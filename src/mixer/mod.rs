pub mod apply;
pub mod enumerate;
pub mod policy;
pub mod target;

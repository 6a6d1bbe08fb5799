pub mod availability;
pub mod clinic;
pub mod payroll;
pub mod shift;
pub mod trust;

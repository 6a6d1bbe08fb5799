pub mod availability;
pub mod clinic;
pub mod health;
pub mod payroll;
pub mod shift;
pub mod trust;

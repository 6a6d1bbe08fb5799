mod availability_test;
mod middleware_test;
mod payroll_test;
mod trust_test;

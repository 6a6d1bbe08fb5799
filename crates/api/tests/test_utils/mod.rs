use locumdesk_core::models::auth::{AuthUser, Role};
use locumdesk_db::mock::repositories::{
    MockAvailabilityRepo, MockClinicRepo, MockPayrollRepo, MockShiftRepo, MockTrustRepo,
};

pub const TEST_JWT_SECRET: &str = "test-secret";

pub struct TestContext {
    pub availability_repo: MockAvailabilityRepo,
    pub shift_repo: MockShiftRepo,
    pub clinic_repo: MockClinicRepo,
    pub trust_repo: MockTrustRepo,
    pub payroll_repo: MockPayrollRepo,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            availability_repo: MockAvailabilityRepo::new(),
            shift_repo: MockShiftRepo::new(),
            clinic_repo: MockClinicRepo::new(),
            trust_repo: MockTrustRepo::new(),
            payroll_repo: MockPayrollRepo::new(),
        }
    }
}

pub fn staff_user(staff_id: &str) -> AuthUser {
    AuthUser {
        user_id: "user-1".to_string(),
        clinic_id: String::new(),
        role: Role::Staff,
        staff_id: staff_id.to_string(),
        full_name: "A. Assistant".to_string(),
        phone: "0812345678".to_string(),
        email: "a@example.com".to_string(),
    }
}

pub fn clinic_admin(clinic_id: &str) -> AuthUser {
    AuthUser {
        user_id: "admin-1".to_string(),
        clinic_id: clinic_id.to_string(),
        role: Role::Admin,
        staff_id: String::new(),
        full_name: "Clinic Admin".to_string(),
        phone: "021234567".to_string(),
        email: "admin@example.com".to_string(),
    }
}

//! Application use cases. Orchestrate domain logic via ports.

pub mod class_service;
pub mod registration_service;
pub mod settings_service;

pub use class_service::ClassService;
pub use registration_service::{
    ClassDetails, DashboardSummary, RegistrationService, StudentRegistrations,
};
pub use settings_service::SettingsService;

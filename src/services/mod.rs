//! 服务模块

pub mod activity_service;
pub mod clinic_service;
pub mod llm;
pub mod narrator;
pub mod profile_service;

pub use activity_service::{
    AccountDeletion, ActivityService, CheckInOutcome, Dashboard, create_activity_service,
};
pub use clinic_service::{
    ClinicOverview, ClinicService, FatigueAlert, PatientDetail, PatientSummary,
    create_clinic_service,
};
pub use llm::{ChatMessage, ChatRequest, LlmClient, create_llm_client};
pub use narrator::{CheckInAnswers, DailyContent, MoodAnalysis, Narrator};
pub use profile_service::{ProfileService, create_profile_service};

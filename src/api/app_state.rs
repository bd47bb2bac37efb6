use std::sync::Arc;

use crate::config::config::AppConfig;
use crate::security::auth::{Authenticator, CombinedAuthenticator};
use crate::services::llm::LlmClient;
use crate::services::{
    ActivityService, ClinicService, Narrator, ProfileService, create_activity_service,
    create_clinic_service, create_profile_service,
};
use crate::storage::repository::Repositories;

/// Application state containing all shared services and security components
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<AppConfig>,
    /// Storage handles
    pub repositories: Repositories,
    /// Cognitive profile and insight computation
    pub profile_service: Arc<dyn ProfileService>,
    /// Check-ins, game sessions, dashboard and account lifecycle
    pub activity_service: Arc<dyn ActivityService>,
    /// Clinician views over every patient
    pub clinic_service: Arc<dyn ClinicService>,
    /// LLM-backed narrative generation with canned fallbacks
    pub narrator: Arc<Narrator>,
    /// Authenticator for API key and JWT validation
    pub authenticator: Arc<dyn Authenticator>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("app_name", &self.config.app_name)
            .field("repositories", &self.repositories)
            .field("profile_service", &"Arc<dyn ProfileService>")
            .field("activity_service", &"Arc<dyn ActivityService>")
            .field("clinic_service", &"Arc<dyn ClinicService>")
            .field("narrator", &"Arc<Narrator>")
            .field("authenticator", &self.authenticator.authenticator_type())
            .finish()
    }
}

impl AppState {
    /// Wire every service from configuration, storage and an LLM client
    pub fn new(config: AppConfig, repositories: Repositories, llm: Arc<dyn LlmClient>) -> Self {
        let narrator = Arc::new(Narrator::new(llm, &config.llm));
        let profile_service = create_profile_service(
            repositories.clone(),
            narrator.clone(),
            config.engine.clone(),
        );
        let activity_service = create_activity_service(
            repositories.clone(),
            narrator.clone(),
            config.engine.clone(),
        );
        let clinic_service = create_clinic_service(repositories.clone(), profile_service.clone());
        let authenticator: Arc<dyn Authenticator> =
            Arc::new(CombinedAuthenticator::from_config(&config.security));

        Self {
            config: Arc::new(config),
            repositories,
            profile_service,
            activity_service,
            clinic_service,
            narrator,
            authenticator,
        }
    }

    /// Development state: in-memory storage and the given LLM client
    pub fn development(llm: Arc<dyn LlmClient>) -> Self {
        Self::new(AppConfig::development(), Repositories::in_memory(), llm)
    }
}

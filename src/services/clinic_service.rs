//! 临床端服务
//!
//! 管理员查看全体患者的汇总、单个患者详情，以及登记新患者。

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::{CognitiveProfile, DailyLog, GameSession, User};
use crate::security::rbac::Role;
use crate::security::validation::validators;
use crate::services::profile_service::ProfileService;
use crate::storage::repository::{
    DailyLogRepository, GameSessionRepository, Repositories, UserRepository,
};

/// 高疲劳告警阈值（疲劳 1-5，越高越疲惫）
pub const HIGH_FATIGUE_THRESHOLD: u8 = 4;
/// 总览中展示的告警条数
pub const ALERT_LIMIT: usize = 5;
/// 患者详情中展示的签到条数
pub const DETAIL_LOG_LIMIT: usize = 7;
/// 患者详情中展示的游戏条数
pub const DETAIL_SESSION_LIMIT: usize = 20;

/// 高疲劳告警
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FatigueAlert {
    pub user_id: String,
    /// 已登记患者的邮箱
    pub email: Option<String>,
    pub date: NaiveDate,
    pub fatigue: u8,
    pub mood: u8,
}

/// 临床总览
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicOverview {
    pub patient_count: u64,
    pub session_count: u64,
    pub log_count: u64,
    pub fatigue_alerts: Vec<FatigueAlert>,
}

/// 患者列表项
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientSummary {
    #[serde(flatten)]
    pub patient: User,
    pub session_count: u64,
    pub log_count: u64,
}

/// 患者详情
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientDetail {
    pub patient: User,
    pub logs: Vec<DailyLog>,
    pub sessions: Vec<GameSession>,
}

/// 临床服务 trait
#[async_trait]
pub trait ClinicService: Send + Sync {
    async fn overview(&self) -> Result<ClinicOverview>;
    async fn list_patients(&self) -> Result<Vec<PatientSummary>>;
    async fn enrol_patient(&self, email: &str) -> Result<User>;
    async fn patient_detail(&self, patient_id: &str) -> Result<PatientDetail>;
    async fn patient_profile(&self, patient_id: &str) -> Result<CognitiveProfile>;
    async fn patient_insights(&self, patient_id: &str) -> Result<Vec<String>>;
}

/// 临床服务实现
pub struct ClinicServiceImpl {
    repos: Repositories,
    profiles: Arc<dyn ProfileService>,
}

impl ClinicServiceImpl {
    pub fn new(repos: Repositories, profiles: Arc<dyn ProfileService>) -> Self {
        Self { repos, profiles }
    }

    async fn require_patient(&self, patient_id: &str) -> Result<User> {
        self.repos
            .users
            .get_user(patient_id)
            .await?
            .filter(User::is_patient)
            .ok_or_else(|| AppError::NotFound(format!("Patient not found: {}", patient_id)))
    }
}

#[async_trait]
impl ClinicService for ClinicServiceImpl {
    async fn overview(&self) -> Result<ClinicOverview> {
        let (patient_count, session_count, log_count, alert_logs) = tokio::try_join!(
            self.repos.users.count_by_role(Role::Patient),
            self.repos.sessions.count_all_sessions(),
            self.repos.logs.count_all_logs(),
            self.repos
                .logs
                .high_fatigue_logs(HIGH_FATIGUE_THRESHOLD, ALERT_LIMIT),
        )?;

        let mut emails: HashMap<String, Option<String>> = HashMap::new();
        let mut fatigue_alerts = Vec::with_capacity(alert_logs.len());
        for log in alert_logs {
            if !emails.contains_key(&log.user_id) {
                let email = self.repos.users.get_user(&log.user_id).await?.map(|u| u.email);
                emails.insert(log.user_id.clone(), email);
            }
            fatigue_alerts.push(FatigueAlert {
                email: emails.get(&log.user_id).cloned().flatten(),
                user_id: log.user_id,
                date: log.date,
                fatigue: log.fatigue,
                mood: log.mood,
            });
        }

        Ok(ClinicOverview {
            patient_count,
            session_count,
            log_count,
            fatigue_alerts,
        })
    }

    async fn list_patients(&self) -> Result<Vec<PatientSummary>> {
        let patients = self.repos.users.list_by_role(Role::Patient).await?;

        let mut summaries = Vec::with_capacity(patients.len());
        for patient in patients {
            let (session_count, log_count) = tokio::try_join!(
                self.repos.sessions.count_sessions(&patient.id),
                self.repos.logs.count_logs(&patient.id),
            )?;
            summaries.push(PatientSummary {
                patient,
                session_count,
                log_count,
            });
        }
        Ok(summaries)
    }

    async fn enrol_patient(&self, email: &str) -> Result<User> {
        let email = email.trim();
        validators::validate_account_email(email)?;

        let user = self
            .repos
            .users
            .create_user(&User::new(email, Role::Patient))
            .await?;
        info!("Enrolled patient {}", user.id);
        Ok(user)
    }

    async fn patient_detail(&self, patient_id: &str) -> Result<PatientDetail> {
        let patient = self.require_patient(patient_id).await?;
        let (logs, sessions) = tokio::try_join!(
            self.repos.logs.recent_logs(patient_id, DETAIL_LOG_LIMIT),
            self.repos
                .sessions
                .recent_sessions(patient_id, DETAIL_SESSION_LIMIT),
        )?;
        Ok(PatientDetail {
            patient,
            logs,
            sessions,
        })
    }

    async fn patient_profile(&self, patient_id: &str) -> Result<CognitiveProfile> {
        self.require_patient(patient_id).await?;
        self.profiles.cognitive_profile(patient_id).await
    }

    async fn patient_insights(&self, patient_id: &str) -> Result<Vec<String>> {
        self.require_patient(patient_id).await?;
        self.profiles.insights(patient_id).await
    }
}

/// 创建临床服务
pub fn create_clinic_service(
    repos: Repositories,
    profiles: Arc<dyn ProfileService>,
) -> Arc<dyn ClinicService> {
    Arc::new(ClinicServiceImpl::new(repos, profiles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CheckInEntry;
    use chrono::{TimeZone, Utc};

    struct NoProfiles;

    #[async_trait]
    impl ProfileService for NoProfiles {
        async fn cognitive_profile(&self, _user_id: &str) -> Result<CognitiveProfile> {
            Err(AppError::InsufficientData("none".into()))
        }

        async fn insights(&self, _user_id: &str) -> Result<Vec<String>> {
            Ok(vec!["keep going".into()])
        }
    }

    fn service() -> (ClinicServiceImpl, Repositories) {
        let repos = Repositories::in_memory();
        (
            ClinicServiceImpl::new(repos.clone(), Arc::new(NoProfiles)),
            repos,
        )
    }

    async fn check_in(repos: &Repositories, user_id: &str, day: u32, fatigue: u8) {
        let at = Utc.with_ymd_and_hms(2026, 3, day, 8, 0, 0).unwrap();
        let entry = CheckInEntry {
            sleep_hours: 6.0,
            mood: 2,
            fatigue,
        };
        repos
            .logs
            .upsert_log(user_id, at.date_naive(), &entry, at)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_enrol_validates_and_rejects_duplicates() {
        let (service, _) = service();
        assert!(matches!(
            service.enrol_patient("nope").await,
            Err(AppError::Validation(_))
        ));

        let user = service.enrol_patient(" Ana@Clinic.org ").await.unwrap();
        assert_eq!(user.email, "ana@clinic.org");
        assert!(matches!(
            service.enrol_patient("ana@clinic.org").await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_overview_counts_and_alerts() {
        let (service, repos) = service();
        let ana = service.enrol_patient("ana@clinic.org").await.unwrap();
        service.enrol_patient("luis@clinic.org").await.unwrap();

        for day in 1..=7 {
            check_in(&repos, &ana.id, day, 4).await;
        }
        check_in(&repos, "unenrolled", 8, 5).await;
        check_in(&repos, &ana.id, 9, 2).await;

        let overview = service.overview().await.unwrap();
        assert_eq!(overview.patient_count, 2);
        assert_eq!(overview.log_count, 9);
        assert_eq!(overview.session_count, 0);
        assert_eq!(overview.fatigue_alerts.len(), ALERT_LIMIT);
        assert_eq!(overview.fatigue_alerts[0].user_id, "unenrolled");
        assert_eq!(overview.fatigue_alerts[0].email, None);
        assert_eq!(
            overview.fatigue_alerts[1].email.as_deref(),
            Some("ana@clinic.org")
        );
    }

    #[tokio::test]
    async fn test_patient_detail_limits_logs() {
        let (service, repos) = service();
        let ana = service.enrol_patient("ana@clinic.org").await.unwrap();
        for day in 1..=10 {
            check_in(&repos, &ana.id, day, 3).await;
        }

        let detail = service.patient_detail(&ana.id).await.unwrap();
        assert_eq!(detail.logs.len(), DETAIL_LOG_LIMIT);
        assert_eq!(
            detail.logs.last().map(|l| l.date),
            Some(Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap().date_naive())
        );
    }

    #[tokio::test]
    async fn test_unknown_patient_is_not_found() {
        let (service, repos) = service();
        assert!(matches!(
            service.patient_detail("ghost").await,
            Err(AppError::NotFound(_))
        ));

        let admin = User::with_id("doc", "doc@clinic.org", Role::Admin);
        repos.users.create_user(&admin).await.unwrap();
        assert!(matches!(
            service.patient_insights("doc").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_patients_with_counts() {
        let (service, repos) = service();
        let ana = service.enrol_patient("ana@clinic.org").await.unwrap();
        check_in(&repos, &ana.id, 1, 3).await;

        let patients = service.list_patients().await.unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].log_count, 1);
        assert_eq!(patients[0].session_count, 0);
    }
}

//! 临床端 DTO

use serde::{Deserialize, Serialize};

/// 登记患者请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrolPatientRequest {
    pub email: String,
}

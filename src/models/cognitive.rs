use serde::{Deserialize, Serialize};

/// 各认知领域得分（0-100）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CognitiveScores {
    pub memory: u8,
    pub attention: u8,
    pub wellness: u8,
    /// 窗口内没有灵活性游戏记录时为空
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flexibility: Option<u8>,
}

impl CognitiveScores {
    /// 按固定顺序列出 (领域名, 得分)
    pub fn domains(&self) -> Vec<(&'static str, u8)> {
        let mut domains = vec![
            ("memory", self.memory),
            ("attention", self.attention),
            ("wellness", self.wellness),
        ];
        if let Some(flexibility) = self.flexibility {
            domains.push(("flexibility", flexibility));
        }
        domains
    }
}

/// 认知画像：得分 + 叙述性总结
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CognitiveProfile {
    pub scores: CognitiveScores,
    pub summary: String,
}

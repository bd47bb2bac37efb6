//! 叙述生成服务
//!
//! 所有面向用户的 LLM 文本（画像总结、单局反馈、周报、每日内容、
//! 教练对话、签到问答解析）都在这里构造提示词。调用失败统一记录
//! `warn!` 并返回固定回退文本，不会向调用方传播错误。

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::config::config::LlmConfig;
use crate::engine::ActivityWindow;
use crate::models::{CognitiveScores, GameType};
use crate::security::validation::{Validatable, ValidationResult, validators};
use crate::services::llm::{ChatMessage, ChatRequest, LlmClient};

/// 画像总结失败时的回退文本
pub const PROFILE_SUMMARY_FALLBACK: &str = "Keep training for a detailed analysis.";
pub const GAME_FEEDBACK_FALLBACK: &str =
    "Good effort! Stay focused on accuracy first and speed will follow in your next game.";
pub const WEEKLY_REPORT_NOT_ENOUGH_DATA: &str =
    "There is not enough data to generate a weekly report yet. Keep training!";
pub const WEEKLY_REPORT_FALLBACK: &str =
    "Your weekly report is not available right now. Please try again later.";
pub const DAILY_CONTENT_FALLBACK: &str =
    "Sleep is when your brain consolidates what you learned during the day: a regular bedtime is a cognitive habit.";
pub const COACH_FALLBACK: &str =
    "The coach is not available right now. Please try again in a moment.";
pub const ANALYSIS_FALLBACK_REASON: &str = "Could not analyze your answers, please adjust manually.";

const ANALYST_SUMMARY_PROMPT: &str = "You are \"NeuroSync Analyst\". Analyze a user's cognitive profile \
and write a two-point summary:\n\
1. **Your Main Strength:** identify the highest score and congratulate the user for it.\n\
2. **Your Focus Area:** identify the lowest score and give one actionable tip to improve it.\n\
Be brief and motivating. Reply only with the text of the two points.";

const COACH_FEEDBACK_PROMPT: &str = "You are \"NeuroSync Coach\", an AI assistant specialised in \
cognitive performance analysis. The user just finished a game. Give brief feedback (at most two \
sentences) that is positive and contains one actionable tip for next time. Do not use emojis. \
Be specific and motivating.";

const WEEKLY_REPORT_PROMPT: &str = "You are \"NeuroSync Analyst\", an expert in cognitive \
performance data. Analyze the user's last week and write a three-point narrative summary as a \
list. The tone must be encouraging, professional and insightful.\n\
1. **Highlight:** something positive and specific (a new high score, good consistency, better mood).\n\
2. **Interesting Pattern:** a correlation between habits (sleep, mood, fatigue) and game performance.\n\
3. **Suggestion for Next Week:** one clear, actionable tip based on the data.\n\
Fatigue is reported from 1 (well rested) to 5 (exhausted). Reply only with the report text, \
without greetings.";

const DAILY_CONTENT_PROMPT: &str = "You are \"NeuroSync Coach\". Write today's \"cognitive pill\": \
very short content (one or two sentences), interesting and easy to understand. Reply only with \
the content, without greetings.";

const CHAT_COACH_PROMPT: &str = "You are \"NeuroSync Coach\", an AI assistant expert in \
neuroscience and cognitive wellbeing. Your goal is to help the user understand and improve their \
mental performance.\n\
- Be concise, friendly and motivating.\n\
- Give practical, science-based advice.\n\
- Never give medical advice.\n\
- Keep answers short (two or three sentences at most).";

const CHECK_IN_ANALYSIS_PROMPT: &str = "You are an expert psychologist. Analyze the user's answers \
and turn them into numeric metrics.\n\
Scoring rules:\n\
- MOOD: 1 (very bad, depressed) to 5 (excellent, happy).\n\
- FATIGUE: 1 (full of energy, well rested) to 5 (completely exhausted).\n\
- SLEEP: estimated hours (0-12). If they say \"I slept little\" use 5, if they say \"well\" use 8.\n\
Reply STRICTLY with a JSON object of this shape:\n\
{\"mood\": number, \"fatigue\": number, \"sleep\": number, \"reason\": \"short sentence (max 10 words)\"}";

/// 每日内容主题，按日期轮换
pub const DAILY_THEMES: &[&str] = &[
    "a curious fact about memory",
    "a practical tip to improve concentration",
    "a mindfulness micro-exercise that takes less than one minute",
    "an inspiring quote about learning and the mind",
    "a simple explanation of how sleep affects the brain",
];

static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid json object regex"));

/// 签到问答（自由文本）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckInAnswers {
    /// 睡眠情况
    pub sleep: String,
    /// 情绪
    pub mood: String,
    /// 精力
    pub energy: String,
}

impl Validatable for CheckInAnswers {
    fn validate(&self) -> ValidationResult<()> {
        validators::validate_message("sleep", &self.sleep)?;
        validators::validate_message("mood", &self.mood)?;
        validators::validate_message("energy", &self.energy)
    }
}

/// 问答解析结果，可直接作为签到内容的建议值
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodAnalysis {
    pub mood: u8,
    pub fatigue: u8,
    pub sleep_hours: f64,
    pub reason: String,
}

impl MoodAnalysis {
    /// 无法解析时的中性值
    pub fn neutral() -> Self {
        Self {
            mood: 3,
            fatigue: 3,
            sleep_hours: 7.0,
            reason: ANALYSIS_FALLBACK_REASON.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct RawAnalysis {
    mood: f64,
    fatigue: f64,
    sleep: f64,
    #[serde(default)]
    reason: String,
}

/// 每日内容
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyContent {
    pub date: NaiveDate,
    pub theme: String,
    pub content: String,
}

/// 当天的主题
pub fn theme_for(date: NaiveDate) -> &'static str {
    let index = date.num_days_from_ce().rem_euclid(DAILY_THEMES.len() as i32) as usize;
    DAILY_THEMES[index]
}

/// 从模型回复中提取 JSON 对象并截断到合法范围
pub fn parse_mood_analysis(reply: &str) -> Option<MoodAnalysis> {
    let json = JSON_OBJECT.find(reply)?.as_str();
    let raw: RawAnalysis = serde_json::from_str(json).ok()?;

    if !(raw.mood.is_finite() && raw.fatigue.is_finite() && raw.sleep.is_finite()) {
        return None;
    }

    Some(MoodAnalysis {
        mood: raw.mood.round().clamp(1.0, 5.0) as u8,
        fatigue: raw.fatigue.round().clamp(1.0, 5.0) as u8,
        sleep_hours: raw.sleep.clamp(0.0, 12.0),
        reason: raw.reason.trim().to_string(),
    })
}

fn game_prompt(game_type: GameType, score: u32, level: u32) -> String {
    let details = match game_type {
        GameType::MemoryWork => format!(
            "The game was \"Working Memory\" (repeat a sequence of squares). The user reached \
             level {level} with a score of {score}. If the level is low (1-3), focus on \
             concentration. If it is medium (4-6), suggest chunking techniques. If it is high \
             (7+), congratulate them on an impressive memory."
        ),
        GameType::AttentionStroop => format!(
            "The game was \"Selective Attention\" (Stroop test: name the ink colour, not the \
             word). The user scored {score} in 60 seconds. Below 100 means difficulty inhibiting \
             the automatic response, 100-180 is good, above 180 is excellent. Suggest techniques \
             such as a deep breath before each answer or focusing only on the letter shapes."
        ),
        GameType::FlexibilityShift => format!(
            "The game was \"Cognitive Flexibility\" (sort cards while the rule keeps switching). \
             The user scored {score} at level {level}. Below 80 suggests the rule switches are \
             costly, 80-160 is good, above 160 is excellent. Suggest pausing for a beat after \
             each rule change."
        ),
    };
    format!("{}\n{}", COACH_FEEDBACK_PROMPT, details)
}

fn describe_window(window: &ActivityWindow) -> String {
    let mut lines = vec!["Check-ins (last 7 days):".to_string()];
    lines.extend(window.logs().iter().map(|log| {
        format!(
            "- {}: sleep {:.1}h, mood {}/5, fatigue {}/5",
            log.date, log.sleep_hours, log.mood, log.fatigue
        )
    }));
    lines.push("Games (last 7 days):".to_string());
    lines.extend(window.sessions().iter().map(|session| {
        format!(
            "- {}: {} score {} level {}",
            session.created_at.format("%Y-%m-%d %H:%M"),
            session.game_type,
            session.score,
            session.level
        )
    }));
    lines.join("\n")
}

/// 叙述生成器
pub struct Narrator {
    client: Arc<dyn LlmClient>,
    summary_model: String,
    fast_model: String,
    analysis_model: String,
}

impl Narrator {
    pub fn new(client: Arc<dyn LlmClient>, config: &LlmConfig) -> Self {
        Self {
            client,
            summary_model: config.summary_model.clone(),
            fast_model: config.fast_model.clone(),
            analysis_model: config.analysis_model.clone(),
        }
    }

    /// 单次调用，失败时返回 `None` 并记录原因
    async fn try_generate(&self, purpose: &'static str, request: ChatRequest) -> Option<String> {
        match self.client.complete(request).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(purpose, error = %e, "LLM call failed, using fallback");
                None
            }
        }
    }

    async fn generate(&self, purpose: &'static str, request: ChatRequest, fallback: &str) -> String {
        self.try_generate(purpose, request)
            .await
            .unwrap_or_else(|| fallback.to_string())
    }

    /// 画像总结：最强与最弱领域
    pub async fn profile_summary(&self, scores: &CognitiveScores) -> String {
        let mut profile = format!(
            "Profile data: Memory={}/100, Attention={}/100, Emotional Wellness={}/100",
            scores.memory, scores.attention, scores.wellness
        );
        if let Some(flexibility) = scores.flexibility {
            profile.push_str(&format!(", Flexibility={}/100", flexibility));
        }
        profile.push('.');

        let request = ChatRequest::new(
            &self.summary_model,
            vec![
                ChatMessage::system(ANALYST_SUMMARY_PROMPT),
                ChatMessage::user(profile),
            ],
        );
        self.generate("profile_summary", request, PROFILE_SUMMARY_FALLBACK)
            .await
    }

    /// 单局游戏反馈
    pub async fn game_feedback(&self, game_type: GameType, score: u32, level: u32) -> String {
        let request = ChatRequest::new(
            &self.fast_model,
            vec![
                ChatMessage::system(game_prompt(game_type, score, level)),
                ChatMessage::user("Give me my feedback."),
            ],
        )
        .with_temperature(0.8);
        self.generate("game_feedback", request, GAME_FEEDBACK_FALLBACK)
            .await
    }

    /// 周报；签到和游戏都少于 2 条时直接返回固定文本
    pub async fn weekly_report(&self, window: &ActivityWindow) -> String {
        if window.log_count() < 2 && window.session_count() < 2 {
            return WEEKLY_REPORT_NOT_ENOUGH_DATA.to_string();
        }

        let request = ChatRequest::new(
            &self.summary_model,
            vec![
                ChatMessage::system(WEEKLY_REPORT_PROMPT),
                ChatMessage::user(format!(
                    "Analyze the following user data:\n{}",
                    describe_window(window)
                )),
            ],
        );
        self.generate("weekly_report", request, WEEKLY_REPORT_FALLBACK)
            .await
    }

    /// 每日内容，主题由日期决定
    pub async fn daily_content(&self, date: NaiveDate) -> DailyContent {
        let theme = theme_for(date);
        let request = ChatRequest::new(
            &self.fast_model,
            vec![ChatMessage::system(format!(
                "{}\nToday's theme is: \"{}\".",
                DAILY_CONTENT_PROMPT, theme
            ))],
        )
        .with_temperature(0.9);

        DailyContent {
            date,
            theme: theme.to_string(),
            content: self
                .generate("daily_content", request, DAILY_CONTENT_FALLBACK)
                .await,
        }
    }

    /// 教练对话
    pub async fn coach_reply(&self, message: &str) -> String {
        let request = ChatRequest::new(
            &self.fast_model,
            vec![
                ChatMessage::system(CHAT_COACH_PROMPT),
                ChatMessage::user(message),
            ],
        )
        .with_temperature(0.7);
        self.generate("coach_reply", request, COACH_FALLBACK).await
    }

    /// 将签到问答转换为数值建议
    pub async fn analyze_check_in(&self, answers: &CheckInAnswers) -> MoodAnalysis {
        let user_content = format!(
            "Today's answers:\n1. Sleep: \"{}\"\n2. Mood: \"{}\"\n3. Energy: \"{}\"",
            answers.sleep.trim(),
            answers.mood.trim(),
            answers.energy.trim()
        );
        let request = ChatRequest::new(
            &self.analysis_model,
            vec![
                ChatMessage::system(CHECK_IN_ANALYSIS_PROMPT),
                ChatMessage::user(user_content),
            ],
        )
        .with_temperature(0.1)
        .json_object();

        let Some(reply) = self.try_generate("analyze_check_in", request).await else {
            return MoodAnalysis::neutral();
        };
        parse_mood_analysis(&reply).unwrap_or_else(|| {
            warn!("LLM check-in analysis was not valid JSON, using neutral values");
            MoodAnalysis::neutral()
        })
    }
}

//! 表单 / 状态控制器
//!
//! 每个 Tab 一个独立的状态机：
//!
//! ```text
//!   Idle --submit(合法输入)--> Submitting --ok--> Success(DisplayModel)
//!    ^  \                           \------err--> Error(message)
//!    |   \--submit(非法输入)--> Idle(带校验错误)
//!    \------------ 修改输入 ------------- Success / Error
//! ```
//!
//! 状态是显式的 tagged union，不可能出现"加载中"和"有结果"同时成立。

use tracing::{debug, info};

use crate::client::DetectionBackend;
use crate::config::InputLimits;
use crate::detection::{AnalysisKind, DetectionRequest, DetectionResult, MediaFile};
use crate::error::DetectionError;
use crate::normalize::{normalize, DisplayModel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabState {
    /// 空闲。上一次提交被本地校验拒绝时带上校验信息
    Idle { validation_error: Option<String> },
    Submitting,
    Success(DisplayModel),
    Error(String),
}

impl TabState {
    fn idle() -> Self {
        TabState::Idle {
            validation_error: None,
        }
    }
}

/// Tab 当前的输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabInput {
    File(Option<MediaFile>),
    Text(String),
}

/// 一次已经放行的提交。`ticket` 用来识别过期的响应。
#[derive(Debug)]
pub struct Submission {
    pub ticket: u64,
    pub request: DetectionRequest,
}

pub struct TabController {
    kind: AnalysisKind,
    limits: InputLimits,
    input: TabInput,
    state: TabState,
    // 每次修改输入或重置都会递增；响应回来时对不上号就丢弃
    generation: u64,
    in_flight: Option<u64>,
}

impl TabController {
    pub fn new(kind: AnalysisKind, limits: InputLimits) -> Self {
        let input = if kind.takes_file() {
            TabInput::File(None)
        } else {
            TabInput::Text(String::new())
        };

        Self {
            kind,
            limits,
            input,
            state: TabState::idle(),
            generation: 0,
            in_flight: None,
        }
    }

    pub fn kind(&self) -> AnalysisKind {
        self.kind
    }

    pub fn state(&self) -> &TabState {
        &self.state
    }

    pub fn input(&self) -> &TabInput {
        &self.input
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// 选择 (或清空) 文件。phishing Tab 上调用会被忽略。
    pub fn set_file(&mut self, file: Option<MediaFile>) {
        if !self.kind.takes_file() {
            debug!("忽略文件输入: kind={}", self.kind);
            return;
        }
        self.input = TabInput::File(file);
        self.on_input_changed();
    }

    /// 修改文本。deepfake / voice Tab 上调用会被忽略。
    pub fn set_text(&mut self, text: impl Into<String>) {
        if self.kind.takes_file() {
            debug!("忽略文本输入: kind={}", self.kind);
            return;
        }
        self.input = TabInput::Text(text.into());
        self.on_input_changed();
    }

    /// 离开页面 / 切走时调用：清空结果，进行中的响应回来后会被丢弃
    pub fn reset(&mut self) {
        self.generation += 1;
        if self.in_flight.is_none() {
            self.state = TabState::idle();
        }
    }

    // 输入变化：清掉旧结果回到 Idle。
    // 提交中不打断 (同一 Tab 只允许一个请求在途)，但旧票据作废。
    fn on_input_changed(&mut self) {
        self.generation += 1;
        if self.in_flight.is_none() {
            self.state = TabState::idle();
        }
    }

    /// 尝试开始一次提交
    ///
    /// - 已有请求在途：no-op，返回 None
    /// - 输入不合法：留在 Idle 并记录校验错误，返回 None，不会发出任何请求
    /// - 否则进入 Submitting，返回需要交给后端的请求
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if self.in_flight.is_some() {
            debug!("已有请求在途，忽略重复提交: kind={}", self.kind);
            return None;
        }

        match self.build_request() {
            Ok(request) => {
                let ticket = self.generation;
                self.in_flight = Some(ticket);
                self.state = TabState::Submitting;
                Some(Submission { ticket, request })
            }
            Err(message) => {
                info!("⚠️ 本地校验未通过: kind={}, reason={}", self.kind, message);
                self.state = TabState::Idle {
                    validation_error: Some(message),
                };
                None
            }
        }
    }

    /// 提交结束，写入结果
    ///
    /// 票据过期 (期间修改过输入或重置过) 时丢弃结果、回到 Idle，返回 false。
    pub fn complete(
        &mut self,
        ticket: u64,
        outcome: Result<DetectionResult, DetectionError>,
    ) -> bool {
        if self.in_flight != Some(ticket) {
            debug!("未知票据，忽略: kind={}, ticket={}", self.kind, ticket);
            return false;
        }
        self.in_flight = None;

        if ticket != self.generation {
            debug!("输入已变化，丢弃过期响应: kind={}, ticket={}", self.kind, ticket);
            self.state = TabState::idle();
            return false;
        }

        self.state = match outcome {
            Ok(result) => TabState::Success(normalize(&result)),
            Err(error) => TabState::Error(error.to_string()),
        };
        true
    }

    /// begin_submit + 调用后端 + complete
    pub async fn submit<B>(&mut self, backend: &B) -> &TabState
    where
        B: DetectionBackend + ?Sized,
    {
        if let Some(submission) = self.begin_submit() {
            let outcome = backend.detect(submission.request).await;
            self.complete(submission.ticket, outcome);
        }
        &self.state
    }

    fn build_request(&self) -> Result<DetectionRequest, String> {
        match &self.input {
            TabInput::File(None) => Err("Please select a file to analyze.".to_string()),
            TabInput::File(Some(file)) => {
                if file.len() > self.limits.max_file_bytes {
                    return Err(format!(
                        "File size exceeds {}MB limit.",
                        self.limits.max_file_bytes / (1024 * 1024)
                    ));
                }
                Ok(match self.kind {
                    AnalysisKind::Voice => DetectionRequest::Voice(file.clone()),
                    _ => DetectionRequest::Deepfake(file.clone()),
                })
            }
            TabInput::Text(text) => {
                if text.trim().is_empty() {
                    return Err("Please enter a URL or text to analyze.".to_string());
                }
                if text.chars().count() > self.limits.max_text_chars {
                    return Err(format!(
                        "Input text is too long. Maximum {} characters allowed.",
                        self.limits.max_text_chars
                    ));
                }
                Ok(DetectionRequest::Phishing(text.clone()))
            }
        }
    }
}

/// 仪表盘：三个互不共享状态的 Tab + 当前激活的 Tab
pub struct Dashboard {
    active: AnalysisKind,
    deepfake: TabController,
    voice: TabController,
    phishing: TabController,
}

impl Dashboard {
    pub fn new(limits: InputLimits) -> Self {
        Self {
            active: AnalysisKind::Deepfake,
            deepfake: TabController::new(AnalysisKind::Deepfake, limits),
            voice: TabController::new(AnalysisKind::Voice, limits),
            phishing: TabController::new(AnalysisKind::Phishing, limits),
        }
    }

    pub fn active(&self) -> AnalysisKind {
        self.active
    }

    pub fn select(&mut self, kind: AnalysisKind) {
        self.active = kind;
    }

    pub fn tab(&self, kind: AnalysisKind) -> &TabController {
        match kind {
            AnalysisKind::Deepfake => &self.deepfake,
            AnalysisKind::Voice => &self.voice,
            AnalysisKind::Phishing => &self.phishing,
        }
    }

    pub fn tab_mut(&mut self, kind: AnalysisKind) -> &mut TabController {
        match kind {
            AnalysisKind::Deepfake => &mut self.deepfake,
            AnalysisKind::Voice => &mut self.voice,
            AnalysisKind::Phishing => &mut self.phishing,
        }
    }

    pub fn active_tab_mut(&mut self) -> &mut TabController {
        self.tab_mut(self.active)
    }

    /// 同时拿到三个 Tab 的可变引用，便于并发提交
    pub fn tabs_mut(&mut self) -> [&mut TabController; 3] {
        [&mut self.deepfake, &mut self.voice, &mut self.phishing]
    }
}

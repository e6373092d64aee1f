use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use crate::client::DetectionBackend;
use crate::detection::{
    AnalysisKind, DeepfakeVerdict, DetectionRequest, DetectionResult, PhishingVerdict, RiskLevel,
    VoiceVerdict,
};
use crate::error::DetectionError;

pub const DEEPFAKE_EXPLANATION: &str = "The facial features show inconsistencies typical of AI-generated content. Detected anomalies in eye movement and facial symmetry.";
pub const VOICE_EXPLANATION: &str = "Audio spectral patterns indicate synthetic generation. Detected unnatural frequency distributions and lack of human vocal irregularities.";
pub const PHISHING_EXPLANATION: &str = "ML model analysis complete. No major rule violations detected.";

/// 本地模拟器：不访问网络，随机编造检测结果 (演示模式)
///
/// 结果同样遵守 confidence 为 0~1 小数的约定。
pub struct LocalSimulator {
    rng: Mutex<StdRng>,
    latency: Duration,
}

impl LocalSimulator {
    pub fn new(latency: Duration) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            latency,
        }
    }

    /// 固定种子，测试里结果可复现
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            latency: Duration::ZERO,
        }
    }

    pub async fn simulate(&self, kind: AnalysisKind) -> DetectionResult {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut rng = self.rng.lock().await;
        let result = match kind {
            AnalysisKind::Deepfake => DetectionResult::Deepfake(DeepfakeVerdict {
                is_deepfake: rng.gen_bool(0.5),
                confidence: random_confidence(&mut *rng),
                explanation: DEEPFAKE_EXPLANATION.to_string(),
            }),
            AnalysisKind::Voice => DetectionResult::Voice(VoiceVerdict {
                is_fake: rng.gen_bool(0.5),
                confidence: random_confidence(&mut *rng),
                explanation: VOICE_EXPLANATION.to_string(),
            }),
            AnalysisKind::Phishing => {
                let risk_percentage: u8 = rng.gen_range(0..100);
                DetectionResult::Phishing(PhishingVerdict {
                    risk_level: RiskLevel::from_percentage(risk_percentage),
                    risk_percentage,
                    explanation: PHISHING_EXPLANATION.to_string(),
                })
            }
        };

        debug!("🎲 模拟结果: kind={}, result={:?}", kind, result);
        result
    }
}

// 0.60 ~ 0.99，步长 0.01
fn random_confidence<R: Rng>(rng: &mut R) -> f64 {
    f64::from(rng.gen_range(60u32..100)) / 100.0
}

#[async_trait]
impl DetectionBackend for LocalSimulator {
    async fn detect(&self, request: DetectionRequest) -> Result<DetectionResult, DetectionError> {
        Ok(self.simulate(request.kind()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[tokio::test]
    async fn results_follow_the_fraction_contract() {
        let simulator = LocalSimulator::with_seed(7);
        for _ in 0..200 {
            match simulator.simulate(AnalysisKind::Deepfake).await {
                DetectionResult::Deepfake(v) => {
                    assert!((0.60..=0.99).contains(&v.confidence));
                }
                other => panic!("unexpected variant: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn phishing_level_agrees_with_percentage() {
        let simulator = LocalSimulator::with_seed(11);
        for _ in 0..200 {
            match simulator.simulate(AnalysisKind::Phishing).await {
                DetectionResult::Phishing(v) => {
                    assert!(v.risk_percentage < 100);
                    assert_eq!(v.risk_level, RiskLevel::from_percentage(v.risk_percentage));
                }
                other => panic!("unexpected variant: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn same_seed_same_results() {
        let a = LocalSimulator::with_seed(42);
        let b = LocalSimulator::with_seed(42);
        for kind in AnalysisKind::ALL {
            assert_eq!(
                normalize(&a.simulate(kind).await),
                normalize(&b.simulate(kind).await)
            );
        }
    }
}

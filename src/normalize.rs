use serde::Serialize;

use crate::detection::{DetectionResult, RiskLevel};

// ==========================================
// 展示模型 (DisplayModel)
// ==========================================
// 每次拿到新的 DetectionResult 都重新计算，不做任何持久化。

/// UI 层的风险分档
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskClass {
    Low,
    Medium,
    High,
}

impl RiskClass {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskClass::Low => "low",
            RiskClass::Medium => "medium",
            RiskClass::High => "high",
        }
    }
}

/// 置信度进度条的颜色分档：>70 高，>40 中，其余低
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

impl ConfidenceBand {
    pub fn from_percent(percent: u8) -> Self {
        if percent > 70 {
            ConfidenceBand::High
        } else if percent > 40 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayModel {
    pub risk_class: RiskClass,
    pub badge_text: String,
    /// 0..=100
    pub confidence_percent: u8,
    pub confidence_band: ConfidenceBand,
    pub explanation: String,
}

/// 把三种后端结果统一成展示模型 (纯函数)
pub fn normalize(result: &DetectionResult) -> DisplayModel {
    // 1. 按结果类型决定分档、徽标文字和百分比
    let (risk_class, badge_text, confidence_percent) = match result {
        // 图片 / 视频：布尔判定直接映射高 / 低，置信度为 0~1 小数
        DetectionResult::Deepfake(v) => {
            let (class, badge) = verdict_class(v.is_deepfake);
            (class, badge.to_string(), fraction_to_percent(v.confidence))
        }
        // 语音：规则同上，字段名为 is_fake
        DetectionResult::Voice(v) => {
            let (class, badge) = verdict_class(v.is_fake);
            (class, badge.to_string(), fraction_to_percent(v.confidence))
        }
        // 钓鱼：后端直接给出等级和 0~100 整数
        DetectionResult::Phishing(v) => {
            // Unknown (后端分析失败时的等级) 按低风险展示
            let class = match v.risk_level {
                RiskLevel::High => RiskClass::High,
                RiskLevel::Medium => RiskClass::Medium,
                RiskLevel::Low | RiskLevel::Unknown => RiskClass::Low,
            };
            let badge = format!("{} Risk", v.risk_level.as_str());
            (class, badge, v.risk_percentage.min(100))
        }
    };

    // 2. 进度条颜色只看百分比，与结果类型无关
    DisplayModel {
        risk_class,
        badge_text,
        confidence_percent,
        confidence_band: ConfidenceBand::from_percent(confidence_percent),
        explanation: result.explanation().to_string(),
    }
}

fn verdict_class(flagged: bool) -> (RiskClass, &'static str) {
    if flagged {
        (RiskClass::High, "High Risk")
    } else {
        (RiskClass::Low, "Low Risk")
    }
}

/// 0~1 小数 -> 0~100 整数，四舍五入。越界值截断，NaN 记为 0。
pub fn fraction_to_percent(confidence: f64) -> u8 {
    if confidence.is_nan() {
        return 0;
    }
    // 先放大再取整，最后截断到 [0, 100]；截断后的值一定能装进 u8
    (confidence * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{DeepfakeVerdict, PhishingVerdict, VoiceVerdict};

    fn deepfake(is_deepfake: bool, confidence: f64) -> DetectionResult {
        DetectionResult::Deepfake(DeepfakeVerdict {
            is_deepfake,
            confidence,
            explanation: "facial symmetry anomalies".to_string(),
        })
    }

    fn phishing(level: RiskLevel, percentage: u8) -> DetectionResult {
        DetectionResult::Phishing(PhishingVerdict {
            risk_level: level,
            risk_percentage: percentage,
            explanation: "ML model analysis complete.".to_string(),
        })
    }

    #[test]
    fn deepfake_positive_example() {
        let model = normalize(&deepfake(true, 0.87));
        assert_eq!(model.risk_class, RiskClass::High);
        assert_eq!(model.badge_text, "High Risk");
        assert_eq!(model.confidence_percent, 87);
        assert_eq!(model.confidence_band, ConfidenceBand::High);
        assert_eq!(model.explanation, "facial symmetry anomalies");
    }

    #[test]
    fn phishing_medium_example() {
        let model = normalize(&phishing(RiskLevel::Medium, 55));
        assert_eq!(model.risk_class, RiskClass::Medium);
        assert_eq!(model.badge_text, "Medium Risk");
        assert_eq!(model.confidence_percent, 55);
    }

    #[test]
    fn every_positive_signal_is_high_risk() {
        for confidence in [0.0, 0.3, 1.0] {
            assert_eq!(normalize(&deepfake(true, confidence)).risk_class, RiskClass::High);
            let voice = DetectionResult::Voice(VoiceVerdict {
                is_fake: true,
                confidence,
                explanation: String::new(),
            });
            assert_eq!(normalize(&voice).risk_class, RiskClass::High);
        }
        for percentage in [0, 50, 100] {
            assert_eq!(
                normalize(&phishing(RiskLevel::High, percentage)).risk_class,
                RiskClass::High
            );
        }
    }

    #[test]
    fn negative_verdicts_are_low_risk() {
        let model = normalize(&deepfake(false, 0.92));
        assert_eq!(model.risk_class, RiskClass::Low);
        assert_eq!(model.badge_text, "Low Risk");
        assert_eq!(model.confidence_percent, 92);
    }

    #[test]
    fn confidence_percent_rounds_fraction() {
        for step in 0..=1000 {
            let c = step as f64 / 1000.0;
            let percent = normalize(&deepfake(false, c)).confidence_percent;
            assert_eq!(percent as f64, (c * 100.0).round());
            assert!(percent <= 100);
        }
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(fraction_to_percent(1.7), 100);
        assert_eq!(fraction_to_percent(-0.2), 0);
        assert_eq!(fraction_to_percent(f64::NAN), 0);
        assert_eq!(normalize(&phishing(RiskLevel::High, 180)).confidence_percent, 100);
    }

    #[test]
    fn unknown_level_maps_to_low_class() {
        let model = normalize(&phishing(RiskLevel::Unknown, 0));
        assert_eq!(model.risk_class, RiskClass::Low);
        assert_eq!(model.badge_text, "Unknown Risk");
    }

    #[test]
    fn normalize_is_idempotent() {
        let result = phishing(RiskLevel::Low, 12);
        assert_eq!(normalize(&result), normalize(&result));
    }
}

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use std::time::Duration;
use tokio::sync::mpsc;

use quotaboard_core::snapshot::TimePoint;
use quotaboard_core::{Metric, Snapshot, SnapshotSet, Status};

use super::SourceMessage;
use crate::state::SharedState;

/// Days of history in generated series
const SERIES_DAYS: u32 = 7;

/// Source that synthesizes accounts from several providers, each using its
/// own key dialect. Values grow with every tick.
pub struct DemoSource {
    refresh: Duration,
    state: SharedState,
}

impl DemoSource {
    pub fn new(refresh: Duration, state: SharedState) -> Self {
        Self { refresh, state }
    }

    /// Start the demo source, returning a receiver for messages (same
    /// interface as the file source)
    pub fn start(self) -> mpsc::Receiver<SourceMessage> {
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            self.run(tx).await;
        });

        rx
    }

    async fn run(self, tx: mpsc::Sender<SourceMessage>) {
        let mut interval = tokio::time::interval(self.refresh);
        let mut tick: u64 = 0;

        loop {
            interval.tick().await;
            if !self.state.read().running {
                break;
            }

            let set = demo_snapshots(tick, Utc::now());
            if tx.send(SourceMessage::SnapshotsUpdated(set)).await.is_err() {
                break;
            }
            tick += 1;
        }
    }
}

/// Demo accounts at `tick`, timestamped relative to `now`
pub fn demo_snapshots(tick: u64, now: DateTime<Utc>) -> SnapshotSet {
    let t = tick as f64;
    let snapshots = [
        openai(t, now),
        anthropic(t, now),
        cursor(t, now),
        openrouter(t, now),
        copilot(t, now),
        gemini(now),
    ];
    snapshots
        .into_iter()
        .map(|s| (s.account_id.clone(), s))
        .collect()
}

fn series(now: DateTime<Utc>, base: f64, step: f64) -> Vec<TimePoint> {
    let today = now.date_naive();
    (0..SERIES_DAYS)
        .rev()
        .map(|back| {
            let date: NaiveDate = today - ChronoDuration::days(i64::from(back));
            TimePoint::new(date, base + step * f64::from(SERIES_DAYS - back))
        })
        .collect()
}

/// `model_<name>_*` metrics, spend limit, rate limits and burn rate
fn openai(t: f64, now: DateTime<Utc>) -> Snapshot {
    let gpt_in = 180_000.0 + 4_000.0 * t;
    let mini_in = 420_000.0 + 9_000.0 * t;
    Snapshot::new("openai", "openai-work")
        .with_status(Status::Ok)
        .with_timestamp(now - ChronoDuration::seconds(4))
        .with_attribute("account_name", "Work")
        .with_attribute("plan", "Tier 3")
        .with_metric("model_gpt-4o_input_tokens", Metric::from_used(gpt_in))
        .with_metric("model_gpt-4o_output_tokens", Metric::from_used(gpt_in * 0.3))
        .with_metric("model_gpt-4o_cost_usd", Metric::from_used(gpt_in * 0.000_01).with_unit("USD"))
        .with_metric("model_gpt-4o-mini_input_tokens", Metric::from_used(mini_in))
        .with_metric("model_gpt-4o-mini_output_tokens", Metric::from_used(mini_in * 0.2))
        .with_metric(
            "model_gpt-4o-mini_cost_usd",
            Metric::from_used(mini_in * 0.000_001_5).with_unit("USD"),
        )
        .with_metric(
            "rate_limit_requests",
            Metric::from_remaining((4_200.0 - 35.0 * t).max(0.0)).with_limit(10_000.0),
        )
        .with_metric(
            "rate_limit_tokens",
            Metric::from_remaining((1_400_000.0 - 12_000.0 * t).max(0.0)).with_limit(2_000_000.0),
        )
        .with_metric(
            "spend_limit",
            Metric::from_used(18.0 + 0.05 * t)
                .with_limit(50.0)
                .with_unit("USD"),
        )
        .with_metric("burn_rate", Metric::from_used(0.42).with_unit("USD"))
        .with_metric("client_api_requests", Metric::from_used(820.0 + 5.0 * t))
        .with_metric("client_playground_requests", Metric::from_used(64.0))
        .with_reset("rate_limit_requests", now + ChronoDuration::minutes(14))
        .with_reset("spend_limit", now + ChronoDuration::days(12))
        .with_series("usage_model_gpt-4o", series(now, 20_000.0, 2_500.0))
        .with_series("usage_model_gpt-4o-mini", series(now, 50_000.0, 4_000.0))
}

/// `{input,output}_tokens_<name>` metrics, percent-based session windows and
/// client/tool composition
fn anthropic(t: f64, now: DateTime<Utc>) -> Snapshot {
    let session = (38.0 + 1.5 * t).min(100.0);
    Snapshot::new("anthropic", "anthropic-team")
        .with_status(Status::Ok)
        .with_timestamp(now - ChronoDuration::seconds(12))
        .with_attribute("account_name", "Team")
        .with_attribute("plan", "Max")
        .with_metric("session_usage", Metric::from_used(session).with_unit("%").with_window("5h"))
        .with_metric("weekly_usage", Metric::from_used(61.0).with_unit("%").with_window("7d"))
        .with_metric("input_tokens_claude-sonnet-4", Metric::from_used(2_400_000.0 + 30_000.0 * t))
        .with_metric("output_tokens_claude-sonnet-4", Metric::from_used(310_000.0 + 4_000.0 * t))
        .with_metric("input_tokens_claude-haiku-3.5", Metric::from_used(650_000.0))
        .with_metric("output_tokens_claude-haiku-3.5", Metric::from_used(90_000.0))
        .with_metric("claude-sonnet-4_cost_usd", Metric::from_used(11.2 + 0.1 * t).with_unit("USD"))
        .with_metric("client_cli_sessions", Metric::from_used(41.0))
        .with_metric("client_ide_sessions", Metric::from_used(17.0))
        .with_metric("tool_bash_calls", Metric::from_used(1_204.0 + 3.0 * t))
        .with_metric("tool_edit_calls", Metric::from_used(880.0 + 2.0 * t))
        .with_metric("tool_web_search_calls", Metric::from_used(96.0))
        .with_reset("session_usage", now + ChronoDuration::minutes(192))
        .with_reset("weekly_usage", now + ChronoDuration::hours(52))
        .with_series("usage_client_cli", series(now, 4.0, 1.0))
}

/// Plan section, spend limit and plan spend for the same money
fn cursor(t: f64, now: DateTime<Utc>) -> Snapshot {
    let spend = 14.0 + 0.2 * t;
    Snapshot::new("cursor", "cursor-pro")
        .with_status(Status::Ok)
        .with_timestamp(now - ChronoDuration::minutes(2))
        .with_attribute("plan", "Pro")
        .with_metric("plan_spend", Metric::from_used(spend).with_limit(20.0).with_unit("USD"))
        .with_metric("spend_limit", Metric::from_used(spend).with_limit(60.0).with_unit("USD"))
        .with_metric("plan_requests", Metric::from_used(312.0 + t).with_limit(500.0))
        .with_metric("model_claude-sonnet-4_requests", Metric::from_used(204.0))
        .with_metric("model_gpt-4.1_requests", Metric::from_used(108.0 + t))
        .with_metric("model_o3_requests", Metric::from_used(0.0))
        .with_reset("plan_spend", now + ChronoDuration::days(9))
}

/// String-valued raw telemetry with `vendor/model` names and a credit balance
fn openrouter(t: f64, now: DateTime<Utc>) -> Snapshot {
    Snapshot::new("openrouter", "openrouter-personal")
        .with_status(Status::Ok)
        .with_timestamp(now - ChronoDuration::seconds(40))
        .with_metric("credits", Metric::from_used(7.5 + 0.02 * t).with_limit(25.0).with_unit("USD"))
        .with_metric("total_cost_usd", Metric::from_used(7.5 + 0.02 * t).with_unit("USD"))
        .with_raw("model_deepseek/deepseek-r1_input_tokens", format!("{}", 880_000.0 + 2_000.0 * t))
        .with_raw("model_deepseek/deepseek-r1_output_tokens", "140,000")
        .with_raw("model_meta-llama/llama-3.3-70b_input_tokens", "310,500")
        .with_raw("model_meta-llama/llama-3.3-70b_output_tokens", "41,200")
        .with_raw("model_deepseek/deepseek-r1_cost_usd", "$4.10")
        .with_series("usage_vendor_deepseek", series(now, 90_000.0, 8_000.0))
}

/// Premium request quota close to its limit
fn copilot(t: f64, now: DateTime<Utc>) -> Snapshot {
    Snapshot::new("copilot", "copilot-oss")
        .with_status(Status::Ok)
        .with_timestamp(now - ChronoDuration::minutes(1))
        .with_attribute("plan", "Business")
        .with_metric(
            "premium_requests",
            Metric::from_used((262.0 + t).min(300.0)).with_limit(300.0),
        )
        .with_metric("chat_requests", Metric::from_used(0.0))
        .with_metric("completions_accepted", Metric::from_used(1_930.0 + 4.0 * t))
        .with_reset("premium_requests", now + ChronoDuration::days(17))
}

/// Account whose credentials were rejected
fn gemini(now: DateTime<Utc>) -> Snapshot {
    Snapshot::new("gemini", "gemini-lab")
        .with_status(Status::Auth)
        .with_timestamp(now - ChronoDuration::minutes(31))
        .with_message("API key rejected (401).\nRun the provider login again.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use quotaboard_core::{
        extract_cost_data, Dashboard, OverrideRegistry, PlainPaint, RenderContext,
    };

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_demo_is_deterministic() {
        assert_eq!(demo_snapshots(3, now()), demo_snapshots(3, now()));
        assert_ne!(demo_snapshots(3, now()), demo_snapshots(4, now()));
    }

    #[test]
    fn test_demo_covers_dialects() {
        let set = demo_snapshots(0, now());
        assert_eq!(set.len(), 6);

        let data = extract_cost_data(set.values(), "");
        let models: Vec<String> = data.model_totals().into_iter().map(|m| m.name).collect();
        assert!(models.contains(&"gpt-4o".to_string()));
        assert!(models.contains(&"claude-sonnet-4".to_string()));
        assert!(models.contains(&"deepseek/deepseek-r1".to_string()));

        // Cursor's plan spend is the same money as its spend limit
        let cursor_budgets: Vec<_> = data
            .budgets
            .iter()
            .filter(|b| b.account_id == "cursor-pro")
            .map(|b| b.key.as_str())
            .collect();
        assert_eq!(cursor_budgets, vec!["spend_limit"]);
    }

    #[test]
    fn test_demo_renders() {
        let registry = OverrideRegistry::builtin();
        let ctx = RenderContext::new(now(), 160, 48);
        let out = Dashboard::new(&registry).render(&demo_snapshots(5, now()), &ctx, &PlainPaint);
        assert!(out.contains("Anthropic · Team"));
        assert!(out.contains("API key rejected (401)."));
    }

    #[tokio::test]
    async fn test_source_sends_snapshots() {
        let state = AppState::shared();
        let mut rx = DemoSource::new(Duration::from_millis(5), state.clone()).start();
        match rx.recv().await {
            Some(SourceMessage::SnapshotsUpdated(set)) => assert_eq!(set.len(), 6),
            other => panic!("unexpected message: {:?}", other),
        }
        state.write().quit();
    }
}

//! Response panel: pretty-printed JSON revealed one line at a time.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;

use crate::fence::FlowFence;
use crate::timers::TimerRegistry;

/// Text shown when nothing has been rendered, and after a reset.
pub const EMPTY_OUTPUT: &str = "{}";

/// Observable output text. Each render or reset starts a new generation, so an
/// in-flight reveal from an older render stops at its next step.
#[derive(Debug, Clone)]
pub struct OutputPanel {
    inner: Arc<OutputInner>,
}

#[derive(Debug)]
struct OutputInner {
    text: watch::Sender<String>,
    fence: FlowFence,
    timers: TimerRegistry,
    line_delay: Duration,
}

impl OutputPanel {
    /// Panel showing [`EMPTY_OUTPUT`]; reveal steps are scheduled on `timers`.
    #[must_use]
    pub fn new(timers: TimerRegistry, line_delay: Duration) -> Self {
        let (text, _) = watch::channel(EMPTY_OUTPUT.to_string());
        Self {
            inner: Arc::new(OutputInner {
                text,
                fence: FlowFence::new(),
                timers,
                line_delay,
            }),
        }
    }

    /// Receiver that observes every revealed step.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.inner.text.subscribe()
    }

    /// Currently visible text.
    #[must_use]
    pub fn text(&self) -> String {
        self.inner.text.borrow().clone()
    }

    /// Show `value` pretty-printed. With a non-zero line delay the first line
    /// appears immediately and each further line after one delay.
    pub fn render(&self, value: &Value) {
        let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        let flow = self.inner.fence.begin();
        let lines: Vec<String> = pretty.lines().map(str::to_owned).collect();

        if self.inner.line_delay.is_zero() || lines.len() <= 1 {
            self.inner.text.send_replace(pretty);
            return;
        }

        self.inner.text.send_replace(lines[0].clone());
        let panel = self.clone();
        self.inner.timers.spawn(async move {
            for shown in 2..=lines.len() {
                if panel.inner.timers.sleep(panel.inner.line_delay).await.is_err() {
                    return;
                }
                if !panel.inner.fence.is_current(flow) {
                    return;
                }
                panel.inner.text.send_replace(lines[..shown].join("\n"));
            }
        });
    }

    /// Show [`EMPTY_OUTPUT`] and cancel any in-flight reveal.
    pub fn reset(&self) {
        self.inner.fence.begin();
        self.inner.text.send_replace(EMPTY_OUTPUT.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::time;

    const LINE: Duration = Duration::from_millis(62);

    fn sample() -> Value {
        json!({"hash": "abc", "name": "Movie", "status": "downloading"})
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_renders_at_once() {
        let panel = OutputPanel::new(TimerRegistry::new(), Duration::ZERO);
        assert_eq!(panel.text(), EMPTY_OUTPUT);

        panel.render(&sample());
        assert_eq!(
            panel.text(),
            serde_json::to_string_pretty(&sample()).expect("pretty")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn lines_are_revealed_one_delay_apart() {
        let panel = OutputPanel::new(TimerRegistry::new(), LINE);
        let pretty = serde_json::to_string_pretty(&sample()).expect("pretty");
        let total = pretty.lines().count();

        panel.render(&sample());
        assert_eq!(panel.text(), "{");

        time::sleep(LINE + Duration::from_millis(1)).await;
        assert_eq!(panel.text().lines().count(), 2);

        time::sleep(LINE * u32::try_from(total).expect("small")).await;
        assert_eq!(panel.text(), pretty);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_inflight_reveal() {
        let panel = OutputPanel::new(TimerRegistry::new(), LINE);
        panel.render(&sample());
        time::sleep(LINE + Duration::from_millis(1)).await;

        panel.reset();
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(panel.text(), EMPTY_OUTPUT);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_render_supersedes_older_reveal() {
        let panel = OutputPanel::new(TimerRegistry::new(), LINE);
        panel.render(&sample());
        time::sleep(Duration::from_millis(70)).await;

        let error = json!({"error": "boom"});
        panel.render(&error);
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(
            panel.text(),
            serde_json::to_string_pretty(&error).expect("pretty")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn disposal_freezes_the_reveal() {
        let timers = TimerRegistry::new();
        let panel = OutputPanel::new(timers.clone(), LINE);
        panel.render(&sample());

        timers.dispose();
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(panel.text(), "{");
    }
}

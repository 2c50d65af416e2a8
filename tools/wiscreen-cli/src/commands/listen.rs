//! Follow a live detector feed on stdin.
//!
//! Each stdin line is either a JSON detector frame or one of the actions
//! `capture`, `toggle`, `reset`, `status`. Lines are handled in arrival
//! order. A frame that is still waiting when a newer frame arrives is
//! replaced, so a slow consumer only sees the latest one; actions are never
//! dropped and never overtaken by later frames.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::Notify;
use wiscreen_calibration_core::EyeGuard;
use wiscreen_common::prefs::PreferenceStore;
use wiscreen_model::DetectorFrame;

use super::Context;

/// User action read from stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Capture,
    Toggle,
    Reset,
    Status,
}

impl std::str::FromStr for Action {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "capture" => Ok(Action::Capture),
            "toggle" => Ok(Action::Toggle),
            "reset" => Ok(Action::Reset),
            "status" => Ok(Action::Status),
            _ => Err(()),
        }
    }
}

/// One parsed stdin line.
#[derive(Debug)]
enum Input {
    Frame(DetectorFrame),
    Action(Action),
}

fn parse_line(line: &str) -> Option<Result<Input, serde_json::Error>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    if let Ok(action) = line.parse::<Action>() {
        return Some(Ok(Input::Action(action)));
    }
    Some(serde_json::from_str(line).map(Input::Frame))
}

#[derive(Debug, Default)]
struct Pending {
    items: VecDeque<Input>,
    closed: bool,
}

/// Ordered hand-off between the stdin reader and the consumer.
///
/// A frame pushed directly behind another queued frame replaces it.
#[derive(Debug, Default)]
struct InputQueue {
    pending: Mutex<Pending>,
    notify: Notify,
}

impl InputQueue {
    fn push(&self, input: Input) {
        {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            let superseded = matches!(
                (pending.items.back(), &input),
                (Some(Input::Frame(_)), Input::Frame(_))
            );
            if superseded {
                pending.items.pop_back();
                tracing::trace!("Superseded frame dropped");
            }
            pending.items.push_back(input);
        }
        self.notify.notify_one();
    }

    fn close(&self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .closed = true;
        self.notify.notify_one();
    }

    /// Next input, or `None` once the queue is closed and drained.
    async fn pop(&self) -> Option<Input> {
        loop {
            {
                let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(input) = pending.items.pop_front() {
                    return Some(input);
                }
                if pending.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }
}

pub async fn run(ctx: &Context, eye_mode: bool) -> anyhow::Result<()> {
    let mut guard = ctx.open_guard()?;
    guard.set_eye_mode(eye_mode);
    println!("{}", guard.report());

    let mut stdout = std::io::stdout();
    run_session(tokio::io::stdin(), &mut guard, &mut stdout).await
}

/// Read `input` line by line and drive `guard` until the input ends.
async fn run_session<R, S, W>(
    input: R,
    guard: &mut EyeGuard<S>,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    S: PreferenceStore,
    W: Write,
{
    let queue = InputQueue::default();

    let reader = async {
        let result = read_lines(input, &queue).await;
        queue.close();
        result
    };
    let consumer = async {
        while let Some(input) = queue.pop().await {
            match input {
                Input::Frame(frame) => on_frame(guard, &frame, out)?,
                Input::Action(action) => apply(guard, action, out)?,
            }
        }
        Ok::<_, std::io::Error>(())
    };

    tokio::try_join!(reader, consumer)?;
    Ok(())
}

async fn read_lines<R: AsyncRead + Unpin>(input: R, queue: &InputQueue) -> std::io::Result<()> {
    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            None => {}
            Some(Ok(input)) => queue.push(input),
            Some(Err(e)) => tracing::warn!("Skipping malformed line: {e}"),
        }
    }
    tracing::debug!("Input closed");
    Ok(())
}

fn on_frame<S: PreferenceStore, W: Write>(
    guard: &mut EyeGuard<S>,
    frame: &DetectorFrame,
    out: &mut W,
) -> std::io::Result<()> {
    let ratio = match frame.face_ratio() {
        Ok(ratio) => ratio,
        Err(e) => {
            tracing::warn!(t = frame.timestamp_ms, "Skipping frame: {e}");
            return Ok(());
        }
    };
    if let Some(update) = guard.observe(ratio) {
        if update.changed {
            writeln!(
                out,
                "t={}ms radius={:.1} alpha={}",
                frame.timestamp_ms, update.blur.radius, update.blur.alpha
            )?;
        }
    }
    Ok(())
}

fn apply<S: PreferenceStore, W: Write>(
    guard: &mut EyeGuard<S>,
    action: Action,
    out: &mut W,
) -> std::io::Result<()> {
    match action {
        Action::Capture => match guard.capture() {
            Ok(outcome) => {
                writeln!(out, "Calibration: {}", outcome.status)?;
                if let Some(baseline) = outcome.baseline {
                    writeln!(out, "Baseline ratio: {}%", baseline.percent())?;
                }
            }
            Err(e) => writeln!(out, "Capture failed: {e}")?,
        },
        Action::Toggle => {
            let blur = guard.toggle_eye_mode();
            writeln!(
                out,
                "Eye mode: {} (radius={:.1} alpha={})",
                if guard.eye_mode() { "on" } else { "off" },
                blur.radius,
                blur.alpha
            )?;
        }
        Action::Reset => match guard.reset() {
            Ok(()) => writeln!(out, "Calibration reset")?,
            Err(e) => writeln!(out, "Reset failed: {e}")?,
        },
        Action::Status => writeln!(out, "{}", guard.report())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiscreen_calibration_core::Phase;
    use wiscreen_common::prefs::MemoryStore;
    use wiscreen_model::BlurPolicy;

    fn guard() -> EyeGuard<MemoryStore> {
        EyeGuard::new(MemoryStore::new(), BlurPolicy::default()).unwrap()
    }

    fn frame(t: u64) -> Input {
        Input::Frame(DetectorFrame::empty(t))
    }

    #[test]
    fn test_parse_actions() {
        assert!(matches!(
            parse_line("capture"),
            Some(Ok(Input::Action(Action::Capture)))
        ));
        assert!(matches!(
            parse_line("  toggle "),
            Some(Ok(Input::Action(Action::Toggle)))
        ));
    }

    #[test]
    fn test_parse_frame() {
        match parse_line(r#"{"t": 40, "ratio": 0.3}"#) {
            Some(Ok(Input::Frame(frame))) => {
                assert_eq!(frame.timestamp_ms, 40);
                assert!(frame.face_ratio().unwrap().is_some());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_skips_blank_and_comments() {
        assert!(parse_line("").is_none());
        assert!(parse_line("# header").is_none());
    }

    #[test]
    fn test_malformed_line_is_error() {
        assert!(matches!(parse_line("{not json"), Some(Err(_))));
        assert!(matches!(parse_line("explode"), Some(Err(_))));
    }

    #[tokio::test]
    async fn test_queue_keeps_latest_frame_without_reordering_actions() {
        let queue = InputQueue::default();
        queue.push(frame(0));
        queue.push(frame(33));
        queue.push(Input::Action(Action::Capture));
        queue.push(frame(66));
        queue.push(frame(100));
        queue.close();

        let mut seen = Vec::new();
        while let Some(input) = queue.pop().await {
            seen.push(match input {
                Input::Frame(frame) => format!("frame {}", frame.timestamp_ms),
                Input::Action(action) => format!("{action:?}"),
            });
        }
        assert_eq!(seen, ["frame 33", "Capture", "frame 100"]);
    }

    #[tokio::test]
    async fn test_capture_sees_frame_from_previous_line() {
        for _ in 0..50 {
            let mut g = guard();
            let mut out = Vec::new();
            let input: &[u8] = b"{\"t\":0,\"ratio\":0.3}\ncapture\n";
            run_session(input, &mut g, &mut out).await.unwrap();

            let text = String::from_utf8(out).unwrap();
            assert!(text.contains("Calibration: 1/3"), "output: {text}");
            assert_eq!(g.phase(), Phase::Calibrating { count: 1 });
        }
    }

    #[tokio::test]
    async fn test_session_calibrates_from_interleaved_input() {
        let mut g = guard();
        let mut out = Vec::new();
        let input: &[u8] = b"\
{\"t\":0,\"ratio\":0.2}\ncapture\n\
{\"t\":33,\"ratio\":0.9}\n{\"t\":66,\"ratio\":0.25}\ncapture\n\
{\"t\":100,\"ratio\":0.3}\ncapture\n\
toggle\n{\"t\":133,\"ratio\":0.7}\n";
        run_session(input, &mut g, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Baseline ratio: 25%"), "output: {text}");
        assert_eq!(g.phase(), Phase::Calibrated);
        assert!(g.eye_mode());
        assert!(text.contains("t=133ms"), "output: {text}");
    }
}

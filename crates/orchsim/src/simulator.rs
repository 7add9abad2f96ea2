//! The orchestration simulator.
//!
//! A [`Simulator`] owns the session log, the seeded generator, a clock, and
//! the queue of pending resolutions. Every operation is `&mut self` and
//! single-threaded; deferred work only runs when the owner pumps the queue
//! or advances a virtual clock.
//!
//! # Resolution
//!
//! `send_user` draws the latency and the outcome sample up front, then
//! schedules the resolution. When it fires, the chaos multiplier in effect
//! *at that moment* is applied to the configured percentages and the sample
//! is classified. Drawing before waiting means the same seed and the same
//! sequence of calls always reproduce the same delays and outcomes.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::event_log::{Decision, DecisionLog};
use crate::palette::{INJECTED_SYSTEM_TEXT, PaletteCommand};
use crate::{Clock, Message, MessageId, Rng, Role, SimClock, SimError, SimRng, Status, TimerQueue};

pub const DEFAULT_DELAY_MIN_MS: u64 = 800;
pub const DEFAULT_DELAY_MAX_MS: u64 = 2_500;
pub const DEFAULT_WARNING_PCT: f64 = 0.10;
pub const DEFAULT_ERROR_PCT: f64 = 0.05;
pub const DEFAULT_LONG_RUNNING_DELAY_MS: u64 = 10_000;

/// Multiplier applied to both percentages while chaos mode is active.
pub const CHAOS_MULTIPLIER: f64 = 2.0;

/// Content of an assistant message awaiting resolution.
pub const PLACEHOLDER_CONTENT: &str = "…";

const SESSION_PREFIX: &str = "sess-";

// ============================================================================
// Options
// ============================================================================

/// Construction-time configuration. Immutable once the simulator exists.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorOptions {
    /// Seed for the generator. `None` derives one from wall-clock time.
    pub seed: Option<u32>,
    /// Lower bound of the resolution latency, inclusive.
    pub base_delay_min_ms: u64,
    /// Upper bound of the resolution latency, inclusive.
    pub base_delay_max_ms: u64,
    /// Base probability of a warning outcome.
    pub warning_pct: f64,
    /// Base probability of an error outcome.
    pub error_pct: f64,
    /// Fixed delay before a long-running task resolves.
    pub long_running_delay_ms: u64,
    /// Cancel pending timers on `clear` instead of letting them no-op.
    pub cancel_pending_on_clear: bool,
    /// Keep a [`DecisionLog`]. The log grows with every scheduled and fired
    /// resolution and survives `clear`, so long-running drivers turn it off.
    pub record_decisions: bool,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self {
            seed: None,
            base_delay_min_ms: DEFAULT_DELAY_MIN_MS,
            base_delay_max_ms: DEFAULT_DELAY_MAX_MS,
            warning_pct: DEFAULT_WARNING_PCT,
            error_pct: DEFAULT_ERROR_PCT,
            long_running_delay_ms: DEFAULT_LONG_RUNNING_DELAY_MS,
            cancel_pending_on_clear: false,
            record_decisions: true,
        }
    }
}

impl SimulatorOptions {
    /// Sets an explicit seed.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the resolution latency bounds (both inclusive).
    pub fn with_delay_range(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.base_delay_min_ms = min_ms;
        self.base_delay_max_ms = max_ms;
        self
    }

    /// Sets the base warning probability.
    pub fn with_warning_pct(mut self, pct: f64) -> Self {
        self.warning_pct = pct;
        self
    }

    /// Sets the base error probability.
    pub fn with_error_pct(mut self, pct: f64) -> Self {
        self.error_pct = pct;
        self
    }

    /// Sets the long-running task delay.
    pub fn with_long_running_delay_ms(mut self, delay_ms: u64) -> Self {
        self.long_running_delay_ms = delay_ms;
        self
    }

    /// Cancels outstanding timers when the log is cleared.
    pub fn with_cancel_pending_on_clear(mut self) -> Self {
        self.cancel_pending_on_clear = true;
        self
    }

    /// Stops recording decisions; `decisions()` stays empty.
    pub fn without_decision_log(mut self) -> Self {
        self.record_decisions = false;
        self
    }
}

/// Seed derived from wall-clock milliseconds, truncated to 31 bits.
pub fn time_derived_seed() -> u32 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis());
    (millis % (1u128 << 31)) as u32
}

/// Renders a seed as a session id: `sess-` followed by the seed in base 36.
pub fn session_id_for_seed(seed: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut n = seed;
    let mut digits = Vec::new();
    loop {
        digits.push(DIGITS[(n % 36) as usize] as char);
        n /= 36;
        if n == 0 {
            break;
        }
    }

    let mut id = String::from(SESSION_PREFIX);
    id.extend(digits.iter().rev());
    id
}

// ============================================================================
// Outcomes
// ============================================================================

/// Terminal outcome of a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Warning,
    Error,
}

impl From<Outcome> for Status {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => Status::Success,
            Outcome::Warning => Status::Warning,
            Outcome::Error => Status::Error,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Status::from(*self).fmt(f)
    }
}

/// Buckets a sample: `[0, error)` is an error, `[error, error + warning)` a
/// warning, everything above a success. A sample on a boundary belongs to
/// the higher bucket.
pub fn classify(sample: f64, error_pct: f64, warning_pct: f64) -> Outcome {
    if sample < error_pct {
        Outcome::Error
    } else if sample < error_pct + warning_pct {
        Outcome::Warning
    } else {
        Outcome::Success
    }
}

// ============================================================================
// Session Status
// ============================================================================

/// Coarse session status derived from the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    Online,
    Executing,
    Degraded,
}

impl SessionStatus {
    /// `Executing` while anything is in flight, else `Degraded` if any entry
    /// errored, else `Online`.
    pub fn derive(messages: &[Message]) -> Self {
        if messages.iter().any(|m| m.status == Status::Executing) {
            SessionStatus::Executing
        } else if messages.iter().any(|m| m.status == Status::Error) {
            SessionStatus::Degraded
        } else {
            SessionStatus::Online
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionStatus::Online => "Online",
            SessionStatus::Executing => "Executing",
            SessionStatus::Degraded => "Degraded",
        })
    }
}

// ============================================================================
// Simulator
// ============================================================================

/// Deferred work held in the timer queue.
#[derive(Debug, Clone)]
enum Pending {
    Resolve {
        message_id: MessageId,
        prompt: String,
        sample: f64,
    },
    LongRunning {
        message_id: MessageId,
    },
}

impl Pending {
    fn message_id(&self) -> &MessageId {
        match self {
            Pending::Resolve { message_id, .. } | Pending::LongRunning { message_id } => {
                message_id
            }
        }
    }
}

/// A session-scoped message log with simulated asynchronous resolution.
pub struct Simulator<R: Rng = SimRng, C: Clock = SimClock> {
    options: SimulatorOptions,
    seed: u32,
    session_id: String,
    rng: R,
    clock: C,
    timers: TimerQueue<Pending>,
    messages: Vec<Message>,
    chaos_mode: bool,
    next_seq: u64,
    decisions: DecisionLog,
}

impl Simulator<SimRng, SimClock> {
    /// Creates a simulator on a virtual clock starting at zero.
    pub fn new(options: SimulatorOptions) -> Self {
        Self::with_clock(options, SimClock::new())
    }
}

impl<C: Clock> Simulator<SimRng, C> {
    /// Creates a simulator on the given clock.
    pub fn with_clock(options: SimulatorOptions, clock: C) -> Self {
        let seed = options.seed.unwrap_or_else(time_derived_seed);
        let options = SimulatorOptions {
            seed: Some(seed),
            ..options
        };
        Self::from_parts(options, SimRng::new(seed), clock)
    }
}

impl<R: Rng, C: Clock> Simulator<R, C> {
    /// Creates a simulator from an arbitrary generator and clock.
    ///
    /// The session id and templates use `options.seed` (time-derived when
    /// absent); the generator is used as given.
    pub fn from_parts(options: SimulatorOptions, rng: R, clock: C) -> Self {
        let seed = options.seed.unwrap_or_else(time_derived_seed);
        let session_id = session_id_for_seed(seed);

        if options.base_delay_max_ms < options.base_delay_min_ms {
            tracing::warn!(
                min_ms = options.base_delay_min_ms,
                max_ms = options.base_delay_max_ms,
                "delay range is inverted; send_user will fail"
            );
        }

        let mut sim = Self {
            options: SimulatorOptions {
                seed: Some(seed),
                ..options
            },
            seed,
            session_id,
            rng,
            clock,
            timers: TimerQueue::new(),
            messages: Vec::new(),
            chaos_mode: false,
            next_seq: 0,
            decisions: DecisionLog::new(),
        };

        tracing::info!(session_id = %sim.session_id, seed, "session started");
        let text = format!("Session started: {}", sim.session_id);
        sim.push_system(text);
        sim
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Returns a copy of the log in insertion order.
    pub fn messages(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Returns a copy of a single entry.
    pub fn message(&self, id: &MessageId) -> Option<Message> {
        self.messages.iter().find(|m| &m.id == id).cloned()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn options(&self) -> &SimulatorOptions {
        &self.options
    }

    pub fn chaos_mode(&self) -> bool {
        self.chaos_mode
    }

    /// Number of timers still waiting to fire.
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Deadline of the next timer, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus::derive(&self.messages)
    }

    pub fn decisions(&self) -> &DecisionLog {
        &self.decisions
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Appends a user message and an executing assistant reply, and
    /// schedules the reply's resolution. Returns the assistant message id.
    ///
    /// Content is not validated. Fails only if the configured delay range is
    /// inverted, in which case nothing is appended.
    pub fn send_user(&mut self, content: impl Into<String>) -> Result<MessageId, SimError> {
        let delay_ms = self.draw_delay()?;
        let sample = self.rng.next_f64();

        let content = content.into();
        let now = self.clock.now_ms();

        let user_id = self.next_id("u");
        self.messages.push(Message::terminal(
            user_id,
            Role::User,
            Status::Success,
            content.clone(),
            now,
        ));

        let assistant_id = self.next_id("a");
        self.messages.push(Message::executing(
            assistant_id.clone(),
            PLACEHOLDER_CONTENT,
            now,
        ));

        let due_at_ms = now.saturating_add(delay_ms);
        self.timers.schedule(
            due_at_ms,
            Pending::Resolve {
                message_id: assistant_id.clone(),
                prompt: content,
                sample,
            },
        );
        self.record(
            now,
            Decision::ResolutionScheduled {
                message_id: assistant_id.clone(),
                delay_ms,
                sample,
                due_at_ms,
            },
        );
        tracing::debug!(message_id = %assistant_id, delay_ms, sample, due_at_ms, "resolution scheduled");

        Ok(assistant_id)
    }

    /// Appends a terminal system message.
    pub fn push_system(&mut self, text: impl Into<String>) -> MessageId {
        let id = self.next_id("m");
        let now = self.clock.now_ms();
        self.messages.push(Message::terminal(
            id.clone(),
            Role::System,
            Status::Success,
            text,
            now,
        ));
        id
    }

    /// Discards the log and appends a "session restarted" message.
    ///
    /// The generator, session id, and chaos mode are untouched. Pending
    /// resolutions targeting cleared messages become no-ops.
    pub fn clear(&mut self) {
        self.messages.clear();

        let cancelled_timers = if self.options.cancel_pending_on_clear {
            let cancelled = self.timers.len();
            self.timers.clear();
            cancelled
        } else {
            0
        };

        let now = self.clock.now_ms();
        self.record(now, Decision::Cleared { cancelled_timers });
        tracing::info!(session_id = %self.session_id, cancelled_timers, "session cleared");

        let text = format!("Session restarted: {}", self.session_id);
        self.push_system(text);
    }

    /// Flips chaos mode and announces the new state. Returns the new state.
    pub fn toggle_chaos_mode(&mut self) -> bool {
        self.chaos_mode = !self.chaos_mode;

        let now = self.clock.now_ms();
        self.record(
            now,
            Decision::ChaosToggled {
                enabled: self.chaos_mode,
            },
        );
        tracing::info!(enabled = self.chaos_mode, "chaos mode toggled");

        let text = if self.chaos_mode {
            "Chaos mode enabled"
        } else {
            "Chaos mode disabled"
        };
        self.push_system(text);
        self.chaos_mode
    }

    /// Appends an assistant message already failed, bypassing resolution.
    pub fn inject_error(&mut self) -> MessageId {
        let id = self.next_id("a");
        let now = self.clock.now_ms();
        self.messages.push(Message::terminal(
            id.clone(),
            Role::Assistant,
            Status::Error,
            "ERROR: injected error via control",
            now,
        ));
        id
    }

    /// Appends an executing assistant message that succeeds after the
    /// configured long-running delay.
    pub fn simulate_long_running(&mut self) -> MessageId {
        let id = self.next_id("a");
        let now = self.clock.now_ms();
        self.messages.push(Message::executing(
            id.clone(),
            "Long running task started",
            now,
        ));

        let due_at_ms = now.saturating_add(self.options.long_running_delay_ms);
        self.timers.schedule(
            due_at_ms,
            Pending::LongRunning {
                message_id: id.clone(),
            },
        );
        self.record(
            now,
            Decision::LongRunningScheduled {
                message_id: id.clone(),
                due_at_ms,
            },
        );
        id
    }

    /// Runs a palette command against this session.
    pub fn apply_command(&mut self, command: PaletteCommand) {
        match command {
            PaletteCommand::Clear => self.clear(),
            PaletteCommand::InjectSystem => {
                self.push_system(INJECTED_SYSTEM_TEXT);
            }
            PaletteCommand::Chaos => {
                self.toggle_chaos_mode();
            }
        }
    }

    // ------------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------------

    /// Fires every timer due at the clock's current time. Returns the count.
    pub fn pump(&mut self) -> usize {
        let now = self.clock.now_ms();
        let mut fired = 0;
        while let Some(timer) = self.timers.pop_due(now) {
            self.fire(timer.payload);
            fired += 1;
        }
        fired
    }

    /// Moves a virtual clock to `target_ms`, firing timers at their exact
    /// deadlines along the way. On a wall clock this only pumps.
    pub fn advance_to(&mut self, target_ms: u64) -> usize {
        if !self.clock.is_virtual() {
            return self.pump();
        }

        let mut fired = 0;
        while let Some(deadline) = self.timers.next_deadline() {
            if deadline > target_ms {
                break;
            }
            if deadline > self.clock.now_ms() {
                self.clock.advance_to(deadline);
            }
            fired += self.pump();
        }

        if target_ms > self.clock.now_ms() {
            self.clock.advance_to(target_ms);
        }
        fired
    }

    /// Moves a virtual clock forward by `delta_ms`. See [`Self::advance_to`].
    pub fn advance_by(&mut self, delta_ms: u64) -> usize {
        let target = self.clock.now_ms().saturating_add(delta_ms);
        self.advance_to(target)
    }

    /// Advances a virtual clock through every pending deadline. On a wall
    /// clock this only pumps what is already due.
    pub fn run_until_idle(&mut self) -> usize {
        if !self.clock.is_virtual() {
            return self.pump();
        }

        let mut fired = 0;
        while let Some(deadline) = self.timers.next_deadline() {
            fired += self.advance_to(deadline);
        }
        fired
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn record(&mut self, at_ms: u64, decision: Decision) {
        if self.options.record_decisions {
            self.decisions.record(at_ms, decision);
        }
    }

    fn next_id(&mut self, prefix: &str) -> MessageId {
        let seq = self.next_seq;
        self.next_seq += 1;
        MessageId::new(prefix, self.clock.now_ms(), seq)
    }

    fn draw_delay(&mut self) -> Result<u64, SimError> {
        let min = i64::try_from(self.options.base_delay_min_ms).unwrap_or(i64::MAX);
        let max = i64::try_from(self.options.base_delay_max_ms).unwrap_or(i64::MAX);
        let delay = self.rng.random_int(min, max)?;
        // min >= 0, so the draw is non-negative.
        Ok(delay as u64)
    }

    fn fire(&mut self, pending: Pending) {
        let now = self.clock.now_ms();

        let Some(index) = self
            .messages
            .iter()
            .position(|m| &m.id == pending.message_id())
        else {
            tracing::debug!(message_id = %pending.message_id(), "target cleared; dropping resolution");
            self.record(
                now,
                Decision::ResolutionDropped {
                    message_id: pending.message_id().clone(),
                },
            );
            return;
        };

        match pending {
            Pending::Resolve {
                message_id,
                prompt,
                sample,
            } => {
                let chaos = self.chaos_mode;
                let multiplier = if chaos { CHAOS_MULTIPLIER } else { 1.0 };
                let outcome = classify(
                    sample,
                    self.options.error_pct * multiplier,
                    self.options.warning_pct * multiplier,
                );
                let content = self.outcome_content(outcome, &prompt, sample);

                let message = &mut self.messages[index];
                debug_assert_eq!(message.status, Status::Executing);
                message.content = content;
                message.status = outcome.into();
                message.finished_at = Some(now);

                self.record(
                    now,
                    Decision::Resolved {
                        message_id: message_id.clone(),
                        outcome,
                        chaos,
                    },
                );
                tracing::debug!(%message_id, %outcome, chaos, "resolution fired");
            }
            Pending::LongRunning { message_id } => {
                let chaos = self.chaos_mode;
                let message = &mut self.messages[index];
                message.content = "Long task finished (simulated)".to_string();
                message.status = Status::Success;
                message.finished_at = Some(now);

                self.record(
                    now,
                    Decision::Resolved {
                        message_id,
                        outcome: Outcome::Success,
                        chaos,
                    },
                );
            }
        }
    }

    fn outcome_content(&self, outcome: Outcome, prompt: &str, sample: f64) -> String {
        match outcome {
            Outcome::Success => format!(
                "Result: simulated OK for: \"{prompt}\"\n\n- exec: completed\n- duration: simulated\n\n(Deterministic seed: {})",
                self.seed
            ),
            Outcome::Warning => format!(
                "Warning: non-fatal issue while processing: \"{prompt}\"\n\n- code: WARN_42\n- note: degraded performance expected; retry recommended"
            ),
            Outcome::Error => {
                let trace = (sample * 1e9).floor() as u64;
                format!(
                    "ERROR: failed to execute orchestration step for: \"{prompt}\"\n\n--- DIAGNOSTIC ---\n- stage: runtime.dispatch\n- trace: 0x{trace:x}\n- suggestion: inspect upstream connector and retry\n--- END ---"
                )
            }
        }
    }
}

impl<R: Rng, C: Clock> fmt::Debug for Simulator<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("session_id", &self.session_id)
            .field("seed", &self.seed)
            .field("chaos_mode", &self.chaos_mode)
            .field("messages", &self.messages.len())
            .field("pending", &self.timers.len())
            .field("now_ms", &self.clock.now_ms())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

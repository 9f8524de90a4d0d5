//! Connection lifecycle state machine
//!
//! Pure transition logic with no I/O: every method takes one external
//! stimulus (caller request, socket callback, timer expiry) and returns the
//! side effects the driver in [`super::connection`] must perform. Keeping
//! the machine synchronous makes the timer-cancellation and backoff rules
//! testable without a network.

use std::fmt;
use std::time::Duration;

use super::backoff::ReconnectPolicy;

/// Close code for an intentional, client-requested shutdown
pub const CLOSE_NORMAL: u16 = 1000;

/// Reported when the stream ends without a close frame
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Lifecycle of the single logical channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// No channel and none wanted
    Idle,
    /// A socket is being opened
    Connecting,
    /// The channel is live; frames flow
    Open,
    /// An intentional close is in flight
    Closing,
    /// Waiting out the backoff delay before retry number `attempt`
    Reconnecting { attempt: u32, delay_ms: u64 },
    /// Retries exhausted; only a fresh connect request leaves this state
    Terminated,
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    pub fn is_reconnecting(&self) -> bool {
        matches!(self, ConnectionState::Reconnecting { .. })
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, ConnectionState::Terminated)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Idle => write!(f, "idle"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Closing => write!(f, "closing"),
            ConnectionState::Reconnecting { attempt, delay_ms } => {
                write!(f, "reconnecting (attempt {attempt}, retry in {delay_ms}ms)")
            }
            ConnectionState::Terminated => write!(f, "terminated"),
        }
    }
}

/// Side effect the I/O driver must perform after a transition
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Directive {
    /// Open a fresh socket, discarding any previous one
    OpenSocket,
    /// Close the live socket with the given close code
    CloseSocket { code: u16 },
    /// Arm the single retry timer
    ScheduleRetry { delay: Duration },
    /// Disarm any pending retry timer
    CancelRetry,
}

/// The machine itself: state + attempt counter + policy
///
/// Owned exclusively by the connection actor; nothing else reads or writes
/// the attempt counter.
pub(crate) struct ConnectionMachine {
    state: ConnectionState,
    attempts: u32,
    policy: ReconnectPolicy,
}

impl ConnectionMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: ConnectionState::Idle,
            attempts: 0,
            policy,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    #[cfg(test)]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Caller asked for a (re)connect: drop any pending retry, reset the
    /// attempt counter and open a fresh socket. Valid from every state,
    /// including `Terminated`; if a socket is already live the driver
    /// replaces it.
    pub fn connect(&mut self) -> Vec<Directive> {
        self.attempts = 0;
        self.state = ConnectionState::Connecting;
        vec![Directive::CancelRetry, Directive::OpenSocket]
    }

    /// The socket finished its handshake
    ///
    /// Only honored while `Connecting`: if a disconnect raced the dial, the
    /// pending close settles the channel and a late open must not revive it.
    pub fn opened(&mut self) {
        if matches!(self.state, ConnectionState::Connecting) {
            self.attempts = 0;
            self.state = ConnectionState::Open;
        }
    }

    /// The socket closed, or a connect attempt failed before opening
    ///
    /// An intentional close (locally requested, or carrying the normal
    /// close code) settles in `Idle`. Anything else walks the backoff
    /// schedule until the policy is exhausted.
    pub fn closed(&mut self, code: u16) -> Option<Directive> {
        match self.state {
            // Nothing was live; a stale notification changes nothing.
            ConnectionState::Idle | ConnectionState::Terminated => return None,
            ConnectionState::Closing => {
                self.state = ConnectionState::Idle;
                return None;
            }
            _ => {}
        }
        if code == CLOSE_NORMAL {
            self.state = ConnectionState::Idle;
            return None;
        }
        self.attempts += 1;
        if self.policy.exhausted(self.attempts) {
            self.state = ConnectionState::Terminated;
            return None;
        }
        let delay = self.policy.delay_for(self.attempts);
        self.state = ConnectionState::Reconnecting {
            attempt: self.attempts,
            delay_ms: delay.as_millis() as u64,
        };
        Some(Directive::ScheduleRetry { delay })
    }

    /// The retry timer fired; a timer that outlived its reconnect window
    /// (disconnect raced the deadline) is ignored
    pub fn retry_due(&mut self) -> Option<Directive> {
        if self.state.is_reconnecting() {
            self.state = ConnectionState::Connecting;
            Some(Directive::OpenSocket)
        } else {
            None
        }
    }

    /// Caller asked to stop: cancel any pending retry and pin the attempt
    /// counter at the maximum so a racing close cannot schedule one, then
    /// close the socket with the intentional code if one is live
    pub fn disconnect(&mut self) -> Vec<Directive> {
        self.attempts = self.policy.max_attempts;
        let mut directives = vec![Directive::CancelRetry];
        match self.state {
            ConnectionState::Open | ConnectionState::Connecting => {
                self.state = ConnectionState::Closing;
                directives.push(Directive::CloseSocket { code: CLOSE_NORMAL });
            }
            ConnectionState::Reconnecting { .. } => {
                self.state = ConnectionState::Idle;
            }
            // Idle and Closing stay put; Terminated remains terminal until
            // the next explicit connect.
            _ => {}
        }
        directives
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> ConnectionMachine {
        ConnectionMachine::new(ReconnectPolicy::default())
    }

    /// Drive one abnormal close and return the scheduled delay in ms.
    fn fail_once(m: &mut ConnectionMachine) -> Option<u64> {
        match m.closed(CLOSE_ABNORMAL) {
            Some(Directive::ScheduleRetry { delay }) => {
                // The timer fires and the machine goes back to Connecting.
                assert_eq!(m.retry_due(), Some(Directive::OpenSocket));
                Some(delay.as_millis() as u64)
            }
            Some(other) => panic!("unexpected directive {other:?}"),
            None => None,
        }
    }

    #[test]
    fn test_backoff_sequence_then_terminated() {
        let mut m = machine();
        m.connect();
        m.opened();

        let mut delays = Vec::new();
        while let Some(delay) = fail_once(&mut m) {
            delays.push(delay);
        }
        assert_eq!(delays, vec![2000, 4000, 8000, 16000, 30000]);
        assert!(m.state().is_terminated());
        // No further timer is scheduled once terminated.
        assert_eq!(m.retry_due(), None);
        assert!(m.state().is_terminated());
    }

    #[test]
    fn test_normal_close_never_reconnects() {
        let mut m = machine();
        m.connect();
        m.opened();
        // Build up attempts first so the counter is non-zero.
        assert!(fail_once(&mut m).is_some());
        assert!(fail_once(&mut m).is_some());
        assert_eq!(m.closed(CLOSE_NORMAL), None);
        assert_eq!(*m.state(), ConnectionState::Idle);
    }

    #[test]
    fn test_disconnect_while_reconnecting_cancels_timer() {
        let mut m = machine();
        m.connect();
        m.opened();
        m.closed(CLOSE_ABNORMAL);
        assert!(m.state().is_reconnecting());

        let directives = m.disconnect();
        assert!(directives.contains(&Directive::CancelRetry));
        assert_eq!(*m.state(), ConnectionState::Idle);

        // The original deadline elapsing must not reopen the channel.
        assert_eq!(m.retry_due(), None);
        assert_eq!(*m.state(), ConnectionState::Idle);
    }

    #[test]
    fn test_disconnect_pins_attempts_at_max() {
        let mut m = machine();
        m.connect();
        m.opened();
        let directives = m.disconnect();
        assert!(directives.contains(&Directive::CloseSocket { code: CLOSE_NORMAL }));
        assert_eq!(*m.state(), ConnectionState::Closing);
        assert_eq!(m.attempts(), 5);

        // A racing abnormal close settles the intentional shutdown.
        assert_eq!(m.closed(CLOSE_ABNORMAL), None);
        assert_eq!(*m.state(), ConnectionState::Idle);
    }

    #[test]
    fn test_connect_resets_attempts_and_cancels_retry() {
        let mut m = machine();
        m.connect();
        m.opened();
        m.closed(CLOSE_ABNORMAL);
        m.retry_due();
        m.closed(CLOSE_ABNORMAL);
        assert_eq!(m.attempts(), 2);

        let directives = m.connect();
        assert_eq!(
            directives,
            vec![Directive::CancelRetry, Directive::OpenSocket]
        );
        assert_eq!(m.attempts(), 0);
        assert_eq!(*m.state(), ConnectionState::Connecting);
    }

    #[test]
    fn test_connect_leaves_terminated() {
        let mut m = machine();
        m.connect();
        for _ in 0..6 {
            m.closed(CLOSE_ABNORMAL);
            m.retry_due();
        }
        assert!(m.state().is_terminated());

        m.connect();
        assert_eq!(*m.state(), ConnectionState::Connecting);
    }

    #[test]
    fn test_opened_resets_attempt_counter() {
        let mut m = machine();
        m.connect();
        m.closed(CLOSE_ABNORMAL);
        m.retry_due();
        m.opened();
        assert_eq!(m.attempts(), 0);
        // The next failure starts the schedule from the beginning.
        assert_eq!(
            m.closed(CLOSE_ABNORMAL),
            Some(Directive::ScheduleRetry {
                delay: Duration::from_secs(2)
            })
        );
    }

    #[test]
    fn test_open_racing_a_disconnect_is_ignored() {
        let mut m = machine();
        m.connect();
        // Disconnect lands while the dial is still in flight.
        m.disconnect();
        assert_eq!(*m.state(), ConnectionState::Closing);

        m.opened();
        assert_eq!(*m.state(), ConnectionState::Closing);

        // The close handshake settles the channel.
        assert_eq!(m.closed(CLOSE_NORMAL), None);
        assert_eq!(*m.state(), ConnectionState::Idle);
    }

    #[test]
    fn test_stale_close_in_idle_is_ignored() {
        let mut m = machine();
        assert_eq!(m.closed(CLOSE_ABNORMAL), None);
        assert_eq!(*m.state(), ConnectionState::Idle);
    }
}

use std::time::Duration;

use tokio::time::Instant;

/// Decides when the text typed in the search box is sent as a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPolicy {
    /// Fires once the input has been left untouched for the given delay
    Debounce(Duration),
    /// Fires every `n` input changes, whatever the delay between them
    KeystrokeCount(usize),
}

/// A search to perform, tagged with its position in the sequence of issued searches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub sequence: u64,
    pub query: String,
}

/// State machine turning input changes into search requests.
///
/// Time is passed in by the caller so the machine can be driven by a real timer
/// or stepped deterministically.
/// Every issued search carries a strictly increasing sequence number; a response is only
/// worth displaying if `is_current` holds for its sequence number.
#[derive(Debug)]
pub struct SearchTrigger {
    policy: TriggerPolicy,
    text: String,
    keystrokes: usize,
    deadline: Option<Instant>,
    last_sequence: u64,
}

impl SearchTrigger {
    pub fn new(policy: TriggerPolicy) -> Self {
        Self {
            policy,
            text: String::new(),
            keystrokes: 0,
            deadline: None,
            last_sequence: 0,
        }
    }

    pub fn policy(&self) -> TriggerPolicy {
        self.policy
    }

    /// Records the current full text of the input after a change.
    ///
    /// Only the keystroke policy can fire right away. The debounce policy (re)arms its
    /// deadline, see `poll`.
    pub fn on_input(&mut self, text: &str, now: Instant) -> Option<SearchTicket> {
        self.text = text.to_string();

        match self.policy {
            TriggerPolicy::Debounce(delay) => {
                self.deadline = Some(now + delay);
                None
            }
            TriggerPolicy::KeystrokeCount(count) => {
                self.keystrokes += 1;
                if self.keystrokes < count.max(1) {
                    return None;
                }
                // The counter resets even when nothing is sent
                self.keystrokes = 0;
                self.issue()
            }
        }
    }

    /// Fires the pending debounced search if its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<SearchTicket> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                self.issue()
            }
            _ => None,
        }
    }

    /// When the pending debounced search is due, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether `sequence` is the last search issued
    pub fn is_current(&self, sequence: u64) -> bool {
        sequence != 0 && sequence == self.last_sequence
    }

    fn issue(&mut self) -> Option<SearchTicket> {
        let query = self.text.trim();
        if query.is_empty() {
            return None;
        }

        self.last_sequence += 1;
        Some(SearchTicket {
            sequence: self.last_sequence,
            query: query.to_string(),
        })
    }
}

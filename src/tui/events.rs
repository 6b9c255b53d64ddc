//! TUI Event System
//!
//! Handles user input and application events for the terminal interface.

use crate::auth::{ApiError, AuthResponse, AuthScreen};
use crate::onboarding::provider::{AccountsEvent, WalletError};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Events that can occur in the TUI
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// User pressed a key
    Key(KeyEvent),

    /// User pasted text
    Paste(String),

    /// Terminal was resized
    Resize(u16, u16),

    /// Request to quit
    Quit,

    /// Tick event for animations/updates
    Tick,

    /// A wallet provider answered (or timed out) for a connection attempt
    WalletResolved {
        attempt: Uuid,
        outcome: Result<String, WalletError>,
    },

    /// The success display delay for a connection attempt elapsed
    WalletSettled { attempt: Uuid },

    /// The connected provider reported a different account list
    AccountsChanged(AccountsEvent),

    /// Seconds left before the OTP can be resent
    OtpTick(u32),

    /// An auth request finished
    AuthCompleted {
        screen: AuthScreen,
        result: Result<AuthResponse, ApiError>,
    },
}

/// Event handler for the TUI
pub struct EventHandler {
    /// Event sender
    tx: mpsc::UnboundedSender<TuiEvent>,

    /// Event receiver
    rx: mpsc::UnboundedReceiver<TuiEvent>,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Get a sender for sending events
    pub fn sender(&self) -> mpsc::UnboundedSender<TuiEvent> {
        self.tx.clone()
    }

    /// Receive the next event (blocks until available)
    pub async fn next(&mut self) -> Option<TuiEvent> {
        self.rx.recv().await
    }

    /// Try to receive the next event without blocking
    pub fn try_next(&mut self) -> Option<TuiEvent> {
        self.rx.try_recv().ok()
    }

    /// Start listening for terminal events
    ///
    /// Uses crossterm's async EventStream so provider calls and auth
    /// requests running on the same runtime are never starved.
    pub fn start_terminal_listener(tx: mpsc::UnboundedSender<TuiEvent>) {
        use crossterm::event::EventStream;
        use futures::StreamExt;

        tokio::spawn(async move {
            let mut reader = EventStream::new();
            let tick_interval = std::time::Duration::from_millis(100);

            loop {
                // Race: next terminal event vs tick timer
                let event = tokio::select! {
                    maybe_event = reader.next() => {
                        match maybe_event {
                            Some(Ok(event)) => Some(event),
                            Some(Err(_)) => None,
                            None => break,
                        }
                    }
                    _ = tokio::time::sleep(tick_interval) => None,
                };

                if let Some(event) = event {
                    let should_break = match event {
                        crossterm::event::Event::Key(key) => {
                            // Only process key press events to avoid duplicates
                            if key.kind == crossterm::event::KeyEventKind::Press {
                                tx.send(TuiEvent::Key(key)).is_err()
                            } else {
                                false
                            }
                        }
                        crossterm::event::Event::Resize(w, h) => {
                            tx.send(TuiEvent::Resize(w, h)).is_err()
                        }
                        crossterm::event::Event::Paste(text) => {
                            tx.send(TuiEvent::Paste(text)).is_err()
                        }
                        _ => false,
                    };
                    if should_break {
                        break;
                    }
                }

                if tx.send(TuiEvent::Tick).is_err() {
                    break;
                }
            }
        });
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper function to check if a key event matches
pub fn key_matches(event: &KeyEvent, code: KeyCode, modifiers: KeyModifiers) -> bool {
    event.code == code && event.modifiers == modifiers
}

/// Common key bindings
pub mod keys {
    use super::*;

    /// Ctrl+C - Quit
    pub fn is_quit(event: &KeyEvent) -> bool {
        key_matches(event, KeyCode::Char('c'), KeyModifiers::CONTROL)
    }

    /// Ctrl+L - Sign out
    pub fn is_logout(event: &KeyEvent) -> bool {
        key_matches(event, KeyCode::Char('l'), KeyModifiers::CONTROL)
    }

    /// Ctrl+W - Open the wallet modal from anywhere in the wizard
    pub fn is_wallet(event: &KeyEvent) -> bool {
        key_matches(event, KeyCode::Char('w'), KeyModifiers::CONTROL)
    }

    /// Ctrl+D - Disconnect the wallet
    pub fn is_disconnect(event: &KeyEvent) -> bool {
        key_matches(event, KeyCode::Char('d'), KeyModifiers::CONTROL)
    }

    /// Ctrl+R - Start the wizard over
    pub fn is_reset(event: &KeyEvent) -> bool {
        key_matches(event, KeyCode::Char('r'), KeyModifiers::CONTROL)
    }

    /// Escape - Cancel/Back
    pub fn is_cancel(event: &KeyEvent) -> bool {
        event.code == KeyCode::Esc
    }

    /// Enter - Select/Confirm
    pub fn is_enter(event: &KeyEvent) -> bool {
        event.code == KeyCode::Enter && event.modifiers.is_empty()
    }

    /// Up arrow
    pub fn is_up(event: &KeyEvent) -> bool {
        event.code == KeyCode::Up && event.modifiers.is_empty()
    }

    /// Down arrow
    pub fn is_down(event: &KeyEvent) -> bool {
        event.code == KeyCode::Down && event.modifiers.is_empty()
    }

    /// Tab - next field
    pub fn is_next_field(event: &KeyEvent) -> bool {
        event.code == KeyCode::Tab
    }

    /// Shift+Tab - previous field
    pub fn is_prev_field(event: &KeyEvent) -> bool {
        event.code == KeyCode::BackTab
    }

    /// Alt+1..Alt+7 - jump to a wizard step from the sidebar
    pub fn step_jump(event: &KeyEvent) -> Option<usize> {
        if !event.modifiers.contains(KeyModifiers::ALT) {
            return None;
        }
        match event.code {
            KeyCode::Char(c @ '1'..='9') => c.to_digit(10).map(|d| d as usize),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_handler_creation() {
        let handler = EventHandler::new();
        let sender = handler.sender();
        assert!(sender.send(TuiEvent::Quit).is_ok());
    }

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let mut handler = EventHandler::new();
        let tx = handler.sender();
        tx.send(TuiEvent::OtpTick(3)).unwrap();
        tx.send(TuiEvent::Tick).unwrap();

        assert!(matches!(handler.next().await, Some(TuiEvent::OtpTick(3))));
        assert!(matches!(handler.try_next(), Some(TuiEvent::Tick)));
        assert!(handler.try_next().is_none());
    }

    #[test]
    fn test_key_matches() {
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(key_matches(&event, KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!key_matches(&event, KeyCode::Char('c'), KeyModifiers::empty()));
    }

    #[test]
    fn test_quit_key() {
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(keys::is_quit(&event));

        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::empty());
        assert!(!keys::is_quit(&event));
    }

    #[test]
    fn test_step_jump() {
        let event = KeyEvent::new(KeyCode::Char('4'), KeyModifiers::ALT);
        assert_eq!(keys::step_jump(&event), Some(4));

        let event = KeyEvent::new(KeyCode::Char('4'), KeyModifiers::empty());
        assert_eq!(keys::step_jump(&event), None);
    }
}

//! Match driver: one owner per match, one action at a time.
//!
//! `MatchDriver` holds the canonical `MatchState` and is the only caller of
//! `rules::apply` for it. Each submission either commits (both seats get a
//! fresh view plus the event log) or is rejected (only the submitter hears
//! about it).
//!
//! ## Threads
//!
//! `MatchDriver::spawn` moves the driver onto its own thread behind a
//! `crossbeam-channel` inbox. Remote actions and AI decisions all arrive on
//! that inbox, so they are applied strictly in arrival order. AI seats run
//! on a separate worker thread: it receives state snapshots, thinks, and
//! posts its action to the same inbox. A decision made for a snapshot that
//! is no longer current is dropped.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::ai::{policy_for, AiConfig, DecisionSource};
use crate::core::{
    Action, GameConfig, IllegalAction, MatchError, MatchEvent, MatchState, PlayerId, PlayerMap,
};
use crate::rules::{apply, MatchOutcome, MatchResult};
use crate::view::{project, VisibleMatchState};

use super::protocol::{ClientMessage, Outbound, ServerMessage};

/// Lifecycle of a driven match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DriverStatus {
    Running,
    /// Ended normally.
    Finished,
    /// A seat left; the other seat was awarded the match.
    Abandoned { by: PlayerId },
    /// Stopped after an internal invariant violation.
    Terminated { reason: String },
}

type Seats = PlayerMap<Option<Box<dyn DecisionSource>>>;

/// Owner of one match.
pub struct MatchDriver {
    state: MatchState,
    status: DriverStatus,
    ai: Seats,
}

impl std::fmt::Debug for MatchDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchDriver")
            .field("turn", &self.state.turn)
            .field("phase", &self.state.phase)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl MatchDriver {
    /// Create the match, with AI seats built from their difficulty.
    ///
    /// Each AI seat's policy is seeded from the match seed and its seat.
    pub fn new(config: &GameConfig) -> Result<Self, MatchError> {
        let state = MatchState::new(config)?;
        let ai = PlayerMap::new(|p| {
            config.player(p).ai.map(|difficulty| {
                let seed = config.seed ^ (0xA5A5_0000 + p.index() as u64);
                policy_for(difficulty, AiConfig::for_difficulty(difficulty).with_seed(seed))
            })
        });
        Ok(Self {
            state,
            status: DriverStatus::Running,
            ai,
        })
    }

    /// Replace the decision source of a seat.
    pub fn set_decision_source(&mut self, player: PlayerId, source: Option<Box<dyn DecisionSource>>) {
        self.ai[player] = source;
    }

    /// The canonical state.
    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    #[must_use]
    pub fn status(&self) -> &DriverStatus {
        &self.status
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == DriverStatus::Running
    }

    /// Current view for one seat.
    #[must_use]
    pub fn view(&self, player: PlayerId) -> VisibleMatchState {
        project(&self.state, player)
    }

    /// Views to send when the seats first connect.
    #[must_use]
    pub fn initial_messages(&self) -> Vec<Outbound> {
        self.broadcast_state(&[])
    }

    /// The AI seat that should act now, if any.
    #[must_use]
    pub fn pending_ai_seat(&self) -> Option<PlayerId> {
        if !self.is_running() {
            return None;
        }
        PlayerId::both().find(|&p| self.ai[p].is_some() && self.state.can_act(p))
    }

    /// Handle one client message.
    pub fn handle(&mut self, message: ClientMessage) -> Vec<Outbound> {
        match message {
            ClientMessage::Act { player, action } => self.submit(player, action),
            ClientMessage::Abandon { player } => self.abandon(player),
        }
    }

    /// Apply an action from `player` and produce the outgoing messages.
    pub fn submit(&mut self, player: PlayerId, action: Action) -> Vec<Outbound> {
        if !self.is_running() {
            return vec![Outbound::new(
                player,
                ServerMessage::Rejected {
                    reason: IllegalAction::MatchOver,
                },
            )];
        }

        match apply(&self.state, player, &action) {
            Ok(applied) => {
                self.state = applied.state;
                let mut out = self.broadcast_state(&applied.events);
                if let Some(result) = self.state.result.clone() {
                    self.status = DriverStatus::Finished;
                    out.extend(
                        PlayerId::both()
                            .map(|p| Outbound::new(p, ServerMessage::GameOver { result: result.clone() })),
                    );
                }
                out
            }
            Err(MatchError::Illegal(reason)) => {
                warn!(%player, %reason, "action rejected");
                vec![Outbound::new(player, ServerMessage::Rejected { reason })]
            }
            Err(fatal) => {
                error!(%player, error = %fatal, "match terminated");
                let reason = fatal.to_string();
                self.status = DriverStatus::Terminated {
                    reason: reason.clone(),
                };
                PlayerId::both()
                    .map(|p| {
                        Outbound::new(
                            p,
                            ServerMessage::Terminated {
                                reason: reason.clone(),
                            },
                        )
                    })
                    .collect()
            }
        }
    }

    /// `player` leaves; the other seat wins on the points as they stand.
    pub fn abandon(&mut self, player: PlayerId) -> Vec<Outbound> {
        if !self.is_running() {
            return Vec::new();
        }
        info!(%player, "match abandoned");
        self.status = DriverStatus::Abandoned { by: player };

        let mut result = MatchResult::from_state(&self.state);
        result.outcome = MatchOutcome::Winner(player.opponent());
        vec![Outbound::new(
            player.opponent(),
            ServerMessage::GameOver { result },
        )]
    }

    /// Let AI seats act until a human must move or the match ends.
    pub fn run_ai(&mut self) -> Vec<Outbound> {
        let mut out = Vec::new();
        while let Some(player) = self.pending_ai_seat() {
            let Some(source) = self.ai[player].as_mut() else {
                break;
            };
            let Some(action) = source.choose(&self.state, player) else {
                break;
            };
            debug!(%player, source = source.name(), ?action, "ai decision");

            let before = self.state.action_history.len();
            out.extend(self.submit(player, action));
            if self.state.action_history.len() == before {
                // Rejected: leave the seat to the caller instead of looping.
                break;
            }
        }
        out
    }

    fn broadcast_state(&self, events: &[MatchEvent]) -> Vec<Outbound> {
        PlayerId::both()
            .map(|p| {
                Outbound::new(
                    p,
                    ServerMessage::State {
                        view: project(&self.state, p),
                        events: events.to_vec(),
                    },
                )
            })
            .collect()
    }

    /// Run the match on its own thread.
    ///
    /// AI seats move to a worker thread. The returned handle submits
    /// client messages and receives outbound messages.
    #[must_use]
    pub fn spawn(mut self) -> MatchHandle {
        let (inbox_tx, inbox_rx) = unbounded::<Command>();
        let (out_tx, out_rx) = unbounded::<Outbound>();
        let (ai_tx, ai_rx) = unbounded::<AiRequest>();

        let seats: Seats = PlayerMap::from_pair(self.ai[PlayerId::ONE].take(), self.ai[PlayerId::TWO].take());
        let has_ai = seats.iter().any(|(_, s)| s.is_some());
        let ai_seats = seats.map(|_, s| s.is_some());

        let ai_thread = has_ai.then(|| {
            let inbox = inbox_tx.clone();
            thread::spawn(move || ai_worker(seats, ai_rx, inbox))
        });

        let driver_thread = thread::spawn(move || {
            let mut requested: Option<usize> = None;
            let send_all = |messages: Vec<Outbound>| {
                for message in messages {
                    // A dropped handle only means nobody is listening.
                    let _ = out_tx.send(message);
                }
            };

            send_all(self.initial_messages());
            request_ai(&self, &ai_seats, &ai_tx, &mut requested);

            while self.is_running() {
                let Ok(command) = inbox_rx.recv() else {
                    break;
                };
                match command {
                    Command::Client(message) => send_all(self.handle(message)),
                    Command::Ai {
                        player,
                        action,
                        sequence,
                    } => {
                        if sequence == self.state.action_history.len() {
                            send_all(self.submit(player, action));
                        } else {
                            debug!(%player, "stale ai decision dropped");
                        }
                        requested = None;
                    }
                    Command::Shutdown => break,
                }
                request_ai(&self, &ai_seats, &ai_tx, &mut requested);
            }
            drop(ai_tx);
            self
        });

        MatchHandle {
            inbox: inbox_tx,
            outbox: out_rx,
            driver_thread,
            ai_thread,
        }
    }
}

fn request_ai(
    driver: &MatchDriver,
    ai_seats: &PlayerMap<bool>,
    ai_tx: &Sender<AiRequest>,
    requested: &mut Option<usize>,
) {
    if !driver.is_running() {
        return;
    }
    let sequence = driver.state.action_history.len();
    if *requested == Some(sequence) {
        return;
    }
    let Some(player) = PlayerId::both().find(|&p| ai_seats[p] && driver.state.can_act(p)) else {
        return;
    };
    if ai_tx
        .send(AiRequest {
            state: driver.state.clone(),
            player,
            sequence,
        })
        .is_ok()
    {
        *requested = Some(sequence);
    }
}

fn ai_worker(mut seats: Seats, requests: Receiver<AiRequest>, inbox: Sender<Command>) {
    for request in requests {
        let Some(source) = seats[request.player].as_mut() else {
            continue;
        };
        let action = source.choose(&request.state, request.player).unwrap_or(Action::Pass);
        let command = Command::Ai {
            player: request.player,
            action,
            sequence: request.sequence,
        };
        if inbox.send(command).is_err() {
            break;
        }
    }
}

enum Command {
    Client(ClientMessage),
    Ai {
        player: PlayerId,
        action: Action,
        sequence: usize,
    },
    Shutdown,
}

struct AiRequest {
    state: MatchState,
    player: PlayerId,
    sequence: usize,
}

/// The driver thread is gone.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("match driver has stopped")]
pub struct DriverGone;

/// Handle to a match running on its own thread.
pub struct MatchHandle {
    inbox: Sender<Command>,
    outbox: Receiver<Outbound>,
    driver_thread: JoinHandle<MatchDriver>,
    ai_thread: Option<JoinHandle<()>>,
}

impl MatchHandle {
    /// Queue a client message.
    pub fn send(&self, message: ClientMessage) -> Result<(), DriverGone> {
        self.inbox.send(Command::Client(message)).map_err(|_| DriverGone)
    }

    /// Queue an action for a seat.
    pub fn submit(&self, player: PlayerId, action: Action) -> Result<(), DriverGone> {
        self.send(ClientMessage::Act { player, action })
    }

    /// Outgoing messages, in commit order.
    #[must_use]
    pub fn outbound(&self) -> &Receiver<Outbound> {
        &self.outbox
    }

    /// Wait for the next outgoing message.
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Result<Outbound, RecvTimeoutError> {
        self.outbox.recv_timeout(timeout)
    }

    /// Stop the match and return the driver with its final state.
    ///
    /// Returns `None` if the driver thread panicked.
    pub fn shutdown(self) -> Option<MatchDriver> {
        // The driver may already have stopped on its own.
        let _ = self.inbox.send(Command::Shutdown);
        drop(self.inbox);
        let driver = self.driver_thread.join().ok();
        if let Some(ai) = self.ai_thread {
            let _ = ai.join();
        }
        driver
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::cards::{CardId, CharacterCard, MissionCard};
    use crate::core::{AiDifficulty, Deck, PlayerSpec};

    fn deck(offset: u32) -> Deck {
        Deck {
            characters: (0..30)
                .map(|i| CharacterCard::new(CardId::new(offset + i), format!("Ninja {i}"), 1 + i % 4, i64::from(i % 5)))
                .collect(),
            missions: (0..3)
                .map(|i| MissionCard::new(CardId::new(offset + 100 + i), format!("Mission {i}"), 1 + i))
                .collect(),
        }
    }

    fn humans() -> GameConfig {
        GameConfig::new(PlayerSpec::human("a", deck(0)), PlayerSpec::human("b", deck(1000)), 5)
    }

    fn bots() -> GameConfig {
        GameConfig::new(
            PlayerSpec::ai(AiDifficulty::Easy, deck(0)),
            PlayerSpec::ai(AiDifficulty::Medium, deck(1000)),
            5,
        )
    }

    #[test]
    fn test_rejection_goes_to_submitter_only() {
        let mut driver = MatchDriver::new(&humans()).unwrap();
        let before = driver.state().action_history.len();

        let out = driver.submit(PlayerId::ONE, Action::Pass);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].recipient, PlayerId::ONE);
        assert!(matches!(
            out[0].message,
            ServerMessage::Rejected {
                reason: IllegalAction::WrongPhase { .. }
            }
        ));
        assert_eq!(driver.state().action_history.len(), before);
        assert!(driver.is_running());
    }

    #[test]
    fn test_commit_broadcasts_to_both_seats() {
        let mut driver = MatchDriver::new(&humans()).unwrap();

        let out = driver.submit(PlayerId::ONE, Action::Mulligan { redraw: false });

        assert_eq!(out.len(), 2);
        let recipients: Vec<_> = out.iter().map(|o| o.recipient).collect();
        assert_eq!(recipients, vec![PlayerId::ONE, PlayerId::TWO]);
        for outbound in &out {
            let ServerMessage::State { view, .. } = &outbound.message else {
                panic!("expected a state message");
            };
            assert_eq!(view.viewer, outbound.recipient);
        }
    }

    #[test]
    fn test_invariant_violation_terminates_match() {
        let mut driver = MatchDriver::new(&humans()).unwrap();
        driver.submit(PlayerId::ONE, Action::Mulligan { redraw: false });
        driver.submit(PlayerId::TWO, Action::Mulligan { redraw: false });
        let first = driver.state().active_player;
        let card = driver.state().players[first].hand[0].instance;
        driver.submit(first, Action::PlayFaceDown { card, lane: 0 });
        if let Some(placed) = driver.state.players[first].board.get_mut(0) {
            placed.lane = 3;
        }
        driver.submit(first.opponent(), Action::Pass);

        let out = driver.submit(first, Action::Pass);

        assert_eq!(out.len(), 2);
        for (outbound, seat) in out.iter().zip(PlayerId::both()) {
            assert_eq!(outbound.recipient, seat);
            let ServerMessage::Terminated { reason } = &outbound.message else {
                panic!("expected termination, got {:?}", outbound.message);
            };
            assert!(reason.contains("lane 3"), "{reason}");
        }
        assert!(matches!(driver.status(), DriverStatus::Terminated { .. }));
        assert_eq!(driver.state().turn, 1);

        let late = driver.submit(first.opponent(), Action::Pass);
        assert_eq!(
            late,
            vec![Outbound::new(
                first.opponent(),
                ServerMessage::Rejected {
                    reason: IllegalAction::MatchOver
                }
            )]
        );
    }

    #[test]
    fn test_abandon_awards_opponent() {
        let mut driver = MatchDriver::new(&humans()).unwrap();

        let out = driver.handle(ClientMessage::Abandon {
            player: PlayerId::TWO,
        });

        assert_eq!(driver.status(), &DriverStatus::Abandoned { by: PlayerId::TWO });
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].recipient, PlayerId::ONE);
        let ServerMessage::GameOver { result } = &out[0].message else {
            panic!("expected game over");
        };
        assert!(result.outcome.is_winner(PlayerId::ONE));

        let late = driver.submit(PlayerId::ONE, Action::Mulligan { redraw: false });
        assert!(matches!(
            late[0].message,
            ServerMessage::Rejected {
                reason: IllegalAction::MatchOver
            }
        ));
    }

    #[test]
    fn test_run_ai_plays_to_the_end() {
        let mut driver = MatchDriver::new(&bots()).unwrap();

        let out = driver.run_ai();

        assert_eq!(driver.status(), &DriverStatus::Finished);
        assert!(driver.state().is_over());
        let game_overs = out
            .iter()
            .filter(|o| matches!(o.message, ServerMessage::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 2);
        assert!(driver.pending_ai_seat().is_none());
    }

    #[test]
    fn test_run_ai_waits_for_human() {
        let config = GameConfig::new(
            PlayerSpec::human("a", deck(0)),
            PlayerSpec::ai(AiDifficulty::Easy, deck(1000)),
            8,
        );
        let mut driver = MatchDriver::new(&config).unwrap();

        driver.run_ai();

        // The AI seat made its mulligan decision; the human has not.
        assert_eq!(driver.state().action_history.len(), 1);
        assert!(driver.state().can_act(PlayerId::ONE));
        assert!(driver.pending_ai_seat().is_none());
    }

    #[test]
    fn test_spawned_match_finishes() {
        let handle = MatchDriver::new(&bots()).unwrap().spawn();

        let mut game_overs = 0;
        while game_overs < 2 {
            let outbound = handle
                .recv_timeout(Duration::from_secs(30))
                .expect("driver stalled");
            if matches!(outbound.message, ServerMessage::GameOver { .. }) {
                game_overs += 1;
            }
        }

        let driver = handle.shutdown().unwrap();
        assert_eq!(driver.status(), &DriverStatus::Finished);
    }

    #[test]
    fn test_spawned_match_accepts_client_messages() {
        let handle = MatchDriver::new(&humans()).unwrap().spawn();

        handle.submit(PlayerId::ONE, Action::Mulligan { redraw: false }).unwrap();
        handle.submit(PlayerId::TWO, Action::Mulligan { redraw: true }).unwrap();

        // Two initial views, then two views per commit.
        let mut states = 0;
        while states < 6 {
            let outbound = handle
                .recv_timeout(Duration::from_secs(5))
                .expect("driver stalled");
            if matches!(outbound.message, ServerMessage::State { .. }) {
                states += 1;
            }
        }

        let driver = handle.shutdown().unwrap();
        assert_eq!(driver.state().action_history.len(), 2);
        assert!(driver.is_running());
    }
}

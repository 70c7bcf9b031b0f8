//! Progress notifications: the observer interface, event records, and an in-memory log.

use crate::models::{MatchId, RoundNumber, Team, TeamId, TournamentId, TournamentTag};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cell::RefCell;

/// Identifies where an event came from. Fields are filled in as far as they apply.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    pub tag: TournamentTag,
    pub tournament_id: Option<TournamentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<RoundNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<MatchId>,
}

impl EventContext {
    pub fn new(tag: TournamentTag, tournament_id: Option<TournamentId>) -> Self {
        Self {
            tag,
            tournament_id,
            round: None,
            match_id: None,
        }
    }

    pub fn with_round(mut self, round: RoundNumber) -> Self {
        self.round = Some(round);
        self
    }

    pub fn with_match(mut self, match_id: MatchId) -> Self {
        self.match_id = Some(match_id);
        self
    }
}

/// Receives tournament progress. Every callback defaults to doing nothing.
pub trait Observer {
    fn on_tournament_started(&self, _ctx: &EventContext) {}
    fn on_match_created(&self, _ctx: &EventContext) {}
    fn on_match_ended(&self, _ctx: &EventContext, _winner: &Team) {}
    fn on_round_ended(&self, _ctx: &EventContext) {}
    fn on_tournament_ended(&self, _ctx: &EventContext, _winner_name: &str) {}
    fn on_tournament_error(&self, _ctx: &EventContext, _message: &str) {}
}

/// An observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// What happened.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    TournamentStarted,
    MatchCreated,
    MatchEnded {
        #[serde(rename = "winnerId")]
        winner_id: TeamId,
    },
    RoundEnded,
    TournamentEnded {
        #[serde(rename = "winnerName")]
        winner_name: String,
    },
    TournamentError {
        message: String,
    },
}

/// A timestamped notification.
#[derive(Clone, Debug, Serialize)]
pub struct Event {
    pub at: DateTime<Utc>,
    pub context: EventContext,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn new(context: EventContext, kind: EventKind) -> Self {
        Self {
            at: Utc::now(),
            context,
            kind,
        }
    }
}

/// Anything that can store events. Every sink is an [`Observer`].
pub trait EventSink {
    fn record(&self, event: Event);
}

impl<S: EventSink + ?Sized> Observer for S {
    fn on_tournament_started(&self, ctx: &EventContext) {
        self.record(Event::new(*ctx, EventKind::TournamentStarted));
    }

    fn on_match_created(&self, ctx: &EventContext) {
        self.record(Event::new(*ctx, EventKind::MatchCreated));
    }

    fn on_match_ended(&self, ctx: &EventContext, winner: &Team) {
        self.record(Event::new(
            *ctx,
            EventKind::MatchEnded {
                winner_id: winner.id(),
            },
        ));
    }

    fn on_round_ended(&self, ctx: &EventContext) {
        self.record(Event::new(*ctx, EventKind::RoundEnded));
    }

    fn on_tournament_ended(&self, ctx: &EventContext, winner_name: &str) {
        self.record(Event::new(
            *ctx,
            EventKind::TournamentEnded {
                winner_name: winner_name.to_string(),
            },
        ));
    }

    fn on_tournament_error(&self, ctx: &EventContext, message: &str) {
        self.record(Event::new(
            *ctx,
            EventKind::TournamentError {
                message: message.to_string(),
            },
        ));
    }
}

/// In-memory event list, in arrival order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: RefCell<Vec<Event>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.borrow().iter().map(|e| e.kind.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl EventSink for EventLog {
    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

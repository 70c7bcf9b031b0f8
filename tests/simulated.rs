//! Full brackets against the in-process simulated authority.

use knockout_bracket::authority::{StartRequest, TeamInfoRequest, WinnerRequest};
use knockout_bracket::{
    Authority, AuthorityError, EventKind, EventLog, NoopObserver, SimulatedAuthority, Tournament,
    TournamentConfig,
};
use std::rc::Rc;
use std::time::Duration;

async fn play(seed: u64, config: TournamentConfig) -> (Tournament, knockout_bracket::Outcome) {
    let authority = Rc::new(SimulatedAuthority::new(seed));
    let mut t = Tournament::new(config, authority, Rc::new(NoopObserver));
    let outcome = t.start().await.unwrap();
    (t, outcome)
}

#[tokio::test]
async fn plays_a_full_bracket() {
    let (t, outcome) = play(42, TournamentConfig::new(4, 16)).await;

    assert_eq!(outcome.rounds_played, 2);
    assert_eq!(t.rounds()[0].len(), 4);
    assert_eq!(t.rounds()[1].len(), 1);
    assert!(!outcome.winner_name.is_empty());
    assert!(t.rounds().iter().flatten().all(|m| m.winner().is_some()));
    assert_eq!(t.rounds()[1][0].winner().unwrap().id(), outcome.winner_id);
}

#[tokio::test]
async fn uneven_field_shrinks_round_by_round() {
    let (t, outcome) = play(7, TournamentConfig::new(3, 10)).await;

    let sizes: Vec<usize> = t.rounds().iter().map(|r| r.len()).collect();
    assert_eq!(sizes, vec![4, 2, 1]);
    assert_eq!(t.rounds()[0][3].team_ids().len(), 1);
    assert_eq!(outcome.rounds_played, 3);
}

#[tokio::test]
async fn same_seed_same_champion() {
    let (_, first) = play(2024, TournamentConfig::new(2, 32)).await;
    let (_, second) = play(2024, TournamentConfig::new(2, 32)).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn shared_authority_runs_isolated_tournaments() {
    let authority = Rc::new(SimulatedAuthority::new(5).with_latency(Duration::from_millis(1)));
    let log_a = Rc::new(EventLog::new());
    let log_b = Rc::new(EventLog::new());
    let mut a = Tournament::new(TournamentConfig::new(2, 8), authority.clone(), log_a.clone());
    let mut b = Tournament::new(TournamentConfig::new(2, 4), authority.clone(), log_b.clone());

    let (ra, rb) = tokio::join!(a.start(), b.start());
    ra.unwrap();
    rb.unwrap();

    assert_ne!(a.id(), b.id());
    assert_eq!(a.rounds().len(), 3);
    assert_eq!(b.rounds().len(), 2);
    for (t, log) in [(&a, &log_a), (&b, &log_b)] {
        let events = log.events();
        assert!(events.iter().all(|e| e.context.tag == t.tag()));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e.kind, EventKind::TournamentEnded { .. }))
                .count(),
            1
        );
    }
}

#[tokio::test]
async fn rejects_empty_brackets() {
    let authority = SimulatedAuthority::new(1);
    let err = authority
        .start_tournament(StartRequest {
            teams_per_match: 0,
            total_teams: 5,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AuthorityError::Rejected(_)));
}

#[tokio::test]
async fn winner_is_the_score_closest_to_the_match_score() {
    let authority = SimulatedAuthority::new(1);
    let started = authority
        .start_tournament(StartRequest {
            teams_per_match: 2,
            total_teams: 4,
        })
        .await
        .unwrap();

    let winner = authority
        .winner(WinnerRequest {
            tournament_id: started.tournament_id,
            team_scores: vec![10, 40, 90, 50],
            match_score: 45,
        })
        .await
        .unwrap();

    assert_eq!(winner, 40);
}

#[tokio::test]
async fn unknown_team_is_reported() {
    let authority = SimulatedAuthority::new(1);
    let started = authority
        .start_tournament(StartRequest {
            teams_per_match: 2,
            total_teams: 2,
        })
        .await
        .unwrap();

    let err = authority
        .team_info(TeamInfoRequest {
            tournament_id: started.tournament_id,
            team_id: 9,
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        AuthorityError::UnknownTeam {
            tournament_id: started.tournament_id,
            team_id: 9
        }
    );
}

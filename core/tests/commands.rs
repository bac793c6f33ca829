//! Command surface tests — the host-facing JSON contract.

use economy_core::{
    clock::SimClock, command::PlayerCommand, config::EconomyConfig, engine::EconomyEngine,
    types::PlayerId,
};

fn build() -> EconomyEngine {
    EconomyEngine::build(EconomyConfig::default(), 42, SimClock::at_epoch())
}

fn player(n: u128) -> PlayerId {
    PlayerId::from_u128(n)
}

/// Commands arrive as tagged JSON, exactly the way a host would send
/// them over a pipe.
#[test]
fn commands_parse_from_tagged_json() {
    let alice = player(1);
    let json = format!(r#"{{"cmd": "balance", "player": "{alice}"}}"#);
    let command: PlayerCommand = serde_json::from_str(&json).unwrap();
    assert!(matches!(command, PlayerCommand::Balance { player } if player == alice));

    let json = format!(
        r#"{{"cmd": "buy_stock", "player": "{alice}", "symbol": "NOVA", "shares": 3}}"#
    );
    let command: PlayerCommand = serde_json::from_str(&json).unwrap();
    assert!(matches!(command, PlayerCommand::BuyStock { shares: 3, .. }));
}

#[test]
fn execute_returns_json_replies() {
    let engine = build();
    let alice = player(1);
    let bob = player(2);

    let reply = engine
        .execute(PlayerCommand::InitializePlayer { player: alice })
        .unwrap();
    assert_eq!(reply["initialized"], true);
    assert_eq!(reply["balance"], 100);

    let reply = engine
        .execute(PlayerCommand::Transfer {
            from: alice,
            to: bob,
            amount: 50,
            memo: "gift".into(),
        })
        .unwrap();
    assert_eq!(reply["sent"], 50);
    assert_eq!(reply["tax"], 2);

    let reply = engine.execute(PlayerCommand::MarketSummary).unwrap();
    assert_eq!(reply["listed"], 21);
}

/// Business failures surface as errors the host can render; they never
/// panic and never mutate state.
#[test]
fn execute_surfaces_business_failures() {
    let engine = build();
    let alice = player(1);

    let result = engine.execute(PlayerCommand::Withdraw { player: alice, amount: 10 });
    assert!(result.is_err());
    assert_eq!(engine.balance(alice), 0);

    let result = engine.execute(PlayerCommand::BuyStock {
        player: alice,
        symbol: "NOPE".into(),
        shares: 1,
    });
    assert!(result.is_err());
}

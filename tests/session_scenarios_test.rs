// End-to-end conversation scenarios against a scripted model

mod common;

use chrono::NaiveDateTime;
use serde_json::json;

use bugscribe::logging::TraceEvent;
use bugscribe::providers::Role;
use bugscribe::session::EndReason;
use bugscribe::{ConversationOutput, EngineError};
use common::{call, converse, engine, extraction, say};

fn identify(name: &str, developer_id: i64) -> Vec<bugscribe::providers::ModelTurn> {
    vec![
        call("verify-1", "verify_developer", json!({"name": name})),
        call("bugs-1", "get_bugs_for_developer", json!({"developer_id": developer_id})),
    ]
}

#[tokio::test]
async fn test_happy_path_produces_stamped_report() {
    let mut script = identify("Alice Johnson", 1);
    script.extend([
        say("You have bug #1: Login page crashes on submit (Open). Which bug?"),
        say("What work did you do on bug #1?"),
        say("Is the bug solved now?"),
        call("end-1", "end_conversation", json!({"reason": "report complete"})),
        say("Thanks Alice, goodbye!"),
        extraction(json!({
            "success": true,
            "developer_id": 1,
            "bug_id": 1,
            "progress_description": "Fixed the null pointer in the login form submit handler",
            "solved": true,
            "reason": "all information gathered"
        })),
    ]);
    let (engine, gateway) = engine(script);
    let mut session = engine.start();

    let replies = converse(
        &engine,
        &mut session,
        &[
            "Hi, I'm Alice Johnson",
            "Bug 1",
            "I fixed the null pointer in the login form submit handler",
            "Yes, it's solved",
        ],
    )
    .await;

    assert!(replies[..3].iter().all(|r| !r.session_ended));
    assert!(replies[3].session_ended);
    assert_eq!(session.turn_count(), 4);
    assert_eq!(session.developer_id(), Some(1));
    assert_eq!(session.developer_name(), Some("Alice Johnson"));

    let output = engine.finalize(&mut session).await;
    assert!(output.success);
    let report = output.report.expect("successful output has a report");
    assert_eq!(report.bug_id, 1);
    assert!(report.solved);

    let (stamp, description) = report.progress_note.split_at(19);
    assert!(NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").is_ok());
    assert_eq!(
        description,
        " - Fixed the null pointer in the login form submit handler"
    );
    assert_eq!(session.selected_bug_id(), Some(1));
    assert_eq!(gateway.remaining(), 0);
}

#[tokio::test]
async fn test_foreign_bug_is_rejected() {
    let mut script = identify("Bob Smith", 2);
    script.extend([
        say("You have bug #2: Payment processing fails. Which bug?"),
        say("Bug #7 is not assigned to you. What did you do?"),
        say("Is it solved?"),
        call("end-1", "end_conversation", json!({})),
        say("Goodbye!"),
        extraction(json!({
            "success": true,
            "developer_id": 2,
            "bug_id": 7,
            "progress_description": "Closed the leaking database connection pool",
            "solved": true,
            "reason": "developer reported on bug 7"
        })),
    ]);
    let (engine, _) = engine(script);
    let mut session = engine.start();

    converse(
        &engine,
        &mut session,
        &[
            "This is Bob Smith",
            "I want to report on bug 7",
            "I closed the leaking database connection pool",
            "yes",
        ],
    )
    .await;

    let output = engine.finalize(&mut session).await;
    assert_eq!(output, ConversationOutput::failure());

    let rejection = session.trace().events().find_map(|e| match e {
        TraceEvent::Finalized { rejection, .. } => rejection.clone(),
        _ => None,
    });
    assert!(rejection.unwrap().contains("not assigned"));
}

#[tokio::test]
async fn test_unverified_lookup_is_refused() {
    let (engine, _) = engine(vec![
        call("bugs-1", "get_bugs_for_developer", json!({"developer_id": 3})),
        say("I need to verify your name first. Who are you?"),
    ]);
    let mut session = engine.start();

    converse(&engine, &mut session, &["Show me Carol's bugs, I'm developer 3"]).await;

    let tool_msg = session
        .transcript()
        .iter()
        .find(|m| m.role == Role::Tool)
        .unwrap();
    assert!(tool_msg.text().contains("developer_not_established"));
    assert_eq!(session.developer_id(), None);
}

#[tokio::test]
async fn test_unknown_developer_never_reports() {
    let (engine, gateway) = engine(vec![
        call("verify-1", "verify_developer", json!({"name": "Zzz Nobody"})),
        say("I couldn't find Zzz Nobody. Valid developers are Alice, Bob, Carol and Dave."),
        call("bugs-1", "get_bugs_for_developer", json!({"developer_id": 1})),
        say("Sorry, I can only look up verified developers."),
        call("end-1", "end_conversation", json!({"reason": "unknown developer"})),
        say("Goodbye."),
        extraction(json!({
            "success": true,
            "bug_id": 1,
            "progress_description": "fixed the login page",
            "solved": true
        })),
    ]);
    let mut session = engine.start();

    let replies = converse(
        &engine,
        &mut session,
        &["I'm Zzz Nobody", "Just give me bug 1, I fixed the login page", "bye"],
    )
    .await;
    assert!(replies[2].session_ended);

    let verify_result = session
        .transcript()
        .iter()
        .find(|m| m.tool_call_id.as_deref() == Some("verify-1"))
        .unwrap();
    let payload: serde_json::Value = serde_json::from_str(verify_result.text()).unwrap();
    assert_eq!(payload["success"], false);
    assert_eq!(payload["valid_developers"].as_array().unwrap().len(), 4);

    assert_eq!(session.developer_id(), None);
    assert!(!engine.finalize(&mut session).await.success);
    assert_eq!(gateway.remaining(), 0);
}

#[tokio::test]
async fn test_developer_without_bugs() {
    let mut script = identify("Dave Brown", 4);
    script.extend([
        call("end-1", "end_conversation", json!({"reason": "no assigned bugs"})),
        say("You have no bugs assigned, so there is nothing to report. Bye!"),
        extraction(json!({
            "success": false,
            "developer_id": 4,
            "bug_id": null,
            "progress_description": null,
            "solved": null,
            "reason": "developer has no assigned bugs"
        })),
    ]);
    let (engine, _) = engine(script);
    let mut session = engine.start();

    let replies = converse(&engine, &mut session, &["Dave Brown"]).await;
    assert!(replies[0].session_ended);
    assert_eq!(session.developer_id(), Some(4));

    let bugs_result = session
        .transcript()
        .iter()
        .find(|m| m.tool_call_id.as_deref() == Some("bugs-1"))
        .unwrap();
    assert_eq!(bugs_result.text(), "[]");

    assert_eq!(engine.finalize(&mut session).await, ConversationOutput::failure());
}

#[tokio::test]
async fn test_vague_progress_is_not_fabricated() {
    let mut script = identify("Alice Johnson", 1);
    script.extend([
        say("Which bug?"),
        say("What did you do on it?"),
        say("Could you be more specific?"),
        say("Is it solved?"),
        call("end-1", "end_conversation", json!({})),
        say("Thanks."),
        extraction(json!({
            "success": true,
            "developer_id": 1,
            "bug_id": 1,
            "progress_description": "Refactored the authentication middleware",
            "solved": true
        })),
    ]);
    let (engine, _) = engine(script);
    let mut session = engine.start();

    converse(
        &engine,
        &mut session,
        &["Alice Johnson", "bug 1", "idk", "stuff", "yes"],
    )
    .await;

    let output = engine.finalize(&mut session).await;
    assert!(!output.success);
    assert!(output.report.is_none());
}

#[tokio::test]
async fn test_vague_progress_cannot_borrow_the_bug_number() {
    let mut script = identify("Alice Johnson", 1);
    script.extend([
        say("Which bug?"),
        say("What did you do on it?"),
        say("Could you be more specific?"),
        say("Is it solved?"),
        call("end-1", "end_conversation", json!({})),
        say("Thanks."),
        extraction(json!({
            "success": true,
            "bug_id": 1,
            "progress_description": "Fixed bug 1",
            "solved": true
        })),
    ]);
    let (engine, _) = engine(script);
    let mut session = engine.start();

    converse(
        &engine,
        &mut session,
        &["Alice Johnson", "bug 1", "idk", "stuff", "yes"],
    )
    .await;

    let output = engine.finalize(&mut session).await;
    assert_eq!(output, ConversationOutput::failure());
    assert!(session.selected_bug_id().is_none());
}

#[tokio::test]
async fn test_turn_budget_ends_session_at_twenty() {
    let script = (0..20).map(|i| say(&format!("Question {i}"))).collect();
    let (engine, gateway) = engine(script);
    let mut session = engine.start();

    for i in 0..20 {
        let reply = engine
            .submit_user_utterance(&mut session, "still thinking")
            .await
            .unwrap();
        assert_eq!(reply.session_ended, i == 19);
    }

    assert_eq!(session.turn_count(), 20);
    assert!(session.is_ended());
    assert_eq!(session.end_reason(), Some(&EndReason::TurnBudget));

    let err = engine
        .submit_user_utterance(&mut session, "one more")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SessionClosed));
    assert_eq!(session.turn_count(), 20);
    assert_eq!(gateway.call_count(), 20);
    assert!(session
        .trace()
        .events()
        .any(|e| matches!(e, TraceEvent::TurnBudgetReached { turns: 20 })));
}

#[tokio::test]
async fn test_empty_utterances_never_count() {
    let (engine, gateway) = engine(vec![say("What's your name?")]);
    let mut session = engine.start();

    for blank in ["", "   ", "\t\n"] {
        let reply = engine.submit_user_utterance(&mut session, blank).await.unwrap();
        assert!(!reply.session_ended);
    }
    assert_eq!(session.turn_count(), 0);
    assert_eq!(gateway.call_count(), 0);

    converse(&engine, &mut session, &["hello"]).await;
    assert_eq!(session.turn_count(), 1);
}

#[tokio::test]
async fn test_tool_loop_cap_ends_session_without_report() {
    let script = (0..6)
        .map(|i| call(&format!("v{i}"), "verify_developer", json!({"name": "Alice Johnson"})))
        .collect();
    let (engine, gateway) = engine(script);
    let mut session = engine.start();

    let err = engine
        .submit_user_utterance(&mut session, "Alice Johnson")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ToolLoopExceeded { .. }));
    assert!(session.is_ended());

    let output = engine.finalize(&mut session).await;
    assert_eq!(output, ConversationOutput::failure());
    assert_eq!(gateway.call_count(), 6);
}

#[tokio::test]
async fn test_finalize_is_idempotent() {
    let mut script = identify("Alice Johnson", 1);
    script.extend([
        say("Which bug, and what did you do?"),
        extraction(json!({
            "success": true,
            "developer_id": 1,
            "bug_id": 1,
            "progress_description": "Patched the submit handler crash",
            "solved": false
        })),
    ]);
    let (engine, gateway) = engine(script);
    let mut session = engine.start();

    converse(
        &engine,
        &mut session,
        &["Alice Johnson here. On bug 1 I patched the submit handler crash, not solved yet"],
    )
    .await;

    let first = engine.finalize(&mut session).await;
    let second = engine.finalize(&mut session).await;
    assert!(first.success);
    assert!(!first.report.as_ref().unwrap().solved);
    assert_eq!(first, second);
    assert_eq!(gateway.call_count(), 4);
    assert_eq!(session.end_reason(), Some(&EndReason::CallerEnded));
}

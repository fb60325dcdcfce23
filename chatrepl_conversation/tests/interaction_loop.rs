mod common;

use std::sync::Arc;
use std::time::Duration;

use chatrepl_conversation::{
    Console, ExchangeError, InteractionLoop, LoopState, StreamedResponse, WholeResponse,
};
use chatrepl_core::{ConversationBuffer, Turn};
use common::{ClosedPipe, Reply, ScriptedProvider, text};

fn buffer(capacity: usize) -> ConversationBuffer {
    ConversationBuffer::new(Some("S"), capacity).unwrap()
}

#[tokio::test]
async fn test_whole_reply_recorded_and_shown() {
    let provider = Arc::new(ScriptedProvider::new(vec![Reply::Fragments(vec!["Hei"])]));
    let input: &[u8] = b"hello\nexit\n";
    let mut output = Vec::new();

    let history = InteractionLoop::new(
        provider.clone(),
        WholeResponse,
        buffer(10),
        Console::new(input, &mut output),
        "test-model",
    )
    .run()
    .await
    .unwrap();

    assert_eq!(
        history.snapshot(),
        &[Turn::system("S"), Turn::human("hello"), Turn::assistant("Hei")]
    );
    assert_eq!(
        provider.requests(),
        vec![vec![Turn::system("S"), Turn::human("hello")]]
    );

    let shown = text(&output);
    assert!(shown.starts_with("🤖 Welcome to the Interactive AI Chatbot!\n"));
    assert!(shown.contains("You: 🤖 AI: Hei\n\nYou: "));
    assert!(shown.ends_with("\n🤖 AI: Goodbye! Have a great day! 👋\n"));
}

#[tokio::test]
async fn test_streamed_fragments_become_one_turn() {
    let provider = Arc::new(ScriptedProvider::new(vec![Reply::Fragments(vec![
        "Hel", "lo", " world",
    ])]));
    let input: &[u8] = b"greet me\nquit\n";
    let mut output = Vec::new();

    let history = InteractionLoop::new(
        provider,
        StreamedResponse,
        buffer(10),
        Console::new(input, &mut output),
        "test-model",
    )
    .run()
    .await
    .unwrap();

    let assistant: Vec<_> = history
        .snapshot()
        .iter()
        .filter(|t| t.role == chatrepl_core::Role::Assistant)
        .collect();
    assert_eq!(assistant, vec![&Turn::assistant("Hello world")]);
    assert!(text(&output).contains("🤖 AI: Hello world\n\n"));
}

#[tokio::test]
async fn test_exit_words_terminate_without_calling_provider() {
    for line in ["EXIT", "  Quit ", "BYE"] {
        let provider = Arc::new(ScriptedProvider::new(Vec::new()));
        let input = format!("{line}\nnever read\n");
        let mut output = Vec::new();

        let history = InteractionLoop::new(
            provider.clone(),
            WholeResponse,
            buffer(10),
            Console::new(input.as_bytes(), &mut output),
            "test-model",
        )
        .run()
        .await
        .unwrap();

        assert!(provider.requests().is_empty(), "{line:?}");
        assert_eq!(history.snapshot(), &[Turn::system("S")]);
        assert_eq!(text(&output).matches("You: ").count(), 1);
    }
}

#[tokio::test]
async fn test_empty_input_is_skipped() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let input: &[u8] = b"\n   \n\t\nbye\n";
    let mut output = Vec::new();

    let history = InteractionLoop::new(
        provider.clone(),
        StreamedResponse,
        buffer(10),
        Console::new(input, &mut output),
        "test-model",
    )
    .run()
    .await
    .unwrap();

    assert!(provider.requests().is_empty());
    assert_eq!(history.len(), 1);
    assert_eq!(text(&output).matches("You: ").count(), 4);
}

#[tokio::test]
async fn test_provider_failure_keeps_human_turn_and_continues() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Reply::Fail("provider down"),
        Reply::Fragments(vec!["ok"]),
    ]));
    let input: &[u8] = b"first\nsecond\nexit\n";
    let mut output = Vec::new();

    let history = InteractionLoop::new(
        provider.clone(),
        WholeResponse,
        buffer(10),
        Console::new(input, &mut output),
        "test-model",
    )
    .run()
    .await
    .unwrap();

    assert_eq!(
        history.snapshot(),
        &[
            Turn::system("S"),
            Turn::human("first"),
            Turn::human("second"),
            Turn::assistant("ok"),
        ]
    );
    assert_eq!(provider.requests()[1].len(), 3);

    let shown = text(&output);
    assert!(shown.contains("🤖 AI: ❌ Error: provider down\nPlease try again.\n\nYou: "));
    assert_eq!(shown.matches("You: ").count(), 3);
}

#[tokio::test]
async fn test_stream_failure_records_no_partial_reply() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Reply::BreakAfter(vec!["Hel"], "connection reset"),
        Reply::Fragments(vec!["fine"]),
    ]));
    let input: &[u8] = b"one\ntwo\nbye\n";
    let mut output = Vec::new();

    let history = InteractionLoop::new(
        provider,
        StreamedResponse,
        buffer(10),
        Console::new(input, &mut output),
        "test-model",
    )
    .run()
    .await
    .unwrap();

    assert_eq!(
        history.snapshot(),
        &[
            Turn::system("S"),
            Turn::human("one"),
            Turn::human("two"),
            Turn::assistant("fine"),
        ]
    );
    assert!(text(&output).contains("🤖 AI: Hel\n❌ Error: connection reset\n"));
}

#[tokio::test]
async fn test_history_trimmed_after_each_exchange() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Reply::Fragments(vec!["a1"]),
        Reply::Fragments(vec!["a2"]),
        Reply::Fragments(vec!["a3"]),
    ]));
    let input: &[u8] = b"h1\nh2\nh3\nexit\n";
    let mut output = Vec::new();

    let history = InteractionLoop::new(
        provider.clone(),
        WholeResponse,
        buffer(3),
        Console::new(input, &mut output),
        "test-model",
    )
    .run()
    .await
    .unwrap();

    assert_eq!(
        history.snapshot(),
        &[Turn::system("S"), Turn::human("h3"), Turn::assistant("a3")]
    );

    let requests = provider.requests();
    assert_eq!(
        requests[2],
        vec![
            Turn::system("S"),
            Turn::human("h2"),
            Turn::assistant("a2"),
            Turn::human("h3"),
        ]
    );
}

#[tokio::test]
async fn test_end_of_input_terminates() {
    let provider = Arc::new(ScriptedProvider::new(vec![Reply::Fragments(vec!["Hei"])]));
    let input: &[u8] = b"hello\n";
    let mut output = Vec::new();

    let history = InteractionLoop::new(
        provider,
        WholeResponse,
        buffer(10),
        Console::new(input, &mut output),
        "test-model",
    )
    .run()
    .await
    .unwrap();

    assert_eq!(history.len(), 3);
    assert!(text(&output).ends_with("Goodbye! Have a great day! 👋\n"));
}

#[tokio::test]
async fn test_step_state_transitions() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Reply::Fragments(vec!["Hei"]),
        Reply::Fail("boom"),
    ]));
    let input: &[u8] = b"hello\nagain\n";
    let mut output = Vec::new();

    let mut repl = InteractionLoop::new(
        provider,
        WholeResponse,
        buffer(10),
        Console::new(input, &mut output),
        "test-model",
    );
    assert_eq!(repl.state(), LoopState::AwaitingInput);

    assert_eq!(repl.step().await.unwrap(), LoopState::AwaitingInput);
    assert_eq!(repl.buffer().len(), 3);

    assert!(repl.step().await.is_err());
    assert_eq!(repl.state(), LoopState::AwaitingInput);
    assert_eq!(repl.buffer().len(), 4);

    assert_eq!(repl.step().await.unwrap(), LoopState::Terminated);
    assert_eq!(repl.state(), LoopState::Terminated);
}

#[tokio::test]
async fn test_closed_output_ends_session() {
    let provider = Arc::new(ScriptedProvider::new(vec![Reply::Fragments(vec!["Hei"])]));
    let input: &[u8] = b"hello\nexit\n";

    let session = InteractionLoop::new(
        provider.clone(),
        StreamedResponse,
        buffer(10),
        Console::new(input, ClosedPipe),
        "test-model",
    )
    .run();

    let result = tokio::time::timeout(Duration::from_secs(2), session)
        .await
        .expect("session should end once output is closed");

    assert!(matches!(result, Err(ExchangeError::Output(_))));
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn test_invalid_utf8_line_is_reported_and_skipped() {
    let provider = Arc::new(ScriptedProvider::new(vec![Reply::Fragments(vec!["Hei"])]));
    let input: &[u8] = b"\xff\xfe\nhello\nexit\n";
    let mut output = Vec::new();

    let history = InteractionLoop::new(
        provider,
        WholeResponse,
        buffer(10),
        Console::new(input, &mut output),
        "test-model",
    )
    .run()
    .await
    .unwrap();

    assert_eq!(
        history.snapshot(),
        &[Turn::system("S"), Turn::human("hello"), Turn::assistant("Hei")]
    );
    assert!(text(&output).contains("You: ❌ Error: Failed to read input: "));
}

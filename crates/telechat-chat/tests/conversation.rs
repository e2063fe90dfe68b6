//! End-to-end behaviour of the conversation view-state with scripted
//! reply and speech doubles.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use telechat_chat::{
    ChatError, Conversation, ConversationSettings, Phase, SendOutcome, CONNECTION_ERROR_MESSAGE,
    SPOKEN_ERROR_NOTICE,
};
use telechat_core::types::Role;
use telechat_reply::{ReplyError, ReplyService};
use telechat_voice::{Speaker, SpeechSynthesisAdapter, Utterance, VoiceError, VoiceSettings};

// =============================================================================
// Doubles
// =============================================================================

/// Reply service answering from a script, one entry per call.
#[derive(Default)]
struct ScriptedReply {
    script: Mutex<VecDeque<Result<String, ReplyError>>>,
    requests: Mutex<Vec<(String, String)>>,
}

impl ScriptedReply {
    fn with(script: Vec<Result<String, ReplyError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplyService for ScriptedReply {
    async fn send_message(&self, text: &str, user_id: &str) -> Result<String, ReplyError> {
        self.requests
            .lock()
            .unwrap()
            .push((text.to_string(), user_id.to_string()));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ReplyError::Transport("script exhausted".to_string())))
    }
}

/// Speaker recording spoken texts and counting cancellations.
#[derive(Default)]
struct RecordingSpeaker {
    spoken: Mutex<Vec<Utterance>>,
    cancels: AtomicUsize,
}

impl RecordingSpeaker {
    fn spoken(&self) -> Vec<String> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .map(|u| u.text.clone())
            .collect()
    }
}

impl Speaker for RecordingSpeaker {
    fn speak(&self, utterance: &Utterance) -> Result<(), VoiceError> {
        self.spoken.lock().unwrap().push(utterance.clone());
        Ok(())
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }

    fn is_busy(&self) -> bool {
        false
    }
}

fn build(
    reply: Arc<ScriptedReply>,
    delay: Duration,
) -> (Conversation, Arc<RecordingSpeaker>) {
    let speaker = Arc::new(RecordingSpeaker::default());
    let speech = Arc::new(SpeechSynthesisAdapter::new(
        speaker.clone(),
        VoiceSettings::default(),
        true,
    ));
    let settings = ConversationSettings {
        reply_delay: delay,
        ..ConversationSettings::default()
    };
    (Conversation::new(reply, speech, settings), speaker)
}

fn transcript(conv: &Conversation) -> Vec<(Role, String)> {
    conv.messages()
        .iter()
        .map(|m| (m.role, m.content.clone()))
        .collect()
}

// =============================================================================
// Send / receive
// =============================================================================

#[tokio::test]
async fn test_successful_exchange() {
    let reply = ScriptedReply::with(vec![Ok("Let me check that for you.".to_string())]);
    let (mut conv, speaker) = build(reply.clone(), Duration::ZERO);

    let outcome = conv.submit("My bill is wrong").await.unwrap();
    assert_eq!(outcome, SendOutcome::Replied);
    assert_eq!(
        transcript(&conv),
        vec![
            (Role::User, "My bill is wrong".to_string()),
            (Role::Agent, "Let me check that for you.".to_string()),
        ]
    );
    assert!(!conv.loading());
    assert_eq!(
        reply.requests(),
        vec![("My bill is wrong".to_string(), "local_tester".to_string())]
    );
    assert_eq!(speaker.spoken(), vec!["Let me check that for you.".to_string()]);
}

#[tokio::test]
async fn test_failed_exchange_shows_apology() {
    let reply = ScriptedReply::with(vec![Err(ReplyError::Status(500))]);
    let (mut conv, speaker) = build(reply, Duration::ZERO);

    let outcome = conv.submit("Hello").await.unwrap();
    assert_eq!(outcome, SendOutcome::Failed);
    assert_eq!(
        transcript(&conv),
        vec![
            (Role::User, "Hello".to_string()),
            (Role::Agent, CONNECTION_ERROR_MESSAGE.to_string()),
        ]
    );
    assert_eq!(CONNECTION_ERROR_MESSAGE, "Sorry, I encountered a connection error.");
    assert!(!conv.loading());
    assert_eq!(speaker.spoken(), vec![SPOKEN_ERROR_NOTICE.to_string()]);
}

#[tokio::test]
async fn test_each_submission_adds_exactly_two_messages() {
    let reply = ScriptedReply::with(vec![
        Ok("one".to_string()),
        Err(ReplyError::Timeout(30)),
        Ok("three".to_string()),
    ]);
    let (mut conv, _) = build(reply, Duration::ZERO);

    for (i, text) in ["first", "second", "third"].iter().enumerate() {
        conv.submit(text).await.unwrap();
        assert_eq!(conv.messages().len(), (i + 1) * 2);
        let last_two = &conv.messages()[i * 2..];
        assert_eq!(last_two[0].role, Role::User);
        assert_eq!(last_two[0].content, *text);
        assert_eq!(last_two[1].role, Role::Agent);
    }
    assert_eq!(conv.messages()[3].content, CONNECTION_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_blank_submission_is_noop() {
    let reply = ScriptedReply::with(vec![]);
    let (mut conv, speaker) = build(reply.clone(), Duration::ZERO);

    for blank in ["", "   ", "\n\t "] {
        assert_eq!(conv.submit(blank).await.unwrap(), SendOutcome::Ignored);
    }
    assert!(conv.messages().is_empty());
    assert!(conv.sessions().is_empty());
    assert!(reply.requests().is_empty());
    assert!(speaker.spoken().is_empty());
}

// =============================================================================
// Single request in flight
// =============================================================================

#[tokio::test]
async fn test_second_send_rejected_while_pending() {
    let reply = ScriptedReply::with(vec![]);
    let (mut conv, _) = build(reply, Duration::ZERO);

    let outgoing = conv.begin_send("Is there an outage in Pune?").unwrap().unwrap();
    assert!(conv.loading());
    assert_eq!(conv.phase(), Phase::AwaitingReply);

    assert!(matches!(
        conv.begin_send("hello?"),
        Err(ChatError::ReplyPending)
    ));
    assert!(matches!(
        conv.submit("hello again?").await,
        Err(ChatError::ReplyPending)
    ));
    assert_eq!(conv.messages().len(), 1);

    conv.finish_send(outgoing, Ok("No outages reported.".to_string()));
    assert!(!conv.loading());
    assert_eq!(conv.messages().len(), 2);
}

#[tokio::test]
async fn test_session_switch_forbidden_while_pending() {
    let reply = ScriptedReply::with(vec![Ok("first reply".to_string())]);
    let (mut conv, _) = build(reply, Duration::ZERO);
    conv.submit("Billing question").await.unwrap();
    let first_id = conv.current_session_id().unwrap().to_string();

    conv.new_chat().unwrap();
    let outgoing = conv.begin_send("Roaming question").unwrap().unwrap();

    assert!(matches!(conv.new_chat(), Err(ChatError::ReplyPending)));
    assert!(matches!(
        conv.select_session(&first_id),
        Err(ChatError::ReplyPending)
    ));
    assert_eq!(conv.current_session_id(), Some(outgoing.session_id()));

    conv.finish_send(outgoing, Ok("Roaming is enabled.".to_string()));
    conv.select_session(&first_id).unwrap();
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn test_first_message_creates_titled_session() {
    let reply = ScriptedReply::with(vec![Ok("ok".to_string()), Ok("ok".to_string())]);
    let (mut conv, _) = build(reply, Duration::ZERO);

    conv.submit("My internet has been dropping every evening since Monday")
        .await
        .unwrap();
    assert_eq!(conv.sessions().len(), 1);
    let session = conv.current_session().unwrap();
    assert_eq!(session.title, "My internet has been dropping ...");

    conv.submit("Still happening").await.unwrap();
    assert_eq!(conv.sessions().len(), 1);
}

#[tokio::test]
async fn test_new_chat_clears_messages_keeps_sessions() {
    let reply = ScriptedReply::with(vec![Ok("ok".to_string()), Ok("ok".to_string())]);
    let (mut conv, _) = build(reply, Duration::ZERO);

    conv.submit("Payment failed").await.unwrap();
    let sessions_before = conv.sessions().to_vec();

    conv.new_chat().unwrap();
    assert!(conv.messages().is_empty());
    assert!(conv.current_session_id().is_none());
    assert_eq!(conv.sessions(), sessions_before.as_slice());

    conv.submit("Internet upgrade info").await.unwrap();
    assert_eq!(conv.sessions().len(), 2);
    assert_eq!(conv.sessions()[0].title, "Internet upgrade info...");
    assert_eq!(conv.sessions()[1].title, "Payment failed...");
}

#[tokio::test]
async fn test_select_session_restores_transcript_and_is_idempotent() {
    let reply = ScriptedReply::with(vec![
        Ok("billing reply".to_string()),
        Ok("data reply".to_string()),
    ]);
    let (mut conv, _) = build(reply, Duration::ZERO);

    conv.submit("Billing").await.unwrap();
    let billing = conv.current_session_id().unwrap().to_string();
    conv.new_chat().unwrap();
    conv.submit("Data usage").await.unwrap();

    conv.open_sidebar();
    conv.select_session(&billing).unwrap();
    assert!(!conv.flags().sidebar_open);
    let once = (conv.current_session_id().map(str::to_string), transcript(&conv));

    conv.select_session(&billing).unwrap();
    let twice = (conv.current_session_id().map(str::to_string), transcript(&conv));

    assert_eq!(once, twice);
    assert_eq!(
        once.1,
        vec![
            (Role::User, "Billing".to_string()),
            (Role::Agent, "billing reply".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_select_unknown_session_leaves_state() {
    let reply = ScriptedReply::with(vec![Ok("ok".to_string())]);
    let (mut conv, _) = build(reply, Duration::ZERO);
    conv.submit("hello").await.unwrap();
    let current = conv.current_session_id().map(str::to_string);

    let err = conv.select_session("does-not-exist").unwrap_err();
    assert!(matches!(err, ChatError::SessionNotFound(ref id) if id == "does-not-exist"));
    assert_eq!(conv.current_session_id().map(str::to_string), current);
    assert_eq!(conv.messages().len(), 2);
}

// =============================================================================
// Speech
// =============================================================================

#[tokio::test]
async fn test_tts_disabled_means_no_synthesis() {
    let reply = ScriptedReply::with(vec![Ok("Your balance is 2 GB.".to_string())]);
    let (mut conv, speaker) = build(reply, Duration::ZERO);

    assert!(!conv.toggle_tts());
    conv.submit("Data balance?").await.unwrap();
    conv.flush_speech().await;

    assert!(speaker.spoken().is_empty());
    assert_eq!(speaker.cancels.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_reply_spoken_after_delay() {
    let reply = ScriptedReply::with(vec![Ok("Let me check that for you.".to_string())]);
    let (mut conv, speaker) = build(reply, Duration::from_millis(500));

    conv.submit("My bill is wrong").await.unwrap();
    assert!(speaker.spoken().is_empty());

    conv.flush_speech().await;
    assert_eq!(speaker.spoken(), vec!["Let me check that for you.".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_new_reply_replaces_pending_speech() {
    let reply = ScriptedReply::with(vec![Ok("first".to_string()), Ok("second".to_string())]);
    let (mut conv, speaker) = build(reply, Duration::from_millis(500));

    conv.submit("one").await.unwrap();
    conv.submit("two").await.unwrap();
    conv.flush_speech().await;

    assert_eq!(speaker.spoken(), vec!["second".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_failure_notice_supersedes_delayed_reply() {
    let reply = ScriptedReply::with(vec![
        Ok("Your plan renews on the 5th.".to_string()),
        Err(ReplyError::Transport("connection reset".to_string())),
    ]);
    let (mut conv, speaker) = build(reply, Duration::from_millis(500));

    conv.submit("When does my plan renew?").await.unwrap();
    conv.submit("And my data balance?").await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(speaker.spoken(), vec![SPOKEN_ERROR_NOTICE.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_conversation_cancels_speech() {
    let reply = ScriptedReply::with(vec![Ok("Goodbye for now.".to_string())]);
    let (mut conv, speaker) = build(reply, Duration::from_millis(500));

    conv.submit("That's all, thanks").await.unwrap();
    drop(conv);
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(speaker.spoken().is_empty());
    assert!(speaker.cancels.load(Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn test_utterances_use_fixed_voice() {
    let reply = ScriptedReply::with(vec![Ok("ok".to_string())]);
    let (mut conv, speaker) = build(reply, Duration::ZERO);
    conv.submit("hi").await.unwrap();

    let spoken = speaker.spoken.lock().unwrap();
    assert_eq!(spoken[0].locale, "en-IN");
    assert_eq!(spoken[0].rate, 1.0);
    assert_eq!(spoken[0].pitch, 1.0);
}

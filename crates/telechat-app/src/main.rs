//! Telechat application binary - composition root.
//!
//! Ties the Telechat crates into a terminal client:
//! 1. Start tracing, then load configuration from TOML and apply CLI/env overrides
//! 2. Build the reply client and the voice adapters
//! 3. Run the event loop over stdin, recognition events and replies

mod cli;
mod command;
mod logging;

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use telechat_chat::{ChatError, Conversation, ConversationSettings, OutgoingMessage};
use telechat_core::config::TelechatConfig;
use telechat_reply::{HttpReplyClient, ReplyError, ReplyService};
use telechat_ui::{
    osc52_copy_sequence, render_screen, render_session_list, resolve_selection, CopyConfirmation,
    InputBar,
};
use telechat_voice::{
    CommandSpeaker, CommandTranscriber, ListenOutcome, NullSpeaker, RecognitionEvent,
    RecognitionEvents, RecognitionSettings, Speaker, SpeechSynthesisAdapter, Transcriber,
    TranscriptionAdapter, UnsupportedTranscriber, VoiceError, VoiceSettings,
};

use cli::CliArgs;
use command::{Command, HELP};
use logging::FilterHandle;

const UNSUPPORTED_NOTICE: &str =
    "Speech recognition isn't supported here. Set [transcription].command in the config.";
const PENDING_NOTICE: &str = "Please wait for the assistant to reply.";

/// A reply request running on the runtime.
struct InFlight {
    outgoing: OutgoingMessage,
    task: JoinHandle<Result<String, ReplyError>>,
}

/// Terminal client state around the conversation.
struct App {
    conversation: Conversation,
    reply: Arc<dyn ReplyService>,
    listener: TranscriptionAdapter,
    recognition: Option<RecognitionEvents>,
    input: InputBar,
    copy: CopyConfirmation,
    in_flight: Option<InFlight>,
}

impl App {
    fn redraw(&self) {
        let copied = self.copy.visible(Instant::now());
        for line in render_screen(&self.conversation, &self.input, copied) {
            println!("{}", line);
        }
    }

    fn notice(&self, text: &str) {
        println!("! {}", text);
    }

    /// Handle one line of input. Returns `false` to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        match Command::parse(line) {
            Command::Send(text) => {
                self.input.set_text(text);
                match self.input.take(self.conversation.loading()) {
                    Some(text) => self.send(&text),
                    None if self.conversation.loading() => {
                        self.input.clear();
                        self.notice(PENDING_NOTICE);
                    }
                    None => {}
                }
            }
            Command::NewChat => match self.conversation.new_chat() {
                Ok(()) => self.redraw(),
                Err(e) => self.chat_error(e),
            },
            Command::Sessions => {
                self.conversation.open_sidebar();
                let lines = render_session_list(
                    self.conversation.sessions(),
                    self.conversation.current_session_id(),
                );
                for line in lines {
                    println!("{}", line);
                }
            }
            Command::Select(selector) => {
                let id = resolve_selection(self.conversation.sessions(), &selector)
                    .map(|s| s.id.clone())
                    .unwrap_or(selector);
                match self.conversation.select_session(&id) {
                    Ok(()) => {
                        self.copy.reset();
                        self.redraw();
                    }
                    Err(e) => self.chat_error(e),
                }
            }
            Command::Mic => self.start_listening(),
            Command::StopMic => {
                self.listener.stop();
                self.recognition = None;
                self.input.set_listening(false);
                self.redraw();
            }
            Command::ToggleTts => {
                let enabled = self.conversation.toggle_tts();
                tracing::info!(enabled, "Text-to-speech toggled");
                self.redraw();
            }
            Command::ToggleTheme => {
                let dark = self.conversation.toggle_theme();
                tracing::debug!(dark, "Theme toggled");
                self.redraw();
            }
            Command::Copy => self.copy_last_reply(),
            Command::Help => println!("{}", HELP),
            Command::Quit => return false,
            Command::Unknown(cmd) => self.notice(&format!("Unknown command {}; try /help", cmd)),
        }
        true
    }

    fn send(&mut self, text: &str) {
        match self.conversation.begin_send(text) {
            Ok(Some(outgoing)) => {
                let reply = Arc::clone(&self.reply);
                let (text, user_id) = (outgoing.text.clone(), outgoing.user_id.clone());
                let task = tokio::spawn(async move { reply.send_message(&text, &user_id).await });
                self.in_flight = Some(InFlight { outgoing, task });
                self.redraw();
            }
            Ok(None) => {}
            Err(e) => self.chat_error(e),
        }
    }

    fn on_reply(&mut self, result: Result<String, ReplyError>) {
        let Some(in_flight) = self.in_flight.take() else {
            return;
        };
        let outcome = self.conversation.finish_send(in_flight.outgoing, result);
        tracing::debug!(outcome = ?outcome, "Reply handled");
        self.redraw();
    }

    fn start_listening(&mut self) {
        match self.listener.start() {
            Ok(ListenOutcome::Started(events)) => {
                self.recognition = Some(events);
                self.input.set_listening(true);
                self.redraw();
            }
            Ok(ListenOutcome::AlreadyListening) => {}
            Err(VoiceError::Unsupported(_)) => self.notice(UNSUPPORTED_NOTICE),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to start listening");
                self.notice(&e.to_string());
            }
        }
    }

    fn on_recognition(&mut self, event: Option<RecognitionEvent>) {
        let state = match event {
            Some(event) => self.listener.handle_event(event),
            None => {
                self.recognition = None;
                self.listener.handle_event(RecognitionEvent::End)
            }
        };
        let listening = self.listener.listening();
        if !listening {
            self.recognition = None;
        }
        if self.input.listening() != listening {
            tracing::debug!(state = %state, "Listening state changed");
            self.input.set_listening(listening);
            self.redraw();
        }
    }

    /// A recognized utterance is submitted like typed text.
    fn on_transcript(&mut self, text: String) {
        if self.conversation.loading() {
            tracing::info!("Discarding transcript while a reply is pending");
            self.notice(PENDING_NOTICE);
            return;
        }
        self.send(&text);
    }

    fn copy_last_reply(&mut self) {
        let last = self
            .conversation
            .messages()
            .iter()
            .enumerate()
            .rev()
            .find(|(_, m)| m.is_agent());
        match last {
            Some((index, message)) => {
                print!("{}", osc52_copy_sequence(&message.content));
                self.copy.mark(index, Instant::now());
                self.redraw();
            }
            None => self.notice("Nothing to copy yet."),
        }
    }

    fn chat_error(&self, error: ChatError) {
        match error {
            ChatError::ReplyPending => self.notice(PENDING_NOTICE),
            e => self.notice(&e.to_string()),
        }
    }
}

async fn next_recognition(events: &mut Option<RecognitionEvents>) -> Option<RecognitionEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_reply(in_flight: &mut Option<InFlight>) -> Result<String, ReplyError> {
    match in_flight {
        Some(in_flight) => match (&mut in_flight.task).await {
            Ok(result) => result,
            Err(e) => Err(ReplyError::Transport(e.to_string())),
        },
        None => std::future::pending().await,
    }
}

fn build_speaker(config: &TelechatConfig) -> Arc<dyn Speaker> {
    match config
        .speech
        .command
        .as_deref()
        .and_then(CommandSpeaker::from_command_line)
    {
        Some(speaker) => {
            tracing::info!(program = %speaker.program(), "Speech synthesis via command");
            Arc::new(speaker)
        }
        None => {
            tracing::info!("No speech command configured, replies will not be spoken aloud");
            Arc::new(NullSpeaker)
        }
    }
}

fn build_transcriber(config: &TelechatConfig) -> Arc<dyn Transcriber> {
    match config
        .transcription
        .command
        .as_deref()
        .and_then(CommandTranscriber::from_command_line)
    {
        Some(transcriber) => {
            tracing::info!(program = %transcriber.program(), "Speech recognition via command");
            Arc::new(transcriber)
        }
        None => Arc::new(UnsupportedTranscriber),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Tracing goes to stderr so it does not interleave with the chat.
    let explicit =
        logging::explicit_directive(std::env::var("RUST_LOG").ok(), args.log_level.as_deref());
    let (subscriber, log_filter) = logging::build_subscriber(
        explicit.as_deref().unwrap_or(logging::DEFAULT_LEVEL),
        std::io::stderr,
    );
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!("Starting Telechat v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args, explicit.is_none().then_some(log_filter)).await {
        tracing::error!(error = %e, "Telechat failed");
        return Err(e.into());
    }
    Ok(())
}

/// Load the config, wire everything together and run until `/quit` or EOF.
///
/// `log_filter` is set when the config file decides the log level.
async fn run(args: CliArgs, log_filter: Option<FilterHandle>) -> telechat_core::Result<()> {
    let config_file = args.resolve_config_path();
    let mut config = TelechatConfig::load_or_default(&config_file);
    if let Some(ref handle) = log_filter {
        logging::apply_config_level(handle, &config.general.log_level);
    }
    config.reply.endpoint = args.resolve_endpoint(&config.reply.endpoint);
    if let Some(ref user_id) = args.user_id {
        config.general.user_id = user_id.clone();
    }
    if args.no_tts {
        config.speech.enabled = false;
    }
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    let reply: Arc<dyn ReplyService> = Arc::new(HttpReplyClient::from_config(&config.reply)?);
    tracing::info!(
        endpoint = %config.reply.endpoint,
        user_id = %config.general.user_id,
        "Reply client ready"
    );

    let speech = Arc::new(SpeechSynthesisAdapter::new(
        build_speaker(&config),
        VoiceSettings::from(&config.speech),
        config.speech.enabled,
    ));

    let (transcript_tx, mut transcripts) = mpsc::unbounded_channel::<String>();
    let listener = TranscriptionAdapter::new(
        build_transcriber(&config),
        RecognitionSettings::single_utterance(config.transcription.locale.clone()),
        Box::new(move |text| {
            let _ = transcript_tx.send(text);
        }),
    );

    let mut app = App {
        conversation: Conversation::new(
            Arc::clone(&reply),
            speech,
            ConversationSettings::from(&config),
        ),
        reply,
        listener,
        recognition: None,
        input: InputBar::new(),
        copy: CopyConfirmation::default(),
        in_flight: None,
    };
    app.redraw();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !app.handle_line(&line) {
                        break;
                    }
                }
                None => break,
            },
            event = next_recognition(&mut app.recognition) => app.on_recognition(event),
            Some(text) = transcripts.recv() => app.on_transcript(text),
            result = next_reply(&mut app.in_flight) => app.on_reply(result),
        }
    }

    // Shutdown abandons the pending reply; dropping the conversation cancels
    // any utterance still scheduled or playing.
    if let Some(in_flight) = app.in_flight.take() {
        tracing::info!(session_id = %in_flight.outgoing.session_id(), "Abandoning pending reply");
        in_flight.task.abort();
    }
    app.listener.stop();
    drop(app);
    tracing::info!("Telechat stopped");

    Ok(())
}

//! Terminal chat client for a running relay
//!
//! Usage:
//!   RELAY_URL=http://localhost:3001 cargo run --example chat_client -- you@example.com
//!
//! Lines are sent as text. Commands:
//!   /agent interview|profile   switch agent
//!   /pdf <path>                send a PDF
//!   /audio <path>              send an audio clip
//!   /log                       print the chat log

use std::sync::Arc;

use agent_relay::client::{ChatSession, Composer, PushSubscriber, ReconnectPolicy, RelayClient};
use agent_relay::models::{AgentKind, ChatMessage, Sender};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};
use tracing_subscriber::EnvFilter;

fn render(message: &ChatMessage) -> String {
    let who = match message.sender {
        Sender::User => "you",
        Sender::Ai => "ai ",
    };
    let body = match (&message.text, &message.attachment) {
        (Some(text), _) => text.clone(),
        (None, Some(file)) => format!("[{} {}]", file.kind.as_str(), file.filename),
        (None, None) => String::new(),
    };
    format!("{} > {}", who, body)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("agent_relay=warn")),
        )
        .init();

    let email = std::env::args()
        .nth(1)
        .ok_or("usage: chat_client <email>")?;
    let relay_url =
        std::env::var("RELAY_URL").unwrap_or_else(|_| "http://localhost:3001".to_string());

    let client = Arc::new(RelayClient::new(&relay_url)?);
    let session = Arc::new(Mutex::new(ChatSession::new(email)));

    // Replies
    let (push_tx, mut push_rx) = mpsc::unbounded_channel();
    let subscriber = PushSubscriber::new(client.push_url()?.to_string(), ReconnectPolicy::default());
    tokio::spawn(subscriber.run(push_tx));

    let replies = session.clone();
    tokio::spawn(async move {
        while let Some(payload) = push_rx.recv().await {
            let mut session = replies.lock().await;
            session.apply_push(payload);
            if let Some(last) = session.messages().iter().rev().find(|m| m.sender == Sender::Ai) {
                println!("{}", render(last));
            }
        }
    });

    println!("Connected to {}. Type a message or /help for commands", relay_url);

    let mut agent = AgentKind::Interview;
    let mut composer = Composer::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').unwrap_or((line, "")) {
            ("/help", _) => {
                println!("/agent interview|profile, /pdf <path>, /audio <path>, /log");
                continue;
            }
            ("/agent", name) => {
                match name.parse() {
                    Ok(kind) => {
                        agent = kind;
                        println!("agent: {}", agent);
                    }
                    Err(e) => println!("{}", e),
                }
                continue;
            }
            ("/log", _) => {
                for message in session.lock().await.messages() {
                    println!("{}", render(message));
                }
                continue;
            }
            ("/pdf", path) => {
                let data = match tokio::fs::read(path).await {
                    Ok(data) => data,
                    Err(e) => {
                        println!("cannot read {}: {}", path, e);
                        continue;
                    }
                };
                let filename = std::path::Path::new(path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "document.pdf".to_string());
                if let Err(e) = composer.attach_pdf(filename, "application/pdf", data) {
                    println!("{}", e);
                    continue;
                }
            }
            ("/audio", path) => match tokio::fs::read(path).await {
                Ok(data) => composer.attach_audio(data),
                Err(e) => {
                    println!("cannot read {}: {}", path, e);
                    continue;
                }
            },
            _ => composer.set_text(line),
        }

        let request = match session.lock().await.begin_send(&mut composer, agent) {
            Ok(request) => request,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        // Dispatch without waiting; the reply comes through the push channel
        let client = client.clone();
        let dispatched = session.clone();
        tokio::spawn(async move {
            match client.send(&request).await {
                Ok(_) => dispatched.lock().await.mark_dispatched(),
                Err(e) => eprintln!("send failed: {}", e),
            }
        });
    }

    Ok(())
}

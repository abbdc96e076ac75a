//! Two peers on one in-process network, chatting in the same room.
//!
//! Lines typed on stdin are sent by the first peer; the second peer
//! prints what it receives. Usage: `lobby [user] [room] [log-level]`.

use hbxchat::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

// ---------------------------------------------------------------------------
// Input commands
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Say(&'a str),
    Rename(&'a str),
    Peers,
    Quit,
    Nothing,
}

fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    match line.split_once(' ') {
        Some(("/name", name)) if !name.trim().is_empty() => Command::Rename(name.trim()),
        _ => match line {
            "" => Command::Nothing,
            "/peers" => Command::Peers,
            "/quit" => Command::Quit,
            text => Command::Say(text),
        },
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), ChatError> {
    let mut args = std::env::args().skip(1);
    let user = args.next().unwrap_or_default();
    let room = args.next().unwrap_or_default();
    let level = args.next().unwrap_or_default();
    hbxchat::init_tracing(&level);

    let network = MemoryNetwork::new();
    let local = network.node();
    let remote = network.node();

    let mut me = ChatRoom::join(&local, &user, &room)?;
    let mut echo = ChatRoom::join(&remote, "listener", &room)?;
    tracing::info!(room = me.room_name(), user = %me.user_name(), "joined");
    println!("Joined '{}' as '{}'. /name <new>, /peers, /quit", me.room_name(), me.user_name());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(msg) = echo.inbound.recv() => {
                println!("[{}] {}: {}", echo.room_name(), msg.sender_name, msg.text);
            }
            Some(log) = me.logs.recv() => println!("{log}"),
            Some(log) = echo.logs.recv() => println!("{log}"),
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "stdin failed");
                        break;
                    }
                };
                match parse_command(&line) {
                    Command::Say(text) => {
                        if me.outbound.send(text.to_string()).await.is_err() {
                            break;
                        }
                    }
                    Command::Rename(name) => me.update_user(name),
                    Command::Peers => {
                        for peer in me.peer_list() {
                            println!("  {peer}");
                        }
                    }
                    Command::Quit => break,
                    Command::Nothing => {}
                }
            }
        }
    }

    me.exit().await;
    echo.exit().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text() {
        assert_eq!(parse_command("hello there"), Command::Say("hello there"));
        assert_eq!(parse_command("  padded  "), Command::Say("padded"));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command("/peers"), Command::Peers);
        assert_eq!(parse_command("/name  alice "), Command::Rename("alice"));
        assert_eq!(parse_command(""), Command::Nothing);
    }

    #[test]
    fn test_parse_name_without_argument_is_text() {
        assert_eq!(parse_command("/name"), Command::Say("/name"));
    }
}

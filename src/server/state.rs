//! Feedback host state.
//!
//! Each connection gets its own [`LearnerSession`] with its own
//! [`NuggetProgress`], so learners never see each other's answers or
//! fragment positions.

use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::interpreter::{NuggetProgress, RetryPolicy};
use crate::models::Nugget;
use crate::protocol::{ClientMessage, ServerMessage, outline};

/// A single learner connection.
pub struct LearnerSession {
    pub id: Uuid,
    pub addr: SocketAddr,
    pub progress: NuggetProgress,
    /// Channel to send messages to this learner.
    sender: mpsc::UnboundedSender<ServerMessage>,
}

impl LearnerSession {
    pub fn new(nugget: &Nugget, addr: SocketAddr, sender: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self {
            id: Uuid::new_v4(),
            addr,
            progress: NuggetProgress::for_nugget(nugget),
            sender,
        }
    }

    /// Send a message to this learner. Returns false once the connection
    /// is gone.
    pub fn send(&self, msg: ServerMessage) -> bool {
        self.sender.send(msg).is_ok()
    }
}

/// Main host state.
pub struct ServerState {
    pub nugget: Nugget,
    pub retry: RetryPolicy,
    pub sessions: HashMap<Uuid, LearnerSession>,
}

impl ServerState {
    pub fn new(nugget: Nugget, retry: RetryPolicy) -> Self {
        Self {
            nugget,
            retry,
            sessions: HashMap::new(),
        }
    }

    /// Register a connection and greet it with the outline.
    pub fn open_session(&mut self, addr: SocketAddr, sender: mpsc::UnboundedSender<ServerMessage>) -> Uuid {
        let session = LearnerSession::new(&self.nugget, addr, sender);
        let id = session.id;

        session.send(ServerMessage::ConnectionAck {
            session_id: id,
            title: self.nugget.title.clone(),
            sections: outline(&self.nugget),
        });
        self.sessions.insert(id, session);
        id
    }

    pub fn close_session(&mut self, id: &Uuid) {
        self.sessions.remove(id);
    }

    /// Handle a message and send the reply to the session.
    pub fn dispatch(&mut self, id: &Uuid, msg: ClientMessage) {
        let reply = self.handle(id, msg);
        if let Some(session) = self.sessions.get(id) {
            session.send(reply);
        }
    }

    /// Compute the reply to a message for one session.
    pub fn handle(&mut self, id: &Uuid, msg: ClientMessage) -> ServerMessage {
        let Some(session) = self.sessions.get_mut(id) else {
            return rejected(format!("unknown session {}", id));
        };

        match msg {
            ClientMessage::Outline => ServerMessage::Outline {
                sections: outline(&self.nugget),
            },
            ClientMessage::Evaluate {
                section,
                block,
                selected,
            } => {
                let Some(quiz) = self.nugget.quiz(section, block) else {
                    return rejected(format!("no quiz block {} in section {}", block, section));
                };
                let Some(progress) = session.progress.section_mut(section) else {
                    return rejected(format!("no section {}", section));
                };

                let visible = self.nugget.sections[section].visible_quizzes(progress.fragment());
                if !visible.contains(&block) {
                    return rejected(format!("quiz block {} is not revealed yet", block));
                }

                let Some(block_session) = progress.block_mut(block) else {
                    return rejected(format!("no quiz block {} in section {}", block, section));
                };
                match block_session.submit(quiz, selected, self.retry) {
                    Ok(result) => ServerMessage::Feedback {
                        section,
                        block,
                        is_correct: result.is_correct,
                        message: result.message,
                    },
                    Err(e) => rejected(e.to_string()),
                }
            }
            ClientMessage::Advance { section } => match session.progress.section_mut(section) {
                Some(progress) => ServerMessage::FragmentRevealed {
                    section,
                    index: progress.advance(),
                },
                None => rejected(format!("no section {}", section)),
            },
            ClientMessage::Reset { section } => match session.progress.section_mut(section) {
                Some(progress) => {
                    progress.rewind();
                    ServerMessage::FragmentRevealed { section, index: 0 }
                }
                None => rejected(format!("no section {}", section)),
            },
        }
    }
}

fn rejected(reason: String) -> ServerMessage {
    ServerMessage::Rejected { reason }
}

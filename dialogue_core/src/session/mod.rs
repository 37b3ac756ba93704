//! Dialogue sessions - the state machine driving one conversation.
//!
//! A session is a stack of frames. A choice list sits at the bottom, selecting
//! a topic pushes its lines on top, and selecting a sub-menu pushes another
//! choice list. Running out of lines pops back to the list below, which is
//! recomputed since the lines may have taught the player something.

mod view;

pub use view::*;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use world_rules::KnowledgeStore;

use crate::effects::Effect;
use crate::script::ScriptLibrary;
use crate::tree::{is_goodbye, mark_seen, Choice, ChoiceKind, CompletionMap, Resolver, Speaker, Step, ENTER_KEY};

/// Number of choices shown at once unless configured otherwise.
pub const DEFAULT_VISIBLE_CHOICES: usize = 11;

/// Unique identifier for sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a session stands after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Something is on screen and the session waits for input.
    Active,
    /// The outermost choice list ran out of choices.
    Finished,
    /// An `EXIT` step ended the conversation.
    Exited,
}

impl SessionStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Active)
    }
}

/// Everything a session reads or mutates outside of itself.
pub struct DialogueContext<'a> {
    pub scripts: &'a ScriptLibrary,
    pub knowledge: &'a mut KnowledgeStore,
    pub completion: &'a mut CompletionMap,
    /// Effects queued by `EXEC` steps, applied by the caller.
    pub effects: &'a mut Vec<Effect>,
}

#[derive(Debug, Clone)]
struct ChoiceFrame {
    path: Vec<String>,
    choices: Vec<Choice>,
    selected: usize,
    offset: usize,
}

impl ChoiceFrame {
    fn new(path: Vec<String>) -> Self {
        Self {
            path,
            choices: Vec::new(),
            selected: 0,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct Line {
    speaker: Speaker,
    text: String,
}

#[derive(Debug, Clone)]
struct LineFrame {
    steps: VecDeque<Step>,
    current: Option<Line>,
}

#[derive(Debug, Clone)]
enum Frame {
    Choices(ChoiceFrame),
    Lines(LineFrame),
}

/// One conversation with an actor or an object.
#[derive(Debug, Clone)]
pub struct DialogueSession {
    id: SessionId,
    namespace: String,
    /// Display name of whoever the player talks to.
    partner: String,
    player_name: String,
    visible: usize,
    frames: Vec<Frame>,
}

impl DialogueSession {
    /// Open a session on a script's root menu, playing its `enter` topic first.
    ///
    /// The session is only worth keeping when the returned status is active.
    pub fn open(
        namespace: impl Into<String>,
        partner: impl Into<String>,
        player_name: impl Into<String>,
        visible: usize,
        ctx: &mut DialogueContext<'_>,
    ) -> (Self, SessionStatus) {
        let mut session = Self {
            id: SessionId::new(),
            namespace: namespace.into(),
            partner: partner.into(),
            player_name: player_name.into(),
            visible: visible.max(1),
            frames: Vec::new(),
        };

        let status = session.push_menu(Vec::new(), ctx);
        tracing::debug!(session = %session.id, namespace = %session.namespace, ?status, "session opened");
        (session, status)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn partner(&self) -> &str {
        &self.partner
    }

    /// Nesting depth; zero once the session is over.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Push a choice list for a menu, with its `enter` lines on top when present.
    pub fn push_menu(&mut self, path: Vec<String>, ctx: &mut DialogueContext<'_>) -> SessionStatus {
        let enter = ctx.scripts.menu(&self.namespace, &path).and_then(|menu| {
            Resolver::new(&self.namespace, &*ctx.knowledge, &*ctx.completion)
                .get_enter(menu, &path)
                .map(|resolved| (resolved.condition.clone(), resolved.steps.to_vec()))
        });

        if let Some((condition, steps)) = enter {
            mark_seen(ctx.completion, &self.namespace, &path, ENTER_KEY, &condition);
            self.frames.push(Frame::Choices(ChoiceFrame::new(path)));
            self.frames.push(Frame::Lines(LineFrame {
                steps: steps.into(),
                current: None,
            }));
        } else {
            self.frames.push(Frame::Choices(ChoiceFrame::new(path)));
        }

        self.settle(ctx)
    }

    /// Recompute the choices of the top choice list.
    ///
    /// Selects the first unseen choice (or the first one) and centers the
    /// scroll window on it. Returns `false` if nothing is on offer.
    pub fn show(&mut self, ctx: &DialogueContext<'_>) -> bool {
        let Some(Frame::Choices(frame)) = self.frames.last_mut() else {
            return false;
        };
        let Some(menu) = ctx.scripts.menu(&self.namespace, &frame.path) else {
            return false;
        };

        let choices = Resolver::new(&self.namespace, &*ctx.knowledge, &*ctx.completion).get_choices(menu, &frame.path);
        if choices.is_empty() {
            return false;
        }

        frame.selected = choices.iter().position(|choice| !choice.seen).unwrap_or(0);
        frame.offset = centered_offset(frame.selected, choices.len(), self.visible);
        frame.choices = choices;
        true
    }

    /// Move the highlight up, wrapping to the bottom.
    pub fn up(&mut self) {
        self.move_selection(|selected, len| (selected + len - 1) % len);
    }

    /// Move the highlight down, wrapping to the top.
    pub fn down(&mut self) {
        self.move_selection(|selected, len| (selected + 1) % len);
    }

    fn move_selection(&mut self, next: impl FnOnce(usize, usize) -> usize) {
        let visible = self.visible;
        let Some(Frame::Choices(frame)) = self.frames.last_mut() else {
            return;
        };
        let len = frame.choices.len();
        if len == 0 {
            return;
        }

        frame.selected = next(frame.selected, len);
        if frame.selected < frame.offset {
            frame.offset = frame.selected;
        } else if frame.selected >= frame.offset + visible {
            frame.offset = frame.selected + 1 - visible;
        }
    }

    /// Select the highlighted choice, or advance to the next line.
    pub fn select(&mut self, ctx: &mut DialogueContext<'_>) -> SessionStatus {
        let (path, choice) = match self.frames.last_mut() {
            None => return SessionStatus::Finished,
            Some(Frame::Lines(lines)) => {
                lines.current = None;
                return self.settle(ctx);
            }
            Some(Frame::Choices(frame)) => match frame.choices.get(frame.selected) {
                Some(choice) => (frame.path.clone(), choice.clone()),
                None => return self.settle(ctx),
            },
        };

        match choice.kind {
            ChoiceKind::Menu => {
                let mut sub_path = path;
                sub_path.push(choice.key);
                self.push_menu(sub_path, ctx)
            }
            ChoiceKind::Topic => self.play_topic(path, &choice.key, ctx),
        }
    }

    /// Same as [`select`](Self::select) while lines are showing.
    pub fn advance(&mut self, ctx: &mut DialogueContext<'_>) -> SessionStatus {
        self.select(ctx)
    }

    fn play_topic(&mut self, path: Vec<String>, key: &str, ctx: &mut DialogueContext<'_>) -> SessionStatus {
        let resolved = ctx.scripts.menu(&self.namespace, &path).and_then(|menu| {
            Resolver::new(&self.namespace, &*ctx.knowledge, &*ctx.completion)
                .get_steps(menu, &path, key)
                .map(|resolved| (resolved.condition.clone(), resolved.steps.to_vec()))
        });

        let Some((condition, steps)) = resolved else {
            // Stale choice list; show it again.
            return self.settle(ctx);
        };

        if !is_goodbye(key) {
            mark_seen(ctx.completion, &self.namespace, &path, key, &condition);
        }
        tracing::debug!(session = %self.id, topic = key, "topic selected");

        self.frames.push(Frame::Lines(LineFrame {
            steps: steps.into(),
            current: None,
        }));
        self.settle(ctx)
    }

    /// Leave a sub-menu. Does nothing on the root list or while lines play.
    pub fn back(&mut self, ctx: &mut DialogueContext<'_>) -> SessionStatus {
        let nested = self.frames.len() > 1 && matches!(self.frames.last(), Some(Frame::Choices(_)));
        if !nested {
            return self.status();
        }

        self.frames.pop();
        self.settle(ctx)
    }

    /// Current status without changing anything.
    pub fn status(&self) -> SessionStatus {
        if self.frames.is_empty() {
            SessionStatus::Finished
        } else {
            SessionStatus::Active
        }
    }

    /// Run until something can be shown.
    ///
    /// `LEARN`, `FORGET` and `EXEC` steps apply without stopping, a spoken
    /// line stops, exhausted lines pop back to the choice list below.
    fn settle(&mut self, ctx: &mut DialogueContext<'_>) -> SessionStatus {
        loop {
            let lines = match self.frames.last_mut() {
                None => return SessionStatus::Finished,
                Some(Frame::Lines(lines)) => lines,
                Some(Frame::Choices(_)) => {
                    if self.show(ctx) {
                        return SessionStatus::Active;
                    }
                    self.frames.pop();
                    continue;
                }
            };

            if lines.current.is_some() {
                return SessionStatus::Active;
            }

            match lines.steps.pop_front() {
                None => {
                    self.frames.pop();
                }
                Some(Step::Speak { speaker, text }) => {
                    lines.current = Some(Line { speaker, text });
                    return SessionStatus::Active;
                }
                Some(Step::Learn(fact)) => {
                    ctx.knowledge.learn(fact);
                }
                Some(Step::Forget(fact)) => {
                    ctx.knowledge.forget(&fact);
                }
                Some(Step::Exec(effect)) => {
                    tracing::debug!(session = %self.id, ?effect, "effect queued");
                    ctx.effects.push(effect);
                }
                Some(Step::Exit) => {
                    tracing::debug!(session = %self.id, "session exited");
                    self.frames.clear();
                    return SessionStatus::Exited;
                }
            }
        }
    }

    /// What the driver should draw for this session.
    pub fn view(&self) -> Option<DialogueView> {
        match self.frames.last()? {
            Frame::Lines(lines) => {
                let line = lines.current.as_ref()?;
                let name = match line.speaker {
                    Speaker::Player => self.player_name.clone(),
                    Speaker::Other => self.partner.clone(),
                };
                Some(DialogueView::Line(LineView {
                    speaker: line.speaker,
                    name,
                    text: line.text.clone(),
                    color: line.speaker.color(),
                }))
            }
            Frame::Choices(frame) => Some(DialogueView::Choices(ChoiceListView::window(
                &frame.choices,
                frame.selected,
                frame.offset,
                self.visible,
            ))),
        }
    }
}

/// Scroll offset that puts `selected` in the middle of the window, clamped to the list.
pub fn centered_offset(selected: usize, len: usize, visible: usize) -> usize {
    if len <= visible {
        return 0;
    }
    selected.saturating_sub(visible / 2).min(len - visible)
}

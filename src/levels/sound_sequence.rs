//! Level 1, "The Silent Cortex": repeat a four-tone sequence

use serde_json::Value;

use crate::game::{GameStore, StatCategory};

pub const LEVEL_ID: &str = "level-1";
/// Choice id under which the entered sequence is kept
pub const PROGRESS_CHOICE: &str = "sequenceProgress";

/// Delay between notes of the demo playback
pub const DEMO_NOTE_SPACING_MS: i32 = 800;

/// A clickable sound node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    A,
    B,
    C,
    D,
}

impl Sound {
    pub const ALL: [Sound; 4] = [Sound::A, Sound::B, Sound::C, Sound::D];

    /// `data-sound` attribute value
    pub fn as_str(&self) -> &'static str {
        match self {
            Sound::A => "sound-A",
            Sound::B => "sound-B",
            Sound::C => "sound-C",
            Sound::D => "sound-D",
        }
    }

    pub fn parse_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sound| sound.as_str() == s)
    }

    /// Short label for the sequence display
    pub fn label(&self) -> &'static str {
        match self {
            Sound::A => "SA",
            Sound::B => "SB",
            Sound::C => "SC",
            Sound::D => "SD",
        }
    }

    /// Tone in Hz (A4, C5, E5, G5)
    pub fn frequency(&self) -> f32 {
        match self {
            Sound::A => 440.0,
            Sound::B => 523.25,
            Sound::C => 659.25,
            Sound::D => 783.99,
        }
    }
}

pub const CORRECT_SEQUENCE: [Sound; 4] = [Sound::B, Sound::D, Sound::A, Sound::C];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Solved,
    Incorrect,
}

impl Verdict {
    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Solved => {
                "Success! You found the hidden sound pattern. The mind begins to open and reconnect."
            }
            Verdict::Incorrect => {
                "The pattern is not right yet. Listen to the example again and try to find the correct order."
            }
        }
    }
}

/// The player's entered sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequencePuzzle {
    entered: Vec<Sound>,
}

impl SequencePuzzle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a saved `sequenceProgress` value; unknown entries are skipped
    pub fn restore(saved: Option<&Value>) -> Self {
        let entered = saved
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(Sound::parse_name)
                    .collect()
            })
            .unwrap_or_default();
        Self { entered }
    }

    pub fn entered(&self) -> &[Sound] {
        &self.entered
    }

    pub fn press(&mut self, sound: Sound) {
        self.entered.push(sound);
    }

    pub fn reset(&mut self) {
        self.entered.clear();
    }

    /// Checking is allowed once a full-length sequence has been entered
    pub fn can_check(&self) -> bool {
        self.entered.len() >= CORRECT_SEQUENCE.len()
    }

    pub fn check(&self) -> Verdict {
        if self.entered == CORRECT_SEQUENCE {
            Verdict::Solved
        } else {
            Verdict::Incorrect
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Array(
            self.entered
                .iter()
                .map(|s| Value::String(s.as_str().to_string()))
                .collect(),
        )
    }
}

pub fn save_progress(store: &mut GameStore, level_id: &str, puzzle: &SequencePuzzle) {
    store.record_choice(level_id, PROGRESS_CHOICE, puzzle.to_value());
}

/// Reward the attempt: solving pays logic and resilience and completes the
/// level; a miss still earns a little resilience.
pub fn apply_verdict(store: &mut GameStore, level_id: &str, verdict: Verdict) {
    match verdict {
        Verdict::Solved => {
            store.adjust_stat(StatCategory::Logic, 15);
            store.adjust_stat(StatCategory::Resilience, 10);
            store.complete_level(level_id);
        }
        Verdict::Incorrect => {
            store.adjust_stat(StatCategory::Resilience, 5);
        }
    }
}

/// Where "continue" leads after the feedback modal
pub fn continue_target(store: &GameStore, level_id: &str, verdict: Verdict) -> Option<String> {
    match verdict {
        Verdict::Solved => Some(format!("/{}", store.next_level(level_id))),
        Verdict::Incorrect => None,
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::SoundSequenceController;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use web_sys::{Document, Element, Window};

    use super::*;
    use crate::audio::ToneGenerator;
    use crate::levels::dom::{self, ListenerSet, Timers};
    use crate::router::{LevelContext, LevelController};

    struct Session {
        ctx: LevelContext,
        window: Window,
        document: Document,
        puzzle: SequencePuzzle,
        verdict: Option<Verdict>,
        playing_demo: bool,
        tones: ToneGenerator,
        timers: Timers,
    }

    impl Session {
        fn render_sequence(&self) {
            let Some(output) = self.document.get_element_by_id("sequence-output") else {
                return;
            };
            output.set_inner_html("");
            for sound in self.puzzle.entered() {
                if let Ok(span) = self.document.create_element("span") {
                    span.set_class_name("sequence-item");
                    span.set_text_content(Some(sound.label()));
                    let _ = output.append_child(&span);
                }
            }
            dom::set_disabled(&self.document, "check-solution", !self.puzzle.can_check());
        }

        fn persist(&self) {
            let mut store = self.ctx.store.borrow_mut();
            save_progress(&mut store, &self.ctx.level_id, &self.puzzle);
        }

        fn set_controls_enabled(&self, enabled: bool) {
            for node in dom::query_all(&self.document, ".node") {
                dom::set_style(&node, "pointer-events", if enabled { "auto" } else { "none" });
                dom::set_style(&node, "opacity", if enabled { "1" } else { "0.5" });
            }
            dom::set_disabled(&self.document, "play-sequence", !enabled);
        }
    }

    fn node_for(document: &Document, sound: Sound) -> Option<Element> {
        document
            .query_selector(&format!("[data-sound=\"{}\"]", sound.as_str()))
            .ok()
            .flatten()
    }

    /// Briefly highlight a node
    fn flash(session: &mut Session, node: Element, ms: i32) {
        let _ = node.class_list().add_1("active");
        let window = session.window.clone();
        session.timers.after(&window, ms, move || {
            let _ = node.class_list().remove_1("active");
        });
    }

    fn play_demo(session: &Rc<RefCell<Session>>) {
        let mut s = session.borrow_mut();
        if s.playing_demo {
            return;
        }
        s.playing_demo = true;
        s.set_controls_enabled(false);

        let window = s.window.clone();
        for (i, sound) in CORRECT_SEQUENCE.into_iter().enumerate() {
            let session = session.clone();
            s.timers.after(&window, i as i32 * DEMO_NOTE_SPACING_MS, move || {
                let mut s = session.borrow_mut();
                s.tones.play(sound.frequency());
                if let Some(node) = node_for(&s.document, sound) {
                    flash(&mut s, node, 500);
                }
            });
        }

        let done_at = (CORRECT_SEQUENCE.len() as i32 - 1) * DEMO_NOTE_SPACING_MS + 1000;
        let session = session.clone();
        s.timers.after(&window, done_at, move || {
            let mut s = session.borrow_mut();
            s.playing_demo = false;
            s.set_controls_enabled(true);
        });
    }

    pub struct SoundSequenceController {
        session: Option<Rc<RefCell<Session>>>,
        listeners: ListenerSet,
    }

    impl SoundSequenceController {
        pub fn new() -> Self {
            Self {
                session: None,
                listeners: ListenerSet::default(),
            }
        }
    }

    impl LevelController for SoundSequenceController {
        fn activate(&mut self, ctx: LevelContext) {
            let Some(window) = web_sys::window() else { return };
            let Some(document) = window.document() else { return };

            let puzzle = {
                let store = ctx.store.borrow();
                SequencePuzzle::restore(store.get_choice(&ctx.level_id, Some(PROGRESS_CHOICE)).as_ref())
            };
            log::info!("{}: restored {} entered sounds", ctx.level_id, puzzle.entered().len());

            let session = Rc::new(RefCell::new(Session {
                ctx,
                window,
                document: document.clone(),
                puzzle,
                verdict: None,
                playing_demo: false,
                tones: ToneGenerator::new(),
                timers: Timers::default(),
            }));
            session.borrow().render_sequence();

            for node in dom::query_all(&document, ".node") {
                let Some(sound) = node.get_attribute("data-sound").and_then(|s| Sound::parse_name(&s)) else {
                    continue;
                };
                let session = session.clone();
                let target = node.clone();
                self.listeners.listen(&node, "click", move |_event| {
                    let mut s = session.borrow_mut();
                    if s.playing_demo {
                        return;
                    }
                    s.tones.play(sound.frequency());
                    s.puzzle.press(sound);
                    s.render_sequence();
                    s.persist();
                    flash(&mut s, target.clone(), 300);
                });
            }

            if let Some(button) = document.get_element_by_id("play-sequence") {
                let session = session.clone();
                self.listeners.listen(&button, "click", move |_event| play_demo(&session));
            }

            if let Some(button) = document.get_element_by_id("check-solution") {
                let session = session.clone();
                self.listeners.listen(&button, "click", move |_event| {
                    let mut s = session.borrow_mut();
                    let verdict = s.puzzle.check();
                    s.verdict = Some(verdict);
                    {
                        let mut store = s.ctx.store.borrow_mut();
                        apply_verdict(&mut store, &s.ctx.level_id, verdict);
                    }
                    if let Some(message) = s.document.get_element_by_id("feedback-message") {
                        message.set_text_content(Some(verdict.message()));
                    }
                    dom::set_hidden(&s.document, "feedback-modal", false);
                });
            }

            if let Some(button) = document.get_element_by_id("reset-sequence") {
                let session = session.clone();
                self.listeners.listen(&button, "click", move |_event| {
                    let mut s = session.borrow_mut();
                    s.puzzle.reset();
                    s.render_sequence();
                    s.persist();
                });
            }

            if let Some(button) = document.get_element_by_id("continue-btn") {
                let session = session.clone();
                self.listeners.listen(&button, "click", move |_event| {
                    let s = session.borrow();
                    dom::set_hidden(&s.document, "feedback-modal", true);
                    let Some(verdict) = s.verdict else { return };
                    let target = {
                        let store = s.ctx.store.borrow();
                        continue_target(&store, &s.ctx.level_id, verdict)
                    };
                    if let Some(target) = target {
                        s.ctx.navigator.navigate(&target);
                    }
                });
            }

            self.session = Some(session);
        }

        fn deactivate(&mut self) {
            self.listeners.clear();
            if let Some(session) = self.session.take() {
                let mut s = session.borrow_mut();
                let window = s.window.clone();
                s.timers.cancel_all(&window);
            }
        }
    }
}

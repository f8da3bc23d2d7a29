//! Renderer capability and a recording implementation
//!
//! Drawing key glyphs and animating the overlay surface belong to the host.
//! The controller hands it the current face, toggles visibility and starts
//! show/hide animations, each tagged with an [`AnimationToken`] the host
//! passes back through `OverlayController::animation_finished`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::case::CaseState;
use crate::key::{Key, KeyLayout, LayoutKind};

/// Which overlay animation is playing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    Show,
    Hide,
}

/// Identifies one animation run; completions carrying an old token are
/// ignored
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationToken(pub(crate) u64);

/// Renderer capability implemented by the host
pub trait Renderer {
    /// Draw `layout` with the shift key reflecting `case`
    fn render(&mut self, layout: &KeyLayout, case: CaseState);

    /// Attach or detach the overlay surface
    fn set_visible(&mut self, visible: bool);

    /// Start an animation; report completion with `token`
    fn play_animation(&mut self, kind: AnimationKind, duration: Duration, token: AnimationToken);

    /// Screen y of the overlay's top edge while shown
    fn overlay_top(&self) -> f32;

    /// Enable or disable the key-press preview bubble
    fn set_preview_enabled(&mut self, _enabled: bool) {}
}

// ============================================================================
// Recording renderer
// ============================================================================

/// A call received by [`RecordingRenderer`]
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCall {
    Render {
        kind: LayoutKind,
        case: CaseState,
        keys: Vec<Key>,
    },
    SetVisible(bool),
    Animation {
        kind: AnimationKind,
        duration: Duration,
        token: AnimationToken,
    },
    Preview(bool),
}

struct RecorderState {
    calls: Vec<RenderCall>,
    visible: bool,
    overlay_top: f32,
}

/// Renderer that records every call
///
/// Cloning shares the recording, so a test can keep a handle while the
/// controller owns another.
#[derive(Clone)]
pub struct RecordingRenderer {
    inner: Rc<RefCell<RecorderState>>,
}

impl RecordingRenderer {
    /// Overlay whose top edge sits at `overlay_top` when shown
    pub fn new(overlay_top: f32) -> Self {
        Self {
            inner: Rc::new(RefCell::new(RecorderState {
                calls: Vec::new(),
                visible: false,
                overlay_top,
            })),
        }
    }

    pub fn calls(&self) -> Vec<RenderCall> {
        self.inner.borrow().calls.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.inner.borrow().visible
    }

    /// Number of animations of `kind` started so far
    pub fn animation_count(&self, kind: AnimationKind) -> usize {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter(|call| matches!(call, RenderCall::Animation { kind: k, .. } if *k == kind))
            .count()
    }

    /// Token of the most recent animation of `kind`
    pub fn last_token(&self, kind: AnimationKind) -> Option<AnimationToken> {
        self.inner.borrow().calls.iter().rev().find_map(|call| match call {
            RenderCall::Animation { kind: k, token, .. } if *k == kind => Some(*token),
            _ => None,
        })
    }

    /// Face and case of the most recent render
    pub fn last_render(&self) -> Option<(LayoutKind, CaseState, Vec<Key>)> {
        self.inner.borrow().calls.iter().rev().find_map(|call| match call {
            RenderCall::Render { kind, case, keys } => Some((*kind, *case, keys.clone())),
            _ => None,
        })
    }

    /// Most recent preview setting
    pub fn preview_enabled(&self) -> Option<bool> {
        self.inner.borrow().calls.iter().rev().find_map(|call| match call {
            RenderCall::Preview(enabled) => Some(*enabled),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().calls.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, layout: &KeyLayout, case: CaseState) {
        self.inner.borrow_mut().calls.push(RenderCall::Render {
            kind: layout.kind(),
            case,
            keys: layout.keys().to_vec(),
        });
    }

    fn set_visible(&mut self, visible: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.visible = visible;
        inner.calls.push(RenderCall::SetVisible(visible));
    }

    fn play_animation(&mut self, kind: AnimationKind, duration: Duration, token: AnimationToken) {
        self.inner.borrow_mut().calls.push(RenderCall::Animation {
            kind,
            duration,
            token,
        });
    }

    fn overlay_top(&self) -> f32 {
        self.inner.borrow().overlay_top
    }

    fn set_preview_enabled(&mut self, enabled: bool) {
        self.inner.borrow_mut().calls.push(RenderCall::Preview(enabled));
    }
}

/// Where a click on the overlay surface landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Surface,
    Descendant,
}

/// Visibility of the single lightbox surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Hidden,
    Visible { src: String },
}

impl OverlayState {
    pub fn is_visible(&self) -> bool {
        matches!(self, OverlayState::Visible { .. })
    }

    pub fn src(&self) -> Option<&str> {
        match self {
            OverlayState::Visible { src } => Some(src.as_str()),
            OverlayState::Hidden => None,
        }
    }

    /// CSS `display` value for the surface in this state.
    pub fn display(&self) -> &'static str {
        if self.is_visible() {
            "block"
        } else {
            "none"
        }
    }

    /// Shows `src`, replacing whatever was visible before.
    pub fn enlarge(&mut self, src: &str) {
        *self = OverlayState::Visible {
            src: src.to_string(),
        };
    }

    /// Returns whether the overlay was visible before.
    pub fn dismiss(&mut self) -> bool {
        let was_visible = self.is_visible();
        *self = OverlayState::Hidden;
        was_visible
    }

    /// Only clicks landing on the surface itself close it.
    pub fn surface_click(&mut self, target: ClickTarget) -> bool {
        match target {
            ClickTarget::Surface => {
                self.dismiss();
                true
            }
            ClickTarget::Descendant => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_hidden() {
        let state = OverlayState::default();
        assert!(!state.is_visible());
        assert_eq!(state.display(), "none");
        assert_eq!(state.src(), None);
    }

    #[test]
    fn enlarge_shows_latest_source() {
        let mut state = OverlayState::default();
        state.enlarge("/static/a.png");
        state.enlarge("/static/b.png");
        assert_eq!(state.display(), "block");
        assert_eq!(state.src(), Some("/static/b.png"));
    }

    #[test]
    fn dismiss_from_any_state_hides() {
        let mut state = OverlayState::default();
        assert!(!state.dismiss());
        state.enlarge("/static/a.png");
        assert!(state.dismiss());
        assert_eq!(state, OverlayState::Hidden);
    }

    #[test]
    fn descendant_click_keeps_overlay_open() {
        let mut state = OverlayState::default();
        state.enlarge("/static/a.png");
        assert!(!state.surface_click(ClickTarget::Descendant));
        assert_eq!(state.src(), Some("/static/a.png"));
        assert!(state.surface_click(ClickTarget::Surface));
        assert!(!state.is_visible());
    }
}

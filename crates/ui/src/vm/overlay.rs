/// The single sheet that may cover the workout screen.
///
/// Rest is tracked by the session controller, so it is not an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    AllSets,
    Substitutes,
    Chat,
}

impl Overlay {
    /// Open `target`, or close it when it is already the open sheet.
    #[must_use]
    pub fn toggle(self, target: Overlay) -> Overlay {
        if self == target { Overlay::None } else { target }
    }

    #[must_use]
    pub fn is_open(self) -> bool {
        self != Overlay::None
    }
}
